use crate::exercise_engine::{
    builder::{build_choice, ChoiceParams, TopicInfo},
    catalog::LimitsView,
    config::EngineConfig,
    difficulty::{Difficulty, Tier},
    distractors::Distractors,
    error::Result,
    models::Exercise,
    session::PrngSession,
};

/// Everything a topic generator may read or draw from during one call.
///
/// The tier is normalized once, here, and the limits view is bound to it.
pub struct GenerationContext<'a> {
    pub session: &'a mut PrngSession,
    pub topic: TopicInfo,
    pub difficulty: Difficulty,
    pub tier: Tier,
    pub limits: LimitsView,
    pub distractor_count: usize,
    pub max_attempts: usize,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        session: &'a mut PrngSession,
        topic: TopicInfo,
        difficulty: Difficulty,
        limits: LimitsView,
        config: &EngineConfig,
    ) -> Self {
        GenerationContext {
            session,
            topic,
            difficulty,
            tier: limits.tier(),
            limits,
            distractor_count: config.distractor_count,
            max_attempts: config.max_attempts,
        }
    }

    /// A sampler preconfigured with the engine's count and attempt budget.
    pub fn distractors<T: std::fmt::Display + Clone + 'static>(&self, correct: T) -> Distractors<T> {
        Distractors::new(correct)
            .count(self.distractor_count)
            .max_attempts(self.max_attempts)
    }

    /// Finish with the correct answer first in `options`.
    pub fn choice(
        &mut self,
        statement: String,
        options: Vec<String>,
        explanation: impl Into<String>,
    ) -> Result<Exercise> {
        build_choice(
            self.session,
            ChoiceParams {
                topic: self.topic,
                difficulty: self.difficulty,
                statement,
                options,
                correct_index: 0,
                explanation: Some(explanation.into()),
            },
        )
    }
}
