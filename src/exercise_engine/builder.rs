//! Assembly of the final exercise value.
//!
//! Every generator ends with [`build_choice`]: it receives the options in
//! "correct answer at a known position" order, shuffles them with the
//! session, and records where the correct answer landed.  The shuffled order
//! is the only order that ever leaves the engine.

use std::collections::HashSet;
use std::fmt::Display;

use tracing::{debug, warn};

use crate::exercise_engine::{
    difficulty::Difficulty,
    error::{EngineError, Result},
    models::{ChoiceExercise, Exercise, ExerciseMeta, FillInExercise},
    session::PrngSession,
};

pub const GENERATOR_VERSION: u32 = 1;

/// Appended to the statement when a choice exercise becomes fill-in.
pub const DEFAULT_FILL_IN_CUE: &str = "Completa: ____";

/// Static identity of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicInfo {
    pub id: u32,
    pub title: &'static str,
}

impl TopicInfo {
    pub const fn new(id: u32, title: &'static str) -> Self {
        TopicInfo { id, title }
    }

    pub fn generator_id(&self) -> String {
        format!("matematicas/{:02}", self.id)
    }
}

pub struct ChoiceParams {
    pub topic: TopicInfo,
    pub difficulty: Difficulty,
    pub statement: String,
    /// Unshuffled options.
    pub options: Vec<String>,
    /// Position of the correct answer in `options`.
    pub correct_index: usize,
    pub explanation: Option<String>,
}

/// Stringify option values in order.
pub fn option_strings<T: Display>(values: &[T]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Build a shuffled multiple-choice exercise.
///
/// Fails with `DuplicateOptions` when two options share a string form, and
/// with `InvalidRange` when `correct_index` is out of bounds; no exercise is
/// produced in either case.
pub fn build_choice(session: &mut PrngSession, params: ChoiceParams) -> Result<Exercise> {
    let ChoiceParams { topic, difficulty, statement, options, correct_index, explanation } = params;

    let correct = options
        .get(correct_index)
        .cloned()
        .ok_or(EngineError::InvalidRange { min: 0, max: options.len() as i64 - 1 })?;

    let mut seen = HashSet::with_capacity(options.len());
    for opt in &options {
        if !seen.insert(opt.as_str()) {
            return Err(EngineError::DuplicateOptions { option: opt.clone() });
        }
    }

    let shuffled = session.shuffle(&options);
    // Injective stringification makes this lookup exact.
    let shuffled_index = shuffled
        .iter()
        .position(|o| *o == correct)
        .ok_or(EngineError::DuplicateOptions { option: correct.clone() })?;

    let meta = ExerciseMeta {
        id: session.next_id(topic.id),
        topic_id: topic.id,
        topic_title: topic.title.to_string(),
        difficulty,
        generator_id: topic.generator_id(),
        generator_version: GENERATOR_VERSION,
    };
    debug!(id = %meta.id, topic = topic.id, %difficulty, options = shuffled.len(), "built choice exercise");

    Ok(Exercise::Choice(ChoiceExercise {
        meta,
        statement,
        options: shuffled,
        correct_index: shuffled_index,
        explanation,
    }))
}

/// Turn a choice exercise into fill-in-the-blank form.
///
/// The correct option becomes the literal answer.  `fill_text` is
/// `replacement` when given, otherwise the statement followed by `cue`.
/// A fill-in exercise is returned unchanged, and so is a choice exercise
/// whose `correct_index` points past its options.
pub fn to_fill_in(exercise: Exercise, cue: &str, replacement: Option<&str>) -> Exercise {
    let choice = match exercise {
        Exercise::Choice(c) => c,
        fill @ Exercise::FillIn(_) => return fill,
    };
    let Some(correct_answer) = choice.correct_option().map(str::to_string) else {
        warn!(
            id = %choice.meta.id,
            correct_index = choice.correct_index,
            options = choice.options.len(),
            "choice exercise has no correct option, leaving it unconverted"
        );
        return Exercise::Choice(choice);
    };
    let fill_text = match replacement {
        Some(text) => text.to_string(),
        None => format!("{} {}", choice.statement, cue),
    };
    Exercise::FillIn(FillInExercise {
        meta: choice.meta,
        statement: choice.statement,
        fill_text,
        correct_answer,
        explanation: choice.explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise_engine::difficulty::CoreDifficulty;

    const TOPIC: TopicInfo = TopicInfo::new(1, "Operaciones básicas");

    fn params(options: &[i64]) -> ChoiceParams {
        ChoiceParams {
            topic: TOPIC,
            difficulty: CoreDifficulty::Basico.into(),
            statement: "¿Cuánto es 2 + 3?".to_string(),
            options: option_strings(options),
            correct_index: 0,
            explanation: Some("2 + 3 = 5".to_string()),
        }
    }

    #[test]
    fn correct_index_follows_the_shuffle() {
        for seed in 0..50 {
            let mut s = PrngSession::from_seed(seed);
            let ex = build_choice(&mut s, params(&[5, 4, 6, 9])).unwrap();
            let c = ex.as_choice().unwrap();
            assert_eq!(c.options.len(), 4);
            assert_eq!(c.correct_option(), Some("5"), "seed={seed}");
        }
    }

    #[test]
    fn correct_answer_position_varies_across_seeds() {
        let positions: HashSet<usize> = (0..40)
            .map(|seed| {
                let mut s = PrngSession::from_seed(seed);
                build_choice(&mut s, params(&[5, 4, 6, 9])).unwrap().as_choice().unwrap().correct_index
            })
            .collect();
        assert!(positions.len() > 1, "the correct answer must not sit at a fixed position");
    }

    #[test]
    fn duplicate_options_are_rejected() {
        let mut s = PrngSession::from_seed(1);
        let err = build_choice(&mut s, params(&[5, 4, 5, 9])).unwrap_err();
        assert_eq!(err, EngineError::DuplicateOptions { option: "5".to_string() });
        assert_eq!(s.ids_allocated(), 0, "a rejected build must not allocate an id");
    }

    #[test]
    fn out_of_range_correct_index_is_rejected() {
        let mut s = PrngSession::from_seed(1);
        let mut p = params(&[1, 2]);
        p.correct_index = 2;
        assert!(matches!(build_choice(&mut s, p), Err(EngineError::InvalidRange { .. })));
    }

    #[test]
    fn fill_in_carries_answer_and_metadata() {
        let mut s = PrngSession::from_seed(3);
        let choice = build_choice(&mut s, params(&[5, 4, 6, 9])).unwrap();
        let fill = to_fill_in(choice.clone(), DEFAULT_FILL_IN_CUE, None);
        let f = fill.as_fill_in().unwrap();
        assert_eq!(f.correct_answer, "5");
        assert_eq!(f.meta, *choice.meta());
        assert_eq!(f.fill_text, format!("¿Cuánto es 2 + 3? {DEFAULT_FILL_IN_CUE}"));
        assert_eq!(f.explanation.as_deref(), Some("2 + 3 = 5"));
    }

    #[test]
    fn fill_in_uses_caller_replacement() {
        let mut s = PrngSession::from_seed(3);
        let choice = build_choice(&mut s, params(&[5, 4, 6, 9])).unwrap();
        let fill = to_fill_in(choice, DEFAULT_FILL_IN_CUE, Some("2 + 3 = ____"));
        assert_eq!(fill.as_fill_in().unwrap().fill_text, "2 + 3 = ____");
    }

    #[test]
    fn fill_in_is_idempotent() {
        let mut s = PrngSession::from_seed(8);
        let choice = build_choice(&mut s, params(&[5, 4, 6, 9])).unwrap();
        let once = to_fill_in(choice, DEFAULT_FILL_IN_CUE, None);
        let twice = to_fill_in(once.clone(), DEFAULT_FILL_IN_CUE, None);
        assert_eq!(once, twice);
    }

    #[test]
    fn fill_in_leaves_a_broken_choice_untouched() {
        let mut s = PrngSession::from_seed(8);
        let mut broken = build_choice(&mut s, params(&[5, 4, 6, 9])).unwrap();
        if let Exercise::Choice(choice) = &mut broken {
            choice.correct_index = 9;
        }
        let out = to_fill_in(broken.clone(), DEFAULT_FILL_IN_CUE, None);
        assert_eq!(out, broken);
        assert!(out.as_fill_in().is_none());
    }
}
