use serde::{Deserialize, Serialize};

use crate::exercise_engine::difficulty::Difficulty;

// ---------------------------------------------------------------------------
// Exercise values
// ---------------------------------------------------------------------------

/// Identity shared by both exercise kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseMeta {
    pub id: String,
    pub topic_id: u32,
    pub topic_title: String,
    pub difficulty: Difficulty,
    /// e.g. `"matematicas/01"`.
    pub generator_id: String,
    pub generator_version: u32,
}

/// Multiple choice: `options[correct_index]` is the right answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceExercise {
    #[serde(flatten)]
    pub meta: ExerciseMeta,
    pub statement: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ChoiceExercise {
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

/// Fill in the blank: the student types `correct_answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillInExercise {
    #[serde(flatten)]
    pub meta: ExerciseMeta,
    pub statement: String,
    pub fill_text: String,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Exercise {
    #[serde(rename = "quiz")]
    Choice(ChoiceExercise),
    #[serde(rename = "completar")]
    FillIn(FillInExercise),
}

impl Exercise {
    pub fn meta(&self) -> &ExerciseMeta {
        match self {
            Exercise::Choice(e) => &e.meta,
            Exercise::FillIn(e) => &e.meta,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    pub fn statement(&self) -> &str {
        match self {
            Exercise::Choice(e) => &e.statement,
            Exercise::FillIn(e) => &e.statement,
        }
    }

    pub fn explanation(&self) -> Option<&str> {
        match self {
            Exercise::Choice(e) => e.explanation.as_deref(),
            Exercise::FillIn(e) => e.explanation.as_deref(),
        }
    }

    pub fn as_choice(&self) -> Option<&ChoiceExercise> {
        match self {
            Exercise::Choice(e) => Some(e),
            Exercise::FillIn(_) => None,
        }
    }

    pub fn as_fill_in(&self) -> Option<&FillInExercise> {
        match self {
            Exercise::FillIn(e) => Some(e),
            Exercise::Choice(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseMode {
    #[default]
    Quiz,
    Completar,
}

/// Per-call options.  An absent config leaves the exercise in choice form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseConfig {
    #[serde(default)]
    pub mode: ExerciseMode,
    /// Replaces the engine's fill-in cue for this call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_in_cue: Option<String>,
}

impl ExerciseConfig {
    pub fn completar() -> Self {
        ExerciseConfig { mode: ExerciseMode::Completar, fill_in_cue: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic_id: u32,
    pub difficulty: Difficulty,
    /// `None` draws from entropy.
    pub rng_seed: Option<u64>,
    #[serde(default)]
    pub config: Option<ExerciseConfig>,
}

impl GenerationRequest {
    /// Minimal request: `basico`, entropy seed, quiz mode.
    pub fn new(topic_id: u32) -> Self {
        GenerationRequest {
            topic_id,
            difficulty: Difficulty::default(),
            rng_seed: None,
            config: None,
        }
    }

    pub fn difficulty(mut self, difficulty: impl Into<Difficulty>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn config(mut self, config: ExerciseConfig) -> Self {
        self.config = Some(config);
        self
    }
}
