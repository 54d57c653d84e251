//! Client-facing split of an [`Exercise`].
//!
//! The renderable [`Question`] never carries the answer.  Options get opaque
//! ids (`opt_0`, `opt_1`, ...) and the [`Correction`] names the right one by
//! id; fill-in corrections hold the literal answer instead.

use serde::Serialize;

use crate::exercise_engine::{
    difficulty::Difficulty,
    models::{Exercise, ExerciseMeta},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Multiple choice.
    Mc,
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMetadata {
    pub generator_id: String,
    pub generator_version: u32,
    pub topic_id: u32,
    pub topic_title: String,
    pub difficulty: Difficulty,
}

impl From<&ExerciseMeta> for QuestionMetadata {
    fn from(meta: &ExerciseMeta) -> Self {
        QuestionMetadata {
            generator_id: meta.generator_id.clone(),
            generator_version: meta.generator_version,
            topic_id: meta.topic_id,
            topic_title: meta.topic_title.clone(),
            difficulty: meta.difficulty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub question_type: QuestionType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
    pub metadata: QuestionMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    pub id: String,
    pub answer_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionPayload {
    pub question: Question,
    pub correction: Correction,
}

fn option_id(index: usize) -> String {
    format!("opt_{index}")
}

impl From<&Exercise> for QuestionPayload {
    fn from(exercise: &Exercise) -> Self {
        let meta = exercise.meta();
        let (question_type, options, answer_key) = match exercise {
            Exercise::Choice(c) => (
                QuestionType::Mc,
                c.options
                    .iter()
                    .enumerate()
                    .map(|(i, text)| QuestionOption { id: option_id(i), text: text.clone() })
                    .collect(),
                option_id(c.correct_index),
            ),
            Exercise::FillIn(f) => (QuestionType::Input, Vec::new(), f.correct_answer.clone()),
        };

        QuestionPayload {
            question: Question {
                id: meta.id.clone(),
                prompt: exercise.statement().to_string(),
                question_type,
                options,
                metadata: QuestionMetadata::from(meta),
            },
            correction: Correction {
                id: meta.id.clone(),
                answer_key,
                explanation: exercise.explanation().map(str::to_string),
            },
        }
    }
}
