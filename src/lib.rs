//! # exercise_drill_gen
//!
//! A deterministic, seeded generator of math exercises.
//!
//! Each topic generator draws its numbers from a seeded session, computes the
//! correct answer, and surrounds it with plausible wrong answers.  The options
//! are shuffled with the same session, so the position of the correct answer
//! reveals nothing, and the same seed always replays the same exercise.
//!
//! ## How it works
//!
//! 1. Build an [`ExerciseEngine`] over a [`CatalogSource`], the remote store of
//!    per-topic limits (number ranges, allowed operations, rules).
//! 2. Create a [`GenerationRequest`] with a topic ID, a difficulty in either
//!    taxonomy (`basico`/`intermedio`/`avanzado` or `facil`/`media`/`dificil`)
//!    and an optional seed.
//! 3. Call [`ExerciseEngine::generate`] to use whatever limits are cached, or
//!    [`ExerciseEngine::generate_fresh`] to fetch the topic's limits first.
//!    Missing catalog entries fall back to each topic's built-in defaults.
//! 4. The returned [`Exercise`] is either multiple choice or fill-in; turn it
//!    into a client payload with [`QuestionPayload::from`].
//!
//! ## Key features
//!
//! - **Deterministic**: `rng_seed: Some(u64)` reproduces the exercise byte for
//!   byte, given the same cached limits.
//! - **Bounded**: every rejection-sampling loop has an attempt budget and a
//!   deterministic fallback, so generation always terminates.
//! - **Coalesced fetches**: concurrent preloads of one topic share a single
//!   catalog request.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use exercise_drill_gen::{
//!     CasualDifficulty, ExerciseEngine, GenerationRequest, MemoryCatalog, QuestionPayload,
//! };
//!
//! let engine = ExerciseEngine::with_source(Arc::new(MemoryCatalog::new()));
//!
//! let exercise = engine
//!     .generate(GenerationRequest::new(1).difficulty(CasualDifficulty::Media).seed(42))
//!     .unwrap();
//! println!("Q: {}", exercise.statement());
//!
//! if let Some(choice) = exercise.as_choice() {
//!     for (i, option) in choice.options.iter().enumerate() {
//!         let mark = if i == choice.correct_index { "+" } else { " " };
//!         println!("[{mark}] {option}");
//!     }
//! }
//!
//! let payload = QuestionPayload::from(&exercise);
//! println!("answer key: {}", payload.correction.answer_key);
//! ```

pub mod exercise_engine;

// Convenience re-exports so callers can use `exercise_drill_gen::ExerciseEngine`
// directly without reaching into `exercise_engine::`.
pub use exercise_engine::{
    to_casual, to_core, CasualDifficulty, CatalogCache, CatalogSource, ChoiceExercise,
    CoreDifficulty, Correction, Difficulty, EngineConfig, EngineError, Exercise, ExerciseConfig,
    ExerciseEngine, ExerciseMeta, ExerciseMode, FetchError, FillInExercise, GenerationRequest,
    MemoryCatalog, PrngSession, Question, QuestionPayload, Registry, Tier, TopicListing,
};
