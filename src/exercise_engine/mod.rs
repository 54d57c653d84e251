//! Core exercise engine: difficulty normalization, catalog limits, seeded
//! generation and distractor synthesis.
//!
//! ## Module overview
//!
//! | Module           | Purpose |
//! |------------------|---------|
//! | `error`          | `EngineError` and the crate `Result` alias |
//! | `session`        | Seeded PRNG session, exercise id counter, per-request slot |
//! | `difficulty`     | Core/casual taxonomies, canonical `Tier`, fallback tables |
//! | `catalog`        | `CatalogSource` contract, limits documents, coalescing cache |
//! | `memory_catalog` | In-process `CatalogSource` for tests and offline use |
//! | `config`         | `EngineConfig` loaded from TOML |
//! | `models`         | Exercise values and the generation request |
//! | `builder`        | Option shuffling, exercise assembly, fill-in conversion |
//! | `distractors`    | Bounded rejection sampling of wrong answers |
//! | `numeric`        | Primes, gcd/lcm, fractions, number formatting |
//! | `context`        | `GenerationContext` handed to every topic generator |
//! | `topics`         | Bespoke topic generators and the generic 56..=85 templates |
//! | `registry`       | Topic ID to generator table |
//! | `engine`         | `ExerciseEngine`: `generate`, `generate_fresh`, `generate_batch` |
//! | `payload`        | Question/correction split for clients |

pub mod builder;
pub mod catalog;
pub mod config;
pub mod context;
pub mod difficulty;
pub mod distractors;
pub mod engine;
pub mod error;
pub mod memory_catalog;
pub mod models;
pub mod numeric;
pub mod payload;
pub mod registry;
pub mod session;
pub mod topics;

// Re-export the public API surface so callers can use
// `exercise_engine::ExerciseEngine` without reaching into sub-modules.
pub use catalog::{CatalogCache, CatalogSource, FetchError, LimitsView, TopicLimits, TopicListing};
pub use config::EngineConfig;
pub use difficulty::{to_casual, to_core, CasualDifficulty, CoreDifficulty, Difficulty, Tier};
pub use engine::ExerciseEngine;
pub use error::{EngineError, Result};
pub use memory_catalog::MemoryCatalog;
pub use models::{
    ChoiceExercise, Exercise, ExerciseConfig, ExerciseMeta, ExerciseMode, FillInExercise,
    GenerationRequest,
};
pub use payload::{Correction, Question, QuestionPayload};
pub use registry::Registry;
pub use session::PrngSession;
