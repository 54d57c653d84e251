use thiserror::Error;

/// Every failure the engine can surface to a caller.
///
/// `Clone` because a coalesced catalog fetch hands the same outcome to every
/// waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("no active PRNG session: install one before drawing")]
    NotInitialized,

    #[error("no limits document for topic '{topic}'")]
    CatalogNotFound { topic: String },

    #[error("catalog document for topic '{topic}' is malformed: {reason}")]
    CatalogMalformed { topic: String, reason: String },

    #[error("catalog fetch for '{topic}' failed: {reason}")]
    CatalogFetch { topic: String, reason: String },

    #[error("no catalog topic matches id {topic_id:02}")]
    TopicUnresolved { topic_id: u32 },

    #[error("no generator registered for topic {topic_id}")]
    UnknownTopic { topic_id: u32 },

    #[error("found {found} of {wanted} distractors for '{correct}' before giving up")]
    DistractorExhaustion { correct: String, wanted: usize, found: usize },

    #[error("option '{option}' appears more than once")]
    DuplicateOptions { option: String },

    #[error("invalid range [{min}, {max}]")]
    InvalidRange { min: i64, max: i64 },

    #[error("unknown difficulty '{0}'")]
    UnknownDifficulty(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// True when the caller may continue with built-in defaults.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::CatalogNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
