//! Engine configuration loaded from TOML.
//!
//! ```toml
//! distractor_count = 3
//! max_attempts = 1000
//! fill_in_cue = "Completa: ____"
//! default_difficulty = "basico"
//! ```
//!
//! Every key is optional.  `EngineConfig::load_from_env` reads the file named
//! by `EXERCISE_ENGINE_CONFIG`; when the variable is unset the defaults apply.

use serde::Deserialize;
use tracing::info;

use crate::exercise_engine::{
    builder::DEFAULT_FILL_IN_CUE,
    difficulty::Difficulty,
    distractors::{DEFAULT_DISTRACTOR_COUNT, DEFAULT_MAX_ATTEMPTS},
    error::{EngineError, Result},
};

pub const CONFIG_PATH_ENV: &str = "EXERCISE_ENGINE_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wrong answers per exercise; four options in total by default.
    pub distractor_count: usize,
    /// Budget for every rejection-sampling loop.
    pub max_attempts: usize,
    pub fill_in_cue: String,
    pub default_difficulty: Difficulty,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            distractor_count: DEFAULT_DISTRACTOR_COUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            fill_in_cue: DEFAULT_FILL_IN_CUE.to_string(),
            default_difficulty: Difficulty::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: EngineConfig = toml::from_str(s).map_err(|e| EngineError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_env() -> Result<Self> {
        let path = match std::env::var(CONFIG_PATH_ENV) {
            Ok(p) => p,
            Err(_) => return Ok(EngineConfig::default()),
        };
        let text = std::fs::read_to_string(&path)
            .map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        let cfg = Self::from_toml_str(&text)?;
        info!(%path, "loaded engine config");
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.distractor_count == 0 {
            return Err(EngineError::Config("distractor_count must be at least 1".into()));
        }
        if self.max_attempts == 0 {
            return Err(EngineError::Config("max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}
