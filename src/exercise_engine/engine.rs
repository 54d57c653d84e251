use std::sync::Arc;

use tracing::{debug, warn};

use crate::exercise_engine::{
    builder::to_fill_in,
    catalog::{CatalogCache, CatalogSource},
    config::EngineConfig,
    context::GenerationContext,
    difficulty::Difficulty,
    error::Result,
    models::{Exercise, ExerciseConfig, ExerciseMode, GenerationRequest},
    registry::Registry,
    session::{PrngSession, SessionSlot},
};

fn session_for(seed: Option<u64>) -> PrngSession {
    match seed {
        Some(seed) => PrngSession::from_seed(seed),
        None       => PrngSession::from_entropy(),
    }
}

/// Topic registry, limits cache and configuration behind one entry point.
pub struct ExerciseEngine {
    registry: Registry,
    catalog: CatalogCache,
    config: EngineConfig,
}

impl ExerciseEngine {
    pub fn new(registry: Registry, catalog: CatalogCache, config: EngineConfig) -> Self {
        ExerciseEngine { registry, catalog, config }
    }

    /// Standard registry and default configuration over `source`.
    pub fn with_source(source: Arc<dyn CatalogSource>) -> Self {
        Self::new(Registry::standard(), CatalogCache::new(source), EngineConfig::default())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A request for `topic_id` at the configured default difficulty.
    pub fn request(&self, topic_id: u32) -> GenerationRequest {
        GenerationRequest::new(topic_id).difficulty(self.config.default_difficulty)
    }

    /// Generate one exercise from whatever limits are cached right now.
    ///
    /// Installs a fresh session seeded from `request.rng_seed`, so equal
    /// requests against equal cache contents produce equal exercises.
    pub fn generate(&self, request: GenerationRequest) -> Result<Exercise> {
        let mut slot = SessionSlot::new();
        slot.install(session_for(request.rng_seed));
        let session = slot.active()?;
        self.generate_with(session, &request)
    }

    /// Generate on a caller-owned session; `request.rng_seed` is ignored.
    pub fn generate_with(&self, session: &mut PrngSession, request: &GenerationRequest) -> Result<Exercise> {
        let entry = self.registry.get(request.topic_id)?;
        let limits = self.catalog.limits_for(request.topic_id, request.difficulty);
        let mut ctx = GenerationContext::new(session, entry.info, request.difficulty, limits, &self.config);
        let exercise = (entry.generator)(&mut ctx)?;
        debug!(
            id = %exercise.id(),
            topic = request.topic_id,
            difficulty = %request.difficulty,
            "generated exercise"
        );
        Ok(self.apply_mode(exercise, request.config.as_ref()))
    }

    /// Resolve the topic's slug, refresh its limits, then generate.
    ///
    /// A topic with no catalog document is generated from defaults; every
    /// other catalog failure is returned.
    pub async fn generate_fresh(&self, request: GenerationRequest) -> Result<Exercise> {
        match self.catalog.preload_by_id(request.topic_id).await {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                warn!(topic = request.topic_id, error = %e, "no catalog limits, using defaults");
            }
            Err(e) => return Err(e),
        }
        self.generate(request)
    }

    /// `count` exercises from one session.  Ids are unique within the batch.
    pub fn generate_batch(
        &self,
        topic_id: u32,
        difficulty: impl Into<Difficulty>,
        seed: Option<u64>,
        count: usize,
    ) -> Result<Vec<Exercise>> {
        let request = GenerationRequest { topic_id, difficulty: difficulty.into(), rng_seed: seed, config: None };
        let mut session = session_for(seed);
        (0..count).map(|_| self.generate_with(&mut session, &request)).collect()
    }

    fn apply_mode(&self, exercise: Exercise, config: Option<&ExerciseConfig>) -> Exercise {
        match config {
            Some(cfg) if cfg.mode == ExerciseMode::Completar => {
                let cue = cfg.fill_in_cue.as_deref().unwrap_or(&self.config.fill_in_cue);
                to_fill_in(exercise, cue, None)
            }
            _ => exercise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise_engine::{
        catalog::FetchError, difficulty::CoreDifficulty, error::EngineError,
        memory_catalog::MemoryCatalog,
    };
    use serde_json::json;

    fn engine_with(catalog: MemoryCatalog) -> (ExerciseEngine, Arc<MemoryCatalog>) {
        let catalog = Arc::new(catalog);
        (ExerciseEngine::with_source(catalog.clone()), catalog)
    }

    #[test]
    fn generation_without_catalog_uses_defaults() {
        let (engine, _) = engine_with(MemoryCatalog::new());
        let ex = engine.generate(GenerationRequest::new(1).seed(7)).unwrap();
        assert_eq!(ex.meta().topic_id, 1);
        assert_eq!(ex.meta().generator_id, "matematicas/01");
        assert_eq!(ex.id(), "ej-01-1");
    }

    #[test]
    fn unknown_topic_is_rejected() {
        let (engine, _) = engine_with(MemoryCatalog::new());
        let err = engine.generate(GenerationRequest::new(99).seed(1)).unwrap_err();
        assert_eq!(err, EngineError::UnknownTopic { topic_id: 99 });
    }

    #[test]
    fn completar_mode_uses_the_request_cue() {
        let (engine, _) = engine_with(MemoryCatalog::new());
        let config = ExerciseConfig { mode: ExerciseMode::Completar, fill_in_cue: Some("→ ?".into()) };
        let ex = engine.generate(GenerationRequest::new(8).seed(3).config(config)).unwrap();
        let fill = ex.as_fill_in().unwrap();
        assert!(fill.fill_text.ends_with("→ ?"));
    }

    #[test]
    fn batch_ids_are_unique() {
        let (engine, _) = engine_with(MemoryCatalog::new());
        let batch = engine.generate_batch(5, CoreDifficulty::Intermedio, Some(11), 10).unwrap();
        let ids: std::collections::HashSet<&str> = batch.iter().map(Exercise::id).collect();
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn fresh_generation_applies_catalog_ranges() {
        let catalog = MemoryCatalog::new().with_topics(["01_operaciones_basicas"]);
        catalog.insert(
            "01_operaciones_basicas",
            json!({ "porDificultad": { "basico": {
                "rangos": { "numeros": [5, 9] },
                "operacionesPermitidas": ["+"]
            } } }),
        );
        let (engine, source) = engine_with(catalog);
        let ex = engine.generate_fresh(GenerationRequest::new(1).seed(4)).await.unwrap();
        let parts: Vec<&str> = ex.statement().split_whitespace().collect();
        let a: i64 = parts[2].parse().unwrap();
        let b: i64 = parts[4].trim_end_matches('?').parse().unwrap();
        assert_eq!(parts[3], "+");
        assert!((5..=9).contains(&a) && (5..=9).contains(&b));
        assert_eq!(source.fetch_count("01_operaciones_basicas"), 1);
    }

    #[tokio::test]
    async fn fresh_generation_tolerates_missing_document() {
        let (engine, _) = engine_with(MemoryCatalog::new().with_topics(["14_probabilidad_simple"]));
        let ex = engine.generate_fresh(GenerationRequest::new(14).seed(2)).await.unwrap();
        assert_eq!(ex.meta().topic_id, 14);
    }

    #[tokio::test]
    async fn fresh_generation_propagates_hard_failures() {
        let (engine, _) = engine_with(MemoryCatalog::new().with_topics(["03_numeros_primos"]));
        let err = engine.generate_fresh(GenerationRequest::new(1).seed(2)).await.unwrap_err();
        assert_eq!(err, EngineError::TopicUnresolved { topic_id: 1 });

        let catalog = MemoryCatalog::new().with_topics(["03_numeros_primos"]);
        catalog.fail_with("03_numeros_primos", FetchError::Transport("timeout".into()));
        let (engine, _) = engine_with(catalog);
        let err = engine.generate_fresh(GenerationRequest::new(3).seed(2)).await.unwrap_err();
        assert!(matches!(err, EngineError::CatalogFetch { .. }));
    }
}
