//! Per-topic limits fetched from a remote catalog and cached for the life of
//! the owning [`CatalogCache`].
//!
//! ## Read and write paths
//!
//! - [`CatalogCache::get_sync`] never blocks and never fails: it returns
//!   whatever is cached, or an empty document on first reference.
//! - [`CatalogCache::preload`] fetches a topic's document.  Concurrent
//!   preloads of one topic share a single in-flight fetch, so at most one
//!   request per topic is ever outstanding.  The fetch runs on its own task;
//!   a caller that stops waiting does not cancel it.
//!
//! A successful fetch swaps the whole entry at once, so readers observe either
//! the previous document or the new one.  A failed or malformed fetch leaves
//! the previous entry in place.
//!
//! ## Document shape
//!
//! ```json
//! { "slug": "01_operaciones_basicas",
//!   "porDificultad": {
//!     "basico": { "rangos": { "numeros": [5, 9] },
//!                 "operacionesPermitidas": ["+", "-"],
//!                 "reglas": { "permitirNegativos": false } } } }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::exercise_engine::{
    difficulty::{Difficulty, Range, Tier, TierTable},
    error::{EngineError, Result},
};

// ---------------------------------------------------------------------------
// Source contract
// ---------------------------------------------------------------------------

/// Transport-level failure reported by a [`CatalogSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("not found")]
    NotFound,
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// An entry of the topic list: a bare slug or an `{ "id": slug }` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicListing {
    Slug(String),
    Record { id: String },
}

impl TopicListing {
    pub fn into_slug(self) -> String {
        match self {
            TopicListing::Slug(s) => s,
            TopicListing::Record { id } => id,
        }
    }
}

/// Where limits documents come from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the raw limits document for `slug`.
    async fn fetch_topic(&self, slug: &str) -> std::result::Result<serde_json::Value, FetchError>;

    /// Fetch the list of topic slugs.
    async fn list_topics(&self) -> std::result::Result<Vec<TopicListing>, FetchError>;
}

// ---------------------------------------------------------------------------
// Limits documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierLimits {
    #[serde(default, rename = "rangos")]
    pub numeric_ranges: BTreeMap<String, Vec<f64>>,
    #[serde(default, rename = "operacionesPermitidas")]
    pub allowed_operations: Vec<String>,
    #[serde(default, rename = "reglas")]
    pub rules: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, rename = "porDificultad")]
    pub by_tier: BTreeMap<String, TierLimits>,
}

impl TopicLimits {
    pub fn is_empty(&self) -> bool {
        self.slug.is_none() && self.by_tier.is_empty()
    }

    pub fn tier(&self, tier: Tier) -> Option<&TierLimits> {
        self.by_tier.get(tier.as_str())
    }

    /// Validate and decode a fetched payload.
    pub fn from_payload(topic: &str, payload: serde_json::Value) -> Result<TopicLimits> {
        let kind = match &payload {
            serde_json::Value::Object(_) => None,
            serde_json::Value::Array(_)  => Some("an array"),
            serde_json::Value::Null      => Some("null"),
            _                            => Some("a scalar"),
        };
        if let Some(kind) = kind {
            return Err(EngineError::CatalogMalformed {
                topic: topic.to_string(),
                reason: format!("expected a JSON object, got {kind}"),
            });
        }
        serde_json::from_value(payload).map_err(|e| EngineError::CatalogMalformed {
            topic: topic.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Largest magnitude a catalog range end may have.  Generators multiply
/// operands together, so products of two bounded ends must stay well inside
/// `i64`.
pub const MAX_RANGE_MAGNITUDE: f64 = 1_000_000.0;

fn within_magnitude(v: f64) -> bool {
    v.is_finite() && v.abs() <= MAX_RANGE_MAGNITUDE
}

/// The cached limits of one topic seen through one normalized tier.
///
/// Built once per generator invocation so every lookup in that invocation
/// uses the same tier.
#[derive(Debug, Clone)]
pub struct LimitsView {
    tier: Tier,
    limits: Arc<TopicLimits>,
}

impl LimitsView {
    pub fn new(tier: Tier, limits: Arc<TopicLimits>) -> Self {
        LimitsView { tier, limits }
    }

    /// A view with nothing cached; every lookup returns its default.
    pub fn empty(tier: Tier) -> Self {
        LimitsView { tier, limits: Arc::new(TopicLimits::default()) }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    fn level(&self) -> Option<&TierLimits> {
        self.limits.tier(self.tier)
    }

    /// Cached range `key` when it holds exactly two finite numbers within
    /// `±MAX_RANGE_MAGNITUDE`, else the default.
    pub fn range(&self, key: &str, defaults: &TierTable<Range>) -> Range {
        match self.level().and_then(|l| l.numeric_ranges.get(key)) {
            Some(pair) if pair.len() == 2 && pair.iter().all(|v| within_magnitude(*v)) => {
                (pair[0].round() as i64, pair[1].round() as i64)
            }
            Some(pair) => {
                warn!(key, ?pair, tier = self.tier.as_str(), "ignoring unusable catalog range");
                *defaults.get(self.tier)
            }
            None => *defaults.get(self.tier),
        }
    }

    /// Cached operation list when non-empty, else the default.
    pub fn operations(&self, defaults: &TierTable<&[&str]>) -> Vec<String> {
        match self.level().map(|l| &l.allowed_operations) {
            Some(ops) if !ops.is_empty() => ops.clone(),
            _ => defaults.get(self.tier).iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Cached rule when it is a boolean, else the default.
    pub fn rule(&self, name: &str, defaults: &TierTable<bool>) -> bool {
        self.level()
            .and_then(|l| l.rules.get(name))
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(*defaults.get(self.tier))
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

type SharedFetch = Shared<BoxFuture<'static, Result<()>>>;
type SharedList = Shared<BoxFuture<'static, Result<Arc<Vec<String>>>>>;

struct CacheInner {
    source: Arc<dyn CatalogSource>,
    limits_by_topic: RwLock<HashMap<String, Arc<TopicLimits>>>,
    pending_by_topic: Mutex<HashMap<String, SharedFetch>>,
    topic_list: RwLock<Option<Arc<Vec<String>>>>,
    pending_list: Mutex<Option<SharedList>>,
    slug_by_id: RwLock<HashMap<u32, String>>,
}

impl CacheInner {
    async fn fetch_and_store(&self, topic: &str) -> Result<()> {
        let payload = self.source.fetch_topic(topic).await.map_err(|e| match e {
            FetchError::NotFound => EngineError::CatalogNotFound { topic: topic.to_string() },
            FetchError::InvalidJson(reason) => {
                EngineError::CatalogMalformed { topic: topic.to_string(), reason }
            }
            FetchError::Transport(reason) => {
                EngineError::CatalogFetch { topic: topic.to_string(), reason }
            }
        })?;

        let limits = TopicLimits::from_payload(topic, payload).map_err(|e| {
            error!(topic, error = %e, "rejecting catalog document");
            e
        })?;

        let tiers = limits.by_tier.len();
        self.limits_by_topic.write().insert(topic.to_string(), Arc::new(limits));
        info!(topic, tiers, "catalog limits populated");
        Ok(())
    }

    async fn fetch_topic_list(&self) -> Result<Arc<Vec<String>>> {
        let listing = self.source.list_topics().await.map_err(|e| EngineError::CatalogFetch {
            topic: "<topic list>".to_string(),
            reason: e.to_string(),
        })?;
        let slugs: Vec<String> = listing
            .into_iter()
            .map(TopicListing::into_slug)
            .filter(|s| !s.is_empty())
            .collect();
        let slugs = Arc::new(slugs);
        *self.topic_list.write() = Some(Arc::clone(&slugs));
        debug!(count = slugs.len(), "topic list cached");
        Ok(slugs)
    }
}

/// Owned handle to the limits cache.  Clones share state.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<CacheInner>,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        CatalogCache {
            inner: Arc::new(CacheInner {
                source,
                limits_by_topic: RwLock::new(HashMap::new()),
                pending_by_topic: Mutex::new(HashMap::new()),
                topic_list: RwLock::new(None),
                pending_list: Mutex::new(None),
                slug_by_id: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Existing entry, or a freshly stored empty one.
    pub fn get_or_create(&self, topic: &str) -> Arc<TopicLimits> {
        let existing = self.inner.limits_by_topic.read().get(topic).cloned();
        if let Some(limits) = existing {
            return limits;
        }
        self.inner
            .limits_by_topic
            .write()
            .entry(topic.to_string())
            .or_insert_with(|| Arc::new(TopicLimits::default()))
            .clone()
    }

    /// Whatever is cached right now; never waits for a fetch.
    pub fn get_sync(&self, topic: &str) -> Arc<TopicLimits> {
        self.get_or_create(topic)
    }

    /// Fetch `topic` unless a fetch is already in flight, in which case wait
    /// for that one.
    pub async fn preload(&self, topic: &str) -> Result<()> {
        let fetch = {
            let mut pending = self.inner.pending_by_topic.lock();
            let in_flight = pending.get(topic).cloned();
            match in_flight {
                Some(in_flight) => {
                    debug!(topic, "joining in-flight catalog fetch");
                    in_flight.clone()
                }
                None => {
                    let shared = self.spawn_fetch(topic);
                    pending.insert(topic.to_string(), shared.clone());
                    shared
                }
            }
        };
        fetch.await
    }

    fn spawn_fetch(&self, topic: &str) -> SharedFetch {
        let inner = Arc::clone(&self.inner);
        let key = topic.to_string();
        debug!(topic, "starting catalog fetch");
        let task = tokio::spawn(async move {
            let outcome = inner.fetch_and_store(&key).await;
            inner.pending_by_topic.lock().remove(&key);
            outcome
        });
        let topic = topic.to_string();
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(EngineError::CatalogFetch { topic, reason: join_err.to_string() }),
            }
        }
        .boxed()
        .shared()
    }

    /// Number of fetches currently in flight.
    pub fn pending_fetches(&self) -> usize {
        self.inner.pending_by_topic.lock().len()
    }

    /// The topic slug list, fetched once and then served from memory.
    /// Concurrent callers on a cold cache share one request.
    pub async fn topics(&self) -> Result<Arc<Vec<String>>> {
        let cached = self.inner.topic_list.read().clone();
        if let Some(list) = cached {
            return Ok(list);
        }
        let fetch = {
            let mut pending = self.inner.pending_list.lock();
            // The list is stored before the pending slot clears.
            let cached = self.inner.topic_list.read().clone();
            if let Some(list) = cached {
                return Ok(list);
            }
            match pending.as_ref() {
                Some(in_flight) => {
                    debug!("joining in-flight topic list fetch");
                    in_flight.clone()
                }
                None => {
                    let shared = self.spawn_list_fetch();
                    *pending = Some(shared.clone());
                    shared
                }
            }
        };
        fetch.await
    }

    fn spawn_list_fetch(&self) -> SharedList {
        let inner = Arc::clone(&self.inner);
        debug!("starting topic list fetch");
        let task = tokio::spawn(async move {
            let outcome = inner.fetch_topic_list().await;
            *inner.pending_list.lock() = None;
            outcome
        });
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(EngineError::CatalogFetch {
                    topic: "<topic list>".to_string(),
                    reason: join_err.to_string(),
                }),
            }
        }
        .boxed()
        .shared()
    }

    /// Map a numeric topic id to its slug by two-digit prefix (`7` → `07_...`).
    pub async fn resolve_topic_id(&self, topic_id: u32) -> Result<String> {
        if let Some(slug) = self.topic_slug_sync(topic_id) {
            return Ok(slug);
        }
        let prefix = format!("{:02}_", topic_id);
        let topics = self.topics().await?;
        let slug = topics
            .iter()
            .find(|t| t.starts_with(&prefix))
            .cloned()
            .ok_or(EngineError::TopicUnresolved { topic_id })?;
        self.inner.slug_by_id.write().insert(topic_id, slug.clone());
        Ok(slug)
    }

    pub fn topic_slug_sync(&self, topic_id: u32) -> Option<String> {
        self.inner.slug_by_id.read().get(&topic_id).cloned()
    }

    pub async fn preload_by_id(&self, topic_id: u32) -> Result<()> {
        let slug = self.resolve_topic_id(topic_id).await?;
        self.preload(&slug).await
    }

    /// Limits for `topic_id` seen through the normalized tier of `difficulty`.
    /// Topics whose slug was never resolved yield an empty view.
    pub fn limits_for(&self, topic_id: u32, difficulty: Difficulty) -> LimitsView {
        let tier = difficulty.tier();
        match self.topic_slug_sync(topic_id) {
            Some(slug) => LimitsView::new(tier, self.get_sync(&slug)),
            None => LimitsView::empty(tier),
        }
    }

    pub fn range_with_fallback(
        &self,
        topic_id: u32,
        difficulty: Difficulty,
        defaults: &TierTable<Range>,
        key: &str,
    ) -> Range {
        self.limits_for(topic_id, difficulty).range(key, defaults)
    }

    pub fn operations_with_fallback(
        &self,
        topic_id: u32,
        difficulty: Difficulty,
        defaults: &TierTable<&[&str]>,
    ) -> Vec<String> {
        self.limits_for(topic_id, difficulty).operations(defaults)
    }

    pub fn rule_with_fallback(
        &self,
        topic_id: u32,
        difficulty: Difficulty,
        rule: &str,
        defaults: &TierTable<bool>,
    ) -> bool {
        self.limits_for(topic_id, difficulty).rule(rule, defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise_engine::difficulty::{CasualDifficulty, CoreDifficulty};
    use crate::exercise_engine::memory_catalog::MemoryCatalog;
    use serde_json::json;
    use std::time::Duration;

    const DEFAULTS: TierTable<Range> = TierTable::new((1, 20), (1, 50), (1, 100));
    const SLUG: &str = "01_operaciones_basicas";

    fn catalog() -> Arc<MemoryCatalog> {
        Arc::new(MemoryCatalog::new().with_topics([SLUG, "03_numeros_primos", "14_probabilidad_simple"]))
    }

    #[tokio::test]
    async fn missing_limits_fall_back_to_defaults_then_use_override() {
        let source = catalog();
        let cache = CatalogCache::new(source.clone());
        cache.resolve_topic_id(1).await.unwrap();

        let basico: Difficulty = CoreDifficulty::Basico.into();
        assert_eq!(cache.range_with_fallback(1, basico, &DEFAULTS, "numeros"), (1, 20));

        source.insert(SLUG, json!({ "porDificultad": { "basico": { "rangos": { "numeros": [5, 9] } } } }));
        cache.preload(SLUG).await.unwrap();
        assert_eq!(cache.range_with_fallback(1, basico, &DEFAULTS, "numeros"), (5, 9));
        // other tiers still use their defaults
        let media: Difficulty = CasualDifficulty::Media.into();
        assert_eq!(cache.range_with_fallback(1, media, &DEFAULTS, "numeros"), (1, 50));
    }

    #[tokio::test]
    async fn empty_document_keeps_defaults() {
        let source = catalog();
        source.insert(SLUG, json!({}));
        let cache = CatalogCache::new(source);
        cache.preload_by_id(1).await.unwrap();
        assert!(cache.get_sync(SLUG).is_empty());
        let d: Difficulty = CoreDifficulty::Basico.into();
        assert_eq!(cache.range_with_fallback(1, d, &DEFAULTS, "numeros"), (1, 20));
    }

    #[tokio::test]
    async fn array_payload_is_malformed_and_keeps_prior_entry() {
        let source = catalog();
        source.insert(SLUG, json!({ "porDificultad": { "basico": { "rangos": { "numeros": [5, 9] } } } }));
        let cache = CatalogCache::new(source.clone());
        cache.preload(SLUG).await.unwrap();
        let before = cache.get_sync(SLUG);

        source.insert(SLUG, json!([1, 2, 3]));
        let err = cache.preload(SLUG).await.unwrap_err();
        assert!(matches!(err, EngineError::CatalogMalformed { .. }), "got {err:?}");
        assert_eq!(*cache.get_sync(SLUG), *before);
    }

    #[tokio::test]
    async fn not_found_is_recoverable() {
        let cache = CatalogCache::new(catalog());
        let err = cache.preload("99_inexistente").await.unwrap_err();
        assert_eq!(err, EngineError::CatalogNotFound { topic: "99_inexistente".to_string() });
        assert!(err.is_recoverable());
        assert_eq!(cache.pending_fetches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_preloads_share_one_fetch() {
        let source = Arc::new(
            MemoryCatalog::new()
                .with_topics([SLUG])
                .with_latency(Duration::from_millis(20)),
        );
        source.insert(SLUG, json!({ "slug": SLUG }));
        let cache = CatalogCache::new(source.clone());

        let (a, b) = tokio::join!(cache.preload(SLUG), cache.preload(SLUG));
        a.unwrap();
        b.unwrap();
        assert_eq!(source.fetch_count(SLUG), 1);
        assert_eq!(cache.pending_fetches(), 0);

        // A later preload is a new fetch.
        cache.preload(SLUG).await.unwrap();
        assert_eq!(source.fetch_count(SLUG), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_preload_still_populates_cache() {
        let source = Arc::new(
            MemoryCatalog::new()
                .with_topics([SLUG])
                .with_latency(Duration::from_millis(30)),
        );
        source.insert(SLUG, json!({ "slug": SLUG }));
        let cache = CatalogCache::new(source.clone());

        let gave_up = tokio::time::timeout(Duration::from_millis(1), cache.preload(SLUG)).await;
        assert!(gave_up.is_err());

        tokio::time::advance(Duration::from_millis(30)).await;
        // Let the woken fetch task run to completion.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(cache.get_sync(SLUG).slug.as_deref(), Some(SLUG));
        assert_eq!(source.fetch_count(SLUG), 1);
    }

    #[tokio::test]
    async fn topic_ids_resolve_by_two_digit_prefix_and_are_cached() {
        let source = Arc::new(MemoryCatalog::new().with_topic_listing(vec![
            TopicListing::Record { id: "03_numeros_primos".to_string() },
            TopicListing::Slug("14_probabilidad_simple".to_string()),
            TopicListing::Slug(String::new()),
        ]));
        let cache = CatalogCache::new(source.clone());
        assert_eq!(cache.resolve_topic_id(3).await.unwrap(), "03_numeros_primos");
        assert_eq!(cache.resolve_topic_id(14).await.unwrap(), "14_probabilidad_simple");
        assert_eq!(cache.topic_slug_sync(3).as_deref(), Some("03_numeros_primos"));
        assert_eq!(
            cache.resolve_topic_id(5).await.unwrap_err(),
            EngineError::TopicUnresolved { topic_id: 5 }
        );
        assert_eq!(source.list_count(), 1, "topic list is fetched once");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_resolution_shares_one_list_fetch() {
        let source = Arc::new(
            MemoryCatalog::new()
                .with_topics([SLUG, "14_probabilidad_simple"])
                .with_latency(Duration::from_millis(20)),
        );
        let cache = CatalogCache::new(source.clone());

        let (a, b, c) = tokio::join!(
            cache.resolve_topic_id(1),
            cache.resolve_topic_id(14),
            cache.resolve_topic_id(1),
        );
        assert_eq!(a.unwrap(), SLUG);
        assert_eq!(b.unwrap(), "14_probabilidad_simple");
        assert_eq!(c.unwrap(), SLUG);
        assert_eq!(source.list_count(), 1);
    }

    #[tokio::test]
    async fn failed_list_fetch_is_retried() {
        let cache = CatalogCache::new(Arc::new(FailingList));
        let err = cache.topics().await.unwrap_err();
        assert!(matches!(err, EngineError::CatalogFetch { .. }), "got {err:?}");
        // The pending slot is cleared, so a second call fetches again.
        assert!(cache.topics().await.is_err());
    }

    struct FailingList;

    #[async_trait]
    impl CatalogSource for FailingList {
        async fn fetch_topic(&self, _slug: &str) -> std::result::Result<serde_json::Value, FetchError> {
            Err(FetchError::NotFound)
        }

        async fn list_topics(&self) -> std::result::Result<Vec<TopicListing>, FetchError> {
            Err(FetchError::Transport("connection reset".to_string()))
        }
    }

    #[test]
    fn view_lookups_validate_cached_shapes() {
        let limits = TopicLimits::from_payload(
            SLUG,
            json!({ "porDificultad": { "intermedio": {
                "rangos": { "numeros": [3, 30], "roto": [1] },
                "operacionesPermitidas": [],
                "reglas": { "permitirNegativos": true, "texto": "si" }
            } } }),
        )
        .unwrap();
        let view = LimitsView::new(Tier::Intermedio, Arc::new(limits));
        assert_eq!(view.range("numeros", &DEFAULTS), (3, 30));
        assert_eq!(view.range("roto", &DEFAULTS), (1, 50));
        let ops: TierTable<&[&str]> = TierTable::new(&["+"], &["+", "-"], &["*"]);
        assert_eq!(view.operations(&ops), vec!["+".to_string(), "-".to_string()]);
        let rules = TierTable::new(false, false, false);
        assert!(view.rule("permitirNegativos", &rules));
        assert!(!view.rule("texto", &rules));
    }

    #[test]
    fn out_of_bounds_ranges_fall_back_to_defaults() {
        let limits = TopicLimits::from_payload(
            SLUG,
            json!({ "porDificultad": { "intermedio": { "rangos": {
                "enorme": [1e10, 1e10],
                "negativo": [-2e6, 5],
                "limite": [-1000000, 1000000],
                "invertido": [90, 10]
            } } } }),
        )
        .unwrap();
        let view = LimitsView::new(Tier::Intermedio, Arc::new(limits));
        assert_eq!(view.range("enorme", &DEFAULTS), (1, 50));
        assert_eq!(view.range("negativo", &DEFAULTS), (1, 50));
        assert_eq!(view.range("limite", &DEFAULTS), (-1_000_000, 1_000_000));
        // Reversed pairs pass through; drawing from them collapses to `min`.
        assert_eq!(view.range("invertido", &DEFAULTS), (90, 10));
    }

    #[test]
    fn mistyped_document_is_malformed() {
        let err = TopicLimits::from_payload(SLUG, json!({ "porDificultad": [1, 2] })).unwrap_err();
        assert!(matches!(err, EngineError::CatalogMalformed { .. }));
        let err = TopicLimits::from_payload(SLUG, json!("texto")).unwrap_err();
        assert!(matches!(err, EngineError::CatalogMalformed { .. }));
    }
}
