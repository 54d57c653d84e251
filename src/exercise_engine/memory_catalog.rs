//! In-process [`CatalogSource`] backed by a map of JSON documents.
//!
//! Counts every fetch so callers can observe coalescing, and can simulate
//! latency and transport failures.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::exercise_engine::catalog::{CatalogSource, FetchError, TopicListing};

#[derive(Default)]
pub struct MemoryCatalog {
    documents: RwLock<HashMap<String, Value>>,
    failures: RwLock<HashMap<String, FetchError>>,
    listing: RwLock<Vec<TopicListing>>,
    latency: Option<Duration>,
    fetches: Mutex<HashMap<String, usize>>,
    list_calls: Mutex<usize>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        MemoryCatalog::default()
    }

    pub fn with_topics<I, S>(self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let listing = slugs.into_iter().map(|s| TopicListing::Slug(s.into())).collect();
        self.with_topic_listing(listing)
    }

    pub fn with_topic_listing(self, listing: Vec<TopicListing>) -> Self {
        *self.listing.write() = listing;
        self
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Store (or replace) the document served for `slug`.
    pub fn insert(&self, slug: impl Into<String>, document: Value) {
        let slug = slug.into();
        self.failures.write().remove(&slug);
        self.documents.write().insert(slug, document);
    }

    /// Make every fetch of `slug` fail with `error`.
    pub fn fail_with(&self, slug: impl Into<String>, error: FetchError) {
        self.failures.write().insert(slug.into(), error);
    }

    pub fn fetch_count(&self, slug: &str) -> usize {
        self.fetches.lock().get(slug).copied().unwrap_or(0)
    }

    pub fn list_count(&self) -> usize {
        *self.list_calls.lock()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn fetch_topic(&self, slug: &str) -> Result<Value, FetchError> {
        *self.fetches.lock().entry(slug.to_string()).or_insert(0) += 1;
        self.delay().await;
        let failure = self.failures.read().get(slug).cloned();
        if let Some(error) = failure {
            return Err(error);
        }
        let document = self.documents.read().get(slug).cloned();
        document.ok_or(FetchError::NotFound)
    }

    async fn list_topics(&self) -> Result<Vec<TopicListing>, FetchError> {
        *self.list_calls.lock() += 1;
        self.delay().await;
        Ok(self.listing.read().clone())
    }
}
