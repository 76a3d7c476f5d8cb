//! Token metadata fetch cache.
//!
//! Metadata JSON is content-addressed and treated as immutable: one fetch
//! per URI for the life of the process. A failed fetch clears the slot and
//! yields `None` — callers render the "no metadata" state rather than an
//! error, and a later call may retry the fetch.

use crate::metrics::METRICS;
use canvas_types::NftMetadata;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

/// Where metadata documents come from.
pub trait MetadataSource {
    fn fetch(
        &self,
        uri: &str,
    ) -> impl std::future::Future<Output = Result<NftMetadata, crate::Error>> + Send;
}

pub struct HttpMetadataSource {
    http: reqwest::Client,
}

impl HttpMetadataSource {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { http }
    }
}

impl Default for HttpMetadataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataSource for HttpMetadataSource {
    async fn fetch(&self, uri: &str) -> Result<NftMetadata, crate::Error> {
        let resp = self
            .http
            .get(uri)
            .send()
            .await
            .map_err(|e| crate::Error::Metadata(format!("fetch failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(crate::Error::Metadata(format!(
                "gateway returned {}",
                resp.status()
            )));
        }
        resp.json()
            .await
            .map_err(|e| crate::Error::Metadata(format!("invalid metadata JSON: {e}")))
    }
}

pub struct MetadataCache<S> {
    source: S,
    entries: Mutex<HashMap<String, NftMetadata>>,
}

impl<S: MetadataSource> MetadataCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch-and-memoize. A present entry short-circuits without any
    /// network call; a fetch failure is logged and surfaced as `None`.
    pub async fn get(&self, uri: &str) -> Option<NftMetadata> {
        if let Some(found) = self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(uri)
            .cloned()
        {
            METRICS.metadata_cache_hits.fetch_add(1, Ordering::Relaxed);
            return Some(found);
        }

        METRICS.metadata_cache_misses.fetch_add(1, Ordering::Relaxed);
        match self.source.fetch(uri).await {
            Ok(metadata) => {
                let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
                entries.insert(uri.to_string(), metadata.clone());
                Some(metadata)
            }
            Err(e) => {
                METRICS.metadata_fetch_errors.fetch_add(1, Ordering::Relaxed);
                let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
                entries.remove(uri);
                warn!(uri, error = %e, "Metadata fetch failed");
                None
            }
        }
    }

    /// The underlying source, e.g. to inspect a test double.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
