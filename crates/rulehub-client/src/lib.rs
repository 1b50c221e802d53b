//! # rulehub-client — Package Index Client
//!
//! Fetches the RuleHub package index over HTTP and turns it into
//! normalized [`Pack`] records: fetch → shape detection → schema
//! validation → normalization → in-memory TTL cache.
//!
//! ## Pipeline
//!
//! 1. Cache check — a fresh entry for the URL short-circuits the network.
//! 2. GET the index URL, racing the caller's cancellation token.
//! 3. Parse the body as JSON.
//! 4. Resolve the document shape once up front: `{"packages": [...]}` or
//!    the legacy `{"items": [...]}` form ([`IndexShape`]).
//! 5. Validate against the plugin-index schema contract with bounded
//!    diagnostics.
//! 6. Normalize each entry through [`Pack::from_raw`].
//! 7. Cache under the exact URL string and return.
//!
//! ## Cancellation
//!
//! Cancellation is cooperative and caller-driven: the client only reacts
//! to the [`CancellationToken`] it is handed. Once the token is
//! cancelled, the outcome is always [`RulehubError::Aborted`] — never any
//! other error class — checked at entry, at each await, and before
//! classifying any other failure.
//!
//! ## Concurrency
//!
//! Concurrent calls for the same URL are not deduplicated; each performs
//! its own fetch and the last writer wins on the cache (both results
//! derive from the same URL, so this is redundant work, not a
//! correctness issue). The cache mutex is held only for map access,
//! never across an await. No internal timeout is enforced.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use rulehub_core::{Pack, RulehubError};

/// Default cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

static SHARED: Lazy<RulehubClient> = Lazy::new(RulehubClient::default);

/// One cached index response.
struct CacheEntry {
    data: Vec<Pack>,
    fetched_at: Instant,
}

struct ClientState {
    cache: HashMap<String, CacheEntry>,
    ttl: Duration,
}

/// Client for fetching and validating RuleHub package indexes.
///
/// Construct instances explicitly (each owns an independent cache and
/// TTL), or use the process-wide [`RulehubClient::shared`] convenience
/// instance. Instances are never synchronized with each other.
pub struct RulehubClient {
    http: reqwest::Client,
    state: Mutex<ClientState>,
}

impl Default for RulehubClient {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl RulehubClient {
    /// Create a client with the given cache TTL. `Duration::ZERO`
    /// disables caching entirely.
    pub fn new(ttl: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            state: Mutex::new(ClientState {
                cache: HashMap::new(),
                ttl,
            }),
        }
    }

    /// The process-wide convenience instance (default TTL).
    pub fn shared() -> &'static RulehubClient {
        &SHARED
    }

    /// Fetch, validate and normalize the package index at `url`.
    ///
    /// Returns the cached result when a fresh entry exists. `cancel` is
    /// the caller's cancellation token; a cancelled token always yields
    /// [`RulehubError::Aborted`].
    pub async fn get_index(
        &self,
        url: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<Pack>, RulehubError> {
        if let Some(cached) = self.cache_lookup(url) {
            tracing::debug!(url, "index cache hit");
            return Ok(cached);
        }

        if is_cancelled(cancel) {
            return Err(RulehubError::Aborted);
        }

        tracing::debug!(url, "fetching index");
        let response = race_cancellation(cancel, self.http.get(url).send())
            .await?
            .map_err(|e| transport_error(url, e, cancel))?;

        let status = response.status();
        if !status.is_success() {
            return Err(abort_or(
                cancel,
                RulehubError::Http {
                    status: Some(status.as_u16()),
                    message: format!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("Unknown")
                    ),
                    details: format!("failed to fetch index from {url}"),
                },
            ));
        }

        let body = race_cancellation(cancel, response.text())
            .await?
            .map_err(|e| transport_error(url, e, cancel))?;

        let doc: Value = serde_json::from_str(&body).map_err(|e| {
            abort_or(
                cancel,
                RulehubError::Unknown {
                    message: format!("invalid JSON in index response: {e}"),
                    details: e.to_string(),
                },
            )
        })?;

        let shape = IndexShape::detect(&doc).ok_or_else(|| {
            abort_or(
                cancel,
                RulehubError::SchemaInvalid {
                    message: "invalid index format: missing packages or items array".to_owned(),
                    details: "expected object with packages or items array".to_owned(),
                },
            )
        })?;

        let candidate = serde_json::json!({ "packages": shape.entries() });
        if let Err(violations) = rulehub_schema::validate_index(&candidate) {
            return Err(abort_or(
                cancel,
                RulehubError::SchemaInvalid {
                    message: format!("schema validation failed: {}", violations.summary()),
                    details: violations.details(),
                },
            ));
        }

        let packs: Vec<Pack> = shape
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| Pack::from_raw(raw, i))
            .collect();

        self.cache_store(url, packs.clone());
        Ok(packs)
    }

    /// Empty the cache unconditionally.
    pub fn clear_cache(&self) {
        self.state().cache.clear();
    }

    /// Change this instance's cache TTL. `Duration::ZERO` disables
    /// caching; existing entries are retained but never served.
    pub fn set_cache_ttl(&self, ttl: Duration) {
        self.state().ttl = ttl;
    }

    /// The current cache TTL.
    pub fn cache_ttl(&self) -> Duration {
        self.state().ttl
    }

    fn state(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_lookup(&self, url: &str) -> Option<Vec<Pack>> {
        let state = self.state();
        let entry = state.cache.get(url)?;
        if state.ttl > Duration::ZERO && entry.fetched_at.elapsed() < state.ttl {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    fn cache_store(&self, url: &str, data: Vec<Pack>) {
        self.state().cache.insert(
            url.to_owned(),
            CacheEntry {
                data,
                fetched_at: Instant::now(),
            },
        );
    }
}

/// Canonical shape of an index document, resolved by one up-front
/// inspection. `packages` wins when both keys are present.
enum IndexShape<'a> {
    /// Current `{"packages": [...]}` form.
    Packages(&'a [Value]),
    /// Legacy `{"items": [...]}` form.
    Items(&'a [Value]),
}

impl<'a> IndexShape<'a> {
    fn detect(doc: &'a Value) -> Option<Self> {
        if let Some(packages) = doc.get("packages").and_then(Value::as_array) {
            return Some(IndexShape::Packages(packages));
        }
        if let Some(items) = doc.get("items").and_then(Value::as_array) {
            return Some(IndexShape::Items(items));
        }
        None
    }

    fn entries(&self) -> &'a [Value] {
        match self {
            IndexShape::Packages(entries) | IndexShape::Items(entries) => entries,
        }
    }
}

fn is_cancelled(cancel: Option<&CancellationToken>) -> bool {
    cancel.is_some_and(CancellationToken::is_cancelled)
}

/// Cancellation takes priority over any other classification.
fn abort_or(cancel: Option<&CancellationToken>, err: RulehubError) -> RulehubError {
    if is_cancelled(cancel) {
        RulehubError::Aborted
    } else {
        err
    }
}

/// Transport-level failure: the fetch mechanism itself failed, as opposed
/// to an HTTP error status.
fn transport_error(
    url: &str,
    err: reqwest::Error,
    cancel: Option<&CancellationToken>,
) -> RulehubError {
    abort_or(
        cancel,
        RulehubError::Http {
            status: None,
            message: format!("network error fetching index from {url}"),
            details: err.to_string(),
        },
    )
}

/// Run `fut` to completion unless the token fires first. `biased` so a
/// token that is already cancelled wins even when `fut` is also ready.
async fn race_cancellation<F: Future>(
    cancel: Option<&CancellationToken>,
    fut: F,
) -> Result<F::Output, RulehubError> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(RulehubError::Aborted),
            out = fut => Ok(out),
        },
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shape_detection_prefers_packages() {
        let doc = json!({"packages": [{"id": "a.b"}], "items": [1, 2, 3]});
        let shape = IndexShape::detect(&doc).unwrap();
        assert_eq!(shape.entries().len(), 1);
    }

    #[test]
    fn shape_detection_accepts_legacy_items() {
        let doc = json!({"items": [{"id": "a.b"}]});
        assert!(matches!(
            IndexShape::detect(&doc),
            Some(IndexShape::Items(_))
        ));
    }

    #[test]
    fn shape_detection_rejects_other_shapes() {
        assert!(IndexShape::detect(&json!({"packages": "nope"})).is_none());
        assert!(IndexShape::detect(&json!([1, 2])).is_none());
        assert!(IndexShape::detect(&json!(null)).is_none());
    }

    #[test]
    fn zero_ttl_never_serves_cache() {
        let client = RulehubClient::new(Duration::ZERO);
        client.cache_store("https://example.com/index.json", Vec::new());
        assert!(client.cache_lookup("https://example.com/index.json").is_none());
    }

    #[test]
    fn ttl_is_mutable_per_instance() {
        let client = RulehubClient::new(DEFAULT_CACHE_TTL);
        client.cache_store("https://example.com/index.json", Vec::new());
        assert!(client.cache_lookup("https://example.com/index.json").is_some());

        client.set_cache_ttl(Duration::ZERO);
        assert_eq!(client.cache_ttl(), Duration::ZERO);
        assert!(client.cache_lookup("https://example.com/index.json").is_none());
    }
}
