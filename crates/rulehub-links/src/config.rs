//! Host configuration surface for link derivation.
//!
//! All fields are optional; defaults reproduce the canonical RuleHub
//! hosting. Override via explicit construction or environment variables.

use std::collections::HashMap;

/// The canonical hosted index consumed when the host supplies nothing.
pub const DEFAULT_INDEX_URL: &str =
    "https://rulehub.github.io/rulehub-charts/plugin-index/index.json";

/// Link-derivation configuration supplied by the host environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkConfig {
    /// Overrides the default core-repo tree base for repository links.
    pub repo_base_url: Option<String>,
    /// Overrides the default charts-repo tree base for source links;
    /// when absent, a base is inferred from the index URL.
    pub source_base_url: Option<String>,
    /// Per-id overrides consulted before heuristics: id → repo-relative
    /// path or absolute URL.
    pub repo_per_id: HashMap<String, String>,
    /// When no charts-relative engine path is derivable, allow falling
    /// back to an absolute engine URL. Default false (strict charts-first
    /// behavior).
    pub source_abs_fallback: bool,
}

impl LinkConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `RULEHUB_REPO_BASE_URL`
    /// - `RULEHUB_SOURCE_BASE_URL`
    /// - `RULEHUB_SOURCE_ABS_FALLBACK` (`1` or `true`)
    /// - `RULEHUB_PER_ID_JSON` (JSON object of id → path-or-URL)
    ///
    /// Unset or empty variables fall back to the defaults above.
    pub fn from_env() -> Self {
        Self {
            repo_base_url: env_string("RULEHUB_REPO_BASE_URL"),
            source_base_url: env_string("RULEHUB_SOURCE_BASE_URL"),
            repo_per_id: env_string("RULEHUB_PER_ID_JSON")
                .map(|raw| Self::parse_per_id(&raw))
                .unwrap_or_default(),
            source_abs_fallback: env_flag("RULEHUB_SOURCE_ABS_FALLBACK"),
        }
    }

    /// Parse a per-id override map from JSON. Invalid JSON is logged and
    /// ignored — a broken override must never take the link layer down.
    pub fn parse_per_id(raw: &str) -> HashMap<String, String> {
        match serde_json::from_str::<HashMap<String, String>>(raw) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(%err, "invalid per-id link overrides JSON, ignoring");
                HashMap::new()
            }
        }
    }
}

fn env_string(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(var: &str) -> bool {
    env_string(var)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
