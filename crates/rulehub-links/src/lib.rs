//! # rulehub-links — Link Derivation for RuleHub Packages
//!
//! Derives external browsing URLs from package records and base-URL
//! configuration: zero-or-one repository link per pack, and zero-or-one
//! source link per policy engine (Kyverno, Gatekeeper). Pure, synchronous
//! functions over in-memory data — no network calls, and never an error:
//! malformed or ambiguous input yields "no link" so consumers can degrade
//! gracefully.
//!
//! ## Two repository layouts
//!
//! The same logical content lives in two repositories with different path
//! conventions: the *core* repo (`policies/<domain>/<name>/...`) and the
//! *charts* repo (`files/kyverno/...`, `files/gatekeeper/...`,
//! `files/gatekeeper-templates/...`). Repository links target the core
//! repo; engine source links target the charts repo. Base URLs may be
//! supplied in several hosting forms (GitHub Pages, jsDelivr, raw
//! content) and are normalized to canonical `.../tree/<ref>/` bases up
//! front.
//!
//! ## Strategy cascades
//!
//! Both derivations are explicit ordered lists of named strategies, each
//! a pure function `(record, config) -> Option<String>`, evaluated in
//! fixed priority order until one yields a value. The orders are
//! documented in the `repo` and `engine` modules.

pub mod base;
pub mod config;
mod engine;
mod repo;

use std::collections::HashMap;

use rulehub_core::Pack;

use base::{ensure_trailing_slash, infer_source_base, normalize_tree_base, BaseKind};
pub use base::{
    CHARTS_REPO, CORE_REPO, DEFAULT_REF, DEFAULT_REPO_BASE, DEFAULT_SOURCE_BASE, RULEHUB_ORG,
};
pub use config::{LinkConfig, DEFAULT_INDEX_URL};

/// A Kubernetes policy engine a pack may carry source artifacts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    /// Kyverno policies (`files/kyverno/...`).
    Kyverno,
    /// OPA Gatekeeper constraints and templates (`files/gatekeeper/...`,
    /// `files/gatekeeper-templates/...`).
    Gatekeeper,
}

impl Engine {
    /// Display label for the engine.
    pub fn label(&self) -> &'static str {
        match self {
            Engine::Kyverno => "Kyverno",
            Engine::Gatekeeper => "Gatekeeper",
        }
    }
}

/// Link resolver with precomputed effective bases.
///
/// Construction normalizes the configured (or default) bases once; when
/// no source base is configured, a charts-repo base is inferred from the
/// index URL's hosting pattern. All derivation methods are pure.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    repo_base: String,
    source_base: String,
    per_id: HashMap<String, String>,
    source_abs_fallback: bool,
}

impl LinkResolver {
    /// Build a resolver from host configuration. `index_url` feeds
    /// source-base inference when no explicit source base is configured.
    pub fn new(config: LinkConfig, index_url: Option<&str>) -> Self {
        let repo_raw = config
            .repo_base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_REPO_BASE);
        let repo_base = ensure_trailing_slash(normalize_tree_base(repo_raw, BaseKind::Repo));

        let source_raw = config
            .source_base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .or_else(|| index_url.and_then(infer_source_base))
            .unwrap_or_else(|| DEFAULT_SOURCE_BASE.to_owned());
        let source_base =
            ensure_trailing_slash(normalize_tree_base(source_raw.trim(), BaseKind::Source));

        Self {
            repo_base,
            source_base,
            per_id: config.repo_per_id,
            source_abs_fallback: config.source_abs_fallback,
        }
    }

    /// The effective repository tree base (always `/`-terminated).
    pub fn repo_base(&self) -> &str {
        &self.repo_base
    }

    /// The effective source tree base (always `/`-terminated).
    pub fn source_base(&self) -> &str {
        &self.source_base
    }

    /// Derive the repository link for a pack, or `None` when the id is
    /// not mappable (consumers render plain text, not a search link).
    pub fn repo_url(&self, id: &str, pack: &Pack) -> Option<String> {
        repo::resolve(&repo::RepoCtx {
            id,
            pack,
            base: &self.repo_base,
            per_id: &self.per_id,
        })
    }

    /// Derive the source link for one engine, or `None` when the pack has
    /// no derivable artifact for it.
    pub fn engine_url(&self, pack: &Pack, engine: Engine) -> Option<String> {
        engine::resolve(&engine::EngineCtx {
            pack,
            engine,
            base: &self.source_base,
            source_abs_fallback: self.source_abs_fallback,
        })
    }
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::new(LinkConfig::default(), None)
    }
}
