//! Engine-source-link derivation.
//!
//! Ordered strategy cascade, first match wins:
//!
//! 1. [`explicit_path`] — the per-engine path field
//!    (`kyvernoPath`/`gatekeeperPath`).
//! 2. [`artifact_paths`] — the per-engine artifact array: first usable
//!    relative path, or (with `source_abs_fallback`) an absolute URL when
//!    only core-style paths are present.
//! 3. [`id_heuristic`] — charts filename patterns derived from the id,
//!    gated on engine capability detected from the generic `paths` list
//!    (except the Gatekeeper template/constraint id forms, which imply
//!    the engine by themselves).
//! 4. [`artifact_absolute_url`] — any absolute URL from the artifact
//!    array, as a last resort.
//! 5. [`explicit_url`] — the per-engine absolute URL field.
//!
//! Base-layout sensitivity: when the effective source base is
//! charts-style, a candidate relative path in core-repo style
//! (`policies/...` or `*policy.rego`) that is not charts-relative would
//! produce a broken join and is treated as non-applicable.

use rulehub_core::{EngineArtifact, Pack};

use crate::base::{is_absolute_url, join};
use crate::Engine;

pub(crate) struct EngineCtx<'a> {
    pub pack: &'a Pack,
    pub engine: Engine,
    /// Effective source tree base, `/`-terminated.
    pub base: &'a str,
    pub source_abs_fallback: bool,
}

impl<'a> EngineCtx<'a> {
    fn path_field(&self) -> Option<&'a str> {
        match self.engine {
            Engine::Kyverno => self.pack.kyverno_path.as_deref(),
            Engine::Gatekeeper => self.pack.gatekeeper_path.as_deref(),
        }
    }

    fn url_field(&self) -> Option<&'a str> {
        match self.engine {
            Engine::Kyverno => self.pack.kyverno_url.as_deref(),
            Engine::Gatekeeper => self.pack.gatekeeper_url.as_deref(),
        }
    }

    fn artifacts(&self) -> Option<&'a [EngineArtifact]> {
        match self.engine {
            Engine::Kyverno => self.pack.kyverno.as_deref(),
            Engine::Gatekeeper => self.pack.gatekeeper.as_deref(),
        }
    }

    /// A core-style relative path joined onto a charts-style base is a
    /// broken link; such candidates are skipped.
    fn unusable_under_base(&self, rel: &str) -> bool {
        base_looks_charts(self.base) && looks_core_policies(rel) && !is_charts_relative(rel)
    }
}

type Strategy = fn(&EngineCtx<'_>) -> Option<String>;

const STRATEGIES: &[Strategy] = &[
    explicit_path,
    artifact_paths,
    id_heuristic,
    artifact_absolute_url,
    explicit_url,
];

pub(crate) fn resolve(ctx: &EngineCtx<'_>) -> Option<String> {
    STRATEGIES.iter().find_map(|strategy| strategy(ctx))
}

fn explicit_path(ctx: &EngineCtx<'_>) -> Option<String> {
    let field = ctx.path_field().filter(|p| !p.is_empty())?;
    let rel = field.trim_start_matches('/');
    if ctx.unusable_under_base(rel) {
        return None;
    }
    Some(join(ctx.base, rel))
}

fn artifact_paths(ctx: &EngineCtx<'_>) -> Option<String> {
    let artifacts = ctx.artifacts().filter(|a| !a.is_empty())?;

    for artifact in artifacts {
        let Some(path) = artifact.path.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        let rel = path.trim_start_matches('/');
        if !is_absolute_url(rel) && !ctx.unusable_under_base(rel) {
            return Some(join(ctx.base, rel));
        }
    }

    // Every relative path was unusable (or the array carried none).
    // Optionally prefer an absolute URL now over a likely-broken charts
    // join further down the cascade.
    if ctx.source_abs_fallback {
        if let Some(url) = first_absolute_url(artifacts) {
            return Some(url.to_owned());
        }
    }
    None
}

fn id_heuristic(ctx: &EngineCtx<'_>) -> Option<String> {
    let segments: Vec<&str> = ctx.pack.id.split('.').collect();

    // Common two-part id: <domain>.<name>, gated on detected capability.
    if let [domain, name] = segments[..] {
        if is_id_segment(domain) && is_id_segment(name) && capability(ctx) {
            let rel = match ctx.engine {
                Engine::Kyverno => format!("files/kyverno/{domain}-{name}-policy.yaml"),
                Engine::Gatekeeper => format!("files/gatekeeper/{domain}-{name}-constraint.yaml"),
            };
            return Some(join(ctx.base, &rel));
        }
    }

    if ctx.engine != Engine::Gatekeeper {
        return None;
    }

    // Gatekeeper id forms that imply the engine without capability
    // detection: templates and constraint placeholders.
    let keyword = |segment: &str, word: &str| segment.eq_ignore_ascii_case(word);

    if let [domain, name, template] = segments[..] {
        if keyword(template, "template") && is_id_segment(domain) && is_id_segment(name) {
            return Some(join(
                ctx.base,
                &format!("files/gatekeeper-templates/{domain}-{name}-template.yaml"),
            ));
        }
    }

    let constraint_template = match segments[..] {
        [domain, c, t] if keyword(c, "constraint") && keyword(t, "template") => Some(domain),
        [domain, c, t, p]
            if keyword(c, "constraint") && keyword(t, "template") && keyword(p, "placeholder") =>
        {
            Some(domain)
        }
        _ => None,
    };
    if let Some(domain) = constraint_template.filter(|d| is_id_segment(d)) {
        return Some(join(
            ctx.base,
            &format!("files/gatekeeper-templates/{domain}-constraint-template.yaml"),
        ));
    }

    let constraint = match segments[..] {
        [domain, c] if keyword(c, "constraint") => Some(domain),
        [domain, c, p] if keyword(c, "constraint") && keyword(p, "placeholder") => Some(domain),
        _ => None,
    };
    if let Some(domain) = constraint.filter(|d| is_id_segment(d)) {
        return Some(join(ctx.base, &format!("files/gatekeeper/{domain}-constraint.yaml")));
    }

    None
}

fn artifact_absolute_url(ctx: &EngineCtx<'_>) -> Option<String> {
    first_absolute_url(ctx.artifacts()?).map(str::to_owned)
}

fn explicit_url(ctx: &EngineCtx<'_>) -> Option<String> {
    ctx.url_field()
        .filter(|u| is_absolute_url(u))
        .map(str::to_owned)
}

/// Whether the generic `paths` list shows artifacts for this engine.
fn capability(ctx: &EngineCtx<'_>) -> bool {
    let entries = ctx.pack.paths.as_deref().unwrap_or_default();
    match ctx.engine {
        Engine::Kyverno => entries.iter().any(|e| {
            let s = e.path.to_ascii_lowercase();
            s.contains("/kyverno/") || s.starts_with("addons/kyverno")
        }),
        Engine::Gatekeeper => entries.iter().any(|e| {
            let s = e.path.to_ascii_lowercase();
            s.contains("k8s-gatekeeper")
                || s.ends_with("policy.rego")
                || s.contains("/templates/")
                || s.contains("/constraints/")
        }),
    }
}

fn first_absolute_url(artifacts: &[EngineArtifact]) -> Option<&str> {
    artifacts
        .iter()
        .filter_map(|a| a.url.as_deref())
        .find(|u| is_absolute_url(u))
}

fn is_charts_relative(rel: &str) -> bool {
    let lower = rel.trim_start_matches('/').to_ascii_lowercase();
    lower.starts_with("files/kyverno/")
        || lower.starts_with("files/gatekeeper/")
        || lower.starts_with("files/gatekeeper-templates/")
}

fn looks_core_policies(rel: &str) -> bool {
    let lower = rel.to_ascii_lowercase();
    lower.starts_with("policies/")
        || lower.contains("/policies/")
        || lower.ends_with("policy.rego")
}

fn base_looks_charts(base: &str) -> bool {
    let lower = base.to_ascii_lowercase();
    lower.contains("rulehub-charts") || lower.contains("/files/")
}

fn is_id_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
