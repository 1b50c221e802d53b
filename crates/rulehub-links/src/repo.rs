//! Repository-link derivation.
//!
//! Ordered strategy cascade, first match wins:
//!
//! 1. [`explicit_url`] — absolute `repoUrl` from the record, verbatim.
//! 2. [`explicit_path`] — `repoPath` joined to the repo base, unless it is
//!    charts-relative (`files/...`): the charts layout must not leak into
//!    core-repo links.
//! 3. [`per_id_override`] — host-configured id → path-or-URL mapping.
//! 4. [`id_heuristic`] — two-segment ids map to
//!    `policies/<prefix>/<rest>`.
//!
//! No strategy matching means no link; consumers render plain text rather
//! than a generic search URL.

use std::collections::HashMap;

use rulehub_core::Pack;

use crate::base::{is_absolute_url, join};

pub(crate) struct RepoCtx<'a> {
    pub id: &'a str,
    pub pack: &'a Pack,
    /// Effective repo tree base, `/`-terminated.
    pub base: &'a str,
    pub per_id: &'a HashMap<String, String>,
}

type Strategy = fn(&RepoCtx<'_>) -> Option<String>;

const STRATEGIES: &[Strategy] = &[explicit_url, explicit_path, per_id_override, id_heuristic];

pub(crate) fn resolve(ctx: &RepoCtx<'_>) -> Option<String> {
    STRATEGIES.iter().find_map(|strategy| strategy(ctx))
}

fn explicit_url(ctx: &RepoCtx<'_>) -> Option<String> {
    ctx.pack
        .repo_url
        .as_deref()
        .filter(|u| is_absolute_url(u))
        .map(str::to_owned)
}

fn explicit_path(ctx: &RepoCtx<'_>) -> Option<String> {
    let path = ctx.pack.repo_path.as_deref().filter(|p| !p.is_empty())?;
    let rel = path.trim_start_matches('/');
    if rel.starts_with("files/") {
        // Charts-relative path: ignore for repo links and fall through.
        return None;
    }
    Some(join(ctx.base, rel))
}

fn per_id_override(ctx: &RepoCtx<'_>) -> Option<String> {
    let mapped = ctx.per_id.get(ctx.id).filter(|v| !v.is_empty())?;
    if is_absolute_url(mapped) {
        return Some(mapped.clone());
    }
    Some(join(ctx.base, mapped.trim_start_matches('/')))
}

fn id_heuristic(ctx: &RepoCtx<'_>) -> Option<String> {
    let mut parts = ctx.id.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(prefix), Some(rest), None) if !prefix.is_empty() && !rest.is_empty() => {
            Some(join(ctx.base, &format!("policies/{prefix}/{rest}")))
        }
        _ => None,
    }
}
