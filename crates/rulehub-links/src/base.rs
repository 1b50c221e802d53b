//! Base-URL normalization and source-base inference.
//!
//! Bases may be handed to the resolver in several hosting forms. This
//! module maps them onto canonical GitHub tree bases
//! (`https://github.com/<owner>/<repo>/tree/<ref>/`) that repo-relative
//! paths are joined onto.

use url::Url;

/// The known organization owning both repository layouts.
pub const RULEHUB_ORG: &str = "rulehub";
/// Core repository name (`policies/<domain>/<name>` layout).
pub const CORE_REPO: &str = "rulehub";
/// Charts repository name (`files/...` layout).
pub const CHARTS_REPO: &str = "rulehub-charts";
/// Ref used when the hosting pattern does not carry one.
pub const DEFAULT_REF: &str = "HEAD";

/// Default repository base: the core repo's Pages index host, normalized
/// to a tree base at resolver construction.
pub const DEFAULT_REPO_BASE: &str = "https://rulehub.github.io/rulehub/plugin-index/index.json";
/// Default source base: the charts repo's Pages index host.
pub const DEFAULT_SOURCE_BASE: &str =
    "https://rulehub.github.io/rulehub-charts/plugin-index/index.json";

/// Which link family a base serves; the Pages redirection rules differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKind {
    /// Repository (Name/ID) links — prefer the core repo.
    Repo,
    /// Engine source links — prefer the charts repo.
    Source,
}

/// Normalize a base that may be a GitHub Pages index URL
/// (`https://<owner>.github.io/<repo>/...`) into a GitHub tree base.
///
/// Repo-kind bases redirect a charts-named Pages host of the known org to
/// the org's core repo; source-kind bases redirect the known org's core
/// Pages host to its charts sibling. Anything that is not a Pages URL is
/// returned unchanged.
pub fn normalize_tree_base(input: &str, kind: BaseKind) -> String {
    let Ok(parsed) = Url::parse(input) else {
        return input.to_owned();
    };
    let Some((owner, repo)) = pages_owner_repo(&parsed) else {
        return input.to_owned();
    };

    let repo_is_charts = repo.to_ascii_lowercase().contains("charts");
    match kind {
        BaseKind::Repo => {
            if repo_is_charts && owner.eq_ignore_ascii_case(RULEHUB_ORG) {
                github_tree(RULEHUB_ORG, CORE_REPO, DEFAULT_REF)
            } else {
                github_tree(&owner, &repo, DEFAULT_REF)
            }
        }
        BaseKind::Source => {
            if repo_is_charts {
                github_tree(&owner, &repo, DEFAULT_REF)
            } else if owner.eq_ignore_ascii_case(RULEHUB_ORG)
                && repo.eq_ignore_ascii_case(CORE_REPO)
            {
                github_tree(RULEHUB_ORG, CHARTS_REPO, DEFAULT_REF)
            } else {
                github_tree(&owner, &repo, DEFAULT_REF)
            }
        }
    }
}

/// Infer a charts-repo tree base from the index URL's hosting pattern.
///
/// Recognizes, in order: a jsDelivr mirror
/// (`cdn.jsdelivr.net/gh/<owner>/<repo>@<ref>/...`), a raw-content URL
/// (`raw.githubusercontent.com/<owner>/<repo>/<ref>/...`) — both gated on
/// a charts-named repo or a `plugin-index` path — a GitHub Pages URL
/// (charts repos directly; the known org's core repo redirected to its
/// charts sibling), and finally a bare `rulehub-charts` substring with an
/// optional `@<ref>`. Returns `None` when nothing matches.
pub fn infer_source_base(index_url: &str) -> Option<String> {
    let parsed = Url::parse(index_url).ok()?;
    let href = parsed.as_str();
    let href_lower = href.to_ascii_lowercase();
    let host = parsed.host_str().unwrap_or("");
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();
    let charts_hint =
        |repo: &str| repo.to_ascii_lowercase().contains("charts") || href_lower.contains("plugin-index");

    if host == "cdn.jsdelivr.net" && segments.len() >= 4 && segments[0] == "gh" {
        let owner = segments[1];
        if let Some((repo, reference)) = segments[2].split_once('@') {
            if !owner.is_empty() && !repo.is_empty() && !reference.is_empty() && charts_hint(repo) {
                return Some(github_tree(owner, repo, reference));
            }
        }
    }

    if host == "raw.githubusercontent.com" && segments.len() >= 4 {
        let (owner, repo, reference) = (segments[0], segments[1], segments[2]);
        if !owner.is_empty() && !repo.is_empty() && !reference.is_empty() && charts_hint(repo) {
            return Some(github_tree(owner, repo, reference));
        }
    }

    if let Some((owner, repo)) = pages_owner_repo(&parsed) {
        if repo.to_ascii_lowercase().contains("charts") {
            // Pages hosts carry no ref; follow the default branch.
            return Some(github_tree(&owner, &repo, DEFAULT_REF));
        }
        if owner.eq_ignore_ascii_case(RULEHUB_ORG) && repo.eq_ignore_ascii_case(CORE_REPO) {
            return Some(github_tree(RULEHUB_ORG, CHARTS_REPO, DEFAULT_REF));
        }
    }

    if href.contains(CHARTS_REPO) {
        let reference = href
            .split_once("rulehub-charts@")
            .map(|(_, rest)| rest.split('/').next().unwrap_or(""))
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REF);
        return Some(github_tree(RULEHUB_ORG, CHARTS_REPO, reference));
    }

    None
}

/// `https://github.com/<owner>/<repo>/tree/<ref>/`
fn github_tree(owner: &str, repo: &str, reference: &str) -> String {
    format!("https://github.com/{owner}/{repo}/tree/{reference}/")
}

/// Extract `(owner, repo)` from a GitHub Pages URL.
///
/// The host must be exactly `<owner>.github.io` (no extra labels) and the
/// path must reach past the repo segment — `https://o.github.io/repo`
/// alone is not a Pages index URL.
fn pages_owner_repo(url: &Url) -> Option<(String, String)> {
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    let owner = host.strip_suffix(".github.io")?;
    if owner.is_empty() || owner.contains('.') {
        return None;
    }
    let segments: Vec<&str> = url.path_segments()?.collect();
    if segments.len() < 2 || segments[0].is_empty() {
        return None;
    }
    Some((owner.to_owned(), segments[0].to_owned()))
}

pub(crate) fn ensure_trailing_slash(base: String) -> String {
    if base.ends_with('/') {
        base
    } else {
        format!("{base}/")
    }
}

/// `http(s)://` prefix check, case-insensitive.
pub(crate) fn is_absolute_url(value: &str) -> bool {
    let lower = value.get(..8).map(str::to_ascii_lowercase).unwrap_or_else(|| value.to_ascii_lowercase());
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Join a repo-relative path (leading slashes stripped) onto a
/// `/`-terminated base.
pub(crate) fn join(base: &str, rel: &str) -> String {
    format!("{base}{rel}")
}
