//! The `Pack` record and its normalization rules.
//!
//! A pack is one compliance-policy bundle listed in the index. Upstream
//! index entries are loosely shaped; [`Pack::from_raw`] is the single
//! normalization boundary that produces the canonical record every
//! consumer works with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Industry tag of a pack: a single label or a list of labels.
///
/// Lists pass through un-joined so consumers can filter on individual
/// entries; jurisdiction lists by contrast are joined to a display string
/// at the normalization boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Industry {
    /// A single industry label.
    One(String),
    /// Multiple industry labels.
    Many(Vec<String>),
}

impl Industry {
    /// All labels carried by this tag, in order.
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Industry::One(s) => vec![s.as_str()],
            Industry::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// One engine-specific source artifact: a repo-relative path, an absolute
/// URL, or both.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineArtifact {
    /// Repo-relative path, joined onto the source base when used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Absolute URL, used verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A generic file path advertised by a pack, with an existence flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    /// Repo-relative file path.
    pub path: String,
    /// Whether the upstream index reports the file as present.
    pub exists: bool,
}

/// Descriptor of one RuleHub package in the index.
///
/// Invariants established by [`Pack::from_raw`]: `id` and `name` are never
/// empty; `coverage` is always an array (possibly empty); the optional
/// array fields are arrays-or-`None`, never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    /// Stable unique identifier. Dotted (`gdpr.data_minimization`),
    /// dotted-with-suffix (`ban.hostnetwork.template`), or constraint
    /// placeholder forms (`betting.constraint.placeholder`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Compliance standard the pack belongs to; `"N/A"` when unspecified.
    pub standard: String,
    /// Pack version; `"0.0.0"` when unspecified.
    pub version: String,
    /// Jurisdiction display string. Upstream arrays are joined with `", "`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    /// Industry tag(s).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<Industry>,
    /// Coverage labels.
    #[serde(default)]
    pub coverage: Vec<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Policy engine hint (`kyverno`, `gatekeeper`, `other`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Severity label (`low`, `medium`, `high`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Generic file paths advertised by the pack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<PathEntry>>,
    /// Absolute URL to the pack in the core repository (highest precedence
    /// for repo links).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    /// Repo-relative path, joined with the repo base.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
    /// Explicit absolute Kyverno source URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kyverno_url: Option<String>,
    /// Explicit Kyverno source path, joined with the source base.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kyverno_path: Option<String>,
    /// Kyverno source artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kyverno: Option<Vec<EngineArtifact>>,
    /// Explicit absolute Gatekeeper source URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gatekeeper_url: Option<String>,
    /// Explicit Gatekeeper source path, joined with the source base.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gatekeeper_path: Option<String>,
    /// Gatekeeper source artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gatekeeper: Option<Vec<EngineArtifact>>,
}

impl Pack {
    /// Normalize one raw index entry into a `Pack`.
    ///
    /// `index` is the entry's position in the packages array, used to
    /// synthesize identity when upstream omits both `id` and `name`.
    /// Returns `None` for non-object entries, which are silently dropped
    /// from the index.
    pub fn from_raw(raw: &Value, index: usize) -> Option<Pack> {
        let obj = raw.as_object()?;

        let id = non_empty_string(obj.get("id"))
            .or_else(|| non_empty_string(obj.get("name")))
            .unwrap_or_else(|| format!("pkg-{index}"));
        let name = non_empty_string(obj.get("name"))
            .or_else(|| non_empty_string(obj.get("id")))
            .unwrap_or_else(|| format!("Package {index}"));

        let jurisdiction = match obj.get("jurisdiction") {
            Some(Value::Array(items)) => {
                let joined = items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(joined)
            }
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        let industry = match obj.get("industry") {
            Some(Value::Array(items)) => Some(Industry::Many(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect(),
            )),
            Some(Value::String(s)) => Some(Industry::One(s.clone())),
            _ => None,
        };

        let coverage = obj
            .get("coverage")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let paths = obj.get("paths").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(|entry| {
                    let obj = entry.as_object()?;
                    let path = obj.get("path")?.as_str()?;
                    Some(PathEntry {
                        path: path.to_owned(),
                        exists: obj.get("exists").and_then(Value::as_bool).unwrap_or(false),
                    })
                })
                .collect()
        });

        Some(Pack {
            id,
            name,
            standard: non_empty_string(obj.get("standard")).unwrap_or_else(|| "N/A".to_owned()),
            version: non_empty_string(obj.get("version")).unwrap_or_else(|| "0.0.0".to_owned()),
            jurisdiction,
            industry,
            coverage,
            description: string_field(obj.get("description")),
            framework: string_field(obj.get("framework")),
            severity: string_field(obj.get("severity")),
            paths,
            repo_url: string_field(obj.get("repoUrl")),
            repo_path: string_field(obj.get("repoPath")),
            kyverno_url: string_field(obj.get("kyvernoUrl")),
            kyverno_path: string_field(obj.get("kyvernoPath")),
            kyverno: engine_artifacts(obj.get("kyverno")),
            gatekeeper_url: string_field(obj.get("gatekeeperUrl")),
            gatekeeper_path: string_field(obj.get("gatekeeperPath")),
            gatekeeper: engine_artifacts(obj.get("gatekeeper")),
        })
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_owned)
}

/// Engine arrays keep only entries where at least one of `path`/`url` is a
/// string; the other field is dropped unless it is also a string.
fn engine_artifacts(value: Option<&Value>) -> Option<Vec<EngineArtifact>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|entry| {
                let obj = entry.as_object()?;
                let path = obj.get("path").and_then(Value::as_str);
                let url = obj.get("url").and_then(Value::as_str);
                if path.is_none() && url.is_none() {
                    return None;
                }
                Some(EngineArtifact {
                    path: path.map(str::to_owned),
                    url: url.map(str::to_owned),
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn synthesizes_identity_when_missing() {
        let pack = Pack::from_raw(&json!({}), 3).unwrap();
        assert_eq!(pack.id, "pkg-3");
        assert_eq!(pack.name, "Package 3");
        assert_eq!(pack.standard, "N/A");
        assert_eq!(pack.version, "0.0.0");
    }

    #[test]
    fn id_and_name_fall_back_to_each_other() {
        let pack = Pack::from_raw(&json!({"id": "gdpr.storage_limitation"}), 0).unwrap();
        assert_eq!(pack.name, "gdpr.storage_limitation");

        let pack = Pack::from_raw(&json!({"name": "Storage Limitation"}), 0).unwrap();
        assert_eq!(pack.id, "Storage Limitation");
    }

    #[test]
    fn empty_strings_count_as_missing_identity() {
        let pack = Pack::from_raw(&json!({"id": "", "name": ""}), 7).unwrap();
        assert_eq!(pack.id, "pkg-7");
        assert_eq!(pack.name, "Package 7");
    }

    #[test]
    fn non_object_entries_are_dropped() {
        assert!(Pack::from_raw(&json!(null), 0).is_none());
        assert!(Pack::from_raw(&json!("pack"), 0).is_none());
        assert!(Pack::from_raw(&json!([1, 2]), 0).is_none());
    }

    #[test]
    fn jurisdiction_array_is_joined() {
        let pack = Pack::from_raw(
            &json!({"id": "a.b", "name": "x", "jurisdiction": ["EU", "", "UK"]}),
            0,
        )
        .unwrap();
        assert_eq!(pack.jurisdiction.as_deref(), Some("EU, UK"));
    }

    #[test]
    fn jurisdiction_string_passes_through() {
        let pack =
            Pack::from_raw(&json!({"id": "a.b", "name": "x", "jurisdiction": "Global"}), 0).unwrap();
        assert_eq!(pack.jurisdiction.as_deref(), Some("Global"));
    }

    #[test]
    fn industry_array_passes_through_unjoined() {
        let pack = Pack::from_raw(
            &json!({"id": "a.b", "name": "x", "industry": ["fintech", "", "banking"]}),
            0,
        )
        .unwrap();
        assert_eq!(
            pack.industry,
            Some(Industry::Many(vec!["fintech".into(), "banking".into()]))
        );
    }

    #[test]
    fn paths_missing_exists_defaults_to_false() {
        let pack = Pack::from_raw(
            &json!({
                "id": "a.b",
                "name": "x",
                "paths": [
                    {"path": "policies/a/b/policy.yaml"},
                    {"path": "charts/a", "exists": true},
                    {"exists": true},
                    "not-an-object"
                ]
            }),
            0,
        )
        .unwrap();
        let paths = pack.paths.unwrap();
        assert_eq!(paths.len(), 2);
        assert!(!paths[0].exists);
        assert!(paths[1].exists);
    }

    #[test]
    fn engine_arrays_require_a_string_path_or_url() {
        let pack = Pack::from_raw(
            &json!({
                "id": "a.b",
                "name": "x",
                "kyverno": [
                    {"path": "files/kyverno/a-b-policy.yaml"},
                    {"url": "https://example.com/policy.yaml"},
                    {"path": 42},
                    {}
                ]
            }),
            0,
        )
        .unwrap();
        let kyverno = pack.kyverno.unwrap();
        assert_eq!(kyverno.len(), 2);
        assert_eq!(kyverno[0].path.as_deref(), Some("files/kyverno/a-b-policy.yaml"));
        assert_eq!(kyverno[1].url.as_deref(), Some("https://example.com/policy.yaml"));
    }

    #[test]
    fn passthrough_fields_accept_strings_only() {
        let pack = Pack::from_raw(
            &json!({
                "id": "a.b",
                "name": "x",
                "severity": "high",
                "framework": "kyverno",
                "description": 12
            }),
            0,
        )
        .unwrap();
        assert_eq!(pack.severity.as_deref(), Some("high"));
        assert_eq!(pack.framework.as_deref(), Some("kyverno"));
        assert_eq!(pack.description, None);
    }

    #[test]
    fn coverage_defaults_to_empty() {
        let pack = Pack::from_raw(&json!({"id": "a.b", "name": "x"}), 0).unwrap();
        assert!(pack.coverage.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let pack = Pack::from_raw(
            &json!({"id": "a.b", "name": "x", "repoUrl": "https://github.com/rulehub/rulehub"}),
            0,
        )
        .unwrap();
        let value = serde_json::to_value(&pack).unwrap();
        assert_eq!(value["repoUrl"], "https://github.com/rulehub/rulehub");
        assert!(value.get("repo_url").is_none());
    }
}
