//! # rulehub-schema — Index Schema Contract
//!
//! Validates raw package-index documents against the fixed JSON-schema
//! contract before normalization. The contract is deliberately minimal:
//! a top-level `packages` array whose entries carry at least an `id` and
//! a `name` (strings); `jurisdiction` may be a string or an array of
//! strings. Everything else is tolerated and handled by normalization.
//!
//! ## Bounded Diagnostics
//!
//! Validation failures are reported as structured [`Violation`]s. The
//! rendered diagnostic string is bounded to the first
//! [`MAX_REPORTED_VIOLATIONS`] violations so a thoroughly broken payload
//! cannot flood the caller; the overflow count is appended instead.
//!
//! ## Schema Resolution
//!
//! The schema ships inside the crate (embedded from
//! `schemas/plugin-index.schema.json` at the repository root) and is
//! compiled once per process. No network or filesystem access at
//! validation time.

use std::fmt;

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

/// The embedded plugin-index schema document.
pub const INDEX_SCHEMA_JSON: &str = include_str!("../../../schemas/plugin-index.schema.json");

/// Maximum number of violations rendered into diagnostic strings.
pub const MAX_REPORTED_VIOLATIONS: usize = 5;

static COMPILED: Lazy<Validator> = Lazy::new(|| {
    let schema: Value = serde_json::from_str(INDEX_SCHEMA_JSON)
        .expect("embedded plugin-index schema is valid JSON");
    jsonschema::validator_for(&schema).expect("embedded plugin-index schema compiles")
});

/// A single schema violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating location in the instance; `"/"` for
    /// the document root.
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.instance_path, self.message)
    }
}

/// Collection of schema violations for one index document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexViolations {
    violations: Vec<Violation>,
}

impl IndexViolations {
    /// Total number of violations, including unreported overflow.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// All violations, in schema-evaluation order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// The first [`MAX_REPORTED_VIOLATIONS`] violations rendered
    /// `<path> <message>` and joined with `"; "`.
    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .take(MAX_REPORTED_VIOLATIONS)
            .map(Violation::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// [`summary`](Self::summary) plus an `...and N more` suffix when the
    /// total exceeds the reporting bound.
    pub fn details(&self) -> String {
        let summary = self.summary();
        if self.violations.len() > MAX_REPORTED_VIOLATIONS {
            format!(
                "{summary}; ...and {} more",
                self.violations.len() - MAX_REPORTED_VIOLATIONS
            )
        } else {
            summary
        }
    }
}

impl fmt::Display for IndexViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.details())
    }
}

/// Validate a raw index document against the plugin-index contract.
///
/// `instance` is the canonical `{"packages": [...]}` shape (legacy `items`
/// documents must be re-keyed before validation).
pub fn validate_index(instance: &Value) -> Result<(), IndexViolations> {
    let violations: Vec<Violation> = COMPILED
        .iter_errors(instance)
        .map(|e| {
            let path = e.instance_path.to_string();
            Violation {
                instance_path: if path.is_empty() { "/".to_owned() } else { path },
                message: e.to_string(),
            }
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(IndexViolations { violations })
    }
}
