//! # rulehub-core — Foundational Types for the RuleHub Index
//!
//! Defines the `Pack` record (one compliance-policy bundle in the index),
//! the single normalization boundary that turns raw index entries into
//! `Pack`s, the client error taxonomy with stable machine-readable codes,
//! and pack filtering helpers used by table-style consumers.
//!
//! ## Key Design Principles
//!
//! 1. **One normalization boundary.** All raw index entries pass through
//!    [`Pack::from_raw`]. There is no second sanitize pass downstream;
//!    every consumer sees the same defaults (`"N/A"` standard, `"0.0.0"`
//!    version, jurisdiction arrays joined to a display string).
//!
//! 2. **Identity never collapses.** Every normalized `Pack` carries a
//!    non-empty `id` and `name`, synthesized from the entry position when
//!    upstream omits both. List keying downstream can rely on this.
//!
//! 3. **Stable error codes.** Failures from the fetch/validate pipeline
//!    are tagged with one of four wire codes via [`ErrorCode`]; consumers
//!    dispatch on the code, never on message text.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `rulehub-*` crates (leaf of the DAG).
//! - No `unsafe` code, no `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod filter;
pub mod pack;

pub use error::{ErrorCode, RulehubError};
pub use filter::{
    distinct_industries, distinct_jurisdictions, distinct_standards, PackFilter,
};
pub use pack::{EngineArtifact, Industry, Pack, PathEntry};
