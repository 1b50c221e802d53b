//! Pack filtering helpers.
//!
//! Pure iterator-based filters and distinct-option listings backing
//! table-style consumers (filter dropdowns over standard, jurisdiction
//! and industry).

use crate::pack::{Industry, Pack};

/// Filter criteria over a pack list. Empty/`None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackFilter {
    /// Exact match on `standard`.
    pub standard: Option<String>,
    /// Exact match on the jurisdiction display string.
    pub jurisdiction: Option<String>,
    /// Industry label; matches a single label exactly or any entry of a
    /// multi-label tag.
    pub industry: Option<String>,
}

impl PackFilter {
    /// Whether `pack` satisfies every set criterion.
    pub fn matches(&self, pack: &Pack) -> bool {
        if let Some(standard) = &self.standard {
            if &pack.standard != standard {
                return false;
            }
        }
        if let Some(jurisdiction) = &self.jurisdiction {
            if pack.jurisdiction.as_deref().unwrap_or("") != jurisdiction {
                return false;
            }
        }
        if let Some(industry) = &self.industry {
            let matched = match &pack.industry {
                Some(Industry::One(s)) => s == industry,
                Some(Industry::Many(v)) => v.iter().any(|s| s == industry),
                None => false,
            };
            if !matched {
                return false;
            }
        }
        true
    }

    /// Apply the filter to a slice, preserving order.
    pub fn apply<'a>(&self, packs: &'a [Pack]) -> Vec<&'a Pack> {
        packs.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct non-empty standards, sorted.
pub fn distinct_standards(packs: &[Pack]) -> Vec<String> {
    let mut out: Vec<String> = packs
        .iter()
        .map(|p| p.standard.clone())
        .filter(|s| !s.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Distinct non-empty jurisdiction display strings, sorted.
pub fn distinct_jurisdictions(packs: &[Pack]) -> Vec<String> {
    let mut out: Vec<String> = packs
        .iter()
        .filter_map(|p| p.jurisdiction.clone())
        .filter(|s| !s.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Distinct non-empty industry labels, flattening multi-label tags, sorted.
pub fn distinct_industries(packs: &[Pack]) -> Vec<String> {
    let mut out: Vec<String> = packs
        .iter()
        .filter_map(|p| p.industry.as_ref())
        .flat_map(Industry::labels)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    out.sort();
    out.dedup();
    out
}
