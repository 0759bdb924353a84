//! Possibility space - which candidate targets remain plausible.
//!
//! Elimination only fires when a confirmed-No fact or deduced predicate
//! explicitly names an item, which the generic knowledge path rarely
//! produces. That weakness is inherited deliberately: elimination is a
//! hook for category-specific enrichment, not a general solver, and
//! strengthening it would be a behavior change.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::knowledge::KnowledgeState;

/// Flat confidence assigned to remaining items absent stronger signal.
/// A coarse ranking aid, not a calibrated probability.
pub const BASELINE_CONFIDENCE: f64 = 0.8;

/// Confidence for items a confirmed-Yes fact explicitly names.
const NAMED_CONFIDENCE: f64 = 0.95;

/// Partition of the candidate catalog into eliminated and remaining,
/// with a confidence score per remaining item.
///
/// Invariant: `remaining ∪ eliminated == total_items`, the two are
/// disjoint, and `confidence` has exactly the keys of `remaining`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossibilitySpace {
    pub category: String,
    pub total_items: BTreeSet<String>,
    pub eliminated: BTreeSet<String>,
    pub remaining: BTreeSet<String>,
    pub confidence: BTreeMap<String, f64>,
}

impl PossibilitySpace {
    /// Remaining items ranked by confidence descending, name ascending
    /// as the deterministic tie-break.
    pub fn ranked_remaining(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .remaining
            .iter()
            .map(|item| {
                (
                    item.as_str(),
                    self.confidence.get(item).copied().unwrap_or(BASELINE_CONFIDENCE),
                )
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    /// Top `n` remaining item names by confidence.
    pub fn top_candidates(&self, n: usize) -> Vec<String> {
        self.ranked_remaining()
            .into_iter()
            .take(n)
            .map(|(item, _)| item.to_string())
            .collect()
    }
}

/// Partition the candidate catalog against the knowledge state.
pub fn build_possibility_space(
    category: &str,
    state: &KnowledgeState,
    items: &[String],
) -> PossibilitySpace {
    let total_items: BTreeSet<String> = items.iter().cloned().collect();
    let mut eliminated = BTreeSet::new();
    let mut remaining = BTreeSet::new();
    let mut confidence = BTreeMap::new();

    for item in &total_items {
        if is_item_eliminated(item, state) {
            debug!("Possibility: eliminated '{}'", item);
            eliminated.insert(item.clone());
        } else {
            confidence.insert(item.clone(), item_confidence(item, state));
            remaining.insert(item.clone());
        }
    }

    PossibilitySpace {
        category: category.to_string(),
        total_items,
        eliminated,
        remaining,
        confidence,
    }
}

/// An item is out only when a negative fact names it explicitly.
/// Largely inert in the generic path; see module docs.
///
/// Fact buckets store normalized question text (spaces kept), so the
/// bucket lookup uses that form; deduced predicates are underscored
/// atoms, so the `not_<item>` check uses the predicate form.
fn is_item_eliminated(item: &str, state: &KnowledgeState) -> bool {
    let bucket_key = bucket_key(item);
    let predicate_key = predicate_key(item);

    state.deduced_facts.contains(&format!("not_{predicate_key}"))
        || state.confirmed_no.contains(&bucket_key)
        || state.confirmed_no.contains(&format!("is_{predicate_key}"))
}

fn item_confidence(item: &str, state: &KnowledgeState) -> f64 {
    if state.confirmed_yes.contains(&bucket_key(item)) {
        return NAMED_CONFIDENCE;
    }
    BASELINE_CONFIDENCE
}

/// The form an item name takes inside the fact buckets: the same
/// normalization applied to transcript questions, so "Is it Winston
/// Churchill?" -> "winston churchill" matches the catalog entry.
fn bucket_key(item: &str) -> String {
    crate::similarity::SimilarityDetector::normalize(item)
}

/// The form an item name takes inside a deduced predicate atom.
fn predicate_key(item: &str) -> String {
    item.trim().to_lowercase().replace(' ', "_")
}
