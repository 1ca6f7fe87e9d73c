//! Reconciliation of the original and transliterated scoring passes.
//!
//! Both passes can surface the same record. Candidates are grouped by
//! record identifier and only the highest-scored one is kept, so no
//! identifier appears twice. The passes that matched each record are
//! recorded alongside.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::scoring::{Pass, ScoredCandidate};

/// A ranked record after merging, with every pass that matched it.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedResult {
    /// The best (highest-scored) candidate for this record.
    pub candidate: ScoredCandidate,
    /// All passes that produced a candidate for this record.
    pub passes: Vec<Pass>,
}

/// Merge two scoring passes into one ranked list.
///
/// Starting from `original`, each candidate of `transliterated` replaces the
/// stored candidate of the same record only if it scores strictly higher,
/// and is appended otherwise. The result is sorted by score descending,
/// ties broken by retrieval order.
pub fn merge(
    original: Vec<ScoredCandidate>,
    transliterated: Vec<ScoredCandidate>,
) -> Vec<MergedResult> {
    let mut merged: Vec<MergedResult> = Vec::with_capacity(original.len());
    let mut by_id: HashMap<String, usize> = HashMap::with_capacity(original.len());

    for candidate in original.into_iter().chain(transliterated) {
        match by_id.get(&candidate.id) {
            Some(&idx) => {
                let entry = &mut merged[idx];
                if !entry.passes.contains(&candidate.pass) {
                    entry.passes.push(candidate.pass);
                }
                if candidate.score > entry.candidate.score {
                    entry.candidate = candidate;
                }
            }
            None => {
                by_id.insert(candidate.id.clone(), merged.len());
                let passes = vec![candidate.pass];
                merged.push(MergedResult { candidate, passes });
            }
        }
    }

    merged.sort_by(rank);
    merged
}

fn rank(a: &MergedResult, b: &MergedResult) -> Ordering {
    b.candidate
        .score
        .total_cmp(&a.candidate.score)
        .then(a.candidate.position.cmp(&b.candidate.position))
}
