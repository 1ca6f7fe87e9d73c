//! Per-record fuzzy scoring.
//!
//! A record is scored once against its original field text and, when the
//! collection transliterates, once more against its transliterated
//! composite. Each pass yields at most one [`ScoredCandidate`].
//!
//! Aggregate score of the original pass:
//!
//! ```text
//! score = max over matched fields of (field_score + field_weight)
//! ```
//!
//! The transliterated pass matches the whole composite once and adds the
//! weight of the field in which the match starts.

use crate::matcher::PreparedQuery;
use crate::normalize::{Composite, NormalizedRecord};

/// Which scoring pass produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Matched against the flattened field text as stored.
    Original,
    /// Matched against the transliterated composite.
    Transliterated,
}

/// Match of the query inside one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    /// Index of the field in the collection's searchable field list.
    pub field_index: usize,
    /// Unweighted match score.
    pub score: f64,
    /// Ascending char indices into the field's normalised text.
    pub positions: Vec<usize>,
}

/// A record that passed the threshold in one scoring pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Record identifier.
    pub id: String,
    /// Index of the record in retrieval order, used to break score ties.
    pub position: usize,
    /// Aggregate weighted score.
    pub score: f64,
    /// Pass that produced this candidate.
    pub pass: Pass,
    /// Fields that matched. Never empty.
    pub matches: Vec<FieldMatch>,
}

/// Score `record` against the original field text.
///
/// Returns `None` when no field matches or the aggregate falls below
/// `threshold`.
pub fn score_original(
    query: &PreparedQuery,
    id: &str,
    position: usize,
    record: &NormalizedRecord,
    threshold: f64,
) -> Option<ScoredCandidate> {
    let mut best = f64::NEG_INFINITY;
    let mut matches = Vec::new();
    for (field_index, field) in record.fields.iter().enumerate() {
        let Some(m) = query.match_text(&field.text) else {
            continue;
        };
        best = best.max(m.score + field.weight);
        matches.push(FieldMatch {
            field_index,
            score: m.score,
            positions: m.positions,
        });
    }
    if matches.is_empty() || best < threshold {
        return None;
    }
    Some(ScoredCandidate {
        id: id.to_owned(),
        position,
        score: best,
        pass: Pass::Original,
        matches,
    })
}

/// Score `record` against its transliterated composite.
///
/// `query` must already be transliterated. Matched composite chars are
/// mapped back to the source fields, so the resulting positions index the
/// original field text just like those of [`score_original`].
pub fn score_transliterated(
    query: &PreparedQuery,
    id: &str,
    position: usize,
    record: &NormalizedRecord,
    threshold: f64,
) -> Option<ScoredCandidate> {
    let composite = record.composite.as_ref()?;
    let m = query.match_text(&composite.text)?;
    let matches = map_to_fields(composite, &m.positions, m.score);
    let first_field = matches.first()?.field_index;
    let score = m.score + record.fields.get(first_field)?.weight;
    if score < threshold {
        return None;
    }
    Some(ScoredCandidate {
        id: id.to_owned(),
        position,
        score,
        pass: Pass::Transliterated,
        matches,
    })
}

/// Group composite positions by source field, in field order of first
/// appearance. Several composite chars can share one source char (`ж` → `zh`).
fn map_to_fields(composite: &Composite, positions: &[usize], score: f64) -> Vec<FieldMatch> {
    let mut matches: Vec<FieldMatch> = Vec::new();
    let origins = positions
        .iter()
        .filter_map(|&p| composite.origins.get(p).copied().flatten());
    for (field_index, char_index) in origins {
        match matches.iter_mut().find(|fm| fm.field_index == field_index) {
            Some(fm) => {
                if fm.positions.last() != Some(&char_index) {
                    fm.positions.push(char_index);
                }
            }
            None => matches.push(FieldMatch {
                field_index,
                score,
                positions: vec![char_index],
            }),
        }
    }
    matches
}
