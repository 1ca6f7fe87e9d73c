//! Fuzzy string matching with match positions.
//!
//! Three attempts, cheapest first:
//!
//! 1. contiguous substring (preferring one that starts a word)
//! 2. in-order subsequence, tightened to the shortest window
//! 3. approximate substring within `query_len / 4` edits
//!
//! Scores are `0.0` for an exact full-text match and negative otherwise.
//! `None` means "no match". Length-driven penalties are capped, so a
//! contiguous match scores above `-(MAX_LEADING + MID_WORD + MAX_UNMATCHED)`
//! however long the target is.

use crate::normalize::fold_char;

/// Penalty for each gap between matched characters.
const GAP_OPEN: f64 = 10.0;
/// Penalty per skipped character inside a gap.
const GAP_EXTEND: f64 = 1.0;
/// Penalty per character before the first match.
const LEADING: f64 = 0.5;
/// Ceiling on the total leading penalty.
const MAX_LEADING: f64 = 200.0;
/// Penalty when the match does not begin at a word boundary.
const MID_WORD: f64 = 5.0;
/// Penalty per unmatched target character.
const UNMATCHED: f64 = 0.1;
/// Ceiling on the total unmatched penalty.
const MAX_UNMATCHED: f64 = 200.0;
/// Penalty per edit in an approximate match.
const TYPO: f64 = 100.0;

/// A successful match of a query against one target string.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    /// Higher is better; `0.0` for an exact full match.
    pub score: f64,
    /// Ascending char indices of matched target characters.
    pub positions: Vec<usize>,
}

/// A case-folded query, reused across every target of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    chars: Vec<char>,
}

impl PreparedQuery {
    /// Fold `query` for matching. Surrounding whitespace is ignored.
    pub fn new(query: &str) -> Self {
        Self {
            chars: query.trim().chars().map(fold_char).collect(),
        }
    }

    /// Whether there is nothing to match.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Match against `target`, returning `None` when it does not match.
    pub fn match_text(&self, target: &str) -> Option<FuzzyMatch> {
        if self.chars.is_empty() {
            return None;
        }
        let target: Vec<char> = target.chars().map(fold_char).collect();
        if target.is_empty() {
            return None;
        }

        if let Some(start) = find_substring(&self.chars, &target) {
            let positions: Vec<usize> = (start..start + self.chars.len()).collect();
            let score = score_positions(&target, &positions, 0);
            return Some(FuzzyMatch { score, positions });
        }

        if let Some(positions) = find_subsequence(&self.chars, &target) {
            let score = score_positions(&target, &positions, 0);
            return Some(FuzzyMatch { score, positions });
        }

        let max_edits = self.chars.len() / 4;
        let (positions, edits) = find_approximate(&self.chars, &target, max_edits)?;
        let score = score_positions(&target, &positions, edits);
        Some(FuzzyMatch { score, positions })
    }
}

/// One-shot convenience wrapper around [`PreparedQuery::match_text`].
pub fn fuzzy_match(query: &str, target: &str) -> Option<FuzzyMatch> {
    PreparedQuery::new(query).match_text(target)
}

fn is_word_start(target: &[char], idx: usize) -> bool {
    idx == 0 || !target[idx - 1].is_alphanumeric()
}

fn score_positions(target: &[char], positions: &[usize], edits: usize) -> f64 {
    let Some(&first) = positions.first() else {
        return f64::NEG_INFINITY;
    };
    let mut score = -(first as f64 * LEADING).min(MAX_LEADING);
    if !is_word_start(target, first) {
        score -= MID_WORD;
    }
    for pair in positions.windows(2) {
        let gap = pair[1] - pair[0] - 1;
        if gap > 0 {
            score -= GAP_OPEN + gap as f64 * GAP_EXTEND;
        }
    }
    score -= ((target.len() - positions.len()) as f64 * UNMATCHED).min(MAX_UNMATCHED);
    score -= edits as f64 * TYPO;
    score
}

/// First occurrence starting a word, else first occurrence.
fn find_substring(query: &[char], target: &[char]) -> Option<usize> {
    if query.len() > target.len() {
        return None;
    }
    let mut first = None;
    for (start, window) in target.windows(query.len()).enumerate() {
        if window == query {
            if is_word_start(target, start) {
                return Some(start);
            }
            first.get_or_insert(start);
        }
    }
    first
}

/// Shortest-window in-order subsequence match.
fn find_subsequence(query: &[char], target: &[char]) -> Option<Vec<usize>> {
    let mut qi = 0;
    let mut end = None;
    for (ti, &c) in target.iter().enumerate() {
        if c == query[qi] {
            qi += 1;
            if qi == query.len() {
                end = Some(ti);
                break;
            }
        }
    }
    let end = end?;

    // Walk back from the end to find the latest possible start.
    let mut remaining = query.len();
    let mut start = end;
    for ti in (0..=end).rev() {
        if target[ti] == query[remaining - 1] {
            remaining -= 1;
            if remaining == 0 {
                start = ti;
                break;
            }
        }
    }

    let mut positions = Vec::with_capacity(query.len());
    let mut qi = 0;
    for (ti, &c) in target.iter().enumerate().take(end + 1).skip(start) {
        if qi < query.len() && c == query[qi] {
            positions.push(ti);
            qi += 1;
        }
    }
    Some(positions)
}

/// Approximate substring match (edit distance with a free start in `target`).
///
/// Returns the matched target positions and the number of edits, or `None`
/// if every alignment needs more than `max_edits` edits.
fn find_approximate(
    query: &[char],
    target: &[char],
    max_edits: usize,
) -> Option<(Vec<usize>, usize)> {
    if max_edits == 0 {
        return None;
    }
    let (best, end) = best_alignment_end(query, target, max_edits)?;

    // An alignment with `best` edits spans at most `m + best` target chars,
    // so the traceback only needs the window ending at `end`.
    let start = end.saturating_sub(query.len() + best);
    let window = &target[start..end];
    let (m, n) = (query.len(), window.len());
    let width = n + 1;
    let mut d = vec![0usize; (m + 1) * width];
    for i in 1..=m {
        d[i * width] = i;
        for j in 1..=n {
            let cost = usize::from(query[i - 1] != window[j - 1]);
            d[i * width + j] = (d[(i - 1) * width + j - 1] + cost)
                .min(d[(i - 1) * width + j] + 1)
                .min(d[i * width + j - 1] + 1);
        }
    }

    let mut positions = Vec::with_capacity(m);
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        let here = d[i * width + j];
        let cost = usize::from(query[i - 1] != window[j - 1]);
        if here == d[(i - 1) * width + j - 1] + cost {
            if cost == 0 {
                positions.push(start + j - 1);
            }
            i -= 1;
            j -= 1;
        } else if here == d[(i - 1) * width + j] + 1 {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    positions.reverse();

    if positions.is_empty() {
        None
    } else {
        Some((positions, best))
    }
}

/// Two-row pass over the whole target: the fewest edits of any alignment
/// and the exclusive end of the first alignment achieving it.
///
/// Row minima never decrease, so a row whose minimum exceeds the budget
/// rules out any match.
fn best_alignment_end(query: &[char], target: &[char], max_edits: usize) -> Option<(usize, usize)> {
    let width = target.len() + 1;
    let mut prev = vec![0usize; width];
    let mut cur = vec![0usize; width];
    for (i, &qc) in query.iter().enumerate() {
        cur[0] = i + 1;
        let mut row_min = cur[0];
        for (j, &tc) in target.iter().enumerate() {
            let cost = usize::from(qc != tc);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
            row_min = row_min.min(cur[j + 1]);
        }
        if row_min > max_edits {
            return None;
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    let (end, best) = prev
        .iter()
        .copied()
        .enumerate()
        .skip(1)
        .min_by_key(|&(j, edits)| (edits, j))?;
    (best <= max_edits).then_some((best, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_full_match_scores_zero() {
        let m = fuzzy_match("cat", "cat").expect("match");
        assert!(m.score.abs() < f64::EPSILON);
        assert_eq!(m.positions, vec![0, 1, 2]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let m = fuzzy_match("CaT", "the Cat sat").expect("match");
        assert_eq!(m.positions, vec![4, 5, 6]);
    }

    #[test]
    fn substring_prefers_word_start() {
        let m = fuzzy_match("cat", "bobcat cat").expect("match");
        assert_eq!(m.positions, vec![7, 8, 9]);
    }

    #[test]
    fn subsequence_uses_tightest_window() {
        let m = fuzzy_match("abc", "a xx abxc").expect("match");
        assert_eq!(m.positions, vec![5, 6, 8]);
    }

    #[test]
    fn subsequence_scores_below_substring() {
        let contiguous = fuzzy_match("rust", "rust lang").expect("match");
        let scattered = fuzzy_match("rust", "r u s t lang").expect("match");
        assert!(contiguous.score > scattered.score);
    }

    #[test]
    fn earlier_match_scores_higher() {
        let early = fuzzy_match("cat", "cat and dog").expect("match");
        let late = fuzzy_match("cat", "dog and cat").expect("match");
        assert!(early.score > late.score);
    }

    #[test]
    fn one_typo_tolerated_for_four_chars() {
        let m = fuzzy_match("caat", "cat").expect("typo match");
        assert_eq!(m.positions, vec![0, 1, 2]);
        assert!(m.score < 0.0);
        assert!(m.score > -10_000.0);
    }

    #[test]
    fn typo_match_ranks_below_exact() {
        let exact = fuzzy_match("cats", "cats").expect("match");
        let typo = fuzzy_match("cats", "cots").expect("match");
        assert!(exact.score > typo.score);
    }

    #[test]
    fn short_queries_get_no_typos() {
        assert!(fuzzy_match("cax", "cat").is_none());
    }

    #[test]
    fn unrelated_text_does_not_match() {
        assert!(fuzzy_match("caat", "dog").is_none());
        assert!(fuzzy_match("zebra", "a cat sat on the mat").is_none());
    }

    #[test]
    fn empty_query_or_target_never_matches() {
        assert!(fuzzy_match("", "cat").is_none());
        assert!(fuzzy_match("   ", "cat").is_none());
        assert!(fuzzy_match("cat", "").is_none());
    }

    #[test]
    fn positions_are_char_indices() {
        let m = fuzzy_match("fe", "café fe").expect("match");
        assert_eq!(m.positions, vec![5, 6]);
    }

    #[test]
    fn positions_strictly_ascending() {
        for (query, target) in [
            ("abc", "aabbcc"),
            ("hello", "help low hello"),
            ("world", "wrold"),
            ("search", "sarch engine"),
        ] {
            if let Some(m) = fuzzy_match(query, target) {
                assert!(m.positions.windows(2).all(|w| w[0] < w[1]), "{query} / {target}");
            }
        }
    }

    #[test]
    fn exact_match_deep_in_long_text_stays_permissive() {
        let text = format!("{}zebra crossing", "lorem ipsum ".repeat(2000));
        let m = fuzzy_match("zebra", &text).expect("match");
        assert_eq!(m.positions, (24_000..24_005).collect::<Vec<_>>());
        assert!(m.score > -(MAX_LEADING + MID_WORD + MAX_UNMATCHED) - 1.0);
        assert!(m.score > -10_000.0);
    }

    #[test]
    fn leading_penalty_capped_but_ordering_kept_for_short_text() {
        let near = fuzzy_match("cat", &format!("{}cat", "x ".repeat(10))).expect("match");
        let far = fuzzy_match("cat", &format!("{}cat", "x ".repeat(100))).expect("match");
        let farther = fuzzy_match("cat", &format!("{}cat", "x ".repeat(5000))).expect("match");
        assert!(near.score > far.score);
        assert!(farther.score >= -(MAX_LEADING + MAX_UNMATCHED));
    }

    #[test]
    fn typo_found_deep_in_long_text() {
        let prefix = "lorem ipsum ".repeat(20_000);
        let text = format!("{prefix}searching engine");
        // Neither a substring nor a subsequence: only the approximate pass finds it.
        let m = fuzzy_match("serxhing", &text).expect("typo match");
        let start = prefix.chars().count();
        assert_eq!(m.positions.first(), Some(&start));
        assert_eq!(m.positions.last(), Some(&(start + 8)));
        assert_eq!(m.positions.len(), 7);
        assert!(m.score > -10_000.0);
    }

    #[test]
    fn approximate_window_positions_are_absolute() {
        let (positions, edits) =
            find_approximate(&chars("wurld"), &chars("hello world"), 1).expect("match");
        assert_eq!(edits, 1);
        assert_eq!(positions, vec![6, 8, 9, 10]);
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn prepared_query_reusable() {
        let query = PreparedQuery::new("fox");
        assert!(!query.is_empty());
        assert!(query.match_text("quick brown fox").is_some());
        assert!(query.match_text("lazy dog").is_none());
    }
}
