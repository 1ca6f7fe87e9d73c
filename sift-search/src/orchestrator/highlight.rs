//! Highlight rendering for matched fields.

/// Wrap every run of consecutive matched chars of `text` in `open`/`close`.
///
/// `positions` are ascending char indices; indices past the end are ignored.
pub fn render(text: &str, positions: &[usize], open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len() + positions.len() * (open.len() + close.len()));
    let mut matched = positions.iter().copied().peekable();
    let mut in_run = false;

    for (idx, ch) in text.chars().enumerate() {
        while matched.next_if(|&p| p < idx).is_some() {}
        let hit = matched.next_if_eq(&idx).is_some();
        if hit && !in_run {
            out.push_str(open);
        } else if !hit && in_run {
            out.push_str(close);
        }
        in_run = hit;
        out.push(ch);
    }
    if in_run {
        out.push_str(close);
    }
    out
}
