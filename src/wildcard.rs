//! Glob-style name matching for `*` and `?`
//!
//! Used by the `select` / `deselect` built-ins. Matching is linear in the
//! common case: a single remembered `*` position is enough to backtrack,
//! because a later `*` always supersedes an earlier one.

/// Returns whether `text` matches `pattern`.
///
/// `?` matches exactly one character and `*` matches any run of characters,
/// including none. Comparison is exact; no case folding is performed.
pub fn matches(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let mut t = 0;
    let mut p = 0;
    // Pattern index of the last `*` seen, and the text index it currently
    // stops at.
    let mut star: Option<usize> = None;
    let mut restart = 0;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            restart = t;
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if let Some(star_index) = star {
            // Let the star swallow one more character and retry.
            p = star_index + 1;
            restart += 1;
            t = restart;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}
