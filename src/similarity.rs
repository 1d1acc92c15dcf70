//! Lexical similarity between an input name and a matched candidate.
//!
//! Implements the Ratcliff/Obershelp ratio: 2*M/T where M is the total
//! length of matching blocks (the longest common block, then recursively
//! the pieces to its left and right) and T the combined length of both
//! strings. Matches what Python's difflib reports for short strings,
//! which keeps scores comparable with tooling built around that ratio.

/// Similarity ratio between two strings, in [0, 1].
///
/// 1.0 for identical strings (including two empty strings), 0.0 when
/// no characters match.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matches = matching_len(&a, &b);
    2.0 * matches as f64 / total as f64
}

/// Total length of matching blocks between two char slices
fn matching_len(a: &[char], b: &[char]) -> usize {
    let (a_start, b_start, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_len(&a[..a_start], &b[..b_start])
        + matching_len(&a[a_start + len..], &b[b_start + len..])
}

/// Longest common contiguous block, earliest occurrence on ties.
///
/// Returns (start in a, start in b, length). Rolling DP row over `b`,
/// O(len(a) * len(b)) time, O(len(b)) space.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            if curr[j + 1] > best.2 {
                best = (i + 1 - curr[j + 1], j + 1 - curr[j + 1], curr[j + 1]);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
