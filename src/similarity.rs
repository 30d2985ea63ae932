//! Text similarity for near-duplicate span detection.
//!
//! The conflict filter's default threshold (0.75) is calibrated against one
//! specific measure: the matching-block ratio. The longest common contiguous
//! block is found, then the search recurses on the unmatched text to its left
//! and right; the ratio is `2 * matched / (len(a) + len(b))`.
//!
//! Lengths and blocks are counted in Unicode scalar values, not bytes.
//!
//! # Examples
//!
//! ```
//! use c3pa_eval::similarity::sequence_ratio;
//!
//! assert_eq!(sequence_ratio("abcd", "bcde"), 0.75);
//! assert!(sequence_ratio("The quick brown fox", "The quick brown fox ") > 0.97);
//! ```

use std::collections::HashMap;

/// Second sequences at least this long get the popular-element heuristic.
const AUTOJUNK_MIN_LEN: usize = 200;

/// A matching block: `a[a..a + size] == b[b..b + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    /// Start in the first sequence.
    pub a: usize,
    /// Start in the second sequence.
    pub b: usize,
    /// Block length.
    pub size: usize,
}

/// Finds matching blocks between two strings.
///
/// With `autojunk` on (the default) and a second string of 200 or more
/// characters, any character occurring more than `len / 100 + 1` times in it
/// is "popular": it never seeds a match, though it can still extend one.
/// This keeps long, repetitive spans from matching on filler characters, and
/// is part of what the threshold was calibrated against.
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    /// Matcher with the popular-element heuristic enabled.
    #[must_use]
    pub fn new(a: &str, b: &str) -> Self {
        Self::with_autojunk(a, b, true)
    }

    /// Matcher with the popular-element heuristic switched on or off.
    #[must_use]
    pub fn with_autojunk(a: &str, b: &str, autojunk: bool) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &ch) in b.iter().enumerate() {
            b2j.entry(ch).or_default().push(j);
        }

        let n = b.len();
        if autojunk && n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, indices| indices.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    /// Returns a zero-sized match at `(alo, blo)` when nothing matches.
    #[must_use]
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let mut best = Match {
            a: alo,
            b: blo,
            size: 0,
        };

        // j2len[j] = length of the match ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best.size {
                        best = Match {
                            a: i + 1 - k,
                            b: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            j2len = next;
        }

        // Popular characters cannot seed a block but may still grow one.
        while best.a > alo && best.b > blo && self.a[best.a - 1] == self.b[best.b - 1] {
            best.a -= 1;
            best.b -= 1;
            best.size += 1;
        }
        while best.a + best.size < ahi
            && best.b + best.size < bhi
            && self.a[best.a + best.size] == self.b[best.b + best.size]
        {
            best.size += 1;
        }

        best
    }

    /// All matching blocks, ordered by position, adjacent blocks collapsed.
    ///
    /// The last element is always the sentinel `Match { a: len(a), b: len(b), size: 0 }`.
    #[must_use]
    pub fn matching_blocks(&self) -> Vec<Match> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            blocks.push(m);
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
        }
        blocks.sort_unstable();

        let mut collapsed: Vec<Match> = Vec::with_capacity(blocks.len() + 1);
        for m in blocks {
            match collapsed.last_mut() {
                Some(last) if last.a + last.size == m.a && last.b + last.size == m.b => {
                    last.size += m.size;
                }
                _ => collapsed.push(m),
            }
        }
        collapsed.push(Match {
            a: la,
            b: lb,
            size: 0,
        });
        collapsed
    }

    /// Similarity in `[0.0, 1.0]`; two empty strings are identical (1.0).
    #[must_use]
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matched as f64 / total as f64
    }
}

/// Matching-block ratio of `a` against `b` with the popular-element heuristic on.
#[must_use]
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(a, b).ratio()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_and_empty() {
        assert_eq!(sequence_ratio("privacy", "privacy"), 1.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
        assert_eq!(sequence_ratio("privacy", ""), 0.0);
        assert_eq!(sequence_ratio("", "privacy"), 0.0);
    }

    #[test]
    fn test_trailing_space() {
        let ratio = sequence_ratio("The quick brown fox", "The quick brown fox ");
        assert!((ratio - 38.0 / 39.0).abs() < 1e-12);
    }

    #[test]
    fn test_matching_blocks() {
        let blocks = SequenceMatcher::new("abxcd", "abcd").matching_blocks();
        assert_eq!(
            blocks,
            vec![
                Match { a: 0, b: 0, size: 2 },
                Match { a: 3, b: 2, size: 2 },
                Match { a: 5, b: 4, size: 0 },
            ]
        );
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let m = SequenceMatcher::new(" abcd", "abcd abcd").find_longest_match(0, 5, 0, 9);
        assert_eq!(m, Match { a: 0, b: 4, size: 5 });
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // 'é' is two bytes; the ratio must see one character on each side.
        assert_eq!(sequence_ratio("é", "e"), 0.0);
        assert_eq!(sequence_ratio("café", "cafe"), 0.75);
    }

    #[test]
    fn test_popular_characters_do_not_seed_matches() {
        let b = "a".repeat(250);
        let a = format!("b{}", b);
        assert_eq!(SequenceMatcher::new(&a, &b).ratio(), 0.0);
        let plain = SequenceMatcher::with_autojunk(&a, &b, false).ratio();
        assert!((plain - 500.0 / 501.0).abs() < 1e-12);
    }

    #[test]
    fn test_popular_characters_extend_matches() {
        // The zero-size match at (0, 0) still grows over popular characters.
        let s = "a".repeat(250);
        assert_eq!(sequence_ratio(&s, &s), 1.0);
    }

    #[test]
    fn test_autojunk_needs_long_second_sequence() {
        let a = "a".repeat(250);
        let b = format!("b{}", "a".repeat(150));
        // b is shorter than 200 characters, so nothing is junked.
        let ratio = sequence_ratio(&a, &b);
        assert!((ratio - 300.0 / 401.0).abs() < 1e-12);
    }
}
