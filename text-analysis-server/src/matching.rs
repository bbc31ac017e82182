//! Edit-distance matching against the dictionary.
//!
//! Everything here is pure: the functions borrow their inputs and never
//! mutate them, so callers can run them while holding a read-consistent
//! view of the dictionary without worrying about side effects.

use std::fmt;

/// One ranked dictionary candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub word: String,
    pub distance: usize,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.word, self.distance)
    }
}

/// Up to `k` candidates, ascending by distance, ties in dictionary order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedMatch {
    pub candidates: Vec<Candidate>,
    /// Whether any dictionary entry had distance 0, even if ranking stopped early.
    pub exact: bool,
}

impl RankedMatch {
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

/// Levenshtein distance between the trimmed forms of `a` and `b`.
///
/// Insert, delete and substitute each cost 1. Two rows are kept, sized by
/// the shorter input.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.trim().chars().collect();
    let b: Vec<char> = b.trim().chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Ranks `dictionary` against `word` in a single pass, keeping the `k`
/// closest entries.
///
/// An entry only displaces a kept one when its distance is strictly smaller,
/// so among equal distances the earlier dictionary entry wins.
pub fn top_k<'a, I>(word: &str, dictionary: I, k: usize) -> RankedMatch
where
    I: IntoIterator<Item = &'a String>,
{
    let mut ranked = RankedMatch::default();
    if k == 0 {
        return ranked;
    }
    ranked.candidates.reserve(k);

    for entry in dictionary {
        let dist = distance(word, entry);
        if dist == 0 {
            ranked.exact = true;
        }

        let slot = ranked
            .candidates
            .iter()
            .position(|kept| dist < kept.distance);

        match slot {
            Some(index) => {
                if ranked.candidates.len() == k {
                    ranked.candidates.pop();
                }
                ranked.candidates.insert(
                    index,
                    Candidate {
                        word: entry.clone(),
                        distance: dist,
                    },
                );
            }
            None if ranked.candidates.len() < k => ranked.candidates.push(Candidate {
                word: entry.clone(),
                distance: dist,
            }),
            None => {}
        }
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn pairs(ranked: &RankedMatch) -> Vec<(&str, usize)> {
        ranked
            .candidates
            .iter()
            .map(|c| (c.word.as_str(), c.distance))
            .collect()
    }

    #[test]
    fn distance_of_known_pairs() {
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("flaw", "lawn"), 2);
        assert_eq!(distance("", "abc"), 3);
        assert_eq!(distance("abc", ""), 3);
        assert_eq!(distance("", ""), 0);
    }

    #[test]
    fn distance_is_symmetric_and_bounded() {
        let samples = ["cat", "cap", "hat", "house", "horse", "", "a", "banana"];
        for a in samples {
            assert_eq!(distance(a, a), 0);
            for b in samples {
                let d = distance(a, b);
                assert_eq!(d, distance(b, a), "{a} vs {b}");
                let (la, lb) = (a.len(), b.len());
                assert!(la.abs_diff(lb) <= d, "{a} vs {b}");
                assert!(d <= la.max(lb), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn distance_ignores_surrounding_whitespace() {
        let padded = String::from("  cat\n");
        assert_eq!(distance(&padded, "cat"), 0);
        assert_eq!(padded, "  cat\n");
    }

    #[test]
    fn ranks_cap_against_small_dictionary() {
        let dictionary = words(&["cat", "bat", "hat"]);
        let ranked = top_k("cap", &dictionary, 5);

        assert_eq!(pairs(&ranked), vec![("cat", 1), ("bat", 2), ("hat", 2)]);
        assert!(!ranked.exact);
    }

    #[test]
    fn exact_entry_comes_first() {
        let dictionary = words(&["bat", "hat", "cat"]);
        let ranked = top_k("cat", &dictionary, 5);

        assert!(ranked.exact);
        assert_eq!(ranked.best().map(|c| (c.word.as_str(), c.distance)), Some(("cat", 0)));
    }

    #[test]
    fn keeps_only_k_and_prefers_earlier_ties() {
        let dictionary = words(&["aaa", "aab", "aac", "aad", "aae", "aaf", "aaa"]);
        let ranked = top_k("aaz", &dictionary, 3);

        assert_eq!(pairs(&ranked), vec![("aaa", 1), ("aab", 1), ("aac", 1)]);
    }

    #[test]
    fn closer_late_entry_evicts_worst() {
        let dictionary = words(&["zzzz", "zzz", "zz", "dog"]);
        let ranked = top_k("dig", &dictionary, 2);

        assert_eq!(pairs(&ranked), vec![("dog", 1), ("zzz", 3)]);
    }

    #[test]
    fn output_is_sorted_and_sized() {
        let dictionary = words(&["one", "two", "three", "four", "five", "six", "seven"]);
        for k in 0..9 {
            let ranked = top_k("tree", &dictionary, k);
            assert_eq!(ranked.len(), k.min(dictionary.len()));
            assert!(ranked
                .candidates
                .windows(2)
                .all(|pair| pair[0].distance <= pair[1].distance));
        }
    }

    #[test]
    fn empty_dictionary_yields_nothing() {
        let ranked = top_k("xyz", &Vec::<String>::new(), 5);
        assert!(ranked.is_empty());
        assert!(!ranked.exact);
        assert!(ranked.best().is_none());
    }
}
