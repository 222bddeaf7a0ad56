//! Fuzzy ranking of lookup keys.
//!
//! [`SubsequenceMatcher`] finds the query's characters, in order and
//! case-insensitively, inside a key. Among all placements it picks the
//! shortest window, then the earliest one. A key scores higher when that
//! window is tighter and starts closer to the beginning.
//!
//! The matcher implements [`fuzzy_matcher::FuzzyMatcher`], so [`rank`] works
//! equally with `SkimMatcherV2`.

use fuzzy_matcher::FuzzyMatcher;

/// Default number of results returned by a lookup.
pub const DEFAULT_LIMIT: usize = 8;

/// Window-length penalty is weighted above any start offset below this.
const POSITION_RANGE: i64 = 1 << 20;
const MAX_SCORE: i64 = 1 << 50;

/// Where a query was found inside a key, in `char` offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Offset of the first matched character.
    pub start: usize,
    /// Length of the window from the first to the last matched character.
    pub span: usize,
    /// Offsets of every matched character.
    pub indices: Vec<usize>,
}

/// In-order, case-insensitive subsequence scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsequenceMatcher;

impl SubsequenceMatcher {
    /// Find the tightest, earliest placement of `pattern` in `choice`.
    ///
    /// Returns `None` for an empty pattern or when some pattern character
    /// cannot be placed.
    #[must_use]
    pub fn locate(&self, choice: &str, pattern: &str) -> Option<Placement> {
        let pattern: Vec<char> = pattern.chars().map(fold).collect();
        let first = *pattern.first()?;
        let choice: Vec<char> = choice.chars().map(fold).collect();

        let mut best: Option<Placement> = None;
        for start in (0..choice.len()).filter(|&i| choice[i] == first) {
            // no placement from here means none from any later start either
            let Some(indices) = greedy_from(&choice, &pattern, start) else {
                break;
            };
            let span = indices.last().map_or(1, |last| last - start + 1);

            if best.as_ref().is_none_or(|b| span < b.span) {
                best = Some(Placement {
                    start,
                    span,
                    indices,
                });
                if span == pattern.len() {
                    break;
                }
            }
        }
        best
    }

    /// Score a placement; larger is better and always positive.
    #[must_use]
    pub fn score(placement: &Placement) -> i64 {
        let span = i64::try_from(placement.span).unwrap_or(i64::MAX / POSITION_RANGE);
        let start = i64::try_from(placement.start)
            .unwrap_or(POSITION_RANGE - 1)
            .min(POSITION_RANGE - 1);
        MAX_SCORE
            .saturating_sub(span.saturating_mul(POSITION_RANGE))
            .saturating_sub(start)
            .max(1)
    }
}

impl FuzzyMatcher for SubsequenceMatcher {
    fn fuzzy_indices(&self, choice: &str, pattern: &str) -> Option<(i64, Vec<usize>)> {
        let placement = self.locate(choice, pattern)?;
        Some((Self::score(&placement), placement.indices))
    }

    fn fuzzy_match(&self, choice: &str, pattern: &str) -> Option<i64> {
        self.locate(choice, pattern).map(|p| Self::score(&p))
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn greedy_from(choice: &[char], pattern: &[char], start: usize) -> Option<Vec<usize>> {
    let mut indices = Vec::with_capacity(pattern.len());
    let mut pos = start;
    for &wanted in pattern {
        let offset = choice[pos..].iter().position(|&c| c == wanted)?;
        indices.push(pos + offset);
        pos += offset + 1;
    }
    Some(indices)
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<'a> {
    /// Matched key.
    pub key: &'a str,
    /// Value stored under the key.
    pub value: &'a str,
    /// Matcher score, larger is better.
    pub score: i64,
}

/// Rank `(key, value)` candidates against `query`, best first.
///
/// Candidates that do not match, or score zero or below, are dropped. Equal
/// scores keep their input order. An empty query matches nothing.
pub fn rank<'a, M, I>(matcher: &M, query: &str, candidates: I, limit: usize) -> Vec<Ranked<'a>>
where
    M: FuzzyMatcher + ?Sized,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<Ranked<'a>> = candidates
        .into_iter()
        .filter_map(|(key, value)| {
            let score = matcher.fuzzy_match(key, query)?;
            (score > 0).then_some(Ranked { key, value, score })
        })
        .collect();

    // stable: ties stay in candidate order
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fuzzy_matcher::skim::SkimMatcherV2;
    use proptest::prelude::*;

    fn keys<'a>(ranked: &[Ranked<'a>]) -> Vec<&'a str> {
        ranked.iter().map(|r| r.key).collect()
    }

    #[test]
    fn test_locate_prefers_tightest_window() {
        let matcher = SubsequenceMatcher;
        // "ab" appears spread out at 0..=3 and tight at 4..=5
        let placement = matcher.locate("axxbab", "ab").unwrap();
        assert_eq!(placement.start, 4);
        assert_eq!(placement.span, 2);
        assert_eq!(placement.indices, vec![4, 5]);
    }

    #[test]
    fn test_locate_is_case_insensitive() {
        let placement = SubsequenceMatcher.locate("Client.Connect", "CON").unwrap();
        assert_eq!(placement.indices, vec![7, 8, 9]);
    }

    #[test]
    fn test_locate_rejects_out_of_order() {
        assert!(SubsequenceMatcher.locate("message", "gm").is_none());
        assert!(SubsequenceMatcher.locate("message", "").is_none());
    }

    #[test]
    fn test_contiguous_beats_scattered() {
        let candidates = [("s_e_n_d", "a"), ("send", "b")];
        let ranked = rank(&SubsequenceMatcher, "send", candidates, 8);
        assert_eq!(keys(&ranked), vec!["send", "s_e_n_d"]);
    }

    #[test]
    fn test_earlier_start_wins_on_equal_span() {
        let candidates = [("xxsend", "a"), ("send", "b"), ("xsend", "c")];
        let ranked = rank(&SubsequenceMatcher, "send", candidates, 8);
        assert_eq!(keys(&ranked), vec!["send", "xsend", "xxsend"]);
    }

    #[test]
    fn test_ties_keep_candidate_order() {
        let candidates = [("Abc.send", "1"), ("Xyz.send", "2"), ("Def.send", "3")];
        let ranked = rank(&SubsequenceMatcher, "send", candidates, 8);
        assert_eq!(keys(&ranked), vec!["Abc.send", "Xyz.send", "Def.send"]);
    }

    #[test]
    fn test_on_msg_finds_on_message() {
        let candidates = [
            ("Client.connect", "/client.html#Client.connect"),
            ("on_message", "/events.html#on_message"),
        ];
        let ranked = rank(&SubsequenceMatcher, "on_msg", candidates, 8);
        assert_eq!(ranked[0].key, "on_message");
        assert_eq!(ranked[0].value, "/events.html#on_message");
    }

    #[test]
    fn test_empty_query_and_no_match_return_nothing() {
        let candidates = [("on_message", "x"), ("Client.connect", "y")];
        assert!(rank(&SubsequenceMatcher, "", candidates, 8).is_empty());
        assert!(rank(&SubsequenceMatcher, "zzzzqqqq", candidates, 8).is_empty());
    }

    #[test]
    fn test_rank_works_with_skim() {
        let candidates = [("on_message", "x"), ("Client.connect", "y")];
        let ranked = rank(&SkimMatcherV2::default(), "on_msg", candidates, 8);
        assert_eq!(ranked.first().map(|r| r.key), Some("on_message"));
    }

    proptest! {
        #[test]
        fn test_rank_is_deterministic_and_bounded(
            keys in proptest::collection::vec("[a-zA-Z_.]{0,12}", 0..40),
            query in "[a-z_]{0,4}",
            limit in 1usize..12,
        ) {
            let candidates: Vec<(&str, &str)> = keys.iter().map(|k| (k.as_str(), "")).collect();

            let first = rank(&SubsequenceMatcher, &query, candidates.iter().copied(), limit);
            let second = rank(&SubsequenceMatcher, &query, candidates.iter().copied(), limit);

            prop_assert_eq!(&first, &second);
            prop_assert!(first.len() <= limit);
            for pair in first.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
            for hit in &first {
                prop_assert!(SubsequenceMatcher.locate(hit.key, &query).is_some());
            }
        }
    }
}
