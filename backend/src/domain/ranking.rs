//! Free-text ranking of POI names.
//!
//! Pure and stateless: callers supply the candidate set on every call. The
//! same functions back the search endpoint and any client holding a cached
//! copy of `GET /poi`.
//!
//! Scores are tiered, first match wins:
//!
//! | tier      | condition                                   | score                  |
//! |-----------|---------------------------------------------|------------------------|
//! | exact     | normalised name equals normalised term      | 100                    |
//! | prefix    | name starts with term                       | 80                     |
//! | token     | term equals a whitespace-delimited token    | 70                     |
//! | substring | term occurs at character index `i`          | `60 - i / 100`, >= 0.01 |
//! | none      | otherwise, or blank term                    | 0                      |

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::PointOfInterest;

/// Suggestions returned when the caller does not ask for a limit.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

const EXACT_SCORE: f64 = 100.0;
const PREFIX_SCORE: f64 = 80.0;
const TOKEN_SCORE: f64 = 70.0;
const SUBSTRING_BASE_SCORE: f64 = 60.0;
const SUBSTRING_POSITION_DIVISOR: f64 = 100.0;
const SUBSTRING_FLOOR_SCORE: f64 = 0.01;

/// A candidate paired with its score against one query term.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    /// Matched POI.
    pub poi: PointOfInterest,
    /// Non-negative relevance score; higher is better.
    pub score: f64,
}

/// Trim and lowercase for case-insensitive matching.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Score `name` against `term`.
///
/// # Examples
/// ```
/// use poi_backend::domain::ranking::score_name;
///
/// assert_eq!(score_name("Cafe Alpha", "cafe alpha"), 100.0);
/// assert_eq!(score_name("Cafe Alpha", "cafe"), 80.0);
/// assert_eq!(score_name("Coffee Bean Gangnam", "bean"), 70.0);
/// assert_eq!(score_name("Cafe Alpha", "   "), 0.0);
/// ```
#[must_use]
pub fn score_name(name: &str, term: &str) -> f64 {
    let term = normalize(term);
    if term.is_empty() {
        return 0.0;
    }
    score_normalized(&normalize(name), &term)
}

fn score_normalized(name: &str, term: &str) -> f64 {
    if name == term {
        return EXACT_SCORE;
    }
    if name.starts_with(term) {
        return PREFIX_SCORE;
    }
    if name.split_whitespace().any(|token| token == term) {
        return TOKEN_SCORE;
    }
    match name.find(term) {
        Some(byte_index) => {
            let char_index = name.get(..byte_index).map_or(0, |head| head.chars().count());
            let penalty = f64::from(u32::try_from(char_index).unwrap_or(u32::MAX))
                / SUBSTRING_POSITION_DIVISOR;
            (SUBSTRING_BASE_SCORE - penalty).max(SUBSTRING_FLOOR_SCORE)
        }
        None => 0.0,
    }
}

/// Locale-aware sort key: canonical decomposition without combining marks,
/// lowercased.
#[must_use]
pub fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Total order on names: collation key first, raw text second.
#[must_use]
pub fn compare_names(left: &str, right: &str) -> Ordering {
    collation_key(left)
        .cmp(&collation_key(right))
        .then_with(|| left.cmp(right))
}

/// Return the single highest-scoring POI, or `None` when nothing scores
/// above zero. Equal scores prefer the name that collates first.
#[must_use]
pub fn find_best_match<'a>(pois: &'a [PointOfInterest], term: &str) -> Option<&'a PointOfInterest> {
    let term = normalize(term);
    if term.is_empty() {
        return None;
    }

    let mut best: Option<(&PointOfInterest, f64)> = None;
    for poi in pois {
        let score = score_normalized(&normalize(poi.name()), &term);
        if score <= 0.0 {
            continue;
        }
        let replace = match best {
            None => true,
            Some((current, current_score)) => {
                score > current_score
                    || (score == current_score
                        && compare_names(poi.name(), current.name()) == Ordering::Less)
            }
        };
        if replace {
            best = Some((poi, score));
        }
    }
    best.map(|(poi, _)| poi)
}

/// Rank `pois` against `term`, keeping at most `limit` non-zero matches.
///
/// Sorted by score descending, then by [`compare_names`]. The sort is stable,
/// so identical names keep their input order.
///
/// # Examples
/// ```
/// use poi_backend::domain::PointOfInterest;
/// use poi_backend::domain::ranking::rank_suggestions;
///
/// let pois = ["Seoul Station", "Gangnam Station", "Coffee Bean Gangnam"]
///     .iter()
///     .zip(1..)
///     .map(|(name, id)| PointOfInterest::try_from_parts(id, *name, 37.5, 127.0))
///     .collect::<Result<Vec<_>, _>>()
///     .expect("valid pois");
///
/// let names: Vec<_> = rank_suggestions(&pois, "gang", 10)
///     .into_iter()
///     .map(|m| m.poi.name().to_owned())
///     .collect();
/// assert_eq!(names, ["Gangnam Station", "Coffee Bean Gangnam"]);
/// ```
#[must_use]
pub fn rank_suggestions(pois: &[PointOfInterest], term: &str, limit: usize) -> Vec<ScoredMatch> {
    let term = normalize(term);
    if term.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(f64, String, &PointOfInterest)> = pois
        .iter()
        .filter_map(|poi| {
            let score = score_normalized(&normalize(poi.name()), &term);
            (score > 0.0).then(|| (score, collation_key(poi.name()), poi))
        })
        .collect();

    scored.sort_by(|(left_score, left_key, left), (right_score, right_key, right)| {
        right_score
            .total_cmp(left_score)
            .then_with(|| left_key.cmp(right_key))
            .then_with(|| left.name().cmp(right.name()))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(score, _, poi)| ScoredMatch {
            poi: poi.clone(),
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Tier, tie-break, and limit behaviour.
    use super::*;
    use rstest::{fixture, rstest};

    fn pois(names: &[&str]) -> Vec<PointOfInterest> {
        names
            .iter()
            .zip(1..)
            .map(|(name, id)| {
                PointOfInterest::try_from_parts(id, *name, 37.5, 127.0).expect("valid poi")
            })
            .collect()
    }

    fn names(matches: &[ScoredMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.poi.name()).collect()
    }

    #[fixture]
    fn stations() -> Vec<PointOfInterest> {
        pois(&["Seoul Station", "Gangnam Station", "Coffee Bean Gangnam"])
    }

    #[rstest]
    #[case("Cafe Alpha", "cafe alpha", 100.0)]
    #[case("  CAFE ALPHA ", "Cafe Alpha", 100.0)]
    #[case("Cafe Alpha", "cafe", 80.0)]
    #[case("Coffee Bean Gangnam", "bean", 70.0)]
    #[case("Cafe Alpha", "zzz", 0.0)]
    #[case("Cafe Alpha", "", 0.0)]
    #[case("Cafe Alpha", "   ", 0.0)]
    fn scores_follow_tiers(#[case] name: &str, #[case] term: &str, #[case] expected: f64) {
        assert_eq!(score_name(name, term), expected);
    }

    #[test]
    fn substring_score_is_between_zero_and_sixty() {
        let score = score_name("Urbanite", "ban");
        assert!(score > 0.0 && score < 60.0, "score {score}");
        assert!((score - 59.98).abs() < 1e-9);
    }

    #[test]
    fn earlier_substring_scores_higher() {
        assert!(score_name("xban", "ban") > score_name("xxxxban", "ban"));
    }

    #[test]
    fn substring_index_counts_characters_not_bytes() {
        assert!((score_name("강남역카페", "카페") - 59.97).abs() < 1e-9);
    }

    #[test]
    fn substring_score_never_reaches_zero() {
        let name = format!("{}needle", "x".repeat(10_000));
        assert!((score_name(&name, "needle") - SUBSTRING_FLOOR_SCORE).abs() < 1e-9);
    }

    #[rstest]
    fn rank_orders_by_tier(stations: Vec<PointOfInterest>) {
        let ranked = rank_suggestions(&stations, "gang", DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(names(&ranked), ["Gangnam Station", "Coffee Bean Gangnam"]);
    }

    #[rstest]
    fn equal_scores_break_ties_alphabetically(stations: Vec<PointOfInterest>) {
        let ranked = rank_suggestions(&stations, "station", DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(names(&ranked), ["Gangnam Station", "Seoul Station"]);
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn collation_ignores_accents() {
        let ranked = rank_suggestions(&pois(&["Cafe Zeta", "Café Alpha"]), "caf", 10);
        assert_eq!(names(&ranked), ["Café Alpha", "Cafe Zeta"]);
    }

    #[test]
    fn rank_respects_limit() {
        let ranked = rank_suggestions(&pois(&["Cafe A", "Cafe B", "Cafe C"]), "cafe", 2);
        assert_eq!(names(&ranked), ["Cafe A", "Cafe B"]);
    }

    #[rstest]
    fn blank_term_ranks_nothing(stations: Vec<PointOfInterest>) {
        assert!(rank_suggestions(&stations, "  ", 10).is_empty());
        assert!(find_best_match(&stations, "").is_none());
    }

    #[rstest]
    fn rank_is_deterministic(stations: Vec<PointOfInterest>) {
        let first = rank_suggestions(&stations, "a", 10);
        let second = rank_suggestions(&stations, "a", 10);
        assert_eq!(first, second);
    }

    #[rstest]
    fn best_match_prefers_highest_score(stations: Vec<PointOfInterest>) {
        let best = find_best_match(&stations, "seoul station").expect("match");
        assert_eq!(best.name(), "Seoul Station");
    }

    #[rstest]
    fn best_match_ties_use_collation(stations: Vec<PointOfInterest>) {
        let best = find_best_match(&stations, "station").expect("match");
        assert_eq!(best.name(), "Gangnam Station");
    }

    #[rstest]
    fn best_match_is_none_without_hits(stations: Vec<PointOfInterest>) {
        assert!(find_best_match(&stations, "busan").is_none());
    }
}
