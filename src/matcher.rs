//! Fuzzy memory matching
//!
//! A stored string is scored against a search term in four tiers: exact
//! match, term inside candidate, candidate inside term, and shared word.
//! Only lower-casing and whitespace trimming are applied before comparing.

use serde::{Deserialize, Serialize};

/// Scores awarded per match tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTiers {
    /// Candidate equals the term
    pub exact: u32,
    /// Term is a substring of the candidate
    pub term_in_candidate: u32,
    /// Candidate is a substring of the term
    pub candidate_in_term: u32,
    /// Some word of the term is a substring of the candidate
    pub word_overlap: u32,
}

impl ScoreTiers {
    /// Item names stored in item-location records
    pub fn item_location() -> Self {
        Self::new(100, 75, 60, 40)
    }

    /// Labels and objects of images, when locating an item
    pub fn image_sighting() -> Self {
        Self::new(90, 70, 50, 30)
    }

    /// Potential product names of images
    pub fn product() -> Self {
        Self::new(100, 80, 70, 50)
    }

    /// Labels and objects of images, when locating a product
    pub fn product_label() -> Self {
        Self::new(90, 70, 60, 40)
    }

    const fn new(exact: u32, term_in_candidate: u32, candidate_in_term: u32, word_overlap: u32) -> Self {
        Self {
            exact,
            term_in_candidate,
            candidate_in_term,
            word_overlap,
        }
    }
}

/// Score `candidate` against `term`
///
/// Returns `None` when no tier applies.
///
/// # Examples
///
/// ```
/// use memoria::matcher::{score, ScoreTiers};
///
/// let tiers = ScoreTiers::item_location();
/// assert_eq!(score("Umbrella", "umbrella", &tiers), Some(100));
/// assert_eq!(score("blue umbrella", "umbrella", &tiers), Some(75));
/// assert_eq!(score("sofa", "umbrella", &tiers), None);
/// ```
pub fn score(candidate: &str, term: &str, tiers: &ScoreTiers) -> Option<u32> {
    let candidate = candidate.trim().to_lowercase();
    let term = term.trim().to_lowercase();

    if candidate == term {
        Some(tiers.exact)
    } else if candidate.contains(&term) {
        Some(tiers.term_in_candidate)
    } else if term.contains(&candidate) {
        Some(tiers.candidate_in_term)
    } else if term.split_whitespace().any(|word| candidate.contains(word)) {
        Some(tiers.word_overlap)
    } else {
        None
    }
}

/// Running best match over a scan
///
/// Offers are compared with a strict `>`, so the first record offered at a
/// given score is kept over later ones.
#[derive(Debug)]
pub struct BestMatch<T> {
    best: Option<(u32, T)>,
}

impl<T> Default for BestMatch<T> {
    fn default() -> Self {
        Self { best: None }
    }
}

impl<T> BestMatch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest score offered so far, 0 when nothing matched yet
    pub fn score(&self) -> u32 {
        self.best.as_ref().map_or(0, |(s, _)| *s)
    }

    /// Keep `value` if `score` beats the current best
    pub fn offer(&mut self, score: u32, value: impl FnOnce() -> T) {
        if score > self.score() {
            self.best = Some((score, value()));
        }
    }

    /// Score every candidate and offer `value` at each score
    pub fn offer_all<'a, I>(&mut self, candidates: I, term: &str, tiers: &ScoreTiers, value: impl Fn() -> T)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for candidate in candidates {
            if let Some(s) = score(candidate, term, tiers) {
                self.offer(s, &value);
            }
        }
    }

    pub fn into_inner(self) -> Option<T> {
        self.best.map(|(_, value)| value)
    }
}
