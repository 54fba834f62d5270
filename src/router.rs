//! Keyword-pattern query router
//!
//! Queries are classified by an ordered table of rules. Each rule owns a set
//! of trigger phrases and an optional argument extractor; the first rule with
//! a phrase contained in the lower-cased query wins, and `General` catches
//! everything else.

use serde::Serialize;
use std::fmt;

/// Routing category of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// "Where did I put X?"
    Location,
    /// Shopping and product recommendation requests
    Product,
    /// "What did I see?"
    Recall,
    /// "What is this?"
    Identification,
    /// Anything else
    General,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::Location => "location",
            Intent::Product => "product",
            Intent::Recall => "recall",
            Intent::Identification => "identification",
            Intent::General => "general",
        };
        write!(f, "{}", name)
    }
}

/// Result of routing a query
///
/// `argument` is only ever populated for `Location` and `Product`. For those
/// intents `None` means the argument could not be extracted, which callers
/// answer with a clarification request instead of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub intent: Intent,
    pub argument: Option<String>,
}

struct Rule {
    intent: Intent,
    patterns: &'static [&'static str],
    extract: Option<fn(&str) -> Option<String>>,
}

const LOCATION_PATTERNS: &[&str] = &[
    "where did i put",
    "where are my",
    "where is my",
    "where are the",
    "where is the",
    "can't find",
    "find my",
    "where did i store",
    "where did i leave",
];

const PRODUCT_PATTERNS: &[&str] = &[
    "buy",
    "purchase",
    "shop for",
    "get me",
    "where can i get",
    "find products",
    "similar to",
    "shopping",
    "order",
    "want to purchase",
];

const RECALL_PATTERNS: &[&str] = &[
    "what did i see",
    "what did you see",
    "remember seeing",
    "last image",
    "latest photo",
    "what was in the picture",
];

const IDENTIFY_PATTERNS: &[&str] = &[
    "what is this",
    "what am i looking at",
    "what do you see",
    "what is that",
];

const RULES: &[Rule] = &[
    Rule {
        intent: Intent::Location,
        patterns: LOCATION_PATTERNS,
        extract: Some(extract_item_name),
    },
    Rule {
        intent: Intent::Product,
        patterns: PRODUCT_PATTERNS,
        extract: Some(extract_product_name),
    },
    Rule {
        intent: Intent::Recall,
        patterns: RECALL_PATTERNS,
        extract: None,
    },
    Rule {
        intent: Intent::Identification,
        patterns: IDENTIFY_PATTERNS,
        extract: None,
    },
];

/// Start phrases for product extraction and the words that end the product name
const PRODUCT_SPANS: &[(&str, &[&str])] = &[
    ("buy", &["for", "online", "now", "from", "at", "on"]),
    ("purchase", &["for", "online", "from", "at", "on"]),
    ("shop for", &["online", "at", "on", "in"]),
    ("get me", &["from", "at", "online", "on"]),
    ("get me a", &["from", "at", "online", "on"]),
    ("where can i get", &["from", "at", "online", "on"]),
    ("find products like", &["online", "similar to", "from"]),
    ("similar to", &["online", "like", "from"]),
    ("looking for", &["online", "like", "similar to", "from"]),
];

const PRODUCT_KEYWORDS: &[&str] = &[
    "buy", "purchase", "get", "find", "shop", "want", "need", "looking",
];

const CONNECTING_WORDS: &[&str] = &["a", "an", "the", "some", "for", "to"];

const PREPOSITIONS: &[&str] = &[" from ", " at ", " in ", " on ", " by ", " with ", " for "];

const ITEM_DETERMINERS: &[&str] = &["the", "my", "a", "an"];

const PRODUCT_ARTICLES: &[&str] = &["a ", "an ", "the ", "some "];

/// Classify a query
///
/// # Examples
///
/// ```
/// use memoria::router::{route, Intent};
///
/// let routed = route("Where is my blue umbrella?");
/// assert_eq!(routed.intent, Intent::Location);
/// assert_eq!(routed.argument.as_deref(), Some("blue umbrella"));
/// ```
pub fn route(query: &str) -> Route {
    let normalized = query.trim().to_lowercase();

    for rule in RULES {
        if rule.patterns.iter().any(|p| normalized.contains(p)) {
            let argument = rule.extract.and_then(|extract| extract(&normalized));
            return Route {
                intent: rule.intent,
                argument,
            };
        }
    }

    Route {
        intent: Intent::General,
        argument: None,
    }
}

/// Extract the item named after a location phrase
///
/// Returns `None` when no location phrase is present or nothing is left
/// after removing determiners and trailing punctuation.
pub fn extract_item_name(query: &str) -> Option<String> {
    let query = query.trim().to_lowercase();
    let (pos, pattern) = LOCATION_PATTERNS
        .iter()
        .find_map(|p| query.find(p).map(|pos| (pos, *p)))?;

    let mut item = query[pos + pattern.len()..].trim();
    for determiner in ITEM_DETERMINERS {
        if let Some(rest) = item.strip_prefix(determiner) {
            if rest.is_empty() || rest.starts_with(' ') {
                item = rest.trim_start();
            }
        }
    }
    let item = item.trim_end_matches(['.', '?', '!', ',', ';', ':']);

    if item.is_empty() {
        None
    } else {
        Some(item.to_string())
    }
}

/// Extract a product name from a shopping query
///
/// Tries the start/end phrase table first, then falls back to the text
/// following a shopping keyword up to the first preposition.
pub fn extract_product_name(query: &str) -> Option<String> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    for (start, end_markers) in PRODUCT_SPANS {
        let Some(pos) = find_word(&query, start) else {
            continue;
        };
        let rest = &query[pos + start.len()..];
        let end = end_markers
            .iter()
            .filter_map(|marker| find_word(rest, marker))
            .min()
            .unwrap_or(rest.len());

        let mut name = rest[..end].trim_matches(['?', '!', '.', ',', ';', ':', ' ']);
        for article in PRODUCT_ARTICLES {
            if let Some(stripped) = name.strip_prefix(article) {
                name = stripped;
            }
        }

        if !name.is_empty() {
            return Some(name.to_string());
        }
    }

    for keyword in PRODUCT_KEYWORDS {
        let Some(pos) = find_word(&query, keyword) else {
            continue;
        };
        let mut rest = query[pos + keyword.len()..].trim_start();
        for word in CONNECTING_WORDS {
            if let Some(stripped) = rest
                .strip_prefix(word)
                .filter(|s| s.starts_with(' '))
            {
                rest = stripped.trim_start();
            }
        }

        let mut name = rest.trim_matches(['?', '!', '.', ',', ';', ':', ' ']);
        if let Some(cut) = PREPOSITIONS.iter().filter_map(|p| name.find(p)).min() {
            name = name[..cut].trim();
        }

        if !name.is_empty() {
            return Some(name.to_string());
        }
    }

    None
}

/// Byte offset of the first occurrence of `word` not glued to other letters or digits
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    haystack.match_indices(word).map(|(i, _)| i).find(|&i| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
