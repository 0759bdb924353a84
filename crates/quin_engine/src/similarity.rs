//! Local similarity detector - decides if two question strings ask the
//! same thing.
//!
//! Deliberately a bounded lexical heuristic, not semantic understanding:
//! normalization, containment, token overlap, then a curated
//! semantic-group lexicon that catches rephrasings like "big" vs "huge"
//! or "European" vs "from Europe". The design bias is to over-flag
//! similarity: a skipped fresh question costs less than a repeat.

use quin_common::SimilarityVerdict;

use crate::registry::{CategoryPack, SemanticGroup};

/// Function words stripped before any comparison.
const STOPWORDS: &[&str] = &[
    "is", "it", "a", "an", "the", "does", "do", "can", "will", "would", "could", "they", "he",
    "she", "are", "were", "was", "did", "have", "has", "had", "of", "in", "on", "at", "for", "to",
    "and", "or", "with", "from", "its", "their", "your", "than", "this", "that", "you", "i",
];

/// Minimum shared content tokens to flag similarity outright.
const SHARED_TOKEN_THRESHOLD: usize = 2;

/// Overlap ratio (shared / union) above which two token sets are
/// considered the same question. Strict variant used for live dedup.
const OVERLAP_RATIO_THRESHOLD: f64 = 0.70;

/// Curated topic clusters: words in the same cluster express one
/// underlying concept. Kept as versioned data, not derived.
const BUILTIN_GROUPS: &[(&str, &[&str])] = &[
    (
        "size",
        &["big", "large", "huge", "small", "tiny", "giant", "bigger", "larger", "smaller", "size"],
    ),
    (
        "life_status",
        &["alive", "living", "dead", "deceased", "extinct", "lived"],
    ),
    ("gender", &["male", "female", "man", "woman", "boy", "girl"]),
    (
        "geography",
        &[
            "europe", "european", "asia", "asian", "africa", "african", "america", "american",
            "continent", "country", "abroad",
        ],
    ),
    (
        "leadership",
        &[
            "president", "prime", "minister", "leader", "led", "king", "queen", "ruler",
            "chancellor", "office",
        ],
    ),
    (
        "era",
        &["century", "decade", "ancient", "modern", "old", "older", "recent", "historical", "era"],
    ),
    (
        "color",
        &["color", "colour", "red", "blue", "green", "black", "white", "yellow", "colored"],
    ),
    (
        "electronics",
        &[
            "electronic", "electric", "electricity", "battery", "powered", "digital", "plug",
            "device",
        ],
    ),
    (
        "animal_class",
        &["mammal", "bird", "reptile", "fish", "insect", "amphibian", "species"],
    ),
    (
        "diet",
        &["eat", "eats", "carnivore", "herbivore", "omnivore", "meat", "diet", "feeds"],
    ),
    (
        "domesticity",
        &["pet", "domestic", "domesticated", "tame", "wild", "farm"],
    ),
    (
        "habitat",
        &["habitat", "water", "ocean", "sea", "forest", "desert", "jungle", "land", "live", "lives"],
    ),
    (
        "material",
        &["metal", "plastic", "wood", "wooden", "glass", "stone", "fabric", "made", "material"],
    ),
    (
        "function",
        &["used", "use", "purpose", "tool", "function", "works", "work"],
    ),
    (
        "activity",
        &["active", "retired", "current", "former", "still", "anymore"],
    ),
    (
        "achievement",
        &["famous", "known", "achievement", "accomplished", "won", "winner", "prize"],
    ),
];

/// Lexical similarity detector over a semantic-group lexicon.
#[derive(Debug, Clone)]
pub struct SimilarityDetector {
    groups: Vec<SemanticGroup>,
}

impl Default for SimilarityDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityDetector {
    /// Detector with the built-in lexicon only.
    pub fn new() -> Self {
        Self {
            groups: builtin_groups(),
        }
    }

    /// Detector with the built-in lexicon plus a category pack's extras.
    pub fn for_pack(pack: &CategoryPack) -> Self {
        let mut groups = builtin_groups();
        groups.extend(pack.semantic_groups.iter().cloned());
        Self { groups }
    }

    /// Lowercase, strip punctuation, collapse whitespace, drop stopwords.
    pub fn normalize(text: &str) -> String {
        let lowered = text.to_lowercase();
        let cleaned: String = lowered
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
            .collect();

        cleaned
            .split_whitespace()
            .filter(|w| !STOPWORDS.contains(w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Content tokens of a normalized string (length > 2).
    pub fn content_tokens(normalized: &str) -> Vec<String> {
        normalized
            .split_whitespace()
            .filter(|t| t.len() > 2)
            .map(|t| t.to_string())
            .collect()
    }

    /// Cheap boolean variant of [`compare`](Self::compare).
    pub fn is_similar(&self, a: &str, b: &str) -> bool {
        self.compare(a, b).is_similar
    }

    /// Full pipeline: normalize, exact, containment, token overlap,
    /// semantic-group lookup. First match wins.
    pub fn compare(&self, a: &str, b: &str) -> SimilarityVerdict {
        let na = Self::normalize(a);
        let nb = Self::normalize(b);

        // All-stopword strings carry no topic; never flag them.
        if na.is_empty() || nb.is_empty() {
            return SimilarityVerdict::distinct();
        }

        if na == nb {
            return SimilarityVerdict::similar(b, "exact");
        }

        if na.contains(&nb) || nb.contains(&na) {
            return SimilarityVerdict::similar(b, "substring");
        }

        let ta = Self::content_tokens(&na);
        let tb = Self::content_tokens(&nb);

        let shared = ta.iter().filter(|t| tb.contains(t)).count();
        if shared >= SHARED_TOKEN_THRESHOLD {
            return SimilarityVerdict::similar(b, "token_overlap");
        }
        let union = ta.len() + tb.len() - shared;
        if union > 0 && shared as f64 / union as f64 > OVERLAP_RATIO_THRESHOLD {
            return SimilarityVerdict::similar(b, "token_overlap");
        }

        for group in &self.groups {
            let in_a = ta.iter().any(|t| group.words.iter().any(|w| w == t));
            let in_b = tb.iter().any(|t| group.words.iter().any(|w| w == t));
            if in_a && in_b {
                return SimilarityVerdict::similar(b, "semantic_group");
            }
        }

        SimilarityVerdict::distinct()
    }

    /// Check a candidate against every prior question; first hit wins.
    pub fn similar_to_any<'a, I>(&self, candidate: &str, previous: I) -> SimilarityVerdict
    where
        I: IntoIterator<Item = &'a str>,
    {
        for prior in previous {
            let verdict = self.compare(candidate, prior);
            if verdict.is_similar {
                return verdict;
            }
        }
        SimilarityVerdict::distinct()
    }
}

fn builtin_groups() -> Vec<SemanticGroup> {
    BUILTIN_GROUPS
        .iter()
        .map(|(name, words)| SemanticGroup {
            name: name.to_string(),
            words: words.iter().map(|w| w.to_string()).collect(),
        })
        .collect()
}

/// Word list for the named built-in cluster, if one exists.
pub fn builtin_group_words(name: &str) -> Option<&'static [&'static str]> {
    BUILTIN_GROUPS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, words)| *words)
}
