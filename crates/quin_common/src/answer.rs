//! Free-text answer classification.
//!
//! Players answer in natural language; the engine only reasons over
//! five coarse buckets. Classification is keyword-driven and checked
//! in a fixed order, so an answer like "not sure" lands in No - a
//! known quirk of the keyword tables, kept for behavioral parity.

use serde::{Deserialize, Serialize};

/// Classified yes/no/maybe answer from a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    No,
    Maybe,
    Unknown,
    /// Text matched no keyword table. Excluded from all fact buckets;
    /// accepted information loss, not an error.
    Unclassified,
}

impl Answer {
    /// Classify raw answer text into a bucket.
    ///
    /// Checks run in order: Yes, No, Maybe, Unknown. First match wins.
    pub fn classify(raw: &str) -> Self {
        let a = raw.trim().to_lowercase();

        if a.is_empty() {
            return Self::Unclassified;
        }

        if a == "yes" || a.starts_with('y') || a.contains("yeah") || a.contains("yep") {
            return Self::Yes;
        }

        if a == "no" || a.starts_with('n') || a.contains("nope") {
            return Self::No;
        }

        if a.contains("maybe") || a.contains("sometimes") || a.contains("it depends") {
            return Self::Maybe;
        }

        if a.contains("don't know") || a.contains("dont know") || a.contains("unknown") {
            return Self::Unknown;
        }

        Self::Unclassified
    }

    /// True for answers that carry a usable polarity (Yes or No).
    pub fn is_definite(self) -> bool {
        matches!(self, Self::Yes | Self::No)
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Maybe => "maybe",
            Self::Unknown => "unknown",
            Self::Unclassified => "unclassified",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_yes_variants() {
        assert_eq!(Answer::classify("Yes"), Answer::Yes);
        assert_eq!(Answer::classify("  yes  "), Answer::Yes);
        assert_eq!(Answer::classify("yep, definitely"), Answer::Yes);
        assert_eq!(Answer::classify("yeah I think so"), Answer::Yes);
        assert_eq!(Answer::classify("y"), Answer::Yes);
    }

    #[test]
    fn test_classify_no_variants() {
        assert_eq!(Answer::classify("No"), Answer::No);
        assert_eq!(Answer::classify("nope"), Answer::No);
        assert_eq!(Answer::classify("n"), Answer::No);
        // Keyword quirk: leading 'n' wins before the Maybe table runs.
        assert_eq!(Answer::classify("not sure"), Answer::No);
    }

    #[test]
    fn test_classify_maybe_variants() {
        assert_eq!(Answer::classify("maybe?"), Answer::Maybe);
        assert_eq!(Answer::classify("sometimes"), Answer::Maybe);
        assert_eq!(Answer::classify("it depends on who you ask"), Answer::Maybe);
    }

    #[test]
    fn test_classify_unknown_variants() {
        assert_eq!(Answer::classify("I don't know"), Answer::Unknown);
        assert_eq!(Answer::classify("dont know really"), Answer::Unknown);
        assert_eq!(Answer::classify("unknown"), Answer::Unknown);
    }

    #[test]
    fn test_classify_unclassified() {
        assert_eq!(Answer::classify(""), Answer::Unclassified);
        assert_eq!(Answer::classify("ask me later"), Answer::Unclassified);
        assert_eq!(Answer::classify("what a strange question"), Answer::Unclassified);
    }
}
