//! Value objects exchanged with the engine.
//!
//! All of these are recomputed per call; nothing here persists mutable
//! state between turns. The transcript itself is owned by an external
//! collaborator and only read here as an ordered snapshot.

use serde::{Deserialize, Serialize};

use crate::answer::Answer;

/// One question/answer turn from the conversation transcript.
/// Position in the slice is the 1-based question index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaTurn {
    pub question: String,
    pub answer: String,
}

impl QaTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A classified fact derived from one transcript turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// 1-based index of the question in the transcript.
    pub question_index: usize,
    pub question_text: String,
    pub answer: Answer,
}

/// Outcome of a local similarity check between two question strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityVerdict {
    pub is_similar: bool,
    /// The prior question the candidate collided with, if any.
    pub matched_against: Option<String>,
    /// Which pipeline stage flagged the match (exact, substring,
    /// token_overlap, semantic_group).
    pub reason: Option<String>,
}

impl SimilarityVerdict {
    pub fn distinct() -> Self {
        Self {
            is_similar: false,
            matched_against: None,
            reason: None,
        }
    }

    pub fn similar(matched_against: &str, reason: &str) -> Self {
        Self {
            is_similar: true,
            matched_against: Some(matched_against.to_string()),
            reason: Some(reason.to_string()),
        }
    }
}
