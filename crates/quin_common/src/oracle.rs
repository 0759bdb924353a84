//! Optional external semantic-similarity oracle contract.
//!
//! The engine's local detector is a bounded lexical heuristic; a
//! deployment may plug in an LLM-backed oracle for richer judgments.
//! The oracle is advisory only: any failure must degrade to the local
//! heuristic and must never propagate as fatal. Implementations own
//! their timeout; the engine calls `check` at most once per candidate.

use serde::{Deserialize, Serialize};

/// Oracle errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum OracleError {
    #[error("oracle is disabled in configuration")]
    Disabled,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("oracle returned empty verdict")]
    EmptyVerdict,
}

/// Rich verdict from the oracle variant of the similarity check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleVerdict {
    pub is_similar: bool,
    /// Heuristic confidence in [0.0, 1.0]; not a calibrated probability.
    pub confidence: f32,
    pub reasoning: String,
    pub suggested_alternative: Option<String>,
}

/// Semantic-similarity oracle trait
pub trait SimilarityOracle: Send + Sync {
    /// Judge whether `candidate` re-asks anything in `previous`.
    fn check(
        &self,
        candidate: &str,
        previous: &[String],
        category: &str,
    ) -> Result<OracleVerdict, OracleError>;
}
