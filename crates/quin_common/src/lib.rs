//! Quin Common - shared types for the question-selection engine.
//!
//! Holds the value objects exchanged between the engine and its
//! collaborators: answer classification, transcript turns, similarity
//! verdicts, and the optional external similarity-oracle contract.

pub mod answer;
pub mod oracle;
pub mod types;

pub use answer::Answer;
pub use oracle::{OracleError, OracleVerdict, SimilarityOracle};
pub use types::*;
