//! Quin engine - question selection and knowledge-state tracking for a
//! "20 Questions"-style deduction game.
//!
//! Given a transcript of yes/no/maybe answers about a hidden target,
//! the engine rebuilds a logical knowledge state, estimates which
//! candidates remain plausible, ranks candidate next questions by a
//! split-entropy heuristic, rejects questions that re-ask anything
//! already covered, and decides when to stop asking and start guessing.
//!
//! The whole engine is a pure, synchronous function of
//! `(category, transcript, candidate items)`: no I/O, no state carried
//! between turns. The only optional suspension point is the external
//! [`SimilarityOracle`](quin_common::SimilarityOracle), which degrades
//! to the local heuristic on any failure.

pub mod constraints;
pub mod engine;
pub mod generator;
pub mod knowledge;
pub mod policy;
pub mod possibility;
pub mod registry;
pub mod similarity;

pub use engine::{ConversationAnalysis, Engine, FactSummary, Insights};
pub use knowledge::{build_knowledge_state, is_question_redundant, KnowledgeState};
pub use policy::{evaluate_phase, Phase};
pub use possibility::{build_possibility_space, PossibilitySpace};
pub use registry::{CategoryPack, CategoryRegistry, EntityKind, GuessThresholds, RegistryError};
pub use similarity::SimilarityDetector;
