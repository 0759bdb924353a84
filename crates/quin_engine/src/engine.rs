//! Engine facade - the two public operations and the analysis report.
//!
//! Both entry points are total functions of
//! `(category, transcript, candidate items)`: empty histories,
//! contradictory answers, all-unknown transcripts, unknown categories
//! and empty catalogs all degrade to something useful. No business
//! input is fatal.

use quin_common::{QaTurn, SimilarityOracle};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::generator::QuestionGenerator;
use crate::knowledge::{build_knowledge_state, is_question_redundant};
use crate::policy::{build_guess, evaluate_phase, Phase};
use crate::possibility::{build_possibility_space, PossibilitySpace};
use crate::registry::CategoryRegistry;
use crate::similarity::builtin_group_words;

/// How many top candidates the analysis report surfaces.
const TOP_CANDIDATE_COUNT: usize = 5;

/// Fact buckets from the knowledge state, as surfaced in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSummary {
    pub confirmed_yes: Vec<String>,
    pub confirmed_no: Vec<String>,
    pub uncertain_questions: Vec<String>,
    pub unknown_questions: Vec<String>,
}

/// Derived pointers for whoever phrases the next move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub remaining_count: usize,
    pub top_candidates: Vec<String>,
    /// Appropriate predicate domains the transcript has not probed yet.
    pub suggested_focus: Vec<String>,
}

/// Structured analysis of one conversation snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationAnalysis {
    pub possibility_space: PossibilitySpace,
    pub facts: FactSummary,
    pub question_count: usize,
    pub should_enter_guessing_phase: bool,
    pub insights: Insights,
}

/// Question-selection engine over an immutable category registry and
/// an optional external similarity oracle.
pub struct Engine {
    registry: CategoryRegistry,
    oracle: Option<Box<dyn SimilarityOracle>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with the built-in category registry and no oracle.
    pub fn new() -> Self {
        Self::with_registry(CategoryRegistry::builtin())
    }

    pub fn with_registry(registry: CategoryRegistry) -> Self {
        Self {
            registry,
            oracle: None,
        }
    }

    /// Attach an external semantic-similarity oracle. Advisory only:
    /// oracle failure always degrades to the local detector.
    pub fn with_oracle(mut self, oracle: Box<dyn SimilarityOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Produce the single output for this turn: either the best next
    /// question or, in the Guessing phase, a direct guess. Always ends
    /// in `?` and is never empty.
    pub fn generate_optimal_question<R: Rng>(
        &self,
        category: &str,
        history: &[QaTurn],
        items: &[String],
        rng: &mut R,
    ) -> String {
        let pack = self.registry.pack(category);
        let state = build_knowledge_state(history, pack);
        let space = build_possibility_space(category, &state, items);
        let phase = evaluate_phase(&space, history.len(), &pack.thresholds);

        if phase == Phase::Guessing {
            if let Some(guess) = build_guess(&space, pack.entity_kind) {
                info!("Engine: guessing '{}' for '{}'", guess, category);
                return guess;
            }
            // Guessing with nothing nameable: ask an exploratory
            // question instead of naming nothing.
        }

        let asked: Vec<String> = history.iter().map(|t| t.question.clone()).collect();
        let generator = QuestionGenerator::new(pack);
        generator.next_question(&asked, &state, &space, self.oracle.as_deref(), rng)
    }

    /// Structured report over the same snapshot the question path uses.
    /// Pure and idempotent: identical history yields an identical report.
    pub fn analyze_conversation_state(
        &self,
        category: &str,
        history: &[QaTurn],
        items: &[String],
    ) -> ConversationAnalysis {
        let pack = self.registry.pack(category);
        let state = build_knowledge_state(history, pack);
        let space = build_possibility_space(category, &state, items);
        let phase = evaluate_phase(&space, history.len(), &pack.thresholds);

        let facts = FactSummary {
            confirmed_yes: state.confirmed_yes.iter().cloned().collect(),
            confirmed_no: state.confirmed_no.iter().cloned().collect(),
            uncertain_questions: state.uncertain.iter().cloned().collect(),
            unknown_questions: state.unknown.iter().cloned().collect(),
        };

        let insights = Insights {
            remaining_count: space.remaining.len(),
            top_candidates: space.top_candidates(TOP_CANDIDATE_COUNT),
            suggested_focus: suggested_focus(pack, history),
        };

        ConversationAnalysis {
            facts,
            question_count: history.len(),
            should_enter_guessing_phase: phase == Phase::Guessing,
            insights,
            possibility_space: space,
        }
    }

    /// Sanity-check an externally recommended question: applicable to
    /// the category, not similar to anything asked, not redundant with
    /// what is already known.
    pub fn vet_external_question(&self, text: &str, category: &str, history: &[QaTurn]) -> bool {
        let pack = self.registry.pack(category);
        let state = build_knowledge_state(history, pack);
        let generator = QuestionGenerator::new(pack);

        if !generator.validator().validate(text) {
            return false;
        }
        let asked: Vec<String> = history.iter().map(|t| t.question.clone()).collect();
        if generator
            .detector()
            .similar_to_any(text, asked.iter().map(|s| s.as_str()))
            .is_similar
        {
            return false;
        }
        !is_question_redundant(text, &state)
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }
}

/// Appropriate domains the transcript has not touched yet. A domain
/// counts as probed when any asked question uses the domain's name or
/// a word from the built-in cluster of the same name.
fn suggested_focus(pack: &crate::registry::CategoryPack, history: &[QaTurn]) -> Vec<String> {
    use crate::similarity::SimilarityDetector;

    let asked_tokens: Vec<String> = history
        .iter()
        .flat_map(|t| {
            SimilarityDetector::content_tokens(&SimilarityDetector::normalize(&t.question))
        })
        .collect();

    pack.appropriate_domains
        .iter()
        .filter(|domain| {
            let cluster = builtin_group_words(domain).unwrap_or(&[]);
            !asked_tokens
                .iter()
                .any(|t| t == *domain || cluster.contains(&t.as_str()))
        })
        .cloned()
        .collect()
}
