//! Knowledge state - classified facts and deduced consequences.
//!
//! Rebuilt fresh from the full transcript on every turn: stateless,
//! idempotent, no incremental mutation across turns. Inference rules
//! are purely additive; a later rule never retracts an earlier
//! predicate, so contradictory answers leave contradictory predicates
//! in place. That is a documented simplification, kept for parity.

use std::collections::BTreeSet;

use quin_common::{Answer, Fact, QaTurn};
use tracing::debug;

use crate::registry::CategoryPack;
use crate::similarity::SimilarityDetector;

/// Logical knowledge derived from one transcript snapshot.
///
/// Buckets hold normalized question keys; `deduced_facts` holds atomic
/// predicates like `is_animal` or `not_bird` produced by the category's
/// inference rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeState {
    pub confirmed_yes: BTreeSet<String>,
    pub confirmed_no: BTreeSet<String>,
    pub uncertain: BTreeSet<String>,
    pub unknown: BTreeSet<String>,
    pub deduced_facts: BTreeSet<String>,
    /// Classified transcript, ascending question index.
    pub facts: Vec<Fact>,
}

/// Build the knowledge state for a transcript snapshot.
///
/// Iterates turns in ascending 1-based index order, classifies each
/// answer, buckets the normalized question text, and applies the pack's
/// inference rules to Yes/No facts. Unclassified answers are dropped
/// from every bucket - accepted information loss, not an error.
pub fn build_knowledge_state(history: &[QaTurn], pack: &CategoryPack) -> KnowledgeState {
    let mut state = KnowledgeState::default();

    for (i, turn) in history.iter().enumerate() {
        let answer = Answer::classify(&turn.answer);
        let key = SimilarityDetector::normalize(&turn.question);

        state.facts.push(Fact {
            question_index: i + 1,
            question_text: turn.question.clone(),
            answer,
        });

        match answer {
            Answer::Yes => {
                state.confirmed_yes.insert(key);
            }
            Answer::No => {
                state.confirmed_no.insert(key);
            }
            Answer::Maybe => {
                state.uncertain.insert(key);
            }
            Answer::Unknown => {
                state.unknown.insert(key);
            }
            Answer::Unclassified => continue,
        }

        if answer.is_definite() {
            apply_inference_rules(&mut state, &turn.question, answer, pack);
        }
    }

    state
}

fn apply_inference_rules(
    state: &mut KnowledgeState,
    question: &str,
    answer: Answer,
    pack: &CategoryPack,
) {
    let q = question.to_lowercase();
    for rule in &pack.inference_rules {
        if rule.on != answer {
            continue;
        }
        if rule.keywords.iter().any(|k| q.contains(k.as_str())) {
            for predicate in &rule.predicates {
                if state.deduced_facts.insert(predicate.clone()) {
                    debug!("Knowledge: deduced '{}' from '{}'", predicate, question);
                }
            }
        }
    }
}

/// Keyword-containment redundancy check.
///
/// A candidate is redundant when one of its topical tokens already
/// appears in a deduced predicate or in a confirmed fact key. Heuristic,
/// not logical inference: false negatives are acceptable, false
/// positives should be rare because tokens shorter than three
/// characters are ignored.
pub fn is_question_redundant(candidate: &str, state: &KnowledgeState) -> bool {
    let normalized = SimilarityDetector::normalize(candidate);
    let tokens = SimilarityDetector::content_tokens(&normalized);

    for token in &tokens {
        if state.deduced_facts.iter().any(|p| p.contains(token.as_str())) {
            return true;
        }
        let confirmed = state.confirmed_yes.iter().chain(state.confirmed_no.iter());
        for key in confirmed {
            if key.split_whitespace().any(|w| w == token) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CategoryRegistry;

    fn animals_state(history: &[QaTurn]) -> KnowledgeState {
        let registry = CategoryRegistry::builtin();
        build_knowledge_state(history, registry.pack("animals"))
    }

    #[test]
    fn test_buckets_by_answer() {
        let history = vec![
            QaTurn::new("Is it a mammal?", "yes"),
            QaTurn::new("Can it fly?", "no"),
            QaTurn::new("Is it dangerous?", "maybe"),
            QaTurn::new("Is it nocturnal?", "I don't know"),
            QaTurn::new("Is it popular?", "hard to say"),
        ];
        let state = animals_state(&history);

        assert!(state.confirmed_yes.contains("mammal"));
        assert!(state.confirmed_no.contains("fly"));
        assert!(state.uncertain.contains("dangerous"));
        assert!(state.unknown.contains("nocturnal"));
        // Unclassified text lands in no bucket at all.
        let total = state.confirmed_yes.len()
            + state.confirmed_no.len()
            + state.uncertain.len()
            + state.unknown.len();
        assert_eq!(total, 4);
        assert_eq!(state.facts.len(), 5);
    }

    #[test]
    fn test_mammal_yes_derives_class_predicates() {
        let state = animals_state(&[QaTurn::new("Is it a mammal?", "Yes")]);
        for predicate in ["is_animal", "is_living", "not_bird", "not_reptile", "not_fish"] {
            assert!(state.deduced_facts.contains(predicate), "missing {predicate}");
        }
    }

    #[test]
    fn test_rules_are_additive_never_retracting() {
        // Contradictory transcript: both predicate sets stay.
        let state = animals_state(&[
            QaTurn::new("Is it a mammal?", "yes"),
            QaTurn::new("Is it a bird?", "yes"),
        ]);
        assert!(state.deduced_facts.contains("not_bird"));
        assert!(state.deduced_facts.contains("is_bird"));
    }

    #[test]
    fn test_redundancy_against_deduced_facts() {
        let state = animals_state(&[QaTurn::new("Is it a mammal?", "Yes")]);
        assert!(is_question_redundant("Is it a bird?", &state));
        assert!(is_question_redundant("Is it a reptile?", &state));
        assert!(!is_question_redundant("Does it live in water?", &state));
    }

    #[test]
    fn test_redundancy_against_confirmed_keys() {
        let state = animals_state(&[QaTurn::new("Can it fly?", "no")]);
        assert!(is_question_redundant("Can it fly at night?", &state));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let history = vec![
            QaTurn::new("Is it a mammal?", "yes"),
            QaTurn::new("Can it fly?", "no"),
        ];
        assert_eq!(animals_state(&history), animals_state(&history));
    }
}
