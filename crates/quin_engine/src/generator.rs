//! Question generator - ranks a category's candidate pool and picks
//! the next question.
//!
//! Candidates are scored by a single-parameter split heuristic, then
//! filtered through three gates: similarity against the transcript,
//! redundancy against the knowledge state, and the category constraint
//! validator. When the whole pool is exhausted, templated fallback
//! questions are slot-filled from a seeded random source so behavior
//! stays reproducible under test.

use quin_common::SimilarityOracle;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::constraints::ConstraintValidator;
use crate::knowledge::{is_question_redundant, KnowledgeState};
use crate::possibility::PossibilitySpace;
use crate::registry::CategoryPack;
use crate::similarity::SimilarityDetector;

/// Emitted when even the fallback templates collide with the
/// transcript. The engine never returns an empty question.
pub const LAST_RESORT_QUESTION: &str =
    "Can you give me a hint about its most distinctive feature?";

/// Floor applied to both sides of the split before taking logs.
const SPLIT_FLOOR: f64 = 0.01;

/// Passes over the fallback templates before giving up. Each pass
/// re-rolls the slot values.
const FALLBACK_PASSES: usize = 2;

/// Split-based information score for a candidate question.
///
/// `|1 + p·log2(p) + q·log2(q)|` with `p = split_ratio`, `q = 1 - p`,
/// both floored at 0.01. This approximates narrowing from the single
/// split parameter; it is a relative ranking heuristic within one
/// category's pool, not entropy over the actual remaining items, and
/// it is kept verbatim for behavioral parity.
pub fn information_gain(remaining: usize, split_ratio: f64) -> f64 {
    if remaining <= 1 {
        return 0.0;
    }
    let p = split_ratio.max(SPLIT_FLOOR);
    let q = (1.0 - split_ratio).max(SPLIT_FLOOR);
    (1.0 + p * p.log2() + q * q.log2()).abs()
}

/// A pool entry that survived filtering, with its computed score.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub text: String,
    pub information_gain: f64,
    pub priority: i32,
}

/// Per-category question generator.
pub struct QuestionGenerator<'a> {
    pack: &'a CategoryPack,
    detector: SimilarityDetector,
    validator: ConstraintValidator,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(pack: &'a CategoryPack) -> Self {
        Self {
            pack,
            detector: SimilarityDetector::for_pack(pack),
            validator: ConstraintValidator::for_pack(pack),
        }
    }

    pub fn detector(&self) -> &SimilarityDetector {
        &self.detector
    }

    pub fn validator(&self) -> &ConstraintValidator {
        &self.validator
    }

    /// Pick the next question for this turn.
    ///
    /// Pool survivors are tried best-first; the optional oracle is
    /// consulted at most once per survivor and any oracle failure
    /// degrades to the local verdict. An exhausted pool falls through
    /// to templated fallbacks, then to the last-resort prompt.
    pub fn next_question<R: Rng>(
        &self,
        asked: &[String],
        state: &KnowledgeState,
        space: &PossibilitySpace,
        oracle: Option<&dyn SimilarityOracle>,
        rng: &mut R,
    ) -> String {
        let survivors = self.rank_pool(asked, state, space);

        for candidate in &survivors {
            if let Some(oracle) = oracle {
                match oracle.check(&candidate.text, asked, &self.pack.name) {
                    Ok(verdict) if verdict.is_similar => {
                        debug!(
                            "Generator: oracle flagged '{}' as similar ({})",
                            candidate.text, verdict.reasoning
                        );
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        // Local screens already passed; oracle is advisory.
                        warn!("Generator: oracle failed, using local verdict: {}", e);
                    }
                }
            }
            info!(
                "Generator: selected '{}' (gain {:.3}, priority {})",
                candidate.text, candidate.information_gain, candidate.priority
            );
            return candidate.text.clone();
        }

        self.fallback_question(asked, rng)
    }

    /// Filter and rank the pool: drop entries similar to any transcript
    /// question, redundant with the knowledge state, or rejected by the
    /// constraint validator; sort by gain, then priority, then stable
    /// pool order.
    pub fn rank_pool(
        &self,
        asked: &[String],
        state: &KnowledgeState,
        space: &PossibilitySpace,
    ) -> Vec<ScoredCandidate> {
        let mut survivors = Vec::new();

        for entry in &self.pack.pool {
            let verdict = self
                .detector
                .similar_to_any(&entry.text, asked.iter().map(|s| s.as_str()));
            if verdict.is_similar {
                debug!(
                    "Generator: '{}' similar to asked '{}'",
                    entry.text,
                    verdict.matched_against.as_deref().unwrap_or("")
                );
                continue;
            }
            if is_question_redundant(&entry.text, state) {
                debug!("Generator: '{}' redundant with knowledge state", entry.text);
                continue;
            }
            if !self.validator.validate(&entry.text) {
                continue;
            }

            survivors.push(ScoredCandidate {
                text: entry.text.clone(),
                information_gain: information_gain(space.remaining.len(), entry.split_ratio),
                priority: entry.priority,
            });
        }

        // Stable sort keeps pool order as the final tie-break.
        survivors.sort_by(|a, b| {
            b.information_gain
                .total_cmp(&a.information_gain)
                .then_with(|| b.priority.cmp(&a.priority))
        });
        survivors
    }

    /// Templated fallback: randomized slot-filling from the pack's
    /// fixed value lists, re-screened for similarity.
    pub fn fallback_question<R: Rng>(&self, asked: &[String], rng: &mut R) -> String {
        let mut order: Vec<usize> = (0..self.pack.fallback_templates.len()).collect();
        order.shuffle(rng);

        for _ in 0..FALLBACK_PASSES {
            for &i in &order {
                let template = &self.pack.fallback_templates[i];
                let values = match self.pack.slot_values.get(&template.slot) {
                    Some(v) if !v.is_empty() => v,
                    _ => continue,
                };
                let value = match values.choose(rng) {
                    Some(v) => v,
                    None => continue,
                };
                let filled = template
                    .text
                    .replace(&format!("{{{}}}", template.slot), value);

                if !self
                    .detector
                    .similar_to_any(&filled, asked.iter().map(|s| s.as_str()))
                    .is_similar
                {
                    info!("Generator: pool exhausted, fallback '{}'", filled);
                    return filled;
                }
            }
        }

        warn!("Generator: fallback templates exhausted, using last resort");
        LAST_RESORT_QUESTION.to_string()
    }
}
