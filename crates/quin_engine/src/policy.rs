//! Guess policy - when to stop asking and start guessing.
//!
//! A two-state machine re-evaluated every turn from the current
//! possibility space and question count; no hidden history. An empty
//! space never triggers a guess: that is over-elimination, recovered
//! through the generator's fallback path instead.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::possibility::PossibilitySpace;
use crate::registry::{EntityKind, GuessThresholds};

/// Minimum top-candidate confidence to name it outright when more than
/// one item remains.
pub const GUESS_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Remaining-count ceiling for the forced late-game guess.
const LATE_GAME_MAX_REMAINING: usize = 5;

/// Engine phase for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Questioning,
    Guessing,
}

/// Decide the phase for this turn. Rules run in order; first hit wins.
pub fn evaluate_phase(
    space: &PossibilitySpace,
    questions_asked: usize,
    thresholds: &GuessThresholds,
) -> Phase {
    let remaining = space.remaining.len();

    if remaining == 1 {
        return Phase::Guessing;
    }
    // Over-eliminated: never guess blindly at nothing.
    if remaining == 0 {
        return Phase::Questioning;
    }

    if remaining <= thresholds.max_remaining && questions_asked >= thresholds.min_questions {
        info!(
            "Policy: guessing ({} remaining after {} questions)",
            remaining, questions_asked
        );
        return Phase::Guessing;
    }
    if questions_asked >= thresholds.late_game_threshold && remaining <= LATE_GAME_MAX_REMAINING {
        info!(
            "Policy: forced late-game guess ({} remaining after {} questions)",
            remaining, questions_asked
        );
        return Phase::Guessing;
    }

    Phase::Questioning
}

/// Build the guess text for the Guessing phase.
///
/// Names the top-confidence candidate when it clears the threshold or
/// is the only plausible item. Person categories keep the catalog
/// casing verbatim; everything else is lowercased. Returns None when
/// the space is empty or the leader is too weak to name - the caller
/// falls back to an exploratory question instead.
pub fn build_guess(space: &PossibilitySpace, kind: EntityKind) -> Option<String> {
    let ranked = space.ranked_remaining();
    let (top, confidence) = ranked.first()?;

    if ranked.len() > 1 && *confidence <= GUESS_CONFIDENCE_THRESHOLD {
        return None;
    }

    let name = match kind {
        EntityKind::Person => top.to_string(),
        EntityKind::Animal | EntityKind::Object | EntityKind::Generic => top.to_lowercase(),
    };
    Some(format!("Is it {}?", name))
}
