//! Weighted random move selection for autoplay.
//!
//! The bot is deliberately simple: it never searches ahead. It takes the
//! flat list of legal moves and draws one at random, biased by move kind
//! so that foundation plays dominate, shuffling-style moves are common,
//! and drawing is the fallback. The engine's softlock detector is what
//! keeps this policy from looping forever.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::moves::Move;

/// Relative selection weight per move kind.
///
/// Higher means preferred. The defaults order the kinds by how directly
/// they advance the game: foundation plays first, then tableau shuffling,
/// then surfacing waste cards, with foundation retreats and drawing last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveWeights {
    pub waste_to_foundation: u32,
    pub tableau_to_foundation: u32,
    pub tableau_to_tableau: u32,
    pub waste_to_tableau: u32,
    pub foundation_to_tableau: u32,
    pub draw: u32,
}

impl Default for MoveWeights {
    fn default() -> Self {
        MoveWeights {
            waste_to_foundation: 100,
            tableau_to_foundation: 100,
            tableau_to_tableau: 70,
            waste_to_tableau: 60,
            foundation_to_tableau: 50,
            draw: 40,
        }
    }
}

impl MoveWeights {
    /// The weight this policy assigns to a specific move.
    pub fn weight(&self, mv: &Move) -> u32 {
        match mv {
            Move::Draw => self.draw,
            Move::WasteToTableau { .. } => self.waste_to_tableau,
            Move::WasteToFoundation => self.waste_to_foundation,
            Move::TableauToFoundation { .. } => self.tableau_to_foundation,
            Move::TableauToTableau { .. } => self.tableau_to_tableau,
            Move::FoundationToTableau { .. } => self.foundation_to_tableau,
        }
    }
}

/// Pick one move from the list, weighted by kind.
///
/// Returns `None` for an empty list. All default weights are positive, so
/// selection cannot fail for a non-empty list; a caller-supplied all-zero
/// weighting falls back to `None` as well.
pub fn choose_weighted_move<R: Rng + ?Sized>(
    moves: &[Move],
    weights: &MoveWeights,
    rng: &mut R,
) -> Option<Move> {
    if moves.is_empty() {
        return None;
    }
    moves
        .choose_weighted(rng, |mv| weights.weight(mv))
        .ok()
        .copied()
}
