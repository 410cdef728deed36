//! Move representation, placement legality, and legal-move enumeration.
//!
//! This module defines a compact `Move` type plus the pure rule predicates
//! (`can_place_on_column`, `can_move_to_foundation`) and a generator that
//! lists every currently legal move, partitioned by kind. Nothing here
//! mutates a tableau; execution lives in `crate::game`.

use crate::card::{Card, Rank, Suit, is_one_lower_opposite_color};
use crate::tableau::{NUM_COLS, Tableau};

/// Representation of the different move types in Klondike.
///
/// Column indices are 0-based internally but usually printed as 1-based
/// when shown to a human. `start` in `TableauToTableau` indexes into the
/// source column's *face-up run* (0 = bottom of the visible run); the
/// move takes that card and everything stacked on top of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    /// Draw one card from the stock to the waste, recycling the waste
    /// back into the stock first if the stock is empty.
    Draw,

    /// Move the top card of the waste onto a tableau column.
    WasteToTableau { dst_col: u8 },

    /// Move the top card of the waste onto its suit's foundation.
    WasteToFoundation,

    /// Move the top face-up card of a column onto its suit's foundation.
    TableauToFoundation { src_col: u8 },

    /// Move the face-up run starting at `start` from one column to another.
    TableauToTableau { src_col: u8, dst_col: u8, start: u8 },

    /// Move the top card of a foundation back onto a tableau column.
    FoundationToTableau { suit: Suit, dst_col: u8 },
}

impl Move {
    /// Render a move as a human-readable string, using the tableau to
    /// name the cards involved.
    pub fn describe(&self, tab: &Tableau) -> String {
        match *self {
            Move::Draw => "Draw from stock".to_string(),

            Move::WasteToTableau { dst_col } => {
                let d = dst_col as usize;
                match tab.waste.top() {
                    Some(card) => format!("Waste: {} -> Column {}", card.short_str(), d + 1),
                    None => format!("Waste (empty) -> Column {}", d + 1),
                }
            }

            Move::WasteToFoundation => match tab.waste.top() {
                Some(card) => format!(
                    "Waste: {} -> Foundation({:?})",
                    card.short_str(),
                    card.suit()
                ),
                None => "Waste (empty) -> Foundation".to_string(),
            },

            Move::TableauToFoundation { src_col } => {
                let s = src_col as usize;
                match tab.columns[s].top_face_up() {
                    Some(card) => format!(
                        "Column {}: {} -> Foundation({:?})",
                        s + 1,
                        card.short_str(),
                        card.suit()
                    ),
                    None => format!("Column {} (no face-up card) -> Foundation", s + 1),
                }
            }

            Move::TableauToTableau {
                src_col,
                dst_col,
                start,
            } => {
                let s = src_col as usize;
                let d = dst_col as usize;
                let run = tab.columns[s].face_up();
                let start = start as usize;
                if start < run.len() {
                    let run_bottom = run[start];
                    let run_top = run[run.len() - 1];
                    if start + 1 == run.len() {
                        format!(
                            "Column {}: {} -> Column {}",
                            s + 1,
                            run_bottom.short_str(),
                            d + 1
                        )
                    } else {
                        format!(
                            "Column {}: {}..{} -> Column {}",
                            s + 1,
                            run_bottom.short_str(),
                            run_top.short_str(),
                            d + 1
                        )
                    }
                } else {
                    format!("Column {} (run {}) -> Column {}", s + 1, start, d + 1)
                }
            }

            Move::FoundationToTableau { suit, dst_col } => {
                let d = dst_col as usize;
                match tab.foundation_top(suit) {
                    Some(card) => format!(
                        "Foundation({suit:?}): {} -> Column {}",
                        card.short_str(),
                        d + 1
                    ),
                    None => format!("Foundation({suit:?}) (empty) -> Column {}", d + 1),
                }
            }
        }
    }
}

/// True if `card` may be placed on top of column `dst_col`.
///
/// In Klondike this requires either:
///   - the column's face-up top exists, is one rank above `card`, and has
///     the opposite color, or
///   - the column is completely empty (no hidden cards either) and `card`
///     is a King.
///
/// An out-of-range index is simply not a legal placement.
pub fn can_place_on_column(tab: &Tableau, card: Card, dst_col: usize) -> bool {
    if dst_col >= NUM_COLS {
        return false;
    }
    let col = &tab.columns[dst_col];
    match col.top_face_up() {
        Some(top) => is_one_lower_opposite_color(card, top),
        None => col.is_empty() && card.rank() == Rank::King,
    }
}

/// True if `card` may be placed on its suit's foundation: an Ace on an
/// empty foundation, otherwise exactly one rank above the current top.
pub fn can_move_to_foundation(tab: &Tableau, card: Card) -> bool {
    let count = tab.foundations[card.suit() as usize];
    card.rank_number() == count + 1
}

/// All legal moves in the current state, partitioned by move kind.
///
/// The partition mirrors how callers consume moves: the bot weights each
/// kind differently, and the console groups them for display. `flatten`
/// gives the combined list when order across kinds does not matter.
#[derive(Clone, Debug, Default)]
pub struct LegalMoves {
    pub draw: Option<Move>,
    pub waste_to_tableau: Vec<Move>,
    pub waste_to_foundation: Option<Move>,
    pub tableau_to_foundation: Vec<Move>,
    pub tableau_to_tableau: Vec<Move>,
    pub foundation_to_tableau: Vec<Move>,
}

impl LegalMoves {
    /// Total number of legal moves across all kinds.
    pub fn len(&self) -> usize {
        usize::from(self.draw.is_some())
            + self.waste_to_tableau.len()
            + usize::from(self.waste_to_foundation.is_some())
            + self.tableau_to_foundation.len()
            + self.tableau_to_tableau.len()
            + self.foundation_to_tableau.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every legal move in one flat list, foundation moves first.
    pub fn flatten(&self) -> Vec<Move> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.waste_to_foundation);
        out.extend_from_slice(&self.tableau_to_foundation);
        out.extend_from_slice(&self.tableau_to_tableau);
        out.extend_from_slice(&self.waste_to_tableau);
        out.extend_from_slice(&self.foundation_to_tableau);
        out.extend(self.draw);
        out
    }
}

/// Generate all legal moves from the given tableau.
///
/// This is a pure, side-effect-free scan; it must be re-run after every
/// mutation. The rule set:
///   - Draw whenever the stock or waste is non-empty.
///   - Waste -> Column / Waste -> Foundation for the waste top card.
///   - Column -> Foundation for each column's face-up top card.
///   - Column -> Column for *every* face-up starting position against
///     every other column. Runs are trusted from placement history and
///     not re-validated; only the placement of the run's bottom card is
///     checked.
///   - Foundation -> Column for each non-empty foundation's top card.
pub fn generate_legal_moves(tab: &Tableau) -> LegalMoves {
    let mut moves = LegalMoves::default();

    if !tab.stock.is_empty() || !tab.waste.is_empty() {
        moves.draw = Some(Move::Draw);
    }

    if let Some(card) = tab.waste.top() {
        for dst_col in 0..NUM_COLS {
            if can_place_on_column(tab, card, dst_col) {
                moves.waste_to_tableau.push(Move::WasteToTableau {
                    dst_col: dst_col as u8,
                });
            }
        }
        if can_move_to_foundation(tab, card) {
            moves.waste_to_foundation = Some(Move::WasteToFoundation);
        }
    }

    for src_col in 0..NUM_COLS {
        if let Some(card) = tab.columns[src_col].top_face_up()
            && can_move_to_foundation(tab, card)
        {
            moves.tableau_to_foundation.push(Move::TableauToFoundation {
                src_col: src_col as u8,
            });
        }
    }

    for src_col in 0..NUM_COLS {
        let run = tab.columns[src_col].face_up();
        for (start, &card) in run.iter().enumerate() {
            for dst_col in 0..NUM_COLS {
                if dst_col == src_col {
                    continue;
                }
                if can_place_on_column(tab, card, dst_col) {
                    moves.tableau_to_tableau.push(Move::TableauToTableau {
                        src_col: src_col as u8,
                        dst_col: dst_col as u8,
                        start: start as u8,
                    });
                }
            }
        }
    }

    for &suit in Suit::ALL.iter() {
        if let Some(card) = tab.foundation_top(suit) {
            for dst_col in 0..NUM_COLS {
                if can_place_on_column(tab, card, dst_col) {
                    moves.foundation_to_tableau.push(Move::FoundationToTableau {
                        suit,
                        dst_col: dst_col as u8,
                    });
                }
            }
        }
    }

    moves
}
