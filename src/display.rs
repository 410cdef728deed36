//! Human-readable rendering of Klondike tableaus.
//!
//! This module provides functions to render a `Tableau` as multi-line text
//! using the compact `Card` representation. Face-down cards are shown as
//! "XX" and face-up cards are shown with their `short_str()` rank/suit code.
//!
//! The intent is a stable, readable CLI representation for interactive
//! play and debugging. Everything here is strictly read-only over the
//! tableau; input parsing and move selection live in the crate's `run`.

use crate::card::{Card, Suit};
use crate::tableau::{NUM_COLS, Tableau};

/// Format a single card for display, either face-up or face-down.
///
/// - Face-down cards are rendered as `"XX"`.
/// - Face-up cards use `Card::short_str()` such as `"AH"`, `"7C"`, `"TD"`.
pub fn format_card_visible(card: Card, face_up: bool) -> String {
    if face_up {
        card.short_str()
    } else {
        "XX".to_string()
    }
}

/// Render only the foundation row.
///
/// One cell per suit in `Suit::ALL` order, showing the top card:
///   - Empty foundation: `[  ]`
///   - Non-empty: e.g. `[AS]`, `[7H]`, `[KD]`
pub fn render_foundations(tab: &Tableau) -> String {
    let mut s = String::new();
    s.push_str("Foundations: ");
    for &suit in Suit::ALL.iter() {
        match tab.foundation_top(suit) {
            None => s.push_str("[  ] "),
            Some(card) => {
                s.push('[');
                s.push_str(&card.short_str());
                s.push_str("] ");
            }
        }
    }
    s.trim_end().to_string()
}

/// Render the stock (face-down) and waste piles on a single line.
///
/// Stock is shown as a count of remaining face-down cards; waste shows
/// the top card if present plus the total waste size.
pub fn render_stock_and_waste(tab: &Tableau) -> String {
    let mut s = String::new();

    let stock_len = tab.stock.len();
    if stock_len == 0 {
        s.push_str("Stock: [empty]");
    } else {
        s.push_str(&format!("Stock: [{stock_len} cards]"));
    }

    s.push_str("    ");

    match tab.waste.top() {
        None => s.push_str("Waste: [empty]"),
        Some(top) => {
            s.push_str(&format!(
                "Waste: [{}] ({} cards)",
                top.short_str(),
                tab.waste.len()
            ));
        }
    }

    s
}

/// Render all tableau columns, one line per column, bottom to top.
///
/// Hidden cards come first as `XX`, then the face-up run; the last cell
/// on each line is the playable edge.
pub fn render_columns(tab: &Tableau) -> String {
    let mut s = String::new();
    s.push_str("Columns:\n");
    for col_idx in 0..NUM_COLS {
        let col = &tab.columns[col_idx];
        s.push_str(&format!("  C{}:", col_idx + 1));
        if col.is_empty() {
            s.push_str(" --");
        } else {
            for (i, &card) in col.cards().iter().enumerate() {
                let face_up = i >= col.num_face_down();
                s.push(' ');
                s.push_str(&format_card_visible(card, face_up));
            }
        }
        s.push('\n');
    }
    s
}

/// Render a full tableau (foundations, stock/waste, and columns) as a
/// multi-line string.
pub fn render_tableau(tab: &Tableau) -> String {
    let mut s = String::new();
    s.push_str(&render_foundations(tab));
    s.push('\n');
    s.push_str(&render_stock_and_waste(tab));
    s.push('\n');
    s.push_str(&render_columns(tab));
    s
}

/// Print a tableau to stdout using `render_tableau`.
pub fn print_tableau(tab: &Tableau) {
    println!("{}", render_tableau(tab));
}
