//! Import explicit deck permutations from bracketed integer lists.
//!
//! The CLI accepts `--deck=[51, 32, 3, ...]` so that a specific deal can
//! be replayed exactly (e.g. one logged from an earlier run). Each integer
//! is a `Card::index()` in 0..=51, in dealing order, and the list must be
//! a complete permutation of the deck.

use crate::card::{CARDS_PER_DECK, Card};

const DECK_LEN: usize = CARDS_PER_DECK as usize;

/// Parse a single bracketed integer list (e.g. "[1, 2, 3]") into a deck.
///
/// The list must contain exactly 52 integers, each in 0..=51, with no
/// duplicates. Whitespace and trailing commas are tolerated.
pub fn parse_bracketed_deck_list(s: &str) -> Result<[Card; DECK_LEN], String> {
    let open = s.find('[').ok_or_else(|| "missing '['".to_string())?;
    let close = s.rfind(']').ok_or_else(|| "missing ']'".to_string())?;
    if close <= open {
        return Err("malformed [...] list".to_string());
    }

    let inner = &s[open + 1..close];
    let mut nums: Vec<u8> = Vec::with_capacity(DECK_LEN);

    for part in inner.split(',') {
        let t = part.trim();
        if t.is_empty() {
            continue;
        }
        let v: u8 = t
            .parse::<u8>()
            .map_err(|_| format!("could not parse '{t}' as u8"))?;
        nums.push(v);
    }

    if nums.len() != DECK_LEN {
        return Err(format!(
            "deck list must have {} numbers, got {}",
            DECK_LEN,
            nums.len()
        ));
    }

    // Validate range + permutation.
    let mut seen = [false; DECK_LEN];
    for &v in &nums {
        if v as usize >= DECK_LEN {
            return Err(format!("card index {v} out of range 0..=51"));
        }
        if seen[v as usize] {
            return Err(format!("duplicate card index {v}"));
        }
        seen[v as usize] = true;
    }

    let mut deck = [Card(0); DECK_LEN];
    for (i, &v) in nums.iter().enumerate() {
        deck[i] = Card(v);
    }
    Ok(deck)
}
