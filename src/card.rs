//! Card, Suit, Rank, and Color types for a standard 52-card deck.
//!
//! - `Card` is a compact 1-byte representation (0..=51).
//! - `Suit`, `Rank`, and `Color` give human-readable structure on top of that.
//! - Deck construction and shuffling live here too, since they only deal in
//!   permutations of the 52 distinct cards.

use core::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Number of suits in a standard deck.
pub const NUM_SUITS: u8 = 4;
/// Number of ranks in a standard deck.
pub const NUM_RANKS: u8 = 13;
/// Number of cards in a standard deck.
pub const CARDS_PER_DECK: u8 = NUM_SUITS * NUM_RANKS;

/// A playing card represented compactly as an index in 0..=51.
///
/// The mapping is:
/// ```text
/// index = suit as u8 * 13 + rank as u8
/// ```
/// where `rank` is 0=Ace, 1=Two, ..., 12=King.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Card(pub u8);

/// The four suits in a standard deck.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Suit {
    Spades = 0,
    Hearts = 1,
    Diamonds = 2,
    Clubs = 3,
}

/// The two card colors. Hearts and diamonds are red; spades and clubs black.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    Red,
    Black,
}

/// The thirteen ranks in a standard deck.
///
/// Note: Ace is treated as the lowest rank here (0), and you can use
/// `rank_number()` on `Card` to get 1..=13 as a convenience.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[repr(u8)]
pub enum Rank {
    Ace = 0,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King, // 12
}

impl Card {
    /// Create a new card from a suit and rank.
    ///
    /// This uses the mapping:
    /// ```text
    /// index = suit as u8 * 13 + rank as u8
    /// ```
    #[inline]
    pub fn new(suit: Suit, rank: Rank) -> Self {
        let s = suit as u8;
        let r = rank as u8;
        debug_assert!(s < NUM_SUITS && r < NUM_RANKS);
        Card(s * NUM_RANKS + r)
    }

    /// Create a card from a raw index in 0..=51.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `index >= 52`.
    #[inline]
    pub fn from_index(index: u8) -> Self {
        debug_assert!(index < CARDS_PER_DECK);
        Card(index)
    }

    /// Return the raw 0..=51 index of this card.
    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Return the suit of this card.
    #[inline]
    pub fn suit(self) -> Suit {
        Suit::from_u8(self.0 / NUM_RANKS)
    }

    /// Return the rank of this card.
    #[inline]
    pub fn rank(self) -> Rank {
        Rank::from_u8(self.0 % NUM_RANKS)
    }

    /// Rank number in 1..=13 (Ace=1, King=13).
    #[inline]
    pub fn rank_number(self) -> u8 {
        self.rank() as u8 + 1
    }

    /// The color of this card, derived from its suit.
    #[inline]
    pub fn color(self) -> Color {
        self.suit().color()
    }

    /// Short string like "AH", "7C", "TD", "KS".
    pub fn short_str(self) -> String {
        let r = match self.rank() {
            Rank::Ace => 'A',
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
        };
        let s = self.suit().short_char();
        format!("{r}{s}")
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_str())
    }
}

impl Suit {
    /// All suits in a fixed, reproducible order.
    ///
    /// This order also fixes the foundation indices: foundation `i` holds
    /// cards of `Suit::ALL[i]`.
    pub const ALL: [Suit; NUM_SUITS as usize] = [
        Suit::Spades,
        Suit::Hearts,
        Suit::Diamonds,
        Suit::Clubs,
    ];

    /// Construct a suit from a small integer 0..=3.
    ///
    /// # Panics
    ///
    /// Panics if `v >= 4`.
    #[inline]
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Suit::Spades,
            1 => Suit::Hearts,
            2 => Suit::Diamonds,
            3 => Suit::Clubs,
            _ => panic!("invalid suit: {v}"),
        }
    }

    /// The color of this suit.
    #[inline]
    pub const fn color(self) -> Color {
        match self {
            Suit::Hearts | Suit::Diamonds => Color::Red,
            Suit::Spades | Suit::Clubs => Color::Black,
        }
    }

    /// Single-character representation: 'S', 'H', 'D', or 'C'.
    #[inline]
    pub fn short_char(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
        }
    }
}

impl Rank {
    /// All ranks in a fixed, reproducible order (Ace..King).
    pub const ALL: [Rank; NUM_RANKS as usize] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Construct a rank from a small integer 0..=12.
    ///
    /// # Panics
    ///
    /// Panics if `v >= 13`.
    #[inline]
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Rank::Ace,
            1 => Rank::Two,
            2 => Rank::Three,
            3 => Rank::Four,
            4 => Rank::Five,
            5 => Rank::Six,
            6 => Rank::Seven,
            7 => Rank::Eight,
            8 => Rank::Nine,
            9 => Rank::Ten,
            10 => Rank::Jack,
            11 => Rank::Queen,
            12 => Rank::King,
            _ => panic!("invalid rank: {v}"),
        }
    }

    /// Rank number in 1..=13 (Ace=1, King=13).
    #[inline]
    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// Helper for tableau rules: can `upper` be placed on `lower`?
///
/// In Klondike, this is true if:
/// - `upper` is exactly one rank lower than `lower`, and
/// - `upper` is opposite color from `lower`.
#[inline]
pub fn is_one_lower_opposite_color(upper: Card, lower: Card) -> bool {
    upper.rank_number() + 1 == lower.rank_number() && upper.color() != lower.color()
}

/// Generate a standard 52-card deck in a fixed order.
///
/// Suits follow `Suit::ALL` order, and ranks follow `Rank::ALL` order.
pub fn standard_deck() -> [Card; CARDS_PER_DECK as usize] {
    let mut cards = [Card(0); CARDS_PER_DECK as usize];
    let mut i = 0usize;
    for &suit in Suit::ALL.iter() {
        for &rank in Rank::ALL.iter() {
            cards[i] = Card::new(suit, rank);
            i += 1;
        }
    }
    cards
}

/// Shuffle a deck in place with the given RNG.
///
/// This is the single shuffle point for the whole crate: a uniform random
/// permutation, with no cryptographic requirements.
pub fn shuffle_deck<R: Rng + ?Sized>(deck: &mut [Card; CARDS_PER_DECK as usize], rng: &mut R) {
    deck.shuffle(rng);
}

/// Return a deterministically shuffled standard deck given a 64-bit seed.
///
/// Useful for replaying a specific deal: the same seed always produces the
/// same permutation.
pub fn shuffled_deck_from_seed(seed: u64) -> [Card; CARDS_PER_DECK as usize] {
    let mut deck = standard_deck();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffle_deck(&mut deck, &mut rng);
    deck
}

/// Return a freshly shuffled standard deck using the thread-local RNG.
pub fn shuffled_deck() -> [Card; CARDS_PER_DECK as usize] {
    let mut deck = standard_deck();
    let mut rng = rand::thread_rng();
    shuffle_deck(&mut deck, &mut rng);
    deck
}
