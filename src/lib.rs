pub mod bot;
pub mod card;
pub mod decks;
pub mod display;
pub mod game;
pub mod moves;
pub mod progress;
pub mod stats;
pub mod tableau;

use std::env;
use std::io::{self, BufRead, Write};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use crate::bot::{MoveWeights, choose_weighted_move};
use crate::card::{CARDS_PER_DECK, Card, shuffled_deck, shuffled_deck_from_seed};
use crate::display::print_tableau;
use crate::game::GameState;
use crate::stats::{GameResult, Stats};

/// Per-game cap on operations, so a misbehaving policy cannot spin
/// forever even if the softlock heuristic never trips.
const DEFAULT_MAX_MOVES: u32 = 2_000;

/// How the driver obtains the deal for each game.
enum DeckSource {
    Random,
    Seeded(u64),
    Explicit([Card; CARDS_PER_DECK as usize]),
}

impl DeckSource {
    /// Deck for the `game_index`-th game of this run. Seeded runs space
    /// the games out deterministically so a batch is replayable.
    fn deck(&self, game_index: u64) -> [Card; CARDS_PER_DECK as usize] {
        match self {
            DeckSource::Random => shuffled_deck(),
            DeckSource::Seeded(seed) => shuffled_deck_from_seed(seed.wrapping_add(game_index)),
            DeckSource::Explicit(deck) => *deck,
        }
    }
}

/// Entry point for the `klondike_engine` binary.
///
/// Command-line surface:
///   * `--seed=<u64>`   → deterministic deal (and per-game seeds in batch mode)
///   * `--deck=[..]`    → explicit 52-card permutation (see `decks`)
///   * `--manual`       → interactive move selection instead of the bot
///   * `--games=<n>`    → play n bot games and print aggregate stats
///   * `--max-moves=<n>`→ per-game operation cap (default 2000)
///
/// Example:
///   cargo run -- --seed=12345
///   cargo run -- --games=100 --seed=1
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut source = DeckSource::Random;
    let mut manual = false;
    let mut games: u64 = 1;
    let mut max_moves: u32 = DEFAULT_MAX_MOVES;

    // Very small hand-rolled argument parser.
    for arg in env::args().skip(1) {
        if arg == "--manual" {
            manual = true;
        } else if let Some(rest) = arg.strip_prefix("--seed=") {
            match rest.parse::<u64>() {
                Ok(v) => source = DeckSource::Seeded(v),
                Err(_) => eprintln!("Warning: could not parse seed from '{rest}'; ignoring"),
            }
        } else if let Some(rest) = arg.strip_prefix("--deck=") {
            match decks::parse_bracketed_deck_list(rest) {
                Ok(deck) => source = DeckSource::Explicit(deck),
                Err(e) => eprintln!("Warning: bad --deck value ({e}); ignoring"),
            }
        } else if let Some(rest) = arg.strip_prefix("--games=") {
            match rest.parse::<u64>() {
                Ok(v) if v > 0 => games = v,
                _ => eprintln!("Warning: could not parse game count from '{rest}'; ignoring"),
            }
        } else if let Some(rest) = arg.strip_prefix("--max-moves=") {
            match rest.parse::<u32>() {
                Ok(v) if v > 0 => max_moves = v,
                _ => eprintln!("Warning: could not parse move cap from '{rest}'; ignoring"),
            }
        } else {
            eprintln!(
                "Warning: unrecognized argument '{arg}'; supported: \
                 --seed=<u64>, --deck=[..], --manual, --games=<n>, --max-moves=<n>"
            );
        }
    }

    if games > 1 {
        run_batch(&source, games, max_moves);
        return;
    }

    let mut game = GameState::new(source.deck(0));
    if manual {
        play_interactive(&mut game);
    } else {
        let result = play_bot_game(&mut game, max_moves, true);
        match result {
            GameResult::Won => println!("Bot won in {} moves.", game.moves_played()),
            GameResult::Softlocked => println!(
                "Softlock detected after {} moves; no real progress can be made.",
                game.moves_played()
            ),
            GameResult::Abandoned => println!(
                "Game abandoned after {} moves (no legal moves or cap reached).",
                game.moves_played()
            ),
        }
    }
}

/// Play `games` bot games and print aggregate statistics.
fn run_batch(source: &DeckSource, games: u64, max_moves: u32) {
    let mut stats = Stats::default();

    for i in 0..games {
        let mut game = GameState::new(source.deck(i));
        let result = play_bot_game(&mut game, max_moves, false);
        stats.record(result);
    }

    println!("Games played: {}", stats.games_played);
    println!("  won:        {}", stats.games_won);
    println!("  softlocked: {}", stats.games_softlocked);
    println!("  abandoned:  {}", stats.games_abandoned);
    println!("Win rate: {:.1}%", stats.win_rate() * 100.0);
}

/// Drive one game with the weighted random bot.
///
/// When `verbose`, prints the tableau and the chosen move each turn.
fn play_bot_game(game: &mut GameState, max_moves: u32, verbose: bool) -> GameResult {
    let weights = MoveWeights::default();
    let mut rng = StdRng::from_entropy();

    loop {
        if verbose {
            println!();
            print_tableau(game.tableau());
        }

        if game.is_won() {
            return GameResult::Won;
        }
        if game.is_softlocked() {
            return GameResult::Softlocked;
        }
        if game.moves_played() >= max_moves {
            return GameResult::Abandoned;
        }

        let moves = game.legal_moves().flatten();
        let Some(mv) = choose_weighted_move(&moves, &weights, &mut rng) else {
            return GameResult::Abandoned;
        };

        if verbose {
            println!("Bot chooses: {}", mv.describe(game.tableau()));
        }
        game.apply(mv);
    }
}

/// Interactive console loop: show the position and the numbered legal
/// moves, read a selection from stdin, apply it. `q` quits.
fn play_interactive(game: &mut GameState) {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!();
        print_tableau(game.tableau());

        if game.is_won() {
            println!("You won!");
            return;
        }
        if game.is_softlocked() {
            println!("Softlock detected; no real progress can be made.");
            return;
        }

        let moves = game.legal_moves().flatten();
        if moves.is_empty() {
            println!("No more legal moves. Game over.");
            return;
        }

        println!("Legal moves:");
        for (i, mv) in moves.iter().enumerate() {
            println!("  {:2}: {}", i, mv.describe(game.tableau()));
        }

        print!("Enter move number (q to quit): ");
        if io::stdout().flush().is_err() {
            return;
        }

        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => return, // EOF or read error: just stop.
        };
        let choice = line.trim();
        if choice.eq_ignore_ascii_case("q") {
            println!("Exiting game.");
            return;
        }

        match choice.parse::<usize>() {
            Ok(idx) if idx < moves.len() => {
                game.apply(moves[idx]);
            }
            _ => println!("Invalid choice. Try again."),
        }
    }
}
