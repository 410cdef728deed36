//! Progress tracking and softlock detection.
//!
//! "Progress" means a move that reveals a new face-up card or lands a card
//! on a foundation. The tracker counts operations since the last such move;
//! the detector keeps a rolling window of recent state snapshots and flags
//! a softlock once the game revisits a known position without having made
//! progress for a long stretch. The thresholds are policy, not law, so both
//! live in `SoftlockConfig`.

use std::collections::VecDeque;

use tracing::debug;

/// Counts operations since the last state improvement.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgressTracker {
    moves_since_progress: u32,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// An improving move happened; the counter starts over.
    pub fn record_progress(&mut self) {
        self.moves_since_progress = 0;
    }

    /// A completed or attempted move that improved nothing.
    pub fn record_stall(&mut self) {
        self.moves_since_progress = self.moves_since_progress.saturating_add(1);
    }

    pub fn moves_since_progress(&self) -> u32 {
        self.moves_since_progress
    }
}

/// Tunable thresholds for the softlock heuristic.
#[derive(Clone, Copy, Debug)]
pub struct SoftlockConfig {
    /// How many recent snapshots to remember.
    pub history_window: usize,
    /// How many non-improving moves must pile up before a revisited
    /// position counts as a softlock.
    pub stall_threshold: u32,
}

impl Default for SoftlockConfig {
    fn default() -> Self {
        SoftlockConfig {
            history_window: 20,
            stall_threshold: 50,
        }
    }
}

/// Rolling-window softlock detector.
///
/// Fed one snapshot hash per game operation via `observe`. A position
/// "recurs" when the snapshot was already somewhere in the window at the
/// time it was observed. This is a heuristic: it detects that no improving
/// move happened across a long window despite revisiting a prior
/// configuration, not that the position is provably dead.
#[derive(Clone, Debug)]
pub struct SoftlockDetector {
    config: SoftlockConfig,
    history: VecDeque<u64>,
    revisited: bool,
}

impl SoftlockDetector {
    pub fn new(config: SoftlockConfig) -> Self {
        SoftlockDetector {
            history: VecDeque::with_capacity(config.history_window),
            config,
            revisited: false,
        }
    }

    pub fn config(&self) -> SoftlockConfig {
        self.config
    }

    /// Record the state reached after an operation.
    ///
    /// Membership is checked before the snapshot is pushed, so a state only
    /// counts as revisited against genuinely earlier observations.
    pub fn observe(&mut self, snapshot: u64) {
        self.revisited = self.history.contains(&snapshot);
        if self.history.len() == self.config.history_window {
            self.history.pop_front();
        }
        self.history.push_back(snapshot);
    }

    /// True iff the most recently observed state had already appeared in
    /// the window and the stall counter has crossed the threshold.
    pub fn is_softlocked(&self, moves_since_progress: u32) -> bool {
        let locked = self.revisited && moves_since_progress >= self.config.stall_threshold;
        if locked {
            debug!(moves_since_progress, "softlock heuristic tripped");
        }
        locked
    }
}

impl Default for SoftlockDetector {
    fn default() -> Self {
        Self::new(SoftlockConfig::default())
    }
}
