//! Cooperative cancellation shared between the signal handler and the join stages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Records between two polls of the token in per-record stages
pub const DEFAULT_RECORD_BATCH: usize = 1000;

/// Keys between two polls of the token in the matching phase
pub const DEFAULT_KEY_BATCH: usize = 100;

/// Cloneable flag that asks running stages to stop at their next checkpoint
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Polls a token every `batch` ticks instead of on every record
#[derive(Debug)]
pub struct Checkpoint<'a> {
    token: &'a CancellationToken,
    batch: usize,
    ticks: usize,
}

impl<'a> Checkpoint<'a> {
    pub fn new(token: &'a CancellationToken, batch: usize) -> Self {
        Self {
            token,
            batch: batch.max(1),
            ticks: 0,
        }
    }

    /// Advance by one unit of work. Returns true when cancellation was observed.
    ///
    /// The very first tick polls, so an already-cancelled token stops a stage
    /// before it does any work.
    pub fn tick(&mut self) -> bool {
        let poll = self.ticks % self.batch == 0;
        self.ticks += 1;
        poll && self.token.is_cancelled()
    }
}

/// Result of a stage that may stop early. Both variants carry whatever the
/// stage accumulated; `Cancelled` data is a valid prefix of the full result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress<T> {
    Done(T),
    Cancelled(T),
}

impl<T> Progress<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Progress::Cancelled(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Progress::Done(value) | Progress::Cancelled(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_clear_and_clones_share_state() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());

        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_checkpoint_polls_once_per_batch() {
        let token = CancellationToken::new();
        let mut checkpoint = Checkpoint::new(&token, 3);

        assert!(!checkpoint.tick()); // tick 0 polls, token clear
        token.cancel();
        assert!(!checkpoint.tick()); // tick 1 does not poll
        assert!(!checkpoint.tick()); // tick 2 does not poll
        assert!(checkpoint.tick()); // tick 3 polls
    }

    #[test]
    fn test_checkpoint_sees_cancellation_on_first_tick() {
        let token = CancellationToken::new();
        token.cancel();
        let mut checkpoint = Checkpoint::new(&token, 1000);
        assert!(checkpoint.tick());
    }

    #[test]
    fn test_zero_batch_is_treated_as_one() {
        let token = CancellationToken::new();
        let mut checkpoint = Checkpoint::new(&token, 0);
        assert!(!checkpoint.tick());
        token.cancel();
        assert!(checkpoint.tick());
    }

    #[test]
    fn test_progress_helpers() {
        let done: Progress<Vec<u8>> = Progress::Done(vec![1, 2]);
        assert!(!done.is_cancelled());
        assert_eq!(done.into_inner(), vec![1, 2]);

        let cancelled = Progress::Cancelled("partial");
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.into_inner(), "partial");
    }
}
