//! Deadline budget - one shrinking allowance for a whole exchange
//!
//! The budget is only ever touched through two operations:
//! - `reset_checkpoint()` right before anything that may block
//! - `charge_elapsed()` right after it returns
//!
//! Time spent outside those brackets (caller code between stages) is never
//! charged. `charge_elapsed()` is the only place a budget becomes exhausted.

use std::time::{Duration, Instant};

use stint_core::{StintError, StintResult};

use crate::{Clock, MonotonicClock};

/// Remaining time for one exchange
/// INVARIANT: `remaining <= total`, and `remaining` never increases
#[derive(Debug)]
pub struct DeadlineBudget<C: Clock = MonotonicClock> {
    total: Duration,
    remaining: Duration,
    checkpoint: Instant,
    exhausted: bool,
    clock: C,
}

impl DeadlineBudget {
    /// Create a budget on the OS monotonic clock
    pub fn new(total: Duration) -> Self {
        Self::with_clock(total, MonotonicClock)
    }
}

impl<C: Clock> DeadlineBudget<C> {
    pub fn with_clock(total: Duration, clock: C) -> Self {
        let checkpoint = clock.now();
        DeadlineBudget {
            total,
            remaining: total,
            checkpoint,
            exhausted: false,
            clock,
        }
    }

    /// Start measuring from now
    #[inline]
    pub fn reset_checkpoint(&mut self) {
        self.checkpoint = self.clock.now();
    }

    /// Charge the time since the last checkpoint against the budget.
    ///
    /// Returns the amount charged. Fails with `DeadlineExceeded` carrying the
    /// original total once nothing is left; a budget that reaches exactly zero
    /// is exhausted.
    pub fn charge_elapsed(&mut self) -> StintResult<Duration> {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.checkpoint);
        self.remaining = self.remaining.saturating_sub(elapsed);
        self.checkpoint = now;

        tracing::trace!(?elapsed, remaining = ?self.remaining, "budget charged");

        if self.remaining.is_zero() {
            if !self.exhausted {
                tracing::warn!(total = ?self.total, "deadline budget exhausted");
            }
            self.exhausted = true;
            return Err(self.exceeded());
        }
        Ok(elapsed)
    }

    /// Fail fast if an earlier charge already used up the budget
    pub fn check(&self) -> StintResult<()> {
        if self.exhausted {
            Err(self.exceeded())
        } else {
            Ok(())
        }
    }

    /// Original budget this exchange started with
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Time still available; zero once exhausted
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Time charged so far
    pub fn consumed(&self) -> Duration {
        self.total - self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn exceeded(&self) -> StintError {
        StintError::DeadlineExceeded { total: self.total }
    }
}
