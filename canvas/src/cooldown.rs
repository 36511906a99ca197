//! Advisory placement cooldown.
//!
//! One timestamp, the last successful local placement in epoch milliseconds,
//! decides whether the next placement may go out. The server remains the
//! real authority; this only spares users a round trip to be told "too soon".
//!
//! All checks take an explicit `now_ms` so callers and tests control time.

#[cfg(test)]
#[path = "cooldown_test.rs"]
mod cooldown_test;

use std::time::{SystemTime, UNIX_EPOCH};

/// Placement attempted before the cooldown elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("you can't place a pixel yet, {remaining_ms} ms left")]
pub struct CooldownError {
    pub remaining_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    duration_ms: u64,
    last_placement_ms: i64,
}

impl Cooldown {
    /// Cooldown of `duration_ms`, last placement at `last_placement_ms`
    /// (`0` when the user never placed a pixel).
    #[must_use]
    pub fn new(duration_ms: u64, last_placement_ms: i64) -> Self {
        Self { duration_ms, last_placement_ms }
    }

    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    #[must_use]
    pub fn last_placement_ms(&self) -> i64 {
        self.last_placement_ms
    }

    /// Milliseconds until a placement is allowed; `0` once elapsed.
    ///
    /// A clock that moved backwards past the last placement keeps the gate
    /// closed until `last + duration` is reached again.
    #[must_use]
    pub fn remaining_ms(&self, now_ms: i64) -> u64 {
        let ready_at = i128::from(self.last_placement_ms) + i128::from(self.duration_ms);
        let remaining = ready_at - i128::from(now_ms);
        u64::try_from(remaining.max(0)).unwrap_or(u64::MAX)
    }

    /// Permitted iff `now - last >= duration`.
    #[must_use]
    pub fn is_ready(&self, now_ms: i64) -> bool {
        self.remaining_ms(now_ms) == 0
    }

    /// Gate a placement attempt at `now_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`CooldownError`] with the remaining wait when not yet elapsed.
    pub fn check(&self, now_ms: i64) -> Result<(), CooldownError> {
        match self.remaining_ms(now_ms) {
            0 => Ok(()),
            remaining_ms => Err(CooldownError { remaining_ms }),
        }
    }

    /// Fold in a placement made elsewhere (another tab or process). The later
    /// of the two timestamps wins.
    pub fn observe(&mut self, last_placement_ms: i64) {
        self.last_placement_ms = self.last_placement_ms.max(last_placement_ms);
    }

    /// Record a successful placement.
    pub fn record(&mut self, now_ms: i64) {
        self.last_placement_ms = now_ms;
    }

    /// Countdown text shown under the canvas.
    #[must_use]
    pub fn message(&self, now_ms: i64) -> String {
        match self.remaining_ms(now_ms) {
            0 => "You can place a pixel now".to_owned(),
            remaining => format!("You can place a pixel in {} seconds", remaining.div_ceil(1000)),
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
