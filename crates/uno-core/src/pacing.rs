//! Pacing for automated seats.
//!
//! Automated moves are computed by the service on request. The client only
//! decides when to ask, and waits a short, slightly random delay first so a
//! human can follow the table.

use crate::snapshot::GameSnapshot;
use rand::prelude::*;
use std::time::Duration;

/// Whether the snapshot is waiting on an automated seat
pub fn automated_turn_due(snapshot: &GameSnapshot) -> bool {
    !snapshot.is_finished() && snapshot.is_automated_turn()
}

/// Samples the delay before each automated move
pub struct Pacer {
    min: Duration,
    max: Duration,
    rng: StdRng,
}

impl Pacer {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self::with_rng(min, max, StdRng::from_entropy())
    }

    pub fn with_seed(min: Duration, max: Duration, seed: u64) -> Self {
        Self::with_rng(min, max, StdRng::seed_from_u64(seed))
    }

    fn with_rng(min: Duration, max: Duration, rng: StdRng) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self { min, max, rng }
    }

    /// Next delay, uniform in `[min, max]`
    pub fn next_delay(&mut self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let millis = self
            .rng
            .gen_range(self.min.as_millis() as u64..=self.max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}
