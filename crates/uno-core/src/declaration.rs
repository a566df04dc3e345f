//! The one-card declaration window.
//!
//! ```text
//! CLOSED -> OPEN -> DECLARED -> CLOSED
//!                \-> EXPIRED  -> CLOSED
//! ```
//!
//! The window itself is clock-free. The caller arms the countdown slot when
//! [`DeclarationWindow::open`] returns and reports the fire through
//! [`DeclarationWindow::expire`] with the ticket it was given.

use crate::timers::Ticket;
use serde::{Deserialize, Serialize};

/// Window state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationState {
    Closed,
    /// Countdown running under this ticket
    Open { countdown: Ticket },
    Declared,
    Expired,
}

/// How an open window was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Acknowledged in time, no penalty
    Safe,
    /// Countdown elapsed, one penalty draw is owed
    Penalty,
}

impl Resolution {
    pub fn message(&self) -> &'static str {
        match self {
            Resolution::Safe => "SAFE!",
            Resolution::Penalty => "Forgot UNO! +1 penalty",
        }
    }
}

#[derive(Debug)]
pub struct DeclarationWindow {
    state: DeclarationState,
}

impl Default for DeclarationWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationWindow {
    pub fn new() -> Self {
        Self {
            state: DeclarationState::Closed,
        }
    }

    pub fn state(&self) -> DeclarationState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DeclarationState::Open { .. })
    }

    /// Open the window under a freshly armed countdown ticket.
    ///
    /// Any previous window is replaced; the caller has already re-armed the
    /// countdown slot, so the old ticket can no longer fire.
    pub fn open(&mut self, countdown: Ticket) {
        self.state = DeclarationState::Open { countdown };
    }

    /// Player acknowledgement. Only an open window reacts.
    pub fn acknowledge(&mut self) -> Option<Resolution> {
        match self.state {
            DeclarationState::Open { .. } => {
                self.state = DeclarationState::Declared;
                Some(Resolution::Safe)
            }
            _ => None,
        }
    }

    /// Countdown fired. Ignored unless `ticket` is the one the window opened with.
    pub fn expire(&mut self, ticket: Ticket) -> Option<Resolution> {
        match self.state {
            DeclarationState::Open { countdown } if countdown == ticket => {
                self.state = DeclarationState::Expired;
                Some(Resolution::Penalty)
            }
            _ => None,
        }
    }

    /// Return to closed once the resolution notice is gone
    pub fn close(&mut self) {
        if !self.is_open() {
            self.state = DeclarationState::Closed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timers::{TimerSlot, TimerSlots};

    #[test]
    fn test_acknowledge_before_expiry() {
        let mut slots = TimerSlots::new();
        let mut window = DeclarationWindow::new();
        let ticket = slots.arm(TimerSlot::DeclarationCountdown);
        window.open(ticket);

        assert_eq!(window.acknowledge(), Some(Resolution::Safe));
        assert_eq!(window.state(), DeclarationState::Declared);

        // The countdown fires anyway; nothing happens
        assert_eq!(window.expire(ticket), None);
        assert_eq!(window.state(), DeclarationState::Declared);
    }

    #[test]
    fn test_expiry_then_late_acknowledge() {
        let mut slots = TimerSlots::new();
        let mut window = DeclarationWindow::new();
        let ticket = slots.arm(TimerSlot::DeclarationCountdown);
        window.open(ticket);

        assert_eq!(window.expire(ticket), Some(Resolution::Penalty));
        assert_eq!(window.acknowledge(), None);
        assert_eq!(window.state(), DeclarationState::Expired);
    }

    #[test]
    fn test_reopen_ignores_old_countdown() {
        let mut slots = TimerSlots::new();
        let mut window = DeclarationWindow::new();
        let old = slots.arm(TimerSlot::DeclarationCountdown);
        window.open(old);
        let new = slots.arm(TimerSlot::DeclarationCountdown);
        window.open(new);

        assert_eq!(window.expire(old), None);
        assert!(window.is_open());
        assert_eq!(window.expire(new), Some(Resolution::Penalty));
    }

    #[test]
    fn test_close_leaves_open_window_alone() {
        let mut slots = TimerSlots::new();
        let mut window = DeclarationWindow::new();
        window.open(slots.arm(TimerSlot::DeclarationCountdown));

        window.close();
        assert!(window.is_open());

        window.acknowledge();
        window.close();
        assert_eq!(window.state(), DeclarationState::Closed);
    }

    #[test]
    fn test_acknowledge_when_closed() {
        let mut window = DeclarationWindow::new();
        assert_eq!(window.acknowledge(), None);
        assert_eq!(window.state(), DeclarationState::Closed);
    }
}
