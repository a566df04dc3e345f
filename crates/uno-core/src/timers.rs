//! Ticketed timer slots.
//!
//! Every timer the controller uses lives in a named slot, and a slot holds at
//! most one outstanding timer. Arming a slot invalidates whatever ticket it
//! held before, so a fire that races a reschedule or a cancel is recognised
//! as stale and dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logical timer slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerSlot {
    /// Pacing delay before asking the service to move an automated seat
    AutomatedTurn,
    /// One-card declaration countdown
    DeclarationCountdown,
    /// Dismisses the transient error toast
    ErrorToast,
    /// Dismisses the SAFE / penalty notice and closes the declaration window
    DeclarationNotice,
    SwapEffect,
    ShoutEffect,
    ActionBanner,
}

/// Identifies one scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    pub slot: TimerSlot,
    pub generation: u64,
}

/// Generation counters per slot
#[derive(Debug, Default)]
pub struct TimerSlots {
    generations: HashMap<TimerSlot, u64>,
    armed: HashMap<TimerSlot, Ticket>,
}

impl TimerSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `slot`, superseding any ticket it held
    pub fn arm(&mut self, slot: TimerSlot) -> Ticket {
        let generation = self.bump(slot);
        let ticket = Ticket { slot, generation };
        self.armed.insert(slot, ticket);
        ticket
    }

    /// Disarm `slot`. Returns whether a ticket was outstanding.
    pub fn disarm(&mut self, slot: TimerSlot) -> bool {
        self.bump(slot);
        self.armed.remove(&slot).is_some()
    }

    /// Consume a fired ticket. Only the slot's current ticket is honoured.
    pub fn fire(&mut self, ticket: Ticket) -> bool {
        if self.armed.get(&ticket.slot) == Some(&ticket) {
            self.armed.remove(&ticket.slot);
            true
        } else {
            false
        }
    }

    fn bump(&mut self, slot: TimerSlot) -> u64 {
        let generation = self.generations.entry(slot).or_insert(0);
        *generation += 1;
        *generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_invalidates_previous_ticket() {
        let mut slots = TimerSlots::new();
        let first = slots.arm(TimerSlot::DeclarationCountdown);
        let second = slots.arm(TimerSlot::DeclarationCountdown);

        assert_ne!(first, second);
        assert!(!slots.fire(first));
        assert!(slots.fire(second));
        assert!(!slots.disarm(TimerSlot::DeclarationCountdown));
    }

    #[test]
    fn test_disarm_drops_pending_fire() {
        let mut slots = TimerSlots::new();
        let ticket = slots.arm(TimerSlot::AutomatedTurn);

        assert!(slots.disarm(TimerSlot::AutomatedTurn));
        assert!(!slots.disarm(TimerSlot::AutomatedTurn));
        assert!(!slots.fire(ticket));
    }

    #[test]
    fn test_ticket_fires_once() {
        let mut slots = TimerSlots::new();
        let ticket = slots.arm(TimerSlot::ErrorToast);
        assert!(slots.fire(ticket));
        assert!(!slots.fire(ticket));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut slots = TimerSlots::new();
        let pacing = slots.arm(TimerSlot::AutomatedTurn);
        slots.arm(TimerSlot::DeclarationCountdown);
        slots.disarm(TimerSlot::DeclarationCountdown);

        assert!(slots.fire(pacing));
    }
}
