//! UNO table controller - the client side of a four-seat UNO game
//!
//! The game service owns the deck, validates moves and computes CPU turns.
//! This crate decides everything the client has to decide on its own:
//! - Which cards in the local hand are playable right now
//! - How one click expands into a stacked multi-card play
//! - Whether a manual draw is allowed
//! - The one-card declaration race against the clock
//! - When to ask the service to move an automated seat
//! - Which one-shot effects a new snapshot implies
//!
//! # Architecture
//!
//! Everything here is synchronous and free of I/O. The [`session::Controller`]
//! takes inputs and returns [`session::Command`]s; a runtime (the
//! `uno-client` binary, or a browser through the `wasm` feature) executes
//! them and reports back.
//!
//! # Modules
//!
//! - [`card`]: Colors, ranks and card values
//! - [`snapshot`]: Game snapshots and the snapshot store
//! - [`rules`]: Playability, stacking and the draw guard
//! - [`declaration`]: The one-card declaration window
//! - [`effects`]: Snapshot diffing into visual effects
//! - [`pacing`]: Automated-seat pacing
//! - [`timers`]: Ticketed timer slots
//! - [`session`]: The session controller

pub mod card;
pub mod declaration;
pub mod effects;
pub mod pacing;
pub mod rules;
pub mod session;
pub mod snapshot;
pub mod timers;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use card::{Card, Color, Rank};
pub use declaration::{DeclarationState, DeclarationWindow, Resolution};
pub use effects::{EffectDetector, VisualEffect};
pub use pacing::{automated_turn_due, Pacer};
pub use rules::{can_draw, is_playable, playable_cards, select_group, DrawVerdict, StackChoice};
pub use session::{
    Command, Controller, DrawReason, Request, Selection, ServiceError, SessionView, Timings,
};
pub use snapshot::{
    ActionKind, GameSnapshot, LastAction, Lifecycle, Rotation, Seat, SeatId, SnapshotError,
    SnapshotStore, LOCAL_SEAT_ID,
};
pub use timers::{Ticket, TimerSlot};
