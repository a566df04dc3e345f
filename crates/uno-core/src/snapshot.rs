//! Game snapshots and the store that holds the latest one.
//!
//! A snapshot is the complete table state as returned by the game service
//! after every accepted action or state query. Snapshots are never patched;
//! the store swaps the whole value.

use crate::card::{Card, Color};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Seat identifier as assigned by the service ("0" through "3")
pub type SeatId = String;

/// The seat this client controls
pub const LOCAL_SEAT_ID: &str = "0";

/// Game lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lifecycle {
    Waiting,
    Playing,
    Finished,
}

/// Turn rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// A seat at the table. Opponents only ever expose a card count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: SeatId,
    pub name: String,
    #[serde(rename = "cpu")]
    pub automated: bool,
    pub hand_size: u32,
}

impl Seat {
    pub fn is_local(&self) -> bool {
        self.id == LOCAL_SEAT_ID
    }
}

/// Kind of the most recent action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Play,
    Draw,
    Pass,
}

/// The most recent action the service applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastAction {
    #[serde(rename = "playerId")]
    pub actor_id: SeatId,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default)]
    pub card: Option<Card>,
}

/// Snapshot invariant violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Active seat index {index} out of range for {seats} seats")]
    ActiveSeatOutOfRange { index: usize, seats: usize },

    #[error("Expected exactly one local seat, found {0}")]
    LocalSeatCount(usize),

    #[error("Local seat is marked automated")]
    LocalSeatAutomated,

    #[error("Winner must be set exactly when the game is finished")]
    WinnerMismatch,

    #[error("Active color cannot be black")]
    BlackActiveColor,
}

/// The complete table state at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub id: Uuid,
    #[serde(rename = "state")]
    pub lifecycle: Lifecycle,
    #[serde(rename = "currentColor")]
    pub active_color: Color,
    pub top_card: Card,
    #[serde(rename = "direction")]
    pub rotation: Rotation,
    #[serde(rename = "currentPlayerIndex")]
    pub active_seat_index: usize,
    #[serde(default)]
    pub winner_id: Option<SeatId>,
    #[serde(rename = "players")]
    pub seats: Vec<Seat>,
    #[serde(default)]
    pub my_hand: Vec<Card>,
    #[serde(default)]
    pub last_action: Option<LastAction>,
}

impl GameSnapshot {
    /// Check the invariants the controller relies on
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.active_seat_index >= self.seats.len() {
            return Err(SnapshotError::ActiveSeatOutOfRange {
                index: self.active_seat_index,
                seats: self.seats.len(),
            });
        }

        let local: Vec<&Seat> = self.seats.iter().filter(|s| s.is_local()).collect();
        if local.len() != 1 {
            return Err(SnapshotError::LocalSeatCount(local.len()));
        }
        if local[0].automated {
            return Err(SnapshotError::LocalSeatAutomated);
        }

        let finished = self.lifecycle == Lifecycle::Finished;
        if finished != self.winner_id.is_some() {
            return Err(SnapshotError::WinnerMismatch);
        }

        if !self.active_color.is_playable() {
            return Err(SnapshotError::BlackActiveColor);
        }

        Ok(())
    }

    /// The seat whose turn it is
    pub fn active_seat(&self) -> Option<&Seat> {
        self.seats.get(self.active_seat_index)
    }

    pub fn is_local_turn(&self) -> bool {
        self.active_seat().is_some_and(Seat::is_local)
    }

    pub fn is_automated_turn(&self) -> bool {
        self.active_seat().is_some_and(|s| s.automated)
    }

    pub fn is_finished(&self) -> bool {
        self.lifecycle == Lifecycle::Finished
    }

    pub fn winner(&self) -> Option<&Seat> {
        let winner_id = self.winner_id.as_ref()?;
        self.seats.iter().find(|s| &s.id == winner_id)
    }

    /// Hand size per seat, in seat order
    pub fn hand_sizes(&self) -> Vec<(SeatId, u32)> {
        self.seats
            .iter()
            .map(|s| (s.id.clone(), s.hand_size))
            .collect()
    }
}

/// Change notification produced by [`SnapshotStore::replace`]
#[derive(Debug)]
pub struct SnapshotChange {
    pub previous: Option<GameSnapshot>,
    pub revision: u64,
}

/// Holds the latest accepted snapshot.
///
/// Replacement is a single move of the whole value, so readers only ever see
/// a complete snapshot.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Option<GameSnapshot>,
    revision: u64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&GameSnapshot> {
        self.current.as_ref()
    }

    /// Bumped on every replacement, including same-content ones
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn replace(&mut self, snapshot: GameSnapshot) -> SnapshotChange {
        self.revision += 1;
        let previous = self.current.replace(snapshot);
        SnapshotChange {
            previous,
            revision: self.revision,
        }
    }
}
