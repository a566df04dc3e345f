//! The session controller.
//!
//! `Controller` owns every piece of client-side session state: the snapshot
//! store, the declaration window, the effect detector, the timer slots and
//! the ephemeral view state (selection, toasts, effects). It performs no I/O.
//! Each input returns the [`Command`]s the runtime must carry out; their
//! results come back in through [`Controller::on_reply`] and
//! [`Controller::on_timer`].

use crate::card::Color;
use crate::declaration::{DeclarationWindow, Resolution};
use crate::effects::{EffectDetector, VisualEffect};
use crate::pacing::{automated_turn_due, Pacer};
use crate::rules::{self, StackChoice};
use crate::snapshot::{GameSnapshot, SnapshotError, SnapshotStore};
use crate::timers::{Ticket, TimerSlot, TimerSlots};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failures of a game service call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Service unreachable: {0}")]
    Transport(String),

    #[error("Rejected by service: {reason:?}")]
    Rejected { reason: Option<String> },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),
}

impl ServiceError {
    /// Message for the player: the service's reason when it gave one
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ServiceError::Rejected {
                reason: Some(reason),
            } if !reason.trim().is_empty() => reason.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Why a draw is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawReason {
    /// The player asked for it
    Manual,
    /// The declaration window expired
    Penalty,
}

/// Service requests the controller can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Request {
    Start,
    Refresh,
    Play,
    Draw(DrawReason),
    AutomatedTurn,
}

/// Work for the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Start a new game and fetch its first snapshot
    StartSession,
    /// Fetch the current snapshot
    FetchState,
    Play {
        indices: Vec<usize>,
        declared_color: Option<Color>,
    },
    Draw {
        reason: DrawReason,
    },
    AutomatedTurn,
    /// Run a timer for `ticket.slot`, replacing any timer already in that slot
    Schedule { ticket: Ticket, delay: Duration },
    /// Drop the timer in `slot`, if any
    Cancel { slot: TimerSlot },
}

impl Command {
    /// The request this command sends to the service, if any
    pub fn request(&self) -> Option<Request> {
        match self {
            Command::StartSession => Some(Request::Start),
            Command::FetchState => Some(Request::Refresh),
            Command::Play { .. } => Some(Request::Play),
            Command::Draw { reason } => Some(Request::Draw(*reason)),
            Command::AutomatedTurn => Some(Request::AutomatedTurn),
            Command::Schedule { .. } | Command::Cancel { .. } => None,
        }
    }
}

/// Durations the controller schedules with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub pacing_min: Duration,
    pub pacing_max: Duration,
    pub declaration: Duration,
    pub error_toast: Duration,
    pub safe_notice: Duration,
    pub penalty_notice: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            pacing_min: Duration::from_millis(2000),
            pacing_max: Duration::from_millis(3000),
            declaration: Duration::from_millis(1000),
            error_toast: Duration::from_millis(3000),
            safe_notice: Duration::from_millis(2000),
            penalty_notice: Duration::from_millis(3000),
        }
    }
}

/// Pending multi-step card selection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    Idle,
    /// A stacked group is waiting for "all" or "just the clicked card"
    StackChoice { group: Vec<usize> },
    /// A wild is waiting for its declared color
    ColorPick { indices: Vec<usize> },
}

/// Everything a renderer needs, as one value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SessionView {
    pub revision: u64,
    pub snapshot: Option<GameSnapshot>,
    pub playable: Vec<bool>,
    pub selection: Selection,
    /// The UNO button is showing
    pub declaration_open: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub effects: Vec<VisualEffect>,
    pub winner: Option<String>,
}

#[derive(Debug)]
pub struct Controller {
    store: SnapshotStore,
    detector: EffectDetector,
    declaration: DeclarationWindow,
    slots: TimerSlots,
    pacer: Pacer,
    timings: Timings,
    selection: Selection,
    automated_in_flight: bool,
    /// A local play or manual draw awaits its reply
    local_in_flight: bool,
    error: Option<String>,
    notice: Option<Resolution>,
    effects: Vec<VisualEffect>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(Timings::default())
    }
}

impl Controller {
    pub fn new(timings: Timings) -> Self {
        let pacer = Pacer::new(timings.pacing_min, timings.pacing_max);
        Self::with_pacer(timings, pacer)
    }

    pub fn with_seed(timings: Timings, seed: u64) -> Self {
        let pacer = Pacer::with_seed(timings.pacing_min, timings.pacing_max, seed);
        Self::with_pacer(timings, pacer)
    }

    fn with_pacer(timings: Timings, pacer: Pacer) -> Self {
        Self {
            store: SnapshotStore::new(),
            detector: EffectDetector::new(),
            declaration: DeclarationWindow::new(),
            slots: TimerSlots::new(),
            pacer,
            timings,
            selection: Selection::Idle,
            automated_in_flight: false,
            local_in_flight: false,
            error: None,
            notice: None,
            effects: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.store.current()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn declaration(&self) -> &DeclarationWindow {
        &self.declaration
    }

    pub fn view(&self) -> SessionView {
        let snapshot = self.store.current().cloned();
        let playable = snapshot
            .as_ref()
            .map(rules::playable_cards)
            .unwrap_or_default();
        let winner = snapshot
            .as_ref()
            .and_then(|s| s.winner())
            .map(|seat| seat.name.clone());

        SessionView {
            revision: self.store.revision(),
            snapshot,
            playable,
            selection: self.selection.clone(),
            declaration_open: self.declaration.is_open(),
            error: self.error.clone(),
            notice: self.notice.map(|r| r.message().to_string()),
            effects: self.effects.clone(),
            winner,
        }
    }

    // ==================== Player Inputs ====================

    pub fn start(&mut self) -> Vec<Command> {
        vec![Command::StartSession]
    }

    pub fn refresh(&mut self) -> Vec<Command> {
        if self.store.current().is_none() {
            return Vec::new();
        }
        vec![Command::FetchState]
    }

    /// A click on hand card `index`
    pub fn click(&mut self, index: usize) -> Vec<Command> {
        if self.move_in_flight() {
            return Vec::new();
        }
        let Some(snapshot) = self.store.current() else {
            return Vec::new();
        };
        let playable = snapshot
            .my_hand
            .get(index)
            .is_some_and(|card| rules::is_playable(card, snapshot));
        if !playable {
            debug!(index, "Ignoring click on unplayable card");
            return Vec::new();
        }

        let group = rules::select_group(index, &snapshot.my_hand);
        if group.len() > 1 {
            self.selection = Selection::StackChoice { group };
            return Vec::new();
        }
        self.prepare_play(group)
    }

    pub fn choose_stack(&mut self, choice: StackChoice) -> Vec<Command> {
        if self.move_in_flight() {
            return Vec::new();
        }
        let Selection::StackChoice { group } = &self.selection else {
            debug!("No stacked group pending");
            return Vec::new();
        };
        let indices = rules::submission(group, choice);
        self.selection = Selection::Idle;
        self.prepare_play(indices)
    }

    pub fn choose_color(&mut self, color: Color) -> Vec<Command> {
        if self.move_in_flight() {
            return Vec::new();
        }
        if !color.is_playable() {
            debug!(%color, "Declared color must be a playable color");
            return Vec::new();
        }
        let Selection::ColorPick { indices } = &self.selection else {
            debug!("No wild waiting for a color");
            return Vec::new();
        };
        let indices = indices.clone();
        self.selection = Selection::Idle;
        self.local_in_flight = true;
        vec![Command::Play {
            indices,
            declared_color: Some(color),
        }]
    }

    pub fn cancel_selection(&mut self) {
        self.selection = Selection::Idle;
    }

    /// Manual draw, gated by the draw guard
    pub fn draw(&mut self) -> Vec<Command> {
        if self.move_in_flight() {
            return Vec::new();
        }
        let Some(snapshot) = self.store.current() else {
            return Vec::new();
        };
        if !snapshot.is_local_turn() {
            debug!("Ignoring draw outside our turn");
            return Vec::new();
        }

        let verdict = rules::can_draw(snapshot);
        match verdict.reason {
            Some(denial) if !verdict.allowed => self.show_error(denial.message().to_string()),
            _ => {
                self.local_in_flight = true;
                vec![Command::Draw {
                    reason: DrawReason::Manual,
                }]
            }
        }
    }

    /// The UNO button
    pub fn declare(&mut self) -> Vec<Command> {
        match self.declaration.acknowledge() {
            Some(resolution) => {
                let mut commands = self.cancel(TimerSlot::DeclarationCountdown);
                commands.extend(self.show_notice(resolution));
                commands
            }
            None => {
                debug!("Declaration outside an open window has no effect");
                Vec::new()
            }
        }
    }

    fn move_in_flight(&self) -> bool {
        if self.local_in_flight {
            debug!("Ignoring input while a move awaits its reply");
        }
        self.local_in_flight
    }

    fn prepare_play(&mut self, indices: Vec<usize>) -> Vec<Command> {
        let needs_color = self
            .store
            .current()
            .is_some_and(|s| rules::needs_declared_color(&indices, &s.my_hand));
        if needs_color {
            self.selection = Selection::ColorPick { indices };
            return Vec::new();
        }
        self.local_in_flight = true;
        vec![Command::Play {
            indices,
            declared_color: None,
        }]
    }

    // ==================== Runtime Inputs ====================

    /// Result of a service request
    pub fn on_reply(
        &mut self,
        request: Request,
        result: Result<GameSnapshot, ServiceError>,
    ) -> Vec<Command> {
        if let (Ok(snapshot), Some(current)) = (&result, self.store.current()) {
            if request != Request::Start && snapshot.id != current.id {
                debug!(game = %snapshot.id, ?request, "Dropping reply for another game");
                return Vec::new();
            }
        }

        match request {
            Request::AutomatedTurn => self.automated_in_flight = false,
            Request::Play | Request::Draw(DrawReason::Manual) => self.local_in_flight = false,
            _ => {}
        }

        let result = result.and_then(|snapshot| {
            snapshot.validate()?;
            Ok(snapshot)
        });

        match result {
            Ok(snapshot) => {
                if request == Request::Start {
                    self.reset_session();
                }
                let opens_window = request == Request::Play && snapshot.my_hand.len() == 1;
                let mut commands = self.apply_snapshot(snapshot);
                if opens_window {
                    commands.extend(self.open_declaration());
                }
                commands
            }
            Err(err) => self.on_failure(request, err),
        }
    }

    /// A timer fired
    pub fn on_timer(&mut self, ticket: Ticket) -> Vec<Command> {
        if !self.slots.fire(ticket) {
            debug!(?ticket, "Dropping stale timer");
            return Vec::new();
        }

        match ticket.slot {
            TimerSlot::AutomatedTurn => {
                let due = self.store.current().is_some_and(automated_turn_due);
                if !due || self.automated_in_flight {
                    return Vec::new();
                }
                self.automated_in_flight = true;
                vec![Command::AutomatedTurn]
            }
            TimerSlot::DeclarationCountdown => match self.declaration.expire(ticket) {
                Some(resolution) => {
                    let mut commands = self.show_notice(resolution);
                    commands.push(Command::Draw {
                        reason: DrawReason::Penalty,
                    });
                    commands
                }
                None => Vec::new(),
            },
            TimerSlot::ErrorToast => {
                self.error = None;
                Vec::new()
            }
            TimerSlot::DeclarationNotice => {
                self.notice = None;
                self.declaration.close();
                Vec::new()
            }
            slot @ (TimerSlot::SwapEffect | TimerSlot::ShoutEffect | TimerSlot::ActionBanner) => {
                self.effects.retain(|e| e.slot() != slot);
                Vec::new()
            }
        }
    }

    fn on_failure(&mut self, request: Request, err: ServiceError) -> Vec<Command> {
        match request {
            Request::Play => self.show_error(err.user_message("Error playing card")),
            Request::Draw(_) => self.show_error(err.user_message("Cannot draw")),
            Request::Start => self.show_error(err.user_message("Failed to start game")),
            Request::AutomatedTurn => {
                tracing::warn!(error = %err, "Automated turn failed");
                Vec::new()
            }
            Request::Refresh => {
                tracing::warn!(error = %err, "Failed to fetch state");
                Vec::new()
            }
        }
    }

    // ==================== Snapshot Replacement ====================

    fn apply_snapshot(&mut self, snapshot: GameSnapshot) -> Vec<Command> {
        let mut commands = Vec::new();

        for effect in self.detector.observe(&snapshot) {
            commands.extend(self.show_effect(effect));
        }

        let change = self.store.replace(snapshot);
        let hand_changed = change
            .previous
            .as_ref()
            .zip(self.store.current())
            .map_or(true, |(before, after)| before.my_hand != after.my_hand);
        if hand_changed {
            self.selection = Selection::Idle;
        }

        // Every change re-evaluates pacing from scratch
        commands.extend(self.cancel(TimerSlot::AutomatedTurn));
        let due = self.store.current().is_some_and(automated_turn_due);
        if due && !self.automated_in_flight {
            let ticket = self.slots.arm(TimerSlot::AutomatedTurn);
            commands.push(Command::Schedule {
                ticket,
                delay: self.pacer.next_delay(),
            });
        }

        debug!(revision = change.revision, due, "Snapshot replaced");
        commands
    }

    fn reset_session(&mut self) {
        self.detector.reset();
        self.declaration = DeclarationWindow::new();
        self.selection = Selection::Idle;
        self.automated_in_flight = false;
        self.local_in_flight = false;
    }

    // ==================== Timed State ====================

    fn open_declaration(&mut self) -> Vec<Command> {
        let ticket = self.slots.arm(TimerSlot::DeclarationCountdown);
        self.declaration.open(ticket);
        vec![Command::Schedule {
            ticket,
            delay: self.timings.declaration,
        }]
    }

    fn show_error(&mut self, message: String) -> Vec<Command> {
        self.error = Some(message);
        let ticket = self.slots.arm(TimerSlot::ErrorToast);
        vec![Command::Schedule {
            ticket,
            delay: self.timings.error_toast,
        }]
    }

    fn show_notice(&mut self, resolution: Resolution) -> Vec<Command> {
        self.notice = Some(resolution);
        let delay = match resolution {
            Resolution::Safe => self.timings.safe_notice,
            Resolution::Penalty => self.timings.penalty_notice,
        };
        let ticket = self.slots.arm(TimerSlot::DeclarationNotice);
        vec![Command::Schedule { ticket, delay }]
    }

    fn show_effect(&mut self, effect: VisualEffect) -> Vec<Command> {
        let slot = effect.slot();
        let delay = effect.display_duration();
        self.effects.retain(|e| e.slot() != slot);
        self.effects.push(effect);
        let ticket = self.slots.arm(slot);
        vec![Command::Schedule { ticket, delay }]
    }

    fn cancel(&mut self, slot: TimerSlot) -> Vec<Command> {
        if self.slots.disarm(slot) {
            vec![Command::Cancel { slot }]
        } else {
            Vec::new()
        }
    }
}
