//! Transient visual effects derived by diffing snapshots.
//!
//! The service never pushes events, so effects are synthesized by comparing
//! what the previous snapshot looked like with the current one.

use crate::card::{Card, Rank};
use crate::snapshot::{ActionKind, GameSnapshot, LastAction, SeatId};
use crate::timers::TimerSlot;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// One-shot presentation effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualEffect {
    /// A swap card just landed on the pile
    HandsSwapping,

    /// A seat just went down to its last card
    OneCardLeft { seat: SeatId },

    /// Big banner for skip / draw two / wild draw four plays
    ActionBanner { actor: SeatId, rank: Rank },
}

impl VisualEffect {
    /// How long the effect stays on screen
    pub fn display_duration(&self) -> Duration {
        match self {
            VisualEffect::HandsSwapping => Duration::from_millis(2000),
            VisualEffect::OneCardLeft { .. } => Duration::from_millis(1500),
            VisualEffect::ActionBanner { .. } => Duration::from_millis(1200),
        }
    }

    /// Each effect kind occupies its own dismissal slot
    pub fn slot(&self) -> TimerSlot {
        match self {
            VisualEffect::HandsSwapping => TimerSlot::SwapEffect,
            VisualEffect::OneCardLeft { .. } => TimerSlot::ShoutEffect,
            VisualEffect::ActionBanner { .. } => TimerSlot::ActionBanner,
        }
    }

    pub fn caption(&self) -> String {
        match self {
            VisualEffect::HandsSwapping => "SWAP! Hands are changing places".to_string(),
            VisualEffect::OneCardLeft { .. } => "UNO!".to_string(),
            VisualEffect::ActionBanner { rank, .. } => format!("{}!", rank.label()),
        }
    }
}

/// What the detector remembers about a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub game: Uuid,
    pub top_card: Card,
    pub hand_sizes: Vec<(SeatId, u32)>,
    pub last_action: Option<LastAction>,
}

impl Observation {
    pub fn of(snapshot: &GameSnapshot) -> Self {
        Self {
            game: snapshot.id,
            top_card: snapshot.top_card,
            hand_sizes: snapshot.hand_sizes(),
            last_action: snapshot.last_action.clone(),
        }
    }

    fn hand_size(&self, seat: &str) -> Option<u32> {
        self.hand_sizes
            .iter()
            .find(|(id, _)| id == seat)
            .map(|&(_, size)| size)
    }
}

/// Pure diff of two observations.
///
/// Nothing is emitted without a previous observation of the same game.
pub fn diff(previous: Option<&Observation>, current: &Observation) -> Vec<VisualEffect> {
    let Some(previous) = previous.filter(|p| p.game == current.game) else {
        return Vec::new();
    };

    let mut effects = Vec::new();

    if previous.top_card != current.top_card && current.top_card.rank == Rank::Swap {
        effects.push(VisualEffect::HandsSwapping);
    }

    for (seat, size) in &current.hand_sizes {
        if seat != crate::snapshot::LOCAL_SEAT_ID {
            continue;
        }
        if let Some(before) = previous.hand_size(seat) {
            if before > 1 && *size == 1 {
                effects.push(VisualEffect::OneCardLeft { seat: seat.clone() });
            }
        }
    }

    if previous.last_action != current.last_action {
        if let Some(banner) = current.last_action.as_ref().and_then(banner_for) {
            effects.push(banner);
        }
    }

    effects
}

// Swap plays are covered by the top-card rule
fn banner_for(action: &LastAction) -> Option<VisualEffect> {
    if action.kind != ActionKind::Play {
        return None;
    }
    let rank = action.card?.rank;
    match rank {
        Rank::Skip | Rank::DrawTwo | Rank::WildDrawFour => Some(VisualEffect::ActionBanner {
            actor: action.actor_id.clone(),
            rank,
        }),
        _ => None,
    }
}

/// Keeps the previous observation between snapshots
#[derive(Debug, Default)]
pub struct EffectDetector {
    previous: Option<Observation>,
}

impl EffectDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff against the remembered observation, then remember `snapshot`
    pub fn observe(&mut self, snapshot: &GameSnapshot) -> Vec<VisualEffect> {
        let current = Observation::of(snapshot);
        let effects = diff(self.previous.as_ref(), &current);
        self.previous = Some(current);
        effects
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
