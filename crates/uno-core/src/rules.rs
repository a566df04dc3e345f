//! Client-side move rules.
//!
//! The service is the final arbiter of every move. These checks only decide
//! what the player is offered: which cards light up, which companions ride
//! along with a click, and whether a manual draw is allowed.

use crate::card::Card;
use crate::snapshot::GameSnapshot;
use serde::{Deserialize, Serialize};

// ==================== Playability ====================

/// Whether `card` may be played against `snapshot` right now
pub fn is_playable(card: &Card, snapshot: &GameSnapshot) -> bool {
    if !snapshot.is_local_turn() {
        return false;
    }
    if card.is_wild() {
        return true;
    }
    if card.color == snapshot.active_color {
        return true;
    }

    card.same_face(&snapshot.top_card)
}

/// Playability of every card in the local hand, aligned with `my_hand`
pub fn playable_cards(snapshot: &GameSnapshot) -> Vec<bool> {
    snapshot
        .my_hand
        .iter()
        .map(|card| is_playable(card, snapshot))
        .collect()
}

// ==================== Stacking ====================

/// How much of a stacked group the player chose to submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackChoice {
    /// Every card in the group, clicked card first
    All,
    /// Just the clicked card
    ClickedOnly,
}

/// Expand a click into the group of cards sharing its number or symbol.
///
/// The clicked index always comes first so the service anchors color and
/// effect on it; companions follow in hand order. Companions only need to
/// match the clicked card's face, not the top card. An out-of-range click
/// yields an empty group.
pub fn select_group(clicked: usize, hand: &[Card]) -> Vec<usize> {
    let Some(anchor) = hand.get(clicked) else {
        return Vec::new();
    };

    let mut group = vec![clicked];
    group.extend(
        hand.iter()
            .enumerate()
            .filter(|&(i, card)| i != clicked && anchor.same_face(card))
            .map(|(i, _)| i),
    );
    group
}

/// Narrow a group to what the player chose to submit
pub fn submission(group: &[usize], choice: StackChoice) -> Vec<usize> {
    match choice {
        StackChoice::All => group.to_vec(),
        StackChoice::ClickedOnly => group.iter().take(1).copied().collect(),
    }
}

/// Whether submitting `indices` requires a declared color
pub fn needs_declared_color(indices: &[usize], hand: &[Card]) -> bool {
    indices
        .first()
        .and_then(|&i| hand.get(i))
        .is_some_and(Card::is_wild)
}

// ==================== Draw Guard ====================

/// Why a manual draw was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawDenial {
    /// At least one card in hand can be played
    PlayableCardsExist,
}

impl DrawDenial {
    pub fn message(&self) -> &'static str {
        match self {
            DrawDenial::PlayableCardsExist => "Playable cards exist!",
        }
    }
}

/// Outcome of the draw guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawVerdict {
    pub allowed: bool,
    pub reason: Option<DrawDenial>,
}

impl DrawVerdict {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn denied(reason: DrawDenial) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// A player holding a legal move may not draw instead of playing it
pub fn can_draw(snapshot: &GameSnapshot) -> DrawVerdict {
    if playable_cards(snapshot).into_iter().any(|p| p) {
        DrawVerdict::denied(DrawDenial::PlayableCardsExist)
    } else {
        DrawVerdict::allowed()
    }
}
