//! Card values as the game service describes them.
//!
//! This module contains:
//! - `Color`, including the `Black` pseudo-color of unplayed wilds
//! - `Rank`, the card's face type
//! - `Card`, an immutable value whose equality doubles as the top-card identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    /// Only on unplayed wilds and face-down backs
    Black,
}

impl Color {
    /// The four colors a player can declare or match against
    pub const PLAYABLE: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    /// Whether this color can be the active color of a game
    pub fn is_playable(&self) -> bool {
        !matches!(self, Color::Black)
    }

    /// Parse a color from user input (case-insensitive, first letter allowed)
    pub fn parse(input: &str) -> Option<Color> {
        match input.trim().to_ascii_lowercase().as_str() {
            "r" | "red" => Some(Color::Red),
            "b" | "blue" => Some(Color::Blue),
            "g" | "green" => Some(Color::Green),
            "y" | "yellow" => Some(Color::Yellow),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "RED",
            Color::Blue => "BLUE",
            Color::Green => "GREEN",
            Color::Yellow => "YELLOW",
            Color::Black => "BLACK",
        };
        f.write_str(name)
    }
}

/// Card face type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rank {
    Number,
    Skip,
    Reverse,
    #[serde(rename = "DRAW2")]
    DrawTwo,
    Wild,
    #[serde(rename = "WILD_DRAW4")]
    WildDrawFour,
    /// Forces every seat to pass its hand along
    Swap,
}

impl Rank {
    /// Wild ranks can be played on anything and need a declared color
    pub fn is_wild(&self) -> bool {
        matches!(self, Rank::Wild | Rank::WildDrawFour)
    }

    /// Name as the service spells it
    pub fn wire_name(&self) -> &'static str {
        match self {
            Rank::Number => "NUMBER",
            Rank::Skip => "SKIP",
            Rank::Reverse => "REVERSE",
            Rank::DrawTwo => "DRAW2",
            Rank::Wild => "WILD",
            Rank::WildDrawFour => "WILD_DRAW4",
            Rank::Swap => "SWAP",
        }
    }

    /// Short label used by action banners
    pub fn label(&self) -> &'static str {
        match self {
            Rank::DrawTwo => "DRAW +2",
            Rank::WildDrawFour => "DRAW +4",
            rank => rank.wire_name(),
        }
    }
}

/// A single card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub color: Color,
    #[serde(rename = "type")]
    pub rank: Rank,
    /// 0-9 for number cards, absent otherwise
    #[serde(default)]
    pub number: Option<u8>,
}

impl Card {
    /// Create a number card
    pub fn number(color: Color, number: u8) -> Self {
        Self {
            color,
            rank: Rank::Number,
            number: Some(number),
        }
    }

    /// Create a colored action card (skip, reverse, draw two, swap)
    pub fn action(color: Color, rank: Rank) -> Self {
        Self {
            color,
            rank,
            number: None,
        }
    }

    /// Create an unplayed wild card
    pub fn wild(rank: Rank) -> Self {
        Self {
            color: Color::Black,
            rank,
            number: None,
        }
    }

    pub fn is_wild(&self) -> bool {
        self.rank.is_wild()
    }

    /// Same number (both number cards) or same symbol (both action cards).
    ///
    /// Color is ignored; this is the equality stacking relies on.
    pub fn same_face(&self, other: &Card) -> bool {
        match (self.rank, other.rank) {
            (Rank::Number, Rank::Number) => self.number.is_some() && self.number == other.number,
            (Rank::Number, _) | (_, Rank::Number) => false,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.rank, self.number) {
            (Rank::Number, Some(n)) => write!(f, "{}-{}", self.color, n),
            (rank, _) if rank.is_wild() => f.write_str(rank.wire_name()),
            (rank, _) => write!(f, "{}-{}", self.color, rank.wire_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_wire_format() {
        let card: Card =
            serde_json::from_str(r#"{"color":"BLUE","type":"DRAW2","number":null}"#).unwrap();
        assert_eq!(card, Card::action(Color::Blue, Rank::DrawTwo));

        let json = serde_json::to_value(Card::wild(Rank::WildDrawFour)).unwrap();
        assert_eq!(json["type"], "WILD_DRAW4");
        assert_eq!(json["color"], "BLACK");
    }

    #[test]
    fn test_number_field_may_be_missing() {
        let card: Card = serde_json::from_str(r#"{"color":"RED","type":"SKIP"}"#).unwrap();
        assert_eq!(card.number, None);
    }

    #[test]
    fn test_same_face() {
        let red_7 = Card::number(Color::Red, 7);
        assert!(red_7.same_face(&Card::number(Color::Blue, 7)));
        assert!(!red_7.same_face(&Card::number(Color::Red, 5)));
        assert!(!red_7.same_face(&Card::action(Color::Red, Rank::Skip)));

        let skip = Card::action(Color::Green, Rank::Skip);
        assert!(skip.same_face(&Card::action(Color::Yellow, Rank::Skip)));
        assert!(!skip.same_face(&Card::action(Color::Green, Rank::Reverse)));
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("Red"), Some(Color::Red));
        assert_eq!(Color::parse(" y "), Some(Color::Yellow));
        assert_eq!(Color::parse("black"), None);
        assert!(Color::PLAYABLE.iter().all(Color::is_playable));
    }

    #[test]
    fn test_display() {
        assert_eq!(Card::number(Color::Red, 7).to_string(), "RED-7");
        assert_eq!(Card::action(Color::Green, Rank::Skip).to_string(), "GREEN-SKIP");
        assert_eq!(Card::wild(Rank::Wild).to_string(), "WILD");
        assert_eq!(Card::action(Color::Red, Rank::DrawTwo).to_string(), "RED-DRAW2");
        assert_eq!(Card::wild(Rank::WildDrawFour).to_string(), "WILD_DRAW4");
    }

    #[test]
    fn test_banner_labels() {
        assert_eq!(Rank::DrawTwo.label(), "DRAW +2");
        assert_eq!(Rank::WildDrawFour.label(), "DRAW +4");
        assert_eq!(Rank::Skip.label(), Rank::Skip.wire_name());
    }
}
