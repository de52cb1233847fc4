use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Card color. `Wild` is only carried by `Wild` and `+4` cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Wild,
}

impl Color {
    /// The four colors a numbered card can have (and a wild can be declared as).
    pub const PLAYABLE: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    /// Whether this color can be declared after playing a wild card.
    pub fn is_playable(self) -> bool {
        self != Color::Wild
    }
}

/// Face value of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CardValue {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    Skip,
    Reverse,
    #[serde(rename = "+2")]
    DrawTwo,
    Wild,
    #[serde(rename = "+4")]
    WildDrawFour,
}

impl CardValue {
    /// Number cards in ascending order.
    pub const NUMBERS: [CardValue; 10] = [
        CardValue::Zero,
        CardValue::One,
        CardValue::Two,
        CardValue::Three,
        CardValue::Four,
        CardValue::Five,
        CardValue::Six,
        CardValue::Seven,
        CardValue::Eight,
        CardValue::Nine,
    ];

    /// Penalty the value adds to the draw stack.
    pub fn draw_penalty(self) -> u32 {
        match self {
            CardValue::DrawTwo => 2,
            CardValue::WildDrawFour => 4,
            _ => 0,
        }
    }
}

impl fmt::Display for CardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CardValue::Zero => "0",
            CardValue::One => "1",
            CardValue::Two => "2",
            CardValue::Three => "3",
            CardValue::Four => "4",
            CardValue::Five => "5",
            CardValue::Six => "6",
            CardValue::Seven => "7",
            CardValue::Eight => "8",
            CardValue::Nine => "9",
            CardValue::Skip => "Skip",
            CardValue::Reverse => "Reverse",
            CardValue::DrawTwo => "+2",
            CardValue::Wild => "Wild",
            CardValue::WildDrawFour => "+4",
        };
        f.write_str(label)
    }
}

/// A single playing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Card {
    pub color: Color,
    pub value: CardValue,
}

impl Card {
    /// Build a card.
    pub const fn new(color: Color, value: CardValue) -> Self {
        Self { color, value }
    }

    /// Whether the card is a `Wild` or `+4`.
    pub fn is_wild(&self) -> bool {
        self.color == Color::Wild
    }

    /// Whether the card feeds the draw stack.
    pub fn is_draw_card(&self) -> bool {
        self.value.draw_penalty() > 0
    }

    /// Whether this card may be played on `top`.
    ///
    /// With a pending draw stack only `+2`/`+4` may be stacked. Otherwise the
    /// card must share the top's color (or the declared wild color), share its
    /// value, or be wild.
    pub fn can_follow(&self, top: &Card, wild_color: Option<Color>, draw_stack: u32) -> bool {
        if draw_stack > 0 {
            return self.is_draw_card();
        }

        self.color == top.color
            || Some(self.color) == wild_color
            || self.value == top.value
            || self.is_wild()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.color, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_FIVE: Card = Card::new(Color::Red, CardValue::Five);

    #[test]
    fn matching_color_or_value_follows() {
        assert!(Card::new(Color::Red, CardValue::Nine).can_follow(&RED_FIVE, None, 0));
        assert!(Card::new(Color::Blue, CardValue::Five).can_follow(&RED_FIVE, None, 0));
        assert!(!Card::new(Color::Blue, CardValue::Six).can_follow(&RED_FIVE, None, 0));
    }

    #[test]
    fn wild_cards_always_follow_without_stack() {
        assert!(Card::new(Color::Wild, CardValue::Wild).can_follow(&RED_FIVE, None, 0));
        assert!(Card::new(Color::Wild, CardValue::WildDrawFour).can_follow(&RED_FIVE, None, 0));
    }

    #[test]
    fn declared_wild_color_is_matched() {
        let top = Card::new(Color::Wild, CardValue::Wild);
        let green = Card::new(Color::Green, CardValue::Two);
        assert!(green.can_follow(&top, Some(Color::Green), 0));
        assert!(!green.can_follow(&top, Some(Color::Yellow), 0));
    }

    #[test]
    fn pending_stack_only_accepts_draw_cards() {
        let top = Card::new(Color::Red, CardValue::DrawTwo);
        assert!(Card::new(Color::Blue, CardValue::DrawTwo).can_follow(&top, None, 2));
        assert!(Card::new(Color::Wild, CardValue::WildDrawFour).can_follow(&top, None, 2));
        assert!(!Card::new(Color::Red, CardValue::Three).can_follow(&top, None, 2));
        assert!(!Card::new(Color::Wild, CardValue::Wild).can_follow(&top, None, 2));
    }

    #[test]
    fn values_serialize_like_the_table_labels() {
        let json = serde_json::to_string(&Card::new(Color::Yellow, CardValue::DrawTwo)).unwrap();
        assert_eq!(json, r#"{"color":"yellow","value":"+2"}"#);
        let parsed: Card = serde_json::from_str(r#"{"color":"wild","value":"+4"}"#).unwrap();
        assert_eq!(parsed, Card::new(Color::Wild, CardValue::WildDrawFour));
        assert_eq!(CardValue::Seven.to_string(), "7");
    }
}
