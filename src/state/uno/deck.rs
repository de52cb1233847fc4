//! Draw and discard piles for the card game.

use crate::state::{
    rng::RandomSource,
    uno::card::{Card, CardValue, Color},
};

/// Cards in a complete deck.
pub const DECK_SIZE: usize = 108;

/// Build the unshuffled 108-card deck.
///
/// Per color: one `0`, two of each `1`–`9`, `Skip`, `Reverse`, `+2`.
/// Plus four `Wild` and four `+4`.
pub fn standard_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(DECK_SIZE);

    for color in Color::PLAYABLE {
        let values = CardValue::NUMBERS
            .into_iter()
            .chain([CardValue::Skip, CardValue::Reverse, CardValue::DrawTwo]);
        for value in values {
            cards.push(Card::new(color, value));
            if value != CardValue::Zero {
                cards.push(Card::new(color, value));
            }
        }
    }

    for _ in 0..4 {
        cards.push(Card::new(Color::Wild, CardValue::Wild));
        cards.push(Card::new(Color::Wild, CardValue::WildDrawFour));
    }

    cards
}

/// Draw pile (last element is the next card drawn) and discard pile (last
/// element is the active card).
#[derive(Debug, Clone, Default)]
pub struct Deck {
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
}

impl Deck {
    /// Empty piles, used before the first round.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A freshly shuffled full deck with an empty discard pile.
    pub fn shuffled(rng: &mut RandomSource) -> Self {
        let mut draw_pile = standard_deck();
        rng.shuffle(&mut draw_pile);
        Self {
            draw_pile,
            discard_pile: Vec::new(),
        }
    }

    /// Active card, if any has been revealed.
    pub fn top(&self) -> Option<&Card> {
        self.discard_pile.last()
    }

    /// Cards left in the draw pile.
    pub fn draw_len(&self) -> usize {
        self.draw_pile.len()
    }

    /// Cards in the discard pile.
    pub fn discard_len(&self) -> usize {
        self.discard_pile.len()
    }

    /// Deal `amount` cards straight off the draw pile, without reshuffling.
    pub fn deal(&mut self, amount: usize) -> Vec<Card> {
        let start = self.draw_pile.len().saturating_sub(amount);
        self.draw_pile.split_off(start)
    }

    /// Reveal the first active card: pop until a non-wild card surfaces,
    /// moving wild cards to the bottom of the draw pile.
    pub fn reveal_first(&mut self) -> Option<Card> {
        for _ in 0..self.draw_pile.len() {
            let card = self.draw_pile.pop()?;
            if card.is_wild() {
                self.draw_pile.insert(0, card);
                continue;
            }
            self.discard_pile.push(card);
            return Some(card);
        }
        None
    }

    /// Draw `amount` cards, reshuffling the discard pile when the draw pile
    /// runs short. Returns fewer cards only when every other card is in a hand.
    pub fn draw(&mut self, amount: usize, rng: &mut RandomSource) -> Vec<Card> {
        if self.draw_pile.len() < amount {
            self.reshuffle(rng);
        }
        self.deal(amount)
    }

    /// Put a played card on the discard pile.
    pub fn discard(&mut self, card: Card) {
        self.discard_pile.push(card);
    }

    /// Slide cards under the draw pile (hands of players who left).
    pub fn return_to_bottom(&mut self, cards: impl IntoIterator<Item = Card>) {
        let mut returned: Vec<Card> = cards.into_iter().collect();
        returned.append(&mut self.draw_pile);
        self.draw_pile = returned;
    }

    /// Keep the active card, shuffle the rest of the discard pile, and put it
    /// beneath whatever is left in the draw pile.
    fn reshuffle(&mut self, rng: &mut RandomSource) {
        let Some(top) = self.discard_pile.pop() else {
            return;
        };
        let mut recycled = std::mem::take(&mut self.discard_pile);
        rng.shuffle(&mut recycled);
        recycled.append(&mut self.draw_pile);
        self.draw_pile = recycled;
        self.discard_pile.push(top);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn counts(cards: &[Card]) -> HashMap<Card, usize> {
        let mut counts = HashMap::new();
        for card in cards {
            *counts.entry(*card).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn standard_deck_composition() {
        let deck = standard_deck();
        assert_eq!(deck.len(), DECK_SIZE);
        let counts = counts(&deck);

        for color in Color::PLAYABLE {
            assert_eq!(counts[&Card::new(color, CardValue::Zero)], 1);
            for value in CardValue::NUMBERS.into_iter().skip(1) {
                assert_eq!(counts[&Card::new(color, value)], 2);
            }
            for value in [CardValue::Skip, CardValue::Reverse, CardValue::DrawTwo] {
                assert_eq!(counts[&Card::new(color, value)], 2);
            }
        }
        assert_eq!(counts[&Card::new(Color::Wild, CardValue::Wild)], 4);
        assert_eq!(counts[&Card::new(Color::Wild, CardValue::WildDrawFour)], 4);
    }

    #[test]
    fn shuffles_preserve_the_multiset() {
        let expected = counts(&standard_deck());
        let mut rng = RandomSource::seeded(99);
        for _ in 0..10 {
            let mut deck = Deck::shuffled(&mut rng);
            assert_eq!(counts(&deck.deal(DECK_SIZE)), expected);
        }
    }

    #[test]
    fn reveal_first_skips_wild_cards() {
        let mut deck = Deck {
            draw_pile: vec![
                Card::new(Color::Red, CardValue::Three),
                Card::new(Color::Wild, CardValue::WildDrawFour),
                Card::new(Color::Wild, CardValue::Wild),
            ],
            discard_pile: Vec::new(),
        };

        let revealed = deck.reveal_first().unwrap();
        assert_eq!(revealed, Card::new(Color::Red, CardValue::Three));
        assert_eq!(deck.top(), Some(&revealed));
        assert_eq!(deck.draw_len(), 2);
        assert!(deck.draw_pile.iter().all(Card::is_wild));
    }

    #[test]
    fn draw_reshuffles_discard_but_keeps_top() {
        let mut rng = RandomSource::seeded(4);
        let top = Card::new(Color::Blue, CardValue::Seven);
        let mut deck = Deck {
            draw_pile: vec![Card::new(Color::Green, CardValue::One)],
            discard_pile: vec![
                Card::new(Color::Red, CardValue::One),
                Card::new(Color::Red, CardValue::Two),
                top,
            ],
        };

        let drawn = deck.draw(2, &mut rng);
        assert_eq!(drawn.len(), 2);
        assert!(drawn.contains(&Card::new(Color::Green, CardValue::One)));
        assert_eq!(deck.top(), Some(&top));
        assert_eq!(deck.discard_len(), 1);
        assert_eq!(deck.draw_len(), 1);
    }

    #[test]
    fn draw_returns_what_exists_when_everything_is_held() {
        let mut rng = RandomSource::seeded(4);
        let mut deck = Deck {
            draw_pile: Vec::new(),
            discard_pile: vec![Card::new(Color::Red, CardValue::One)],
        };
        assert!(deck.draw(1, &mut rng).is_empty());
        assert_eq!(deck.discard_len(), 1);
    }
}
