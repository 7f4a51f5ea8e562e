use crate::cards::{standard_cards, Card};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeckError {
    #[error("cannot draw {requested} cards from a {capacity}-card deck")]
    InsufficientCapacity { requested: usize, capacity: usize },
}

/// A standard 52-card deck dealt from a cursor.
///
/// Drawn cards stay in place; only the cursor moves. A draw that would run
/// past the end reshuffles the whole deck first, so cards dealt earlier in
/// the same round can come out again.
///
/// ```
/// use poker_sim::deck::Deck;
///
/// let mut deck = Deck::seeded(7);
/// let hand = deck.draw(5).unwrap();
/// assert_eq!(hand.len(), 5);
/// assert_eq!(deck.remaining(), 47);
/// ```
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    cursor: usize,
    rng: ChaCha8Rng,
}

impl Deck {
    /// Filled and shuffled deck driven by the given generator.
    pub fn new(rng: ChaCha8Rng) -> Self {
        let mut deck = Self { cards: Vec::with_capacity(DECK_SIZE), cursor: 0, rng };
        deck.fill();
        deck.shuffle();
        deck
    }

    /// Shuffled deck with a reproducible card order.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Shuffled deck seeded from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_rng(&mut rand::rng()))
    }

    /// Reset to the canonical 52 cards in suit-major order and rewind the cursor.
    pub fn fill(&mut self) {
        self.cards.clear();
        self.cards.extend(standard_cards());
        self.cursor = 0;
    }

    /// Fisher-Yates shuffle of all 52 cards; rewinds the cursor.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards left before the next reshuffle.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Reshuffle now unless the next `k` cards fit. Returns whether a reshuffle happened.
    pub fn reserve(&mut self, k: usize) -> Result<bool, DeckError> {
        if k > self.cards.len() {
            return Err(DeckError::InsufficientCapacity { requested: k, capacity: self.cards.len() });
        }
        if self.cursor + k > self.cards.len() {
            self.shuffle();
            return Ok(true);
        }
        Ok(false)
    }

    /// Draw the next `k` cards, reshuffling first if they do not fit.
    pub fn draw(&mut self, k: usize) -> Result<Vec<Card>, DeckError> {
        self.reserve(k)?;
        let drawn = self.cards[self.cursor..self.cursor + k].to_vec();
        self.cursor += k;
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn shuffled_deck_has_52_unique_cards() {
        let d = Deck::seeded(1);
        assert_eq!(d.len(), DECK_SIZE);
        let unique: HashSet<Card> = d.cards().iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
        assert_eq!(unique, standard_cards().collect::<HashSet<_>>());
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let d1 = Deck::seeded(42);
        let d2 = Deck::seeded(42);
        assert_eq!(d1.cards, d2.cards);
        let d3 = Deck::seeded(43);
        assert_ne!(d1.cards, d3.cards);
    }

    #[test]
    fn fill_restores_canonical_order() {
        let mut d = Deck::seeded(3);
        d.draw(10).unwrap();
        d.fill();
        assert_eq!(d.remaining(), DECK_SIZE);
        assert_eq!(d.cards(), standard_cards().collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn draw_advances_cursor_without_removing() {
        let mut d = Deck::seeded(7);
        let first = d.cards()[0];
        let hand = d.draw(5).unwrap();
        assert_eq!(hand[0], first);
        assert_eq!(hand.len(), 5);
        assert_eq!(d.len(), DECK_SIZE);
        assert_eq!(d.remaining(), 47);
    }

    #[test]
    fn draw_past_end_reshuffles() {
        let mut d = Deck::seeded(9);
        let all = d.draw(DECK_SIZE).unwrap();
        assert_eq!(all.iter().collect::<HashSet<_>>().len(), DECK_SIZE);
        assert_eq!(d.remaining(), 0);

        let extra = d.draw(1).unwrap();
        assert_eq!(extra.len(), 1);
        assert!(all.contains(&extra[0]));
        assert_eq!(d.remaining(), DECK_SIZE - 1);
    }

    #[test]
    fn reserve_reports_reshuffle() {
        let mut d = Deck::seeded(11);
        d.draw(50).unwrap();
        assert!(!d.reserve(2).unwrap());
        assert!(d.reserve(3).unwrap());
        assert_eq!(d.remaining(), DECK_SIZE);
    }

    #[test]
    fn oversized_draw_fails() {
        let mut d = Deck::seeded(5);
        let err = d.draw(53).unwrap_err();
        assert_eq!(err, DeckError::InsufficientCapacity { requested: 53, capacity: 52 });
        assert_eq!(d.remaining(), DECK_SIZE);
    }

    #[test]
    fn zero_draw_is_empty() {
        let mut d = Deck::seeded(5);
        assert!(d.draw(0).unwrap().is_empty());
        assert_eq!(d.remaining(), DECK_SIZE);
    }
}
