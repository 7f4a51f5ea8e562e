use crate::cards::{Card, Suit};

/// Flush detection for a five-card subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuitInfo {
    pub is_flush: bool,
    pub flush_suit: Option<Suit>,
}

impl SuitInfo {
    pub fn detect(cards: &[Card; 5]) -> Self {
        let first_suit = cards[0].suit();
        if cards.iter().all(|c| c.suit() == first_suit) {
            SuitInfo { is_flush: true, flush_suit: Some(first_suit) }
        } else {
            SuitInfo { is_flush: false, flush_suit: None }
        }
    }
}
