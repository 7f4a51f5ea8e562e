use super::rank_groups::RankGroups;
use super::straight_info::StraightInfo;
use super::suit_info::SuitInfo;
use crate::cards::{Card, Rank};
use crate::evaluator::{Category, EvaluatedHand, HandValue};

/// Pre-computed analysis of a 5-card subset.
/// Built once and shared by all category detectors.
#[derive(Debug, Clone)]
pub struct HandAnalysis {
    /// Cards in significance order: rank groups by (count desc, rank desc),
    /// the wheel as 5-4-3-2-A.
    pub ordered_cards: [Card; 5],
    pub rank_groups: RankGroups,
    pub suit_info: SuitInfo,
    pub straight_info: StraightInfo,
}

impl HandAnalysis {
    pub fn new(cards: &[Card; 5]) -> Self {
        let mut rank_counts = [0u8; 15];
        for card in cards {
            rank_counts[card.rank().value() as usize] += 1;
        }
        let ranks = (*cards).map(Card::rank);

        let rank_groups = RankGroups::from_counts(&rank_counts);
        let suit_info = SuitInfo::detect(cards);
        let straight_info = StraightInfo::detect(&ranks);

        let mut ordered_cards = *cards;
        if straight_info.is_wheel() {
            // Ace plays low: it goes last
            ordered_cards.sort_by_key(|c| {
                let low = if c.rank() == Rank::Ace { 1 } else { c.rank().value() };
                core::cmp::Reverse((low, c.suit()))
            });
        } else {
            ordered_cards.sort_by(|a, b| {
                rank_groups
                    .position(a.rank())
                    .cmp(&rank_groups.position(b.rank()))
                    .then(b.suit().cmp(&a.suit()))
            });
        }

        Self { ordered_cards, rank_groups, suit_info, straight_info }
    }

    /// Ranks of the ordered cards; this is the tie-break key within a category.
    pub fn tiebreak(&self) -> [Rank; 5] {
        self.ordered_cards.map(Card::rank)
    }

    /// Build an EvaluatedHand for `category`, without kickers.
    pub fn build_evaluation(&self, category: Category) -> EvaluatedHand {
        let value = HandValue::from_parts(category, &self.tiebreak());
        EvaluatedHand { category, best_five: self.ordered_cards, kickers: Vec::new(), value }
    }
}
