use crate::cards::Rank;

/// Whether five ranks form a straight, and its top rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StraightInfo {
    pub is_straight: bool,
    pub top_rank: Option<Rank>,
}

impl StraightInfo {
    /// Detect a straight from five ranks in any order.
    /// The wheel (A-2-3-4-5) plays the Ace low and tops out at Five.
    pub fn detect(ranks: &[Rank; 5]) -> Self {
        let mut sorted = *ranks;
        sorted.sort_by(|a, b| b.cmp(a));

        // distinct and spanning exactly four steps
        let distinct = sorted.windows(2).all(|w| w[0] != w[1]);
        if distinct && sorted[0].value() - sorted[4].value() == 4 {
            return StraightInfo { is_straight: true, top_rank: Some(sorted[0]) };
        }

        if sorted == [Rank::Ace, Rank::Five, Rank::Four, Rank::Three, Rank::Two] {
            return StraightInfo { is_straight: true, top_rank: Some(Rank::Five) };
        }

        StraightInfo { is_straight: false, top_rank: None }
    }

    pub fn is_wheel(&self) -> bool {
        self.top_rank == Some(Rank::Five)
    }
}
