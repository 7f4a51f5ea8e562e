use crate::cards::Rank;

/// Groups ranks by their frequency in a hand, sorted by (count desc, rank desc).
///
/// Example: AAAKQ groups as [(Ace, 3), (King, 1), (Queen, 1)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankGroups {
    groups: Vec<(Rank, u8)>,
}

impl RankGroups {
    /// Create RankGroups from a rank count array indexed by rank value (2-14).
    pub fn from_counts(rank_counts: &[u8; 15]) -> Self {
        let mut groups: Vec<(Rank, u8)> = Rank::ALL
            .iter()
            .copied()
            .map(|rank| (rank, rank_counts[rank.value() as usize]))
            .filter(|&(_, count)| count > 0)
            .collect();

        groups.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

        Self { groups }
    }

    /// Size of the largest group; 0 for an empty hand.
    pub fn top_count(&self) -> u8 {
        self.groups.first().map_or(0, |&(_, count)| count)
    }

    /// Size of the second largest group; 0 if there is none.
    pub fn second_count(&self) -> u8 {
        self.groups.get(1).map_or(0, |&(_, count)| count)
    }

    /// Number of groups holding exactly two cards.
    pub fn pair_count(&self) -> usize {
        self.groups.iter().filter(|(_, count)| *count == 2).count()
    }

    /// Position of `rank` in group order; lower means more significant.
    pub fn position(&self, rank: Rank) -> usize {
        self.groups.iter().position(|&(r, _)| r == rank).unwrap_or(self.groups.len())
    }

    /// Group ranks in significance order.
    #[cfg(test)]
    pub fn ranks(&self) -> impl Iterator<Item = Rank> + '_ {
        self.groups.iter().map(|&(rank, _)| rank)
    }

    #[cfg(test)]
    pub fn groups(&self) -> &[(Rank, u8)] {
        &self.groups
    }
}
