use crate::deck::DECK_SIZE;
use crate::evaluator::HAND_SIZE;
use crate::game::{DrawPolicy, TableConfig, MAX_PLAYERS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("at least one player is required")]
    NoPlayers,
    #[error("{0} players exceed the table limit of 1000")]
    TooManyPlayers(usize),
    #[error("at least one round per game is required")]
    NoRounds,
    #[error("at least one game is required")]
    NoGames,
    #[error("each player needs at least 5 cards, hole + community is {0}")]
    TooFewCards(usize),
    #[error("cannot deal {0} cards in a single draw from a 52-card deck")]
    TooManyCards(usize),
    #[error("a round deals {0} cards, more than one deck holds")]
    RoundExceedsDeck(usize),
}

/// Everything one simulation batch needs.
///
/// Defaults: 6 players, 2 hole cards, 5 community cards, 10 rounds in each
/// of 5 games, reshuffle on exhaustion, unseeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub players: usize,
    pub hole_cards: usize,
    pub community_cards: usize,
    pub rounds_per_game: u64,
    pub game_count: usize,
    pub draw_policy: DrawPolicy,
    /// Game `i` is seeded with `seed + i`; `None` draws fresh entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let table = TableConfig::default();
        Self {
            players: table.players,
            hole_cards: table.hole_cards,
            community_cards: table.community_cards,
            rounds_per_game: 10,
            game_count: 5,
            draw_policy: table.draw_policy,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn table(&self) -> TableConfig {
        TableConfig {
            players: self.players,
            hole_cards: self.hole_cards,
            community_cards: self.community_cards,
            draw_policy: self.draw_policy,
        }
    }

    /// Rounds across all games.
    pub fn total_rounds(&self) -> u64 {
        self.rounds_per_game.saturating_mul(self.game_count as u64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 {
            return Err(ConfigError::NoPlayers);
        }
        if self.players > MAX_PLAYERS {
            return Err(ConfigError::TooManyPlayers(self.players));
        }
        if self.rounds_per_game == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.game_count == 0 {
            return Err(ConfigError::NoGames);
        }
        for draw in [self.hole_cards, self.community_cards] {
            if draw > DECK_SIZE {
                return Err(ConfigError::TooManyCards(draw));
            }
        }
        let table = self.table();
        if table.pool_size() < HAND_SIZE {
            return Err(ConfigError::TooFewCards(table.pool_size()));
        }
        if self.draw_policy == DrawPolicy::WithoutReplacement {
            match table.checked_round_demand() {
                Some(demand) if demand <= DECK_SIZE => {}
                demand => return Err(ConfigError::RoundExceedsDeck(demand.unwrap_or(usize::MAX))),
            }
        }
        Ok(())
    }

    /// One config per (players, hole, community) combination, players
    /// outermost, everything else copied from `self`.
    ///
    /// Range ends are checked up front; the configs themselves are produced
    /// lazily and still need [`SimulationConfig::validate`].
    ///
    /// ```
    /// use poker_sim::config::{CountRange, SimulationConfig};
    ///
    /// let base = SimulationConfig::default();
    /// let batches: Vec<_> = base
    ///     .sweep("2-4".parse().unwrap(), CountRange::single(2), "3-5".parse().unwrap())
    ///     .unwrap()
    ///     .collect();
    /// assert_eq!(batches.len(), 9);
    /// assert_eq!((batches[0].players, batches[0].community_cards), (2, 3));
    /// ```
    pub fn sweep(
        &self,
        players: CountRange,
        hole_cards: CountRange,
        community_cards: CountRange,
    ) -> Result<impl Iterator<Item = SimulationConfig>, ConfigError> {
        if players.end() > MAX_PLAYERS {
            return Err(ConfigError::TooManyPlayers(players.end()));
        }
        for range in [hole_cards, community_cards] {
            if range.end() > DECK_SIZE {
                return Err(ConfigError::TooManyCards(range.end()));
            }
        }

        let base = self.clone();
        Ok(players.iter().flat_map(move |p| {
            let base = base.clone();
            hole_cards.iter().flat_map(move |h| {
                let base = base.clone();
                community_cards.iter().map(move |c| SimulationConfig {
                    players: p,
                    hole_cards: h,
                    community_cards: c,
                    ..base.clone()
                })
            })
        }))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RangeParseError {
    #[error("invalid count: '{0}'")]
    Invalid(String),
    #[error("range start {start} is above its end {end}")]
    Reversed { start: usize, end: usize },
}

/// Inclusive count range written `3` or `3-6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRange {
    start: usize,
    end: usize,
}

impl CountRange {
    pub const fn single(n: usize) -> Self {
        Self { start: n, end: n }
    }

    pub fn new(start: usize, end: usize) -> Result<Self, RangeParseError> {
        if start > end {
            return Err(RangeParseError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn iter(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl fmt::Display for CountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for CountRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |t: &str| t.trim().parse::<usize>().map_err(|_| RangeParseError::Invalid(s.to_string()));
        match s.split_once('-') {
            Some((a, b)) => CountRange::new(parse(a)?, parse(b)?),
            None => Ok(CountRange::single(parse(s)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = SimulationConfig::default();
        assert_eq!(c.validate(), Ok(()));
        assert_eq!(c.total_rounds(), 50);
        assert_eq!(c.table().round_demand(), 17);
    }

    #[test]
    fn validation_catches_each_problem() {
        let base = SimulationConfig::default();
        let cases = [
            (SimulationConfig { players: 0, ..base.clone() }, ConfigError::NoPlayers),
            (SimulationConfig { rounds_per_game: 0, ..base.clone() }, ConfigError::NoRounds),
            (SimulationConfig { game_count: 0, ..base.clone() }, ConfigError::NoGames),
            (
                SimulationConfig { hole_cards: 1, community_cards: 3, ..base.clone() },
                ConfigError::TooFewCards(4),
            ),
            (SimulationConfig { hole_cards: 53, ..base.clone() }, ConfigError::TooManyCards(53)),
            (
                SimulationConfig {
                    players: 24,
                    draw_policy: DrawPolicy::WithoutReplacement,
                    ..base.clone()
                },
                ConfigError::RoundExceedsDeck(53),
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn huge_tables_are_rejected_without_overflow() {
        let base = SimulationConfig::default();
        let overflowing = SimulationConfig {
            players: usize::MAX / 2,
            hole_cards: 4,
            draw_policy: DrawPolicy::WithoutReplacement,
            ..base.clone()
        };
        assert_eq!(overflowing.validate(), Err(ConfigError::TooManyPlayers(usize::MAX / 2)));

        let at_limit = SimulationConfig { players: MAX_PLAYERS, ..base.clone() };
        assert_eq!(at_limit.validate(), Ok(()));
        let over = SimulationConfig { players: MAX_PLAYERS + 1, ..base.clone() };
        assert_eq!(over.validate(), Err(ConfigError::TooManyPlayers(MAX_PLAYERS + 1)));
        let max = SimulationConfig { players: usize::MAX, ..base };
        assert_eq!(max.validate(), Err(ConfigError::TooManyPlayers(usize::MAX)));
    }

    #[test]
    fn huge_card_counts_are_rejected_before_summing() {
        let c = SimulationConfig { hole_cards: usize::MAX, community_cards: 5, ..SimulationConfig::default() };
        assert_eq!(c.validate(), Err(ConfigError::TooManyCards(usize::MAX)));
    }

    #[test]
    fn oversized_rounds_are_fine_when_reshuffling() {
        let c = SimulationConfig { players: 24, ..SimulationConfig::default() };
        assert_eq!(c.validate(), Ok(()));
    }

    #[test]
    fn zero_hole_cards_with_full_board_is_valid() {
        let c = SimulationConfig { hole_cards: 0, community_cards: 5, ..SimulationConfig::default() };
        assert_eq!(c.validate(), Ok(()));
    }

    #[test]
    fn count_range_parsing() {
        assert_eq!("4".parse::<CountRange>().unwrap(), CountRange::single(4));
        assert_eq!(" 3 - 6 ".parse::<CountRange>().unwrap().iter().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!("6-3".parse::<CountRange>(), Err(RangeParseError::Reversed { start: 6, end: 3 }));
        assert!(matches!("x".parse::<CountRange>(), Err(RangeParseError::Invalid(_))));
        assert!(matches!("1-".parse::<CountRange>(), Err(RangeParseError::Invalid(_))));
        assert_eq!(CountRange::new(2, 5).unwrap().to_string(), "2-5");
        assert_eq!(CountRange::single(7).to_string(), "7");
    }

    #[test]
    fn sweep_keeps_shared_settings() {
        let base = SimulationConfig { seed: Some(9), rounds_per_game: 3, ..SimulationConfig::default() };
        let batches: Vec<_> = base
            .sweep(CountRange::single(2), CountRange::new(2, 3).unwrap(), CountRange::single(5))
            .unwrap()
            .collect();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.seed == Some(9) && b.rounds_per_game == 3 && b.players == 2));
        assert_eq!(batches[1].hole_cards, 3);
    }

    #[test]
    fn sweep_rejects_oversized_ranges_before_expanding() {
        let base = SimulationConfig::default();
        let huge = CountRange::new(1, 100_000_000).unwrap();
        assert_eq!(
            base.sweep(huge, CountRange::single(2), CountRange::single(5)).err(),
            Some(ConfigError::TooManyPlayers(100_000_000))
        );
        assert_eq!(
            base.sweep(CountRange::single(2), CountRange::new(2, 60).unwrap(), CountRange::single(5)).err(),
            Some(ConfigError::TooManyCards(60))
        );
        let mut lazy = base.sweep(CountRange::new(1, MAX_PLAYERS).unwrap(), CountRange::single(2), CountRange::single(5)).unwrap();
        assert_eq!(lazy.next().map(|c| c.players), Some(1));
        assert_eq!(lazy.count(), MAX_PLAYERS - 1);
    }
}
