//! Serializable summary of one simulation batch.

use crate::config::SimulationConfig;
use crate::evaluator::Category;
use crate::simulation::SimulationTotals;
use crate::tally::HandCount;
use serde::Serialize;
use std::fmt;

/// Config echo plus the flattened tallies of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub config: SimulationConfig,
    pub games: usize,
    pub rounds_played: u64,
    pub exact_ties: u64,
    pub total_hands: Vec<HandCount>,
    pub winning_hands: Vec<HandCount>,
    #[serde(skip)]
    totals: SimulationTotals,
}

impl Report {
    pub fn new(config: SimulationConfig, totals: SimulationTotals) -> Self {
        Self {
            config,
            games: totals.games,
            rounds_played: totals.rounds_played,
            exact_ties: totals.exact_ties,
            total_hands: totals.dealt_rows(),
            winning_hands: totals.win_rows(),
            totals,
        }
    }

    pub fn totals(&self) -> &SimulationTotals {
        &self.totals
    }
}

fn percent(share: f64) -> String {
    format!("{:>8.4}%", share * 100.0)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.config;
        writeln!(
            f,
            "{} players, {} hole + {} community cards, {} games x {} rounds",
            c.players, c.hole_cards, c.community_cards, self.games, c.rounds_per_game
        )?;
        writeln!(
            f,
            "{:<15} {:>12} {:>9} {:>12} {:>9} {:>10}",
            "category", "dealt", "of dealt", "wins", "of wins", "efficiency"
        )?;
        for category in Category::ALL.into_iter().rev() {
            let t = &self.totals;
            let efficiency = match t.win_efficiency(category) {
                Some(e) => percent(e),
                None => format!("{:>9}", "---"),
            };
            writeln!(
                f,
                "{:<15} {:>12} {} {:>12} {} {:>10}",
                category.name(),
                t.dealt[category],
                percent(t.dealt_share(category)),
                t.wins[category],
                percent(t.win_share(category)),
                efficiency
            )?;
        }
        write!(f, "{} rounds played, {} decided among exact ties", self.rounds_played, self.exact_ties)
    }
}
