use crate::deck::{Deck, DeckError, DECK_SIZE};
use crate::evaluator::{evaluate, Category, EvalError, EvaluatedHand};
use crate::tally::HandTally;
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;

/// What happens when a round needs more cards than are left in the deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DrawPolicy {
    /// Reshuffle as soon as a single draw runs out, even mid-round. Cards
    /// already dealt this round can then be dealt again.
    #[default]
    ReshuffleOnExhaustion,
    /// Reshuffle before the round if the whole round does not fit, so a
    /// round never repeats a card. Needs the round to fit in one deck.
    WithoutReplacement,
}

/// Largest table a validated config may seat.
pub const MAX_PLAYERS: usize = 1_000;

/// Shape of a single deal: who gets how many cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableConfig {
    pub players: usize,
    pub hole_cards: usize,
    pub community_cards: usize,
    pub draw_policy: DrawPolicy,
}

impl TableConfig {
    /// Cards dealt per round; `None` if the count overflows.
    pub fn checked_round_demand(&self) -> Option<usize> {
        self.players.checked_mul(self.hole_cards)?.checked_add(self.community_cards)
    }

    /// Cards dealt per round, saturating at `usize::MAX`.
    pub fn round_demand(&self) -> usize {
        self.checked_round_demand().unwrap_or(usize::MAX)
    }

    /// Cards each player evaluates.
    pub fn pool_size(&self) -> usize {
        self.hole_cards.saturating_add(self.community_cards)
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { players: 6, hole_cards: 2, community_cards: 5, draw_policy: DrawPolicy::default() }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameError {
    #[error("dealing failed: {0}")]
    Deck(#[from] DeckError),
    #[error("hand evaluation failed: {0}")]
    Eval(#[from] EvalError),
    #[error("no contenders to pick a round winner from")]
    NoContenders,
}

/// Result of one round.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct RoundOutcome {
    /// Seat of the round winner.
    pub winner: usize,
    pub category: Category,
    /// Players that reached the winning category.
    pub contenders: usize,
    /// Another contender's best five matched the winner's exactly.
    pub exact_tie: bool,
    /// Every player's hand, by seat.
    pub hands: Vec<EvaluatedHand>,
}

/// Tallies of a finished (or cancelled) game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameResult {
    pub rounds_played: u64,
    /// Every player's category, every round.
    pub dealt: HandTally,
    /// The winning category, once per round.
    pub wins: HandTally,
    /// Rounds whose winner was picked among exact ties.
    pub exact_ties: u64,
}

/// One game: a deck of its own and the running tallies.
#[derive(Debug)]
pub struct Game {
    table: TableConfig,
    deck: Deck,
    result: GameResult,
}

impl Game {
    pub fn new(table: TableConfig, deck: Deck) -> Self {
        Self { table, deck, result: GameResult::default() }
    }

    pub fn table(&self) -> &TableConfig {
        &self.table
    }

    pub fn result(&self) -> &GameResult {
        &self.result
    }

    /// Deal community cards, deal and evaluate each player, pick the winner,
    /// update both tallies.
    pub fn play_round(&mut self) -> Result<RoundOutcome, GameError> {
        if self.table.draw_policy == DrawPolicy::WithoutReplacement
            && self.deck.reserve(self.table.round_demand())?
        {
            log::debug!("reshuffled before round {}", self.result.rounds_played + 1);
        }

        let community = self.deck.draw(self.table.community_cards)?;
        let mut pool = Vec::with_capacity(self.table.pool_size().min(2 * DECK_SIZE));
        let mut hands = Vec::with_capacity(self.table.players.min(MAX_PLAYERS));
        for _ in 0..self.table.players {
            pool.clear();
            pool.extend(self.deck.draw(self.table.hole_cards)?);
            pool.extend_from_slice(&community);
            let hand = evaluate(&pool)?;
            self.result.dealt.record(hand.category);
            hands.push(hand);
        }

        let outcome = pick_winner(hands)?;
        self.result.wins.record(outcome.category);
        self.result.rounds_played += 1;
        if outcome.exact_tie {
            self.result.exact_ties += 1;
        }
        Ok(outcome)
    }

    /// Play up to `rounds` rounds, calling `after_round` after each one.
    /// Stops early when it returns `ControlFlow::Break`.
    pub fn play_rounds<F>(&mut self, rounds: u64, mut after_round: F) -> Result<(), GameError>
    where
        F: FnMut(&RoundOutcome) -> ControlFlow<()>,
    {
        for _ in 0..rounds {
            let outcome = self.play_round()?;
            if after_round(&outcome).is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Play `rounds` rounds and hand back the tallies.
    ///
    /// ```
    /// use poker_sim::deck::Deck;
    /// use poker_sim::game::{Game, TableConfig};
    ///
    /// let result = Game::new(TableConfig::default(), Deck::seeded(1)).play_game(100).unwrap();
    /// assert_eq!(result.rounds_played, 100);
    /// assert_eq!(result.dealt.total(), 600);
    /// assert_eq!(result.wins.total(), 100);
    /// ```
    pub fn play_game(mut self, rounds: u64) -> Result<GameResult, GameError> {
        self.play_rounds(rounds, |_| ControlFlow::Continue(()))?;
        Ok(self.result)
    }

    pub fn into_result(self) -> GameResult {
        self.result
    }
}

/// Highest category wins; among contenders the best five decide, card by
/// card. On an exact tie the first contender in seat order keeps the win.
pub fn pick_winner(hands: Vec<EvaluatedHand>) -> Result<RoundOutcome, GameError> {
    let category = hands.iter().map(|h| h.category).max().ok_or(GameError::NoContenders)?;

    let mut winner: Option<usize> = None;
    let mut contenders = 0;
    let mut exact_tie = false;
    for (seat, hand) in hands.iter().enumerate().filter(|(_, h)| h.category == category) {
        contenders += 1;
        let Some(best) = winner else {
            winner = Some(seat);
            continue;
        };
        match hand.cmp_best_five(&hands[best]) {
            Ordering::Greater => {
                winner = Some(seat);
                exact_tie = false;
            }
            Ordering::Equal => exact_tie = true,
            Ordering::Less => {}
        }
    }

    let winner = winner.ok_or(GameError::NoContenders)?;
    Ok(RoundOutcome { winner, category, contenders, exact_tie, hands })
}
