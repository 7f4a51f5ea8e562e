//! Parallel multi-game runs and the merge of their tallies.
//!
//! Every game owns its deck, generator and tallies; the only state the
//! worker threads share is [`Progress`], which is advisory. Results are
//! merged once, on the calling thread, after every game has returned.

use crate::config::{ConfigError, SimulationConfig};
use crate::deck::Deck;
use crate::evaluator::Category;
use crate::game::{Game, GameError, GameResult};
use crate::tally::{HandCount, HandTally};
use rayon::prelude::*;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, Thread};
use std::time::{Duration, Instant};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("game {index} failed: {source}")]
    Game { index: usize, source: GameError },
}

/// Shared round counter and cancellation flag.
///
/// Counts are incremented with relaxed ordering; readers may see slightly
/// stale values but never a decrease within one run. Each run rewinds the
/// counter and the clock. Cancellation is sticky: once set, every later run
/// returns at once without playing a game.
#[derive(Debug)]
pub struct Progress {
    rounds_completed: AtomicU64,
    total_rounds: u64,
    cancelled: AtomicBool,
    started: Mutex<Option<Instant>>,
}

/// Point-in-time view of a [`Progress`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    pub rounds_completed: u64,
    pub total_rounds: u64,
    pub elapsed: Duration,
}

impl Progress {
    pub fn new(total_rounds: u64) -> Self {
        Self {
            rounds_completed: AtomicU64::new(0),
            total_rounds,
            cancelled: AtomicBool::new(false),
            started: Mutex::new(None),
        }
    }

    fn restart(&self) {
        self.rounds_completed.store(0, Ordering::Relaxed);
        *self.started.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    pub fn record_round(&self) {
        self.rounds_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rounds_completed(&self) -> u64 {
        self.rounds_completed.load(Ordering::Relaxed)
    }

    /// Ask running games to stop at their next round boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn sample(&self) -> ProgressSample {
        ProgressSample {
            rounds_completed: self.rounds_completed(),
            total_rounds: self.total_rounds,
            elapsed: self
                .started
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .map(|t| t.elapsed())
                .unwrap_or_default(),
        }
    }
}

impl ProgressSample {
    /// Completed share in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total_rounds == 0 {
            return 1.0;
        }
        (self.rounds_completed as f64 / self.total_rounds as f64).clamp(0.0, 1.0)
    }

    pub fn rounds_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.rounds_completed as f64 / secs
        } else {
            0.0
        }
    }

    /// Time left at the current pace; `None` before the first round.
    pub fn eta(&self) -> Option<Duration> {
        let fraction = self.fraction();
        if fraction <= 0.0 {
            return None;
        }
        let total = self.elapsed.as_secs_f64() / fraction;
        Some(Duration::from_secs_f64((total - self.elapsed.as_secs_f64()).max(0.0)))
    }
}

/// Receives progress samples while a simulation runs.
pub trait ProgressObserver: Sync {
    fn observe(&self, sample: ProgressSample);
}

impl<F> ProgressObserver for F
where
    F: Fn(ProgressSample) + Sync,
{
    fn observe(&self, sample: ProgressSample) {
        self(sample)
    }
}

/// Element-wise sums over every game of a simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationTotals {
    pub games: usize,
    pub rounds_played: u64,
    pub dealt: HandTally,
    pub wins: HandTally,
    pub exact_ties: u64,
}

impl SimulationTotals {
    /// Fold one game's result in.
    pub fn merge(&mut self, result: &GameResult) {
        self.games += 1;
        self.rounds_played += result.rounds_played;
        self.dealt += &result.dealt;
        self.wins += &result.wins;
        self.exact_ties += result.exact_ties;
    }

    /// Combine two partial totals.
    pub fn combine(mut self, other: &SimulationTotals) -> Self {
        self.games += other.games;
        self.rounds_played += other.rounds_played;
        self.dealt += &other.dealt;
        self.wins += &other.wins;
        self.exact_ties += other.exact_ties;
        self
    }

    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a GameResult>,
    {
        results.into_iter().fold(Self::default(), |mut totals, r| {
            totals.merge(r);
            totals
        })
    }

    /// Hands evaluated across all rounds and players.
    pub fn hands_dealt(&self) -> u64 {
        self.dealt.total()
    }

    pub fn dealt_rows(&self) -> Vec<HandCount> {
        self.dealt.rows()
    }

    pub fn win_rows(&self) -> Vec<HandCount> {
        self.wins.rows()
    }

    /// Share of all dealt hands that landed in `category`.
    pub fn dealt_share(&self, category: Category) -> f64 {
        ratio(self.dealt[category], self.hands_dealt()).unwrap_or(0.0)
    }

    /// Share of rounds won with `category`.
    pub fn win_share(&self, category: Category) -> f64 {
        ratio(self.wins[category], self.rounds_played).unwrap_or(0.0)
    }

    /// How often a dealt `category` went on to win; `None` if never dealt.
    pub fn win_efficiency(&self, category: Category) -> Option<f64> {
        ratio(self.wins[category], self.dealt[category])
    }
}

fn ratio(part: u64, whole: u64) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64)
}

/// A validated configuration plus the progress handle its run reports to.
///
/// ```
/// use poker_sim::config::SimulationConfig;
/// use poker_sim::simulation::Simulation;
///
/// let config = SimulationConfig { seed: Some(1), ..SimulationConfig::default() };
/// let totals = Simulation::new(config).unwrap().run().unwrap();
/// assert_eq!(totals.rounds_played, 50);
/// assert_eq!(totals.wins.total(), 50);
/// ```
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    progress: Arc<Progress>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let progress = Arc::new(Progress::new(config.total_rounds()));
        Ok(Self { config, progress })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Handle for progress readers and for cancelling from another thread.
    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    /// Play every game on the rayon pool, wait for all of them, then merge.
    /// The first failing game aborts the whole run.
    pub fn run(&self) -> Result<SimulationTotals, SimulationError> {
        let c = &self.config;
        log::info!(
            "simulating {} games x {} rounds: {} players, {} hole, {} community",
            c.game_count,
            c.rounds_per_game,
            c.players,
            c.hole_cards,
            c.community_cards
        );
        self.progress.restart();

        let results = (0..c.game_count)
            .into_par_iter()
            .map(|index| self.play_game(index))
            .collect::<Result<Vec<Option<GameResult>>, SimulationError>>()?;

        let totals = SimulationTotals::from_results(results.iter().flatten());
        if self.progress.is_cancelled() {
            log::warn!("simulation cancelled after {} of {} rounds", totals.rounds_played, c.total_rounds());
        }
        log::info!(
            "finished {} rounds in {:.2?}",
            totals.rounds_played,
            self.progress.sample().elapsed
        );
        Ok(totals)
    }

    /// Like [`Simulation::run`], sampling progress every `interval` on a
    /// separate thread. The observer always sees one last sample after the
    /// games finish, and the sampler stops even if a game panics.
    pub fn run_observed(
        &self,
        observer: &dyn ProgressObserver,
        interval: Duration,
    ) -> Result<SimulationTotals, SimulationError> {
        self.sampled(observer, interval, || self.run())
    }

    fn sampled<R>(&self, observer: &dyn ProgressObserver, interval: Duration, work: impl FnOnce() -> R) -> R {
        let done = AtomicBool::new(false);
        thread::scope(|s| {
            let sampler = s.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    observer.observe(self.progress.sample());
                    thread::park_timeout(interval);
                }
                observer.observe(self.progress.sample());
            });
            let _stop = StopSampler { done: &done, sampler: sampler.thread().clone() };
            work()
        })
    }

    /// Plays game `index`; `None` when cancelled before it started.
    fn play_game(&self, index: usize) -> Result<Option<GameResult>, SimulationError> {
        if self.progress.is_cancelled() {
            return Ok(None);
        }
        let deck = match self.config.seed {
            Some(seed) => Deck::seeded(seed.wrapping_add(index as u64)),
            None => Deck::from_entropy(),
        };
        let mut game = Game::new(self.config.table(), deck);
        game.play_rounds(self.config.rounds_per_game, |_| {
            self.progress.record_round();
            if self.progress.is_cancelled() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .map_err(|source| SimulationError::Game { index, source })?;

        let result = game.into_result();
        log::debug!("game {index} finished after {} rounds", result.rounds_played);
        Ok(Some(result))
    }
}

/// Wakes and stops the sampler thread when dropped, unwinding included.
struct StopSampler<'a> {
    done: &'a AtomicBool,
    sampler: Thread,
}

impl Drop for StopSampler<'_> {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Release);
        self.sampler.unpark();
    }
}

/// Validate `config`, run all of its games and merge them.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationTotals, SimulationError> {
    Simulation::new(config.clone())?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::DrawPolicy;

    fn seeded(players: usize, rounds: u64, games: usize) -> SimulationConfig {
        SimulationConfig {
            players,
            rounds_per_game: rounds,
            game_count: games,
            seed: Some(2024),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_running() {
        let config = SimulationConfig { players: 0, ..SimulationConfig::default() };
        assert_eq!(run_simulation(&config), Err(SimulationError::Config(ConfigError::NoPlayers)));
    }

    #[test]
    fn totals_respect_sum_invariants() {
        let totals = run_simulation(&seeded(4, 250, 8)).unwrap();
        assert_eq!(totals.games, 8);
        assert_eq!(totals.rounds_played, 2000);
        assert_eq!(totals.hands_dealt(), 4 * 2000);
        assert_eq!(totals.wins.total(), 2000);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let a = run_simulation(&seeded(6, 100, 6)).unwrap();
        let b = run_simulation(&seeded(6, 100, 6)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unseeded_runs_still_sum_correctly() {
        let config = SimulationConfig { seed: None, ..seeded(3, 40, 3) };
        let totals = run_simulation(&config).unwrap();
        assert_eq!(totals.hands_dealt(), 3 * 120);
        assert_eq!(totals.wins.total(), 120);
    }

    #[test]
    fn progress_counts_every_round() {
        let sim = Simulation::new(seeded(2, 30, 4)).unwrap();
        sim.run().unwrap();
        let sample = sim.progress().sample();
        assert_eq!(sample.rounds_completed, 120);
        assert_eq!(sample.total_rounds, 120);
        assert_eq!(sample.fraction(), 1.0);
    }

    #[test]
    fn cancelled_simulation_plays_nothing_new() {
        let sim = Simulation::new(seeded(2, 1_000, 4)).unwrap();
        sim.progress().cancel();
        let totals = sim.run().unwrap();
        assert_eq!(totals.games, 0);
        assert_eq!(totals.rounds_played, 0);
        assert!(totals.dealt.is_empty());
        assert_eq!(sim.run().unwrap(), SimulationTotals::default());
    }

    #[test]
    fn each_run_rewinds_the_round_counter() {
        let sim = Simulation::new(seeded(2, 25, 2)).unwrap();
        let first = sim.run().unwrap();
        let second = sim.run().unwrap();
        assert_eq!(first, second);
        assert_eq!(sim.progress().rounds_completed(), 50);
        assert_eq!(sim.progress().sample().fraction(), 1.0);
    }

    #[test]
    fn sampler_stops_when_the_work_panics() {
        let sim = Simulation::new(seeded(2, 10, 1)).unwrap();
        let samples = Mutex::new(0usize);
        let observer = |_: ProgressSample| *samples.lock().unwrap() += 1;
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            sim.sampled(&observer, Duration::from_secs(3600), || -> u32 { panic!("game failed") })
        }));
        assert!(outcome.is_err());
        assert!(*samples.lock().unwrap_or_else(PoisonError::into_inner) >= 1);
    }

    #[test]
    fn panicking_observer_does_not_hang_the_run() {
        let sim = Simulation::new(seeded(2, 10, 2)).unwrap();
        let observer = |_: ProgressSample| panic!("observer failed");
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            sim.run_observed(&observer, Duration::from_millis(1))
        }));
        assert!(outcome.is_err());
        assert_eq!(sim.progress().rounds_completed(), 40);
    }

    #[test]
    fn observer_sees_final_sample() {
        let sim = Simulation::new(seeded(3, 50, 4)).unwrap();
        let samples = Mutex::new(Vec::new());
        let observer = |s: ProgressSample| samples.lock().unwrap().push(s);
        sim.run_observed(&observer, Duration::from_millis(1)).unwrap();
        let samples = samples.into_inner().unwrap();
        let last = samples.last().unwrap();
        assert_eq!(last.rounds_completed, 200);
        assert!(samples.windows(2).all(|w| w[0].rounds_completed <= w[1].rounds_completed));
    }

    #[test]
    fn without_replacement_runs() {
        let config = SimulationConfig { draw_policy: DrawPolicy::WithoutReplacement, ..seeded(7, 100, 2) };
        let totals = run_simulation(&config).unwrap();
        assert_eq!(totals.wins.total(), 200);
    }

    #[test]
    fn shares_and_efficiency() {
        let mut r = GameResult::default();
        r.rounds_played = 2;
        r.dealt.record(Category::OnePair);
        r.dealt.record(Category::OnePair);
        r.dealt.record(Category::HighCard);
        r.dealt.record(Category::Flush);
        r.wins.record(Category::OnePair);
        r.wins.record(Category::Flush);
        let totals = SimulationTotals::from_results([&r]);

        assert_eq!(totals.dealt_share(Category::OnePair), 0.5);
        assert_eq!(totals.win_share(Category::Flush), 0.5);
        assert_eq!(totals.win_efficiency(Category::OnePair), Some(0.5));
        assert_eq!(totals.win_efficiency(Category::Flush), Some(1.0));
        assert_eq!(totals.win_efficiency(Category::RoyalFlush), None);
        assert_eq!(SimulationTotals::default().dealt_share(Category::Flush), 0.0);
    }

    #[test]
    fn sample_eta_and_speed() {
        let s = ProgressSample { rounds_completed: 25, total_rounds: 100, elapsed: Duration::from_secs(5) };
        assert_eq!(s.fraction(), 0.25);
        assert_eq!(s.rounds_per_second(), 5.0);
        assert_eq!(s.eta(), Some(Duration::from_secs(15)));
        let fresh = ProgressSample { rounds_completed: 0, total_rounds: 100, elapsed: Duration::ZERO };
        assert_eq!(fresh.eta(), None);
    }
}
