//! poker-sim: Monte-Carlo deal simulator and hand evaluator
//!
//! Goals:
//! - Deterministic evaluation of any 5..=7 card pool (larger pools work too)
//! - Independent games run in parallel, merged into per-category totals
//! - No panics for invalid input; use `Result` for recoverable errors
//!
//! ## Quick start: evaluate a seven-card pool
//! ```
//! use poker_sim::cards::parse_cards;
//! use poker_sim::evaluator::{evaluate, Category};
//!
//! let cards = parse_cards("As Ks Qs Js Ts 4h 2c").unwrap();
//! let hand = evaluate(&cards).unwrap();
//! assert_eq!(hand.category, Category::RoyalFlush);
//! assert_eq!(hand.kickers.len(), 2);
//! ```
//!
//! ## Quick start: run a seeded simulation
//! ```
//! use poker_sim::config::SimulationConfig;
//! use poker_sim::simulation::run_simulation;
//!
//! let config = SimulationConfig { players: 4, seed: Some(7), ..SimulationConfig::default() };
//! let totals = run_simulation(&config).unwrap();
//! assert_eq!(totals.hands_dealt(), 4 * totals.rounds_played);
//! ```
//!
//! ## CLI
//! ```sh
//! cargo run --release --bin poker-sim -- --players 2-6 --games 8 --rounds 10000
//! ```

pub mod cards;
pub mod config;
pub mod deck;
pub mod evaluator;
pub mod game;
pub mod report;
pub mod simulation;
pub mod tally;

pub use evaluator::{evaluate, Category, EvaluatedHand};
pub use simulation::{run_simulation, Simulation, SimulationError, SimulationTotals};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
