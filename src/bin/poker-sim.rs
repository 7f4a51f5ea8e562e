use clap::Parser;
use log::{error, info};
use poker_sim::config::{CountRange, SimulationConfig};
use poker_sim::game::DrawPolicy;
use poker_sim::report::Report;
use poker_sim::simulation::{ProgressSample, Simulation};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Parser)]
#[clap(version, about = "Deal random poker rounds and tally which hands show up and win")]
struct Cli {
    /// Players per table, a count or an inclusive range like 2-6.
    #[clap(long, short, default_value = "6")]
    players: CountRange,
    /// Hole cards per player, a count or a range.
    #[clap(long, default_value = "2")]
    hole_cards: CountRange,
    /// Community cards per round, a count or a range.
    #[clap(long, default_value = "5")]
    community_cards: CountRange,
    /// Rounds played in each game.
    #[clap(long, short, default_value_t = 10)]
    rounds: u64,
    /// Independent games per configuration.
    #[clap(long, short, default_value_t = 5)]
    games: usize,
    /// Seed for reproducible runs; game i uses seed + i.
    #[clap(long, short)]
    seed: Option<u64>,
    /// Never repeat a card within a round.
    #[clap(long)]
    no_replacement: bool,
    /// Print the reports as JSON instead of tables.
    #[clap(long)]
    json: bool,
    /// Seconds between progress log lines, at most one hour.
    #[clap(long, default_value = "1", value_parser = parse_interval)]
    progress_interval: Duration,
}

const MAX_INTERVAL: Duration = Duration::from_secs(3600);

fn parse_interval(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.trim().parse().map_err(|e| format!("'{s}': {e}"))?;
    let interval = Duration::try_from_secs_f64(secs).map_err(|e| format!("'{s}': {e}"))?;
    if interval.is_zero() || interval > MAX_INTERVAL {
        return Err(format!("'{s}' must be above 0 and at most {} seconds", MAX_INTERVAL.as_secs()));
    }
    Ok(interval)
}

fn log_progress(sample: ProgressSample) {
    let eta = sample.eta().map(|d| format!("{:.0?}", d)).unwrap_or_else(|| "?".to_string());
    info!(
        "{:>5.1}% {}/{} rounds, {:.0} rounds/s, eta {eta}",
        sample.fraction() * 100.0,
        sample.rounds_completed,
        sample.total_rounds,
        sample.rounds_per_second()
    );
}

fn main() -> ExitCode {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp_millis()
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let base = SimulationConfig {
        rounds_per_game: cli.rounds,
        game_count: cli.games,
        draw_policy: if cli.no_replacement {
            DrawPolicy::WithoutReplacement
        } else {
            DrawPolicy::ReshuffleOnExhaustion
        },
        seed: cli.seed,
        ..SimulationConfig::default()
    };
    let batches = match base.sweep(cli.players, cli.hole_cards, cli.community_cards) {
        Ok(batches) => batches,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut reports = Vec::new();
    for config in batches {
        let simulation = match Simulation::new(config.clone()) {
            Ok(s) => s,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        };
        match simulation.run_observed(&log_progress, cli.progress_interval) {
            Ok(totals) => {
                let report = Report::new(config, totals);
                if !cli.json {
                    println!("{report}\n");
                }
                reports.push(report);
            }
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("cannot serialize reports: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
