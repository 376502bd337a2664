//! Simulate CLI: play random self-play games and print a summary.
//!
//! Usage:
//!   cargo run --release --bin simulate -- --games 200 --players 3
//!   cargo run --release --bin simulate -- --config simulation.toml --json

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use meeple_rules_engine::engine::config::{load_config, load_default_config, TileSetKind};
use meeple_rules_engine::engine::simulator::play_games;

#[derive(Parser)]
#[command(name = "simulate", about = "Play random Carcassonne games against the rules engine")]
struct Cli {
    /// Path to simulation.toml (default: auto-discover)
    #[arg(long, env = "MEEPLE_SIM_CONFIG")]
    config: Option<PathBuf>,

    /// Number of games to play
    #[arg(long, env = "MEEPLE_SIM_GAMES")]
    games: Option<usize>,

    /// Seed of the first game
    #[arg(long, env = "MEEPLE_SIM_SEED")]
    seed: Option<u64>,

    /// Number of players
    #[arg(long)]
    players: Option<u8>,

    /// Tile set: "standard" or "mini"
    #[arg(long)]
    tile_set: Option<String>,

    /// Print every game summary as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| format!("Failed to load config: {}", e))?,
        None => load_default_config(),
    };
    if let Some(games) = cli.games {
        config.games = games;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(players) = cli.players {
        config.players = players;
    }
    if let Some(v) = cli.tile_set.as_deref() {
        config.tile_set = match v {
            "standard" => TileSetKind::Standard,
            "mini" => TileSetKind::Mini,
            other => return Err(format!("unknown tile set '{}'", other).into()),
        };
    }
    config.validate()?;

    tracing::info!(
        games = config.games,
        players = config.players,
        seed = config.seed,
        tile_set = ?config.tile_set,
        "starting simulation"
    );
    let start = Instant::now();
    let results = play_games(&config);
    let elapsed = start.elapsed();

    let mut failures = 0;
    let mut total_points = 0u64;
    let mut skipped = 0usize;
    for result in &results {
        match result {
            Ok(summary) => {
                total_points += summary.players.values().map(|t| t.score as u64).sum::<u64>();
                skipped += summary.tiles_skipped;
                if cli.json {
                    println!("{}", serde_json::to_string(summary)?);
                }
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(error = %e, "game aborted");
            }
        }
    }

    let finished = results.len() - failures;
    tracing::info!(
        finished,
        failures,
        skipped_tiles = skipped,
        avg_points = total_points as f64 / finished.max(1) as f64,
        elapsed_ms = elapsed.as_millis() as u64,
        "simulation done"
    );
    Ok(())
}
