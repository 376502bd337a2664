//! Random self-play driver: deals a shuffled tile set, plays uniformly random
//! legal moves and keeps a minimal per-player tally of score and meeples.
//! Used by the simulate CLI and the benches.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::engine::config::SimulationConfig;
use crate::games::carcassonne::board::Board;
use crate::games::carcassonne::error::EngineError;
use crate::games::carcassonne::scoring::{FeatureBreakdown, ScoreReport};
use crate::games::carcassonne::types::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerTally {
    pub score: u32,
    /// Meeples in the player's supply.
    pub meeples: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub seed: u64,
    pub tiles_placed: usize,
    /// Drawn tiles that fit nowhere and were discarded.
    pub tiles_skipped: usize,
    pub players: BTreeMap<PlayerId, PlayerTally>,
    pub end_game: FeatureBreakdown,
}

impl GameSummary {
    /// Players with the highest score.
    pub fn winners(&self) -> Vec<PlayerId> {
        let best = self.players.values().map(|t| t.score).max().unwrap_or(0);
        self.players
            .iter()
            .filter(|(_, t)| t.score == best)
            .map(|(&id, _)| id)
            .collect()
    }
}

fn apply_report(players: &mut BTreeMap<PlayerId, PlayerTally>, report: &ScoreReport) {
    for (player, points) in &report.received_points {
        if let Some(tally) = players.get_mut(player) {
            tally.score += points;
        }
    }
    for (player, meeples) in &report.returned_meeples {
        if let Some(tally) = players.get_mut(player) {
            tally.meeples += meeples.len() as u32;
        }
    }
}

/// Play one game to the end with random moves.
pub fn play_game(config: &SimulationConfig, seed: u64) -> Result<GameSummary, EngineError> {
    let tile_set = config.tile_set.tile_set();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut deck = tile_set.tiles.clone();
    deck.shuffle(&mut rng);

    let mut board = Board::new(&tile_set);
    let mut players: BTreeMap<PlayerId, PlayerTally> = (1..=config.players)
        .map(|id| (PlayerId(id), PlayerTally { score: 0, meeples: config.meeples_per_player }))
        .collect();
    let mut skipped = 0;
    let mut turn = 0usize;

    for tile in deck {
        if !board.tile_has_valid_placement(&tile) {
            tracing::debug!(seed, "tile fits nowhere, discarded");
            skipped += 1;
            continue;
        }
        let player = PlayerId((turn % config.players as usize) as u8 + 1);
        turn += 1;

        let placements = board.get_tile_placements_for(&tile);
        let Some(placement) = placements.choose(&mut rng) else {
            skipped += 1;
            continue;
        };
        let has_meeple = players.get(&player).is_some_and(|t| t.meeples > 0);
        let moves = if has_meeple {
            board.legal_moves_for(placement, player)?
        } else {
            vec![placement.clone()]
        };
        let Some(chosen) = moves.choose(&mut rng).cloned() else {
            continue;
        };
        if chosen.meeple_count() > 0 {
            if let Some(tally) = players.get_mut(&player) {
                tally.meeples -= 1;
            }
        }

        let report = board.place_tile(chosen)?;
        apply_report(&mut players, &report);
    }

    let (report, end_game) = board.score_end_game()?;
    apply_report(&mut players, &report);
    tracing::debug!(seed, tiles = board.tile_count(), skipped, "game finished");

    Ok(GameSummary {
        seed,
        tiles_placed: board.tile_count() - 1,
        tiles_skipped: skipped,
        players,
        end_game,
    })
}

/// Play `config.games` games in parallel, seeds `config.seed..`.
pub fn play_games(config: &SimulationConfig) -> Vec<Result<GameSummary, EngineError>> {
    (0..config.games as u64)
        .into_par_iter()
        .map(|i| play_game(config, config.seed.wrapping_add(i)))
        .collect()
}
