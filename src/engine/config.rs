//! Simulation settings, loaded from TOML at runtime for the simulate CLI.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::games::carcassonne::tiles::TileSet;

/// Which tiles a simulated game is played with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileSetKind {
    #[default]
    Standard,
    Mini,
}

impl TileSetKind {
    pub fn tile_set(self) -> TileSet {
        match self {
            TileSetKind::Standard => TileSet::standard(),
            TileSetKind::Mini => TileSet::mini(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub players: u8,
    /// Seed of the first game; game `i` uses `seed + i`.
    pub seed: u64,
    pub games: usize,
    pub tile_set: TileSetKind,
    pub meeples_per_player: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            players: 2,
            seed: 42,
            games: 100,
            tile_set: TileSetKind::Standard,
            meeples_per_player: 7,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.players == 0 {
            return Err("players must be at least 1".into());
        }
        Ok(())
    }
}

/// Load settings from a TOML file at the given path. Missing keys keep
/// their defaults.
pub fn load_config(path: &Path) -> Result<SimulationConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let config: SimulationConfig =
        toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    config.validate().map_err(|e| format!("Invalid {}: {}", path.display(), e))?;
    Ok(config)
}

/// Try well-known paths, falling back to defaults if none loads.
pub fn load_default_config() -> SimulationConfig {
    let candidates = ["simulation.toml", "../simulation.toml", "/etc/meeple/simulation.toml"];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(path = %p.display(), "loaded simulation config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %p.display(),
                        error = %e,
                        "failed to load simulation config"
                    );
                }
            }
        }
    }
    tracing::info!("no simulation.toml found, using built-in defaults");
    SimulationConfig::default()
}
