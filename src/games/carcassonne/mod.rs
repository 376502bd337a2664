//! Carcassonne rules engine: tiles, region tracking and scoring.

pub mod binary_tile;
pub mod board;
pub mod city;
pub mod error;
pub mod field;
pub mod road;
pub mod scoring;
pub mod side;
pub mod tiles;
pub mod types;

pub use board::{Board, PendingTile, TileLookup};
pub use error::{BinaryTileError, EngineError};
pub use scoring::{FeatureBreakdown, ScoreReport};
