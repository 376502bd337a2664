//! Errors reported by the rules engine.

use thiserror::Error;

use super::side::Side;
use super::types::{FeatureType, PlayerId, Position};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("position {0} is already occupied")]
    Occupied(Position),

    #[error("position {0} does not border any placed tile")]
    NotAdjacent(Position),

    #[error("tile at {position} does not match its neighbour on side {side}")]
    TerrainMismatch { position: Position, side: Side },

    #[error("board is full ({capacity} tiles)")]
    CapacityExceeded { capacity: usize },

    #[error("at most one meeple can be placed per tile, got {0}")]
    TooManyMeeples(usize),

    #[error("{feature_type:?} feature at {position} is already claimed")]
    FeatureClaimed {
        position: Position,
        feature_type: FeatureType,
    },

    #[error("tile at {position} has no {feature_type:?} feature on side {side}")]
    MissingNeighbourFeature {
        position: Position,
        side: Side,
        feature_type: FeatureType,
    },

    #[error("no city tracked at {position} on side {side}")]
    MissingCity { position: Position, side: Side },

    #[error("no tile at {0}")]
    MissingTile(Position),
}

impl EngineError {
    /// Caller mistakes the caller can recover from by picking another move.
    /// Everything else means the board state is inconsistent.
    pub fn is_invalid_move(&self) -> bool {
        matches!(
            self,
            EngineError::Occupied(_)
                | EngineError::NotAdjacent(_)
                | EngineError::TerrainMismatch { .. }
                | EngineError::CapacityExceeded { .. }
                | EngineError::TooManyMeeples(_)
                | EngineError::FeatureClaimed { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinaryTileError {
    #[error("position {0} does not fit in 8 bits per axis")]
    PositionOutOfRange(Position),

    #[error("player {0} cannot be stored in the owner bitmask")]
    OwnerOutOfRange(PlayerId),

    #[error("meeples of more than one player on a single tile")]
    MultipleOwners,

    #[error("side-less {0:?} meeple collides with another center meeple")]
    AmbiguousCenterMeeple(FeatureType),
}
