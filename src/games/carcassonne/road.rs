//! Road regions, found by flood fill from one road segment.
//!
//! A segment is one road feature of one tile. Crossroads and monastery
//! entrances are segments touching a single edge, so a road stops there.

use std::collections::{BTreeSet, VecDeque};

use super::board::TileLookup;
use super::error::EngineError;
use super::scoring::{road_points, ReturnedMeeple, ScoreReport};
use super::side::PRIMARY_SIDES;
use super::types::{FeatureType, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoadSegment {
    pub position: Position,
    pub feature_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Road {
    members: BTreeSet<RoadSegment>,
    open_ends: usize,
    meeples: Vec<ReturnedMeeple>,
}

impl Road {
    /// Walk every segment connected to road feature `feature_index` of the
    /// tile at `position`.
    pub fn expand<L: TileLookup + ?Sized>(
        lookup: &L,
        position: Position,
        feature_index: usize,
    ) -> Result<Road, EngineError> {
        let mut road = Road::default();
        let mut queue = VecDeque::from([RoadSegment { position, feature_index }]);

        while let Some(segment) = queue.pop_front() {
            if !road.members.insert(segment) {
                continue;
            }
            let tile = lookup
                .tile_at(segment.position)
                .ok_or(EngineError::MissingTile(segment.position))?;
            let Some(feature) = tile.features.get(segment.feature_index) else {
                return Err(EngineError::MissingTile(segment.position));
            };
            if let Some(meeple) = feature.meeple {
                road.meeples.push(ReturnedMeeple {
                    meeple,
                    position: segment.position,
                    feature_index: segment.feature_index,
                });
            }

            for &edge in PRIMARY_SIDES.iter().filter(|&&e| feature.sides().overlaps_side(e)) {
                let next = segment.position.neighbour(edge);
                let Some(neighbour) = lookup.tile_at(next) else {
                    road.open_ends += 1;
                    continue;
                };
                match neighbour.feature_index_at_side(edge.mirror(), FeatureType::Road) {
                    Some(index) => queue.push_back(RoadSegment {
                        position: next,
                        feature_index: index,
                    }),
                    None => {
                        tracing::warn!(
                            position = %next,
                            side = %edge.mirror(),
                            "road continues into a tile without a road"
                        );
                        return Err(EngineError::MissingNeighbourFeature {
                            position: next,
                            side: edge.mirror(),
                            feature_type: FeatureType::Road,
                        });
                    }
                }
            }
        }
        road.meeples.sort();
        Ok(road)
    }

    pub fn members(&self) -> impl Iterator<Item = &RoadSegment> {
        self.members.iter()
    }

    pub fn contains(&self, position: Position, feature_index: usize) -> bool {
        self.members.contains(&RoadSegment { position, feature_index })
    }

    /// Distinct tiles. A tile reached through two of its segments counts once.
    pub fn tile_count(&self) -> usize {
        let positions: BTreeSet<Position> = self.members.iter().map(|s| s.position).collect();
        positions.len()
    }

    pub fn open_ends(&self) -> usize {
        self.open_ends
    }

    pub fn is_completed(&self) -> bool {
        self.open_ends == 0
    }

    pub fn meeples(&self) -> &[ReturnedMeeple] {
        &self.meeples
    }

    /// Empty unless the road is complete or `force` is set.
    pub fn score_report(&self, force: bool) -> ScoreReport {
        if !force && !self.is_completed() {
            return ScoreReport::new();
        }
        ScoreReport::from_meeples(road_points(self.tile_count()), &self.meeples)
    }
}
