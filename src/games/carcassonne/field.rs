//! Field regions (farms), flood-filled over the packed tile corners.
//!
//! A field only scores at game end: 3 points per completed city it borders.
//! Bordering cities on one tile:
//! - a side-less field, or the only field on its tile, borders every city there;
//! - otherwise a field borders the cities it shares a corner with.

use std::collections::{BTreeSet, VecDeque};

use super::binary_tile::{BinarySide, BinaryTile, ORTHOGONAL_SIDES};
use super::board::TileLookup;
use super::city::{CityId, CityManager};
use super::error::EngineError;
use super::scoring::{field_points, ReturnedMeeple, ScoreReport};
use super::side::Side;
use super::types::{FeatureType, PlacedTile, Position};

/// One field feature of one tile, as the corner slots it covers.
/// `BinarySide::NONE` stands for a field without sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPiece {
    pub position: Position,
    pub sides: BinarySide,
}

#[derive(Debug, Clone)]
pub struct Field {
    seed: FieldPiece,
    pieces: BTreeSet<FieldPiece>,
    meeples: Vec<ReturnedMeeple>,
    cities: BTreeSet<CityId>,
}

impl Field {
    pub fn new(position: Position, sides: BinarySide) -> Self {
        let seed = FieldPiece { position, sides };
        Self {
            seed,
            pieces: BTreeSet::from([seed]),
            meeples: Vec::new(),
            cities: BTreeSet::new(),
        }
    }

    /// Seed from field feature `feature_index` of `tile`.
    pub fn from_feature(tile: &PlacedTile, feature_index: usize) -> Self {
        let sides = tile
            .features
            .get(feature_index)
            .map(|f| BinarySide::from_side(f.sides(), false))
            .unwrap_or(BinarySide::NONE);
        Self::new(tile.position, sides)
    }

    /// Grow to the whole field and collect the completed cities around it.
    pub fn expand<L: TileLookup + ?Sized>(
        &mut self,
        lookup: &L,
        cities: &CityManager,
    ) -> Result<(), EngineError> {
        self.flood(lookup, Some(cities))
    }

    /// Grow to the whole field, ignoring cities. Enough to count meeples.
    pub fn expand_area<L: TileLookup + ?Sized>(&mut self, lookup: &L) -> Result<(), EngineError> {
        self.flood(lookup, None)
    }

    pub fn pieces(&self) -> impl Iterator<Item = &FieldPiece> {
        self.pieces.iter()
    }

    pub fn features_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn cities_count(&self) -> usize {
        self.cities.len()
    }

    pub fn meeple_count(&self) -> usize {
        self.meeples.len()
    }

    pub fn meeples(&self) -> &[ReturnedMeeple] {
        &self.meeples
    }

    pub fn score_report(&self) -> ScoreReport {
        ScoreReport::from_meeples(field_points(self.cities.len()), &self.meeples)
    }

    fn flood<L: TileLookup + ?Sized>(
        &mut self,
        lookup: &L,
        cities: Option<&CityManager>,
    ) -> Result<(), EngineError> {
        let start = lookup
            .binary_tile_at(self.seed.position)
            .ok_or(EngineError::MissingTile(self.seed.position))?;
        let start_sides = if self.seed.sides.is_none() {
            BinarySide::NONE
        } else {
            start.connected_sides(self.seed.sides, FeatureType::Field)
        };

        self.pieces.clear();
        self.meeples.clear();
        self.cities.clear();
        let mut queue = VecDeque::from([FieldPiece {
            position: self.seed.position,
            sides: start_sides,
        }]);

        while let Some(piece) = queue.pop_front() {
            if !self.pieces.insert(piece) {
                continue;
            }
            let tile = lookup
                .tile_at(piece.position)
                .ok_or(EngineError::MissingTile(piece.position))?;
            let binary = lookup
                .binary_tile_at(piece.position)
                .ok_or(EngineError::MissingTile(piece.position))?;

            // a piece can span several field features, and several pieces can share one
            for index in field_feature_indices(tile, piece.sides) {
                let Some(meeple) = tile.features[index].meeple else {
                    continue;
                };
                let returned = ReturnedMeeple {
                    meeple,
                    position: piece.position,
                    feature_index: index,
                };
                if !self.meeples.contains(&returned) {
                    self.meeples.push(returned);
                }
            }

            if let Some(manager) = cities {
                for group in bordering_cities(binary, piece.sides) {
                    let side = group.to_side();
                    let Some(id) = manager.city_at(piece.position, side) else {
                        tracing::warn!(
                            position = %piece.position,
                            %side,
                            "field borders an untracked city"
                        );
                        return Err(EngineError::MissingCity { position: piece.position, side });
                    };
                    if manager.get(id).is_some_and(|city| city.is_completed()) {
                        self.cities.insert(manager.resolve(id));
                    }
                }
            }

            if piece.sides.is_none() {
                continue;
            }
            let open = piece.sides.corners_to_sides() & !binary.feature_sides(FeatureType::City);
            for &edge in ORTHOGONAL_SIDES.iter().filter(|&&e| open.overlaps_side(e)) {
                let next = piece.position + edge.position_from_side();
                let Some(neighbour) = lookup.binary_tile_at(next) else {
                    continue;
                };
                let corners =
                    BinarySide::corner_from_side(piece.sides & edge.sides_to_corners(), edge);
                let sides = neighbour.connected_sides(corners, FeatureType::Field);
                if sides.is_none() {
                    let side = edge.mirror().to_side();
                    tracing::warn!(
                        position = %next,
                        %side,
                        "field continues into a tile without a field"
                    );
                    return Err(EngineError::MissingNeighbourFeature {
                        position: next,
                        side,
                        feature_type: FeatureType::Field,
                    });
                }
                queue.push_back(FieldPiece { position: next, sides });
            }
        }
        self.meeples.sort();
        Ok(())
    }
}

/// Every field feature of `tile` covered by the corner slots `sides`.
fn field_feature_indices(tile: &PlacedTile, sides: BinarySide) -> Vec<usize> {
    if sides.is_none() {
        return tile
            .feature_index_at_side(Side::NONE, FeatureType::Field)
            .into_iter()
            .collect();
    }
    tile.features
        .iter()
        .enumerate()
        .filter(|(_, f)| {
            f.feature_type() == FeatureType::Field
                && BinarySide::from_side(f.sides(), false).overlaps_side(sides)
        })
        .map(|(i, _)| i)
        .collect()
}

fn bordering_cities(binary: BinaryTile, sides: BinarySide) -> Vec<BinarySide> {
    let cities = binary.features_of_type(FeatureType::City);
    if sides.is_none() || binary.features_of_type(FeatureType::Field).len() == 1 {
        return cities;
    }
    let touching = sides.corners_to_sides();
    cities.into_iter().filter(|c| c.overlaps_side(touching)).collect()
}
