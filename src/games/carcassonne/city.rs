//! City regions and the manager that merges them as tiles arrive.
//!
//! Cities live in an arena indexed by `CityId`. A city absorbed by a merge
//! leaves a redirect behind, so old handles keep resolving to the survivor
//! and region identity is a plain id comparison.

use std::collections::BTreeMap;

use serde::Serialize;

use super::scoring::{city_points, ReturnedMeeple, ScoreReport};
use super::side::{Side, PRIMARY_SIDES};
use super::types::{FeatureType, PlacedFeature, PlacedTile, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CityId(pub usize);

/// One city feature of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CityPiece {
    pub feature_index: usize,
    pub feature: PlacedFeature,
}

impl CityPiece {
    #[inline]
    pub fn sides(&self) -> Side {
        self.feature.sides()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct City {
    pieces: BTreeMap<Position, Vec<CityPiece>>,
    completed: bool,
    scored: bool,
}

impl City {
    pub fn new(position: Position, piece: CityPiece) -> Self {
        let mut city = City::default();
        city.pieces.insert(position, vec![piece]);
        city.check_completed();
        city
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_scored(&self) -> bool {
        self.scored
    }

    pub fn pieces_at(&self, position: Position) -> Option<&[CityPiece]> {
        self.pieces.get(&position).map(Vec::as_slice)
    }

    /// Whether a piece at `position` covers the whole of `side`.
    pub fn has_side_at(&self, position: Position, side: Side) -> bool {
        self.pieces_at(position)
            .is_some_and(|pieces| pieces.iter().any(|p| p.sides().has_side(side)))
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.pieces.keys()
    }

    pub fn tile_count(&self) -> usize {
        self.pieces.len()
    }

    /// Tiles carrying at least one shielded piece of this city.
    pub fn shield_count(&self) -> usize {
        self.pieces
            .values()
            .filter(|pieces| pieces.iter().any(|p| p.feature.feature.has_shield()))
            .count()
    }

    /// Re-evaluate completion. Once complete, a city stays complete.
    pub fn check_completed(&mut self) -> bool {
        if self.completed {
            return true;
        }
        let closed = self.pieces.iter().all(|(&position, pieces)| {
            pieces.iter().all(|piece| {
                PRIMARY_SIDES
                    .iter()
                    .filter(|&&edge| piece.sides().has_side(edge))
                    .all(|&edge| self.has_side_at(position.neighbour(edge), edge.mirror()))
            })
        });
        self.completed = closed;
        closed
    }

    pub fn add_tile(&mut self, position: Position, piece: CityPiece) {
        self.pieces.entry(position).or_default().push(piece);
        self.check_completed();
    }

    /// Absorb every piece of `other`.
    pub fn join(&mut self, other: City) {
        for (position, pieces) in other.pieces {
            self.pieces.entry(position).or_default().extend(pieces);
        }
        self.check_completed();
    }

    pub fn meeples(&self) -> Vec<ReturnedMeeple> {
        self.pieces
            .iter()
            .flat_map(|(&position, pieces)| {
                pieces.iter().filter_map(move |piece| {
                    piece.feature.meeple.map(|meeple| ReturnedMeeple {
                        meeple,
                        position,
                        feature_index: piece.feature_index,
                    })
                })
            })
            .collect()
    }

    pub fn points(&self) -> u32 {
        city_points(self.tile_count(), self.shield_count(), self.completed)
    }

    pub fn score_report(&self) -> ScoreReport {
        ScoreReport::from_meeples(self.points(), &self.meeples())
    }

    fn mark_scored(&mut self) {
        self.scored = true;
        for piece in self.pieces.values_mut().flatten() {
            piece.feature.meeple = None;
        }
    }
}

#[derive(Debug, Clone)]
enum CityEntry {
    Live(City),
    Merged(CityId),
}

#[derive(Debug, Clone, Default)]
pub struct CityManager {
    entries: Vec<CityEntry>,
}

impl CityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow merge redirects to the live city.
    pub fn resolve(&self, mut id: CityId) -> CityId {
        while let Some(CityEntry::Merged(next)) = self.entries.get(id.0) {
            id = *next;
        }
        id
    }

    pub fn get(&self, id: CityId) -> Option<&City> {
        match self.entries.get(self.resolve(id).0) {
            Some(CityEntry::Live(city)) => Some(city),
            _ => None,
        }
    }

    /// Live cities in creation order.
    pub fn cities(&self) -> impl Iterator<Item = (CityId, &City)> {
        self.entries.iter().enumerate().filter_map(|(i, entry)| match entry {
            CityEntry::Live(city) => Some((CityId(i), city)),
            CityEntry::Merged(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.cities().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// City holding a piece at `position` that overlaps `side`.
    pub fn city_at(&self, position: Position, side: Side) -> Option<CityId> {
        self.cities()
            .find(|(_, city)| {
                city.pieces_at(position)
                    .is_some_and(|pieces| pieces.iter().any(|p| p.sides().overlaps_side(side)))
            })
            .map(|(id, _)| id)
    }

    /// For each edge of a tile at `position`, the first city (in creation
    /// order) continuing across it. Linear in the number of cities.
    fn neighbouring_cities(&self, position: Position) -> [Option<CityId>; 4] {
        PRIMARY_SIDES.map(|edge| {
            let neighbour = position.neighbour(edge);
            self.cities()
                .find(|(_, city)| city.has_side_at(neighbour, edge.mirror()))
                .map(|(id, _)| id)
        })
    }

    fn cities_touching(&self, found: &[Option<CityId>; 4], sides: Side) -> Vec<CityId> {
        let mut ids: Vec<CityId> = Vec::new();
        for (edge, id) in PRIMARY_SIDES.iter().zip(found) {
            let Some(id) = id else { continue };
            if !sides.has_side(*edge) {
                continue;
            }
            let id = self.resolve(*id);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// Fold the city features of a freshly placed tile into the regions.
    /// Returns the live cities the tile ended up in.
    pub fn update_cities(&mut self, tile: &PlacedTile) -> Vec<CityId> {
        let found = self.neighbouring_cities(tile.position);
        let mut touched = Vec::new();

        for (feature_index, feature) in tile.features.iter().enumerate() {
            if feature.feature_type() != FeatureType::City {
                continue;
            }
            let piece = CityPiece { feature_index, feature: *feature };
            let targets = self.cities_touching(&found, feature.sides());

            let Some((&survivor, absorbed)) = targets.split_first() else {
                self.entries.push(CityEntry::Live(City::new(tile.position, piece)));
                touched.push(CityId(self.entries.len() - 1));
                continue;
            };
            for &other in absorbed {
                let taken =
                    std::mem::replace(&mut self.entries[other.0], CityEntry::Merged(survivor));
                if let (CityEntry::Live(other_city), CityEntry::Live(city)) =
                    (taken, &mut self.entries[survivor.0])
                {
                    city.join(other_city);
                }
            }
            if let CityEntry::Live(city) = &mut self.entries[survivor.0] {
                city.add_tile(tile.position, piece);
            }
            touched.push(survivor);
        }

        let mut live: Vec<CityId> = Vec::with_capacity(touched.len());
        for id in touched {
            let id = self.resolve(id);
            if !live.contains(&id) {
                live.push(id);
            }
        }
        live
    }

    /// Whether a meeple may go on city feature `feature_index` of a tile
    /// that has not been placed yet.
    pub fn can_place_meeple(&self, tile: &PlacedTile, feature_index: usize) -> bool {
        let Some(feature) = tile.features.get(feature_index) else {
            return false;
        };
        if feature.feature_type() != FeatureType::City {
            return false;
        }
        let found = self.neighbouring_cities(tile.position);
        self.cities_touching(&found, feature.sides())
            .into_iter()
            .filter_map(|id| self.get(id))
            .all(|city| city.meeples().is_empty())
    }

    /// Score cities that have not been scored yet. Without `force` only
    /// completed cities count; with it every remaining city is scored at its
    /// current value.
    pub fn score_cities(&mut self, force: bool) -> ScoreReport {
        let mut report = ScoreReport::new();
        for entry in &mut self.entries {
            let CityEntry::Live(city) = entry else { continue };
            if city.scored || !(force || city.completed) {
                continue;
            }
            report.join(&city.score_report());
            city.mark_scored();
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::carcassonne::tiles;
    use crate::games::carcassonne::types::{Meeple, PlayerId, Tile};

    fn placed(tile: Tile, x: i16, y: i16) -> PlacedTile {
        PlacedTile::from_tile(&tile, Position::new(x, y))
    }

    #[test]
    fn test_single_edge_starts_incomplete_city() {
        let mut manager = CityManager::new();
        manager.update_cities(&placed(tiles::single_city_edge_no_roads(), 0, 0));
        assert_eq!(manager.len(), 1);
        let (_, city) = manager.cities().next().unwrap();
        assert!(!city.is_completed());
        assert_eq!(city.points(), 1);
    }

    #[test]
    fn test_two_caps_complete_city() {
        let mut manager = CityManager::new();
        manager.update_cities(&placed(tiles::single_city_edge_no_roads(), 0, 0));
        let cap = placed(tiles::single_city_edge_no_roads().rotate(2), 0, 1);
        let touched = manager.update_cities(&cap);
        assert_eq!(touched.len(), 1);
        assert_eq!(manager.len(), 1);
        let city = manager.get(touched[0]).unwrap();
        assert!(city.is_completed());
        assert_eq!(city.tile_count(), 2);
        assert_eq!(city.points(), 4);
    }

    #[test]
    fn test_unconnected_edges_stay_separate() {
        let mut manager = CityManager::new();
        manager.update_cities(&placed(tiles::two_city_edges_up_and_down_not_connected(), 0, 0));
        assert_eq!(manager.len(), 2);
        manager.update_cities(&placed(tiles::single_city_edge_no_roads(), 0, -1));
        assert_eq!(manager.len(), 2);
        let completed = manager.cities().filter(|(_, c)| c.is_completed()).count();
        assert_eq!(completed, 1);
    }

    #[test]
    fn test_tile_merges_two_cities() {
        let mut manager = CityManager::new();
        let cap = tiles::single_city_edge_no_roads();
        let top = manager.update_cities(&placed(cap.rotate(2), 0, 1))[0];
        let right = manager.update_cities(&placed(cap.rotate(3), 1, 0))[0];
        assert_ne!(top, right);
        assert_eq!(manager.len(), 2);

        let corner = placed(tiles::two_city_edges_corner_connected(), 0, 0);
        let touched = manager.update_cities(&corner);
        assert_eq!(manager.len(), 1);
        assert_eq!(touched, vec![top]);
        assert_eq!(manager.resolve(right), top);
        let city = manager.get(right).unwrap();
        assert!(city.is_completed());
        assert_eq!(city.tile_count(), 3);
        assert_eq!(city.points(), 6);
    }

    #[test]
    fn test_shielded_city_scoring() {
        let mut manager = CityManager::new();
        let center = placed(tiles::four_city_edges_connected_shield(), 0, 0);
        manager.update_cities(&center);
        for (rotation, (x, y)) in [(2, (0, 1)), (3, (1, 0)), (0, (0, -1))] {
            let cap = tiles::single_city_edge_no_roads().rotate(rotation);
            manager.update_cities(&placed(cap, x, y));
        }
        assert_eq!(manager.score_cities(false), ScoreReport::new());

        let cap = placed(tiles::single_city_edge_no_roads().rotate(1), -1, 0)
            .with_meeple(0, Meeple::new(PlayerId(1)));
        manager.update_cities(&cap);
        let report = manager.score_cities(false);
        assert_eq!(report.received_points[&PlayerId(1)], 12);
        assert_eq!(report.returned_meeples[&PlayerId(1)].len(), 1);

        // already scored
        assert!(manager.score_cities(true).is_empty());
    }

    #[test]
    fn test_forced_scoring_halves_incomplete_city() {
        let mut manager = CityManager::new();
        let tile = placed(tiles::two_city_edges_corner_connected_shield(), 0, 0)
            .with_meeple(0, Meeple::new(PlayerId(2)));
        manager.update_cities(&tile);
        assert!(manager.score_cities(false).is_empty());
        let report = manager.score_cities(true);
        assert_eq!(report.received_points[&PlayerId(2)], 2);
    }

    #[test]
    fn test_meeple_blocked_on_claimed_city() {
        let mut manager = CityManager::new();
        let claimed = placed(tiles::single_city_edge_no_roads(), 0, 0)
            .with_meeple(0, Meeple::new(PlayerId(1)));
        manager.update_cities(&claimed);

        let joining = placed(tiles::two_city_edges_up_and_down_connected(), 0, 1);
        assert!(!manager.can_place_meeple(&joining, 0));

        let elsewhere = placed(tiles::single_city_edge_no_roads(), 5, 5);
        assert!(manager.can_place_meeple(&elsewhere, 0));
        assert!(!manager.can_place_meeple(&elsewhere, 1));
    }

    #[test]
    fn test_completion_is_monotonic() {
        let mut city = City::new(
            Position::ORIGIN,
            CityPiece {
                feature_index: 0,
                feature: tiles::four_city_edges_connected_shield().features[0].into(),
            },
        );
        assert!(!city.check_completed());
        city.completed = true;
        assert!(city.check_completed());
    }
}
