//! Board: tile placement validation, region updates and scoring.
//!
//! Position coordinates around the starting tile:
//!
//! ```text
//! (-1, 1)  (0, 1)  (1, 1)
//! (-1, 0)  (0, 0)  (1, 0)
//! (-1,-1)  (0,-1)  (1,-1)
//! ```

use std::collections::{BTreeSet, HashMap};

use super::binary_tile::BinaryTile;
use super::city::CityManager;
use super::error::EngineError;
use super::field::Field;
use super::road::Road;
use super::scoring::{monastery_points, FeatureBreakdown, ReturnedMeeple, ScoreReport};
use super::side::{EDGE_SIDES, PRIMARY_SIDES};
use super::tiles::TileSet;
use super::types::{FeatureType, Meeple, PlacedTile, PlayerId, Position, Tile};

/// Read access to placed tiles. Region flood fills only need this much,
/// so they run on the board, on a plain map or on a board with one extra
/// tile that has not been committed yet.
pub trait TileLookup {
    fn tile_at(&self, position: Position) -> Option<&PlacedTile>;

    /// Packed geometry of the tile at `position` (no meeples, no position).
    fn binary_tile_at(&self, position: Position) -> Option<BinaryTile> {
        self.tile_at(position).map(|tile| BinaryTile::from_tile(&tile.to_tile()))
    }
}

impl TileLookup for HashMap<Position, PlacedTile> {
    fn tile_at(&self, position: Position) -> Option<&PlacedTile> {
        self.get(&position)
    }
}

/// A lookup with `tile` laid over `base`.
pub struct PendingTile<'a, L: TileLookup + ?Sized> {
    base: &'a L,
    tile: &'a PlacedTile,
}

impl<'a, L: TileLookup + ?Sized> PendingTile<'a, L> {
    pub fn new(base: &'a L, tile: &'a PlacedTile) -> Self {
        Self { base, tile }
    }
}

impl<L: TileLookup + ?Sized> TileLookup for PendingTile<'_, L> {
    fn tile_at(&self, position: Position) -> Option<&PlacedTile> {
        if position == self.tile.position {
            Some(self.tile)
        } else {
            self.base.tile_at(position)
        }
    }

    fn binary_tile_at(&self, position: Position) -> Option<BinaryTile> {
        if position == self.tile.position {
            Some(BinaryTile::from_tile(&self.tile.to_tile()))
        } else {
            self.base.binary_tile_at(position)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    /// Placement order; `tiles[0]` is the starting tile.
    tiles: Vec<PlacedTile>,
    /// Geometry of `tiles[i]`, kept alongside for field flood fills.
    geometry: Vec<BinaryTile>,
    index: HashMap<Position, usize>,
    capacity: usize,
    placeable_positions: Vec<Position>,
    cities: CityManager,
}

impl Board {
    /// Board holding the starting tile of `tile_set` at (0,0).
    pub fn new(tile_set: &TileSet) -> Self {
        let starting = PlacedTile::from_tile(&tile_set.starting_tile, Position::ORIGIN);
        let mut cities = CityManager::new();
        cities.update_cities(&starting);
        Self {
            geometry: vec![BinaryTile::from_tile(&tile_set.starting_tile)],
            tiles: vec![starting],
            index: HashMap::from([(Position::ORIGIN, 0)]),
            capacity: tile_set.capacity(),
            placeable_positions: Position::ORIGIN.neighbours().to_vec(),
            cities,
        }
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> &[PlacedTile] {
        &self.tiles
    }

    pub fn get_tile_at(&self, position: Position) -> Option<&PlacedTile> {
        self.index.get(&position).map(|&i| &self.tiles[i])
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Empty positions bordering at least one tile, in discovery order.
    pub fn placeable_positions(&self) -> &[Position] {
        &self.placeable_positions
    }

    pub fn city_manager(&self) -> &CityManager {
        &self.cities
    }

    /// Every rotation of `tile` on every frontier position whose borders
    /// match. Meeples are not considered.
    pub fn get_tile_placements_for(&self, tile: &Tile) -> Vec<PlacedTile> {
        let mut placements = Vec::new();
        for rotated in tile.rotations() {
            for &position in &self.placeable_positions {
                let placement = PlacedTile::from_tile(&rotated, position);
                if self.is_position_valid(&placement).is_ok() {
                    placements.push(placement);
                }
            }
        }
        placements
    }

    pub fn tile_has_valid_placement(&self, tile: &Tile) -> bool {
        tile.rotations().iter().any(|rotated| {
            self.placeable_positions.iter().any(|&position| {
                self.is_position_valid(&PlacedTile::from_tile(rotated, position))
                    .is_ok()
            })
        })
    }

    /// `placement` as is, plus one variant per feature that `owner` could
    /// legally put a meeple on. `placement` must be valid and meeple-free.
    pub fn legal_moves_for(
        &self,
        placement: &PlacedTile,
        owner: PlayerId,
    ) -> Result<Vec<PlacedTile>, EngineError> {
        let mut moves = vec![placement.clone()];
        for index in 0..placement.features.len() {
            let candidate = placement.clone().with_meeple(index, Meeple::new(owner));
            if self.meeple_allowed(&candidate, index)? {
                moves.push(candidate);
            }
        }
        Ok(moves)
    }

    /// Every borderline half-edge must meet the same terrain. A road on a
    /// neighbour must also continue into this tile, since roads share their
    /// edges with fields.
    fn is_position_valid(&self, tile: &PlacedTile) -> Result<(), EngineError> {
        for feature in &tile.features {
            for &half in EDGE_SIDES.iter().filter(|&&h| feature.sides().has_side(h)) {
                let Some(neighbour) = self.get_tile_at(tile.position.neighbour(half)) else {
                    continue;
                };
                if neighbour.feature_at_side(half.mirror(), feature.feature_type()).is_none() {
                    return Err(EngineError::TerrainMismatch {
                        position: tile.position,
                        side: half,
                    });
                }
            }
        }
        for &edge in &PRIMARY_SIDES {
            let Some(neighbour) = self.get_tile_at(tile.position.neighbour(edge)) else {
                continue;
            };
            if neighbour.feature_at_side(edge.mirror(), FeatureType::Road).is_some()
                && tile.feature_at_side(edge, FeatureType::Road).is_none()
            {
                return Err(EngineError::TerrainMismatch { position: tile.position, side: edge });
            }
        }
        Ok(())
    }

    /// Full legality check of a placement, meeple included.
    pub fn can_be_placed(&self, tile: &PlacedTile) -> Result<(), EngineError> {
        if self.index.contains_key(&tile.position) {
            return Err(EngineError::Occupied(tile.position));
        }
        if !self.placeable_positions.contains(&tile.position) {
            return Err(EngineError::NotAdjacent(tile.position));
        }
        self.is_position_valid(tile)?;

        let meeple_count = tile.meeple_count();
        if meeple_count > 1 {
            return Err(EngineError::TooManyMeeples(meeple_count));
        }
        if let Some(index) = tile.features.iter().position(|f| f.meeple.is_some()) {
            if !self.meeple_allowed(tile, index)? {
                return Err(EngineError::FeatureClaimed {
                    position: tile.position,
                    feature_type: tile.features[index].feature_type(),
                });
            }
        }
        Ok(())
    }

    /// Whether the region of feature `index` on the not yet placed `tile`
    /// is free of other meeples.
    fn meeple_allowed(&self, tile: &PlacedTile, index: usize) -> Result<bool, EngineError> {
        let Some(feature) = tile.features.get(index) else {
            return Ok(false);
        };
        let only_this = |meeples: &[ReturnedMeeple]| {
            meeples
                .iter()
                .all(|m| m.position == tile.position && m.feature_index == index)
        };
        let pending = PendingTile::new(self, tile);
        let allowed = match feature.feature_type() {
            FeatureType::City => self.cities.can_place_meeple(tile, index),
            FeatureType::Road => only_this(Road::expand(&pending, tile.position, index)?.meeples()),
            FeatureType::Field => {
                let mut field = Field::from_feature(tile, index);
                field.expand_area(&pending)?;
                only_this(field.meeples())
            }
            FeatureType::Monastery => true,
        };
        Ok(allowed)
    }

    /// Place `tile`, score whatever it completes and take the returned
    /// meeples off the board. On error the board is left untouched.
    pub fn place_tile(&mut self, tile: PlacedTile) -> Result<ScoreReport, EngineError> {
        if self.tiles.len() >= self.capacity {
            return Err(EngineError::CapacityExceeded { capacity: self.capacity });
        }
        if let Err(err) = self.can_be_placed(&tile) {
            tracing::debug!(position = %tile.position, error = %err, "placement rejected");
            return Err(err);
        }

        // Fallible scoring runs on the overlay, before anything changes.
        let pending = PendingTile::new(&*self, &tile);
        let roads = completed_roads(&pending, &tile)?;
        let monasteries = completed_monasteries(&pending, tile.position);

        self.commit(tile.clone());
        let cities = self.cities.score_cities(false);

        let report = cities.joined(&roads).joined(&monasteries);
        self.clear_meeples(&report);
        tracing::debug!(
            position = %tile.position,
            tiles = self.tiles.len(),
            points = report.total_points(),
            "tile placed"
        );
        Ok(report)
    }

    fn commit(&mut self, tile: PlacedTile) {
        let position = tile.position;
        self.placeable_positions.retain(|&p| p != position);
        for neighbour in position.neighbours() {
            if !self.index.contains_key(&neighbour)
                && !self.placeable_positions.contains(&neighbour)
            {
                self.placeable_positions.push(neighbour);
            }
        }
        self.cities.update_cities(&tile);
        self.index.insert(position, self.tiles.len());
        self.geometry.push(BinaryTile::from_tile(&tile.to_tile()));
        self.tiles.push(tile);
    }

    fn clear_meeples(&mut self, report: &ScoreReport) {
        let returned: Vec<ReturnedMeeple> = report.meeples().copied().collect();
        for meeple in returned {
            if let Some(&i) = self.index.get(&meeple.position) {
                self.tiles[i].clear_meeple(meeple.feature_index);
            }
        }
    }

    /// Final scoring: unfinished cities, roads and monasteries at their
    /// current value, fields at 3 points per completed city. Every meeple
    /// leaves the board.
    pub fn score_end_game(&mut self) -> Result<(ScoreReport, FeatureBreakdown), EngineError> {
        let board: &Board = self;
        let mut claimed: BTreeSet<(Position, usize)> = BTreeSet::new();
        let mut reports: Vec<(FeatureType, ScoreReport)> = Vec::new();

        for tile in &board.tiles {
            for (index, feature) in tile.features.iter().enumerate() {
                if feature.meeple.is_none() || claimed.contains(&(tile.position, index)) {
                    continue;
                }
                let report = match feature.feature_type() {
                    FeatureType::City => continue,
                    FeatureType::Road => {
                        Road::expand(board, tile.position, index)?.score_report(true)
                    }
                    FeatureType::Field => {
                        let mut field = Field::from_feature(tile, index);
                        field.expand(board, &board.cities)?;
                        field.score_report()
                    }
                    FeatureType::Monastery => monastery_report(board, tile.position, true),
                };
                claimed.extend(report.meeples().map(|m| (m.position, m.feature_index)));
                reports.push((feature.feature_type(), report));
            }
        }

        let mut breakdown = FeatureBreakdown::default();
        let mut total = self.cities.score_cities(true);
        breakdown.record(FeatureType::City, &total);
        for (feature_type, report) in &reports {
            tracing::debug!(
                ?feature_type,
                points = report.total_points(),
                "region scored at game end"
            );
            breakdown.record(*feature_type, report);
            total.join(report);
        }
        self.clear_meeples(&total);
        Ok((total, breakdown))
    }
}

impl TileLookup for Board {
    fn tile_at(&self, position: Position) -> Option<&PlacedTile> {
        self.get_tile_at(position)
    }

    fn binary_tile_at(&self, position: Position) -> Option<BinaryTile> {
        self.index.get(&position).map(|&i| self.geometry[i])
    }
}

/// Completed roads running through `tile`, each scored once.
fn completed_roads<L: TileLookup + ?Sized>(
    lookup: &L,
    tile: &PlacedTile,
) -> Result<ScoreReport, EngineError> {
    let mut report = ScoreReport::new();
    let mut seen: Vec<Road> = Vec::new();
    for (index, feature) in tile.features.iter().enumerate() {
        if feature.feature_type() != FeatureType::Road
            || seen.iter().any(|r| r.contains(tile.position, index))
        {
            continue;
        }
        let road = Road::expand(lookup, tile.position, index)?;
        if road.is_completed() {
            tracing::debug!(position = %tile.position, tiles = road.tile_count(), "road completed");
            report.join(&road.score_report(false));
        }
        seen.push(road);
    }
    Ok(report)
}

/// Claimed monasteries on or around `position` that are now surrounded.
fn completed_monasteries<L: TileLookup + ?Sized>(lookup: &L, position: Position) -> ScoreReport {
    let mut report = ScoreReport::new();
    for p in std::iter::once(position).chain(position.surrounding()) {
        report.join(&monastery_report(lookup, p, false));
    }
    report
}

/// A claimed monastery scores 1 per tile in its 3x3 square; 9 once full,
/// anything with `force`.
fn monastery_report<L: TileLookup + ?Sized>(
    lookup: &L,
    position: Position,
    force: bool,
) -> ScoreReport {
    let Some(tile) = lookup.tile_at(position) else {
        return ScoreReport::new();
    };
    let Some(index) = tile.monastery_index() else {
        return ScoreReport::new();
    };
    let Some(meeple) = tile.features[index].meeple else {
        return ScoreReport::new();
    };
    let present = 1 + position
        .surrounding()
        .iter()
        .filter(|&&p| lookup.tile_at(p).is_some())
        .count();
    if present < 9 && !force {
        return ScoreReport::new();
    }
    tracing::debug!(%position, present, "monastery scored");
    ScoreReport::from_meeples(
        monastery_points(present),
        &[ReturnedMeeple { meeple, position, feature_index: index }],
    )
}
