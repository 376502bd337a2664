//! Carcassonne core types: positions, features, tiles and meeples.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::side::{Side, PRIMARY_SIDES};

// --- Position ---

/// Grid coordinate. The starting tile sits at (0,0), `y` grows upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Unit offset towards a single edge (or half-edge) of a tile.
    /// `Side::NONE` maps to (0,0).
    ///
    /// # Panics
    /// If `side` touches more than one edge.
    pub fn from_side(side: Side) -> Self {
        let touched = PRIMARY_SIDES.iter().filter(|&&p| side.overlaps_side(p)).count();
        match touched {
            0 => Self::ORIGIN,
            1 if side.overlaps_side(Side::TOP) => Self::new(0, 1),
            1 if side.overlaps_side(Side::RIGHT) => Self::new(1, 0),
            1 if side.overlaps_side(Side::BOTTOM) => Self::new(0, -1),
            1 => Self::new(-1, 0),
            _ => panic!("Position::from_side called with more than one edge: {side}"),
        }
    }

    /// Neighbouring position across a single edge.
    #[inline]
    pub fn neighbour(self, side: Side) -> Self {
        self + Self::from_side(side)
    }

    /// The four orthogonal neighbours, in `PRIMARY_SIDES` order.
    pub fn neighbours(self) -> [Position; 4] {
        PRIMARY_SIDES.map(|side| self.neighbour(side))
    }

    /// All eight positions around this one.
    pub fn surrounding(self) -> [Position; 8] {
        const OFFSETS: [(i16, i16); 8] =
            [(-1, 1), (0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0)];
        OFFSETS.map(|(dx, dy)| Position::new(self.x + dx, self.y + dy))
    }

    pub fn to_key(self) -> String {
        format!("{},{}", self.x, self.y)
    }

    pub fn from_key(key: &str) -> Result<Self, String> {
        let (x, y) = key
            .split_once(',')
            .ok_or_else(|| format!("invalid position key: {key:?}"))?;
        let x = x.trim().parse().map_err(|e| format!("invalid x in {key:?}: {e}"))?;
        let y = y.trim().parse().map_err(|e| format!("invalid y in {key:?}: {e}"))?;
        Ok(Self { x, y })
    }
}

impl Add for Position {
    type Output = Position;
    fn add(self, other: Position) -> Position {
        Position::new(self.x + other.x, self.y + other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

// Positions serialize as "x,y" so they can key JSON objects.
impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Position::from_key(&key).map_err(serde::de::Error::custom)
    }
}

// --- Features ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Road,
    City,
    Field,
    Monastery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    #[default]
    None,
    Shield,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeepleType {
    #[default]
    Normal,
}

/// 1-based player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Meeple {
    pub meeple_type: MeepleType,
    pub owner: PlayerId,
}

impl Meeple {
    pub fn new(owner: PlayerId) -> Self {
        Self { meeple_type: MeepleType::Normal, owner }
    }
}

/// A terrain segment of a tile template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Feature {
    pub feature_type: FeatureType,
    pub sides: Side,
    #[serde(default)]
    pub modifier: Modifier,
}

impl Feature {
    pub fn new(feature_type: FeatureType, sides: Side) -> Self {
        Self { feature_type, sides, modifier: Modifier::None }
    }

    pub fn shielded(feature_type: FeatureType, sides: Side) -> Self {
        Self { feature_type, sides, modifier: Modifier::Shield }
    }

    pub fn rotate(self, rotations: u32) -> Self {
        Self { sides: self.sides.rotate(rotations), ..self }
    }

    #[inline]
    pub fn has_shield(&self) -> bool {
        self.modifier == Modifier::Shield
    }
}

/// A feature on a placed tile, optionally claimed by a meeple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedFeature {
    #[serde(flatten)]
    pub feature: Feature,
    pub meeple: Option<Meeple>,
}

impl PlacedFeature {
    #[inline]
    pub fn feature_type(&self) -> FeatureType {
        self.feature.feature_type
    }

    #[inline]
    pub fn sides(&self) -> Side {
        self.feature.sides
    }
}

impl From<Feature> for PlacedFeature {
    fn from(feature: Feature) -> Self {
        Self { feature, meeple: None }
    }
}

// --- Tiles ---

/// Unplaced tile geometry. Feature order is significant: placed tiles and
/// meeple moves address features by index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub features: Vec<Feature>,
}

impl Tile {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn rotate(&self, rotations: u32) -> Tile {
        Tile {
            features: self.features.iter().map(|f| f.rotate(rotations)).collect(),
        }
    }

    /// Distinct rotations of this tile, starting with the unrotated one.
    pub fn rotations(&self) -> Vec<Tile> {
        let mut out: Vec<Tile> = Vec::with_capacity(4);
        for r in 0..4 {
            let rotated = self.rotate(r);
            if !out.iter().any(|t| t.exact_equals(&rotated)) {
                out.push(rotated);
            }
        }
        out
    }

    /// Same features in the same order, without rotating.
    pub fn exact_equals(&self, other: &Tile) -> bool {
        self.features == other.features
    }

    /// Equal under some rotation of `self`.
    pub fn equals(&self, other: &Tile) -> bool {
        (0..4).any(|r| self.rotate(r).exact_equals(other))
    }

    pub fn has_shield(&self) -> bool {
        self.features.iter().any(Feature::has_shield)
    }

    pub fn features_of_type(&self, feature_type: FeatureType) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter(move |f| f.feature_type == feature_type)
    }
}

/// A tile put on (or about to be put on) the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedTile {
    pub features: Vec<PlacedFeature>,
    pub position: Position,
}

impl PlacedTile {
    pub fn from_tile(tile: &Tile, position: Position) -> Self {
        Self {
            features: tile.features.iter().copied().map(PlacedFeature::from).collect(),
            position,
        }
    }

    pub fn to_tile(&self) -> Tile {
        Tile {
            features: self.features.iter().map(|f| f.feature).collect(),
        }
    }

    /// Put a meeple on the feature at `index`.
    pub fn with_meeple(mut self, index: usize, meeple: Meeple) -> Self {
        if let Some(feature) = self.features.get_mut(index) {
            feature.meeple = Some(meeple);
        }
        self
    }

    /// Index of the first feature of `feature_type` overlapping `side`.
    /// `Side::NONE` only matches side-less features (monasteries, enclosed fields).
    pub fn feature_index_at_side(&self, side: Side, feature_type: FeatureType) -> Option<usize> {
        self.features.iter().position(|f| {
            f.feature_type() == feature_type
                && if side.is_none() {
                    f.sides().is_none()
                } else {
                    f.sides().overlaps_side(side)
                }
        })
    }

    pub fn feature_at_side(&self, side: Side, feature_type: FeatureType) -> Option<&PlacedFeature> {
        self.feature_index_at_side(side, feature_type)
            .map(|i| &self.features[i])
    }

    pub fn monastery_index(&self) -> Option<usize> {
        self.features
            .iter()
            .position(|f| f.feature_type() == FeatureType::Monastery)
    }

    pub fn monastery(&self) -> Option<&PlacedFeature> {
        self.monastery_index().map(|i| &self.features[i])
    }

    /// Union of the sides of every feature of `feature_type`.
    pub fn feature_sides(&self, feature_type: FeatureType) -> Side {
        self.features
            .iter()
            .filter(|f| f.feature_type() == feature_type)
            .fold(Side::NONE, |acc, f| acc | f.sides())
    }

    pub fn meeple_count(&self) -> usize {
        self.features.iter().filter(|f| f.meeple.is_some()).count()
    }

    pub fn clear_meeple(&mut self, index: usize) {
        if let Some(feature) = self.features.get_mut(index) {
            feature.meeple = None;
        }
    }

    pub fn equals_tile(&self, tile: &Tile) -> bool {
        self.to_tile().equals(tile)
    }

    pub fn exact_equals_tile(&self, tile: &Tile) -> bool {
        self.to_tile().exact_equals(tile)
    }

    /// Same features and meeples regardless of feature order.
    pub fn same_features(&self, other: &PlacedTile) -> bool {
        fn sorted(tile: &PlacedTile) -> Vec<(Feature, Option<Meeple>)> {
            let mut v: Vec<_> = tile.features.iter().map(|f| (f.feature, f.meeple)).collect();
            v.sort();
            v
        }
        sorted(self) == sorted(other)
    }
}
