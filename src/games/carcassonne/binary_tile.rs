//! 64-bit packed tile encoding.
//!
//! Bit layout, low to high:
//!
//! | bits  | content                                                  |
//! |-------|----------------------------------------------------------|
//! | 0-9   | field: 4 corner slots (TR, BR, BL, TL) + 6 connections   |
//! | 10-19 | road: 4 edge slots (T, R, B, L) + 6 connections          |
//! | 20-29 | city: 4 edge slots (T, R, B, L) + 6 connections          |
//! | 30-33 | shield per edge                                          |
//! | 34    | monastery                                                |
//! | 35    | field without sides (enclosed by cities)                 |
//! | 36-44 | meeples: 4 edges, 4 corners, center                      |
//! | 45-46 | owner bitmask (player 1, player 2)                       |
//! | 47    | placed                                                   |
//! | 48-55 | y, two's complement                                      |
//! | 56-63 | x, two's complement                                      |
//!
//! A connection bit is set when both slots of its pair belong to the same
//! feature, which is what tells two unconnected city edges apart from one
//! city spanning both.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use serde::{Deserialize, Serialize};

use super::error::BinaryTileError;
use super::side::{Side, PRIMARY_SIDES};
use super::types::{
    Feature, FeatureType, Meeple, Modifier, PlacedFeature, PlacedTile, PlayerId, Position, Tile,
};

// --- BinarySide ---

/// Slot mask of a packed tile: 4 edges, 4 corners and the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinarySide(pub u16);

impl BinarySide {
    pub const NONE: BinarySide = BinarySide(0);
    pub const CENTER: BinarySide = BinarySide(0b1_0000_0000);

    pub const ALL_DIAGONAL: BinarySide = BinarySide(0b0_1111_0000);
    pub const ALL_ORTHOGONAL: BinarySide = BinarySide(0b0_0000_1111);

    pub const TOP: BinarySide = BinarySide(0b0_0000_0001);
    pub const RIGHT: BinarySide = BinarySide(0b0_0000_0010);
    pub const BOTTOM: BinarySide = BinarySide(0b0_0000_0100);
    pub const LEFT: BinarySide = BinarySide(0b0_0000_1000);

    pub const TOP_RIGHT_CORNER: BinarySide = BinarySide(0b0_0001_0000);
    pub const BOTTOM_RIGHT_CORNER: BinarySide = BinarySide(0b0_0010_0000);
    pub const BOTTOM_LEFT_CORNER: BinarySide = BinarySide(0b0_0100_0000);
    pub const TOP_LEFT_CORNER: BinarySide = BinarySide(0b0_1000_0000);

    #[inline]
    pub fn has_side(self, other: BinarySide) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn overlaps_side(self, other: BinarySide) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Edges touched by the corners in `self`.
    #[inline]
    pub fn corners_to_sides(self) -> BinarySide {
        let corners = self.0 & Self::ALL_DIAGONAL.0;
        BinarySide(((corners >> 4) | (corners >> 3) | (corners >> 7)) & Self::ALL_ORTHOGONAL.0)
    }

    /// Corners at both ends of the edges in `self`.
    #[inline]
    pub fn sides_to_corners(self) -> BinarySide {
        let sides = self.0 & Self::ALL_ORTHOGONAL.0;
        BinarySide(((sides << 4) | (sides << 3) | (sides << 7)) & Self::ALL_DIAGONAL.0)
    }

    /// Point reflection through the tile center.
    pub fn mirror(self) -> BinarySide {
        let rot2 = |nibble: u16| ((nibble << 2) | (nibble >> 2)) & 0xF;
        let orthogonal = rot2(self.0 & 0xF);
        let diagonal = rot2((self.0 >> 4) & 0xF) << 4;
        BinarySide(orthogonal | diagonal | (self.0 & Self::CENTER.0))
    }

    /// Unit offset towards a single edge.
    ///
    /// # Panics
    /// If more than one edge is set.
    pub fn position_from_side(self) -> Position {
        let touched = ORTHOGONAL_SIDES.iter().filter(|&&s| self.overlaps_side(s)).count();
        match touched {
            0 => Position::ORIGIN,
            1 if self.overlaps_side(Self::TOP) => Position::new(0, 1),
            1 if self.overlaps_side(Self::RIGHT) => Position::new(1, 0),
            1 if self.overlaps_side(Self::BOTTOM) => Position::new(0, -1),
            1 => Position::new(-1, 0),
            _ => panic!("position_from_side called with more than one edge: {:#011b}", self.0),
        }
    }

    /// Corners of the neighbouring tile across `direction` that touch the
    /// given corners of this tile. Corners not on that edge are dropped.
    pub fn corner_from_side(corner: BinarySide, direction: BinarySide) -> BinarySide {
        let side_corners = direction.sides_to_corners().0;
        let c = corner.0 & side_corners;
        let adjacent = (c >> 3) | (c >> 1) | (c << 3) | (c << 1);
        BinarySide(Self::ALL_DIAGONAL.0 & !side_corners & adjacent)
    }

    /// Convert half-edge sides. In orthogonal mode an edge is set when either
    /// of its halves is; otherwise a corner is set when either half-edge
    /// meeting at it is.
    pub fn from_side(side: Side, orthogonal: bool) -> BinarySide {
        let slots = if orthogonal { &ORTHOGONAL_HALVES } else { &DIAGONAL_HALVES };
        slots
            .iter()
            .filter(|(halves, _)| side.overlaps_side(*halves))
            .fold(BinarySide::NONE, |acc, (_, slot)| acc | *slot)
    }

    /// Half-edges covered by every edge and corner in `self`.
    pub fn to_side(self) -> Side {
        ORTHOGONAL_HALVES
            .iter()
            .chain(DIAGONAL_HALVES.iter())
            .filter(|(_, slot)| self.overlaps_side(*slot))
            .fold(Side::NONE, |acc, (halves, _)| acc | *halves)
    }
}

pub const ORTHOGONAL_SIDES: [BinarySide; 4] =
    [BinarySide::TOP, BinarySide::RIGHT, BinarySide::BOTTOM, BinarySide::LEFT];

pub const DIAGONAL_SIDES: [BinarySide; 4] = [
    BinarySide::TOP_RIGHT_CORNER,
    BinarySide::BOTTOM_RIGHT_CORNER,
    BinarySide::BOTTOM_LEFT_CORNER,
    BinarySide::TOP_LEFT_CORNER,
];

const ORTHOGONAL_HALVES: [(Side, BinarySide); 4] = [
    (Side::TOP, BinarySide::TOP),
    (Side::RIGHT, BinarySide::RIGHT),
    (Side::BOTTOM, BinarySide::BOTTOM),
    (Side::LEFT, BinarySide::LEFT),
];

const DIAGONAL_HALVES: [(Side, BinarySide); 4] = [
    (Side(Side::TOP_RIGHT_EDGE.0 | Side::RIGHT_TOP_EDGE.0), BinarySide::TOP_RIGHT_CORNER),
    (Side(Side::RIGHT_BOTTOM_EDGE.0 | Side::BOTTOM_RIGHT_EDGE.0), BinarySide::BOTTOM_RIGHT_CORNER),
    (Side(Side::BOTTOM_LEFT_EDGE.0 | Side::LEFT_BOTTOM_EDGE.0), BinarySide::BOTTOM_LEFT_CORNER),
    (Side(Side::LEFT_TOP_EDGE.0 | Side::TOP_LEFT_EDGE.0), BinarySide::TOP_LEFT_CORNER),
];

impl BitOr for BinarySide {
    type Output = BinarySide;
    fn bitor(self, rhs: BinarySide) -> BinarySide {
        BinarySide(self.0 | rhs.0)
    }
}

impl BitOrAssign for BinarySide {
    fn bitor_assign(&mut self, rhs: BinarySide) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for BinarySide {
    type Output = BinarySide;
    fn bitand(self, rhs: BinarySide) -> BinarySide {
        BinarySide(self.0 & rhs.0)
    }
}

impl Not for BinarySide {
    type Output = BinarySide;
    fn not(self) -> BinarySide {
        BinarySide(!self.0 & 0x1FF)
    }
}

// --- BinaryTile ---

const FEATURE_BITS: u32 = 10;
const CONNECTION_OFFSET: u32 = 4;

const FIELD_START: u32 = 0;
const ROAD_START: u32 = FIELD_START + FEATURE_BITS;
const CITY_START: u32 = ROAD_START + FEATURE_BITS;
const SHIELD_START: u32 = CITY_START + FEATURE_BITS;
const MONASTERY_BIT: u32 = SHIELD_START + 4;
const UNCONNECTED_FIELD_BIT: u32 = MONASTERY_BIT + 1;
const MEEPLE_START: u32 = UNCONNECTED_FIELD_BIT + 1;
const MEEPLE_BITS: u32 = 9;
const OWNER_START: u32 = MEEPLE_START + MEEPLE_BITS;
const MAX_PLAYERS: u8 = 2;
const PLACED_BIT: u32 = OWNER_START + MAX_PLAYERS as u32;
const Y_START: u32 = PLACED_BIT + 1;
const X_START: u32 = Y_START + 8;

/// Slot pairs, one connection bit each.
const CONNECTION_MASKS: [u64; 6] = [0b0011, 0b0110, 0b1100, 0b1001, 0b0101, 0b1010];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinaryTile(pub u64);

impl BinaryTile {
    /// Geometry only: no meeples, no position, not marked as placed.
    pub fn from_tile(tile: &Tile) -> Self {
        let mut binary = BinaryTile(0);
        for feature in &tile.features {
            binary.add_feature(feature, false);
        }
        binary
    }

    pub fn from_placed_tile(tile: &PlacedTile) -> Result<Self, BinaryTileError> {
        let position = tile.position;
        let (Ok(x), Ok(y)) = (i8::try_from(position.x), i8::try_from(position.y)) else {
            return Err(BinaryTileError::PositionOutOfRange(position));
        };

        let mut binary = BinaryTile(0);
        let mut owner: Option<PlayerId> = None;
        let mut center_meeple = false;
        for placed in &tile.features {
            if let Some(meeple) = placed.meeple {
                if meeple.owner.0 == 0 || meeple.owner.0 > MAX_PLAYERS {
                    return Err(BinaryTileError::OwnerOutOfRange(meeple.owner));
                }
                match owner {
                    Some(existing) if existing != meeple.owner => {
                        return Err(BinaryTileError::MultipleOwners)
                    }
                    _ => owner = Some(meeple.owner),
                }
                if placed.sides().is_none() {
                    if center_meeple {
                        return Err(BinaryTileError::AmbiguousCenterMeeple(placed.feature_type()));
                    }
                    center_meeple = true;
                }
            }
            binary.add_feature(&placed.feature, placed.meeple.is_some());
        }

        if center_meeple && binary.has_monastery() && binary.has_unconnected_field() {
            return Err(BinaryTileError::AmbiguousCenterMeeple(FeatureType::Monastery));
        }
        if let Some(owner) = owner {
            binary.set_bit(OWNER_START + owner.0 as u32 - 1);
        }
        binary.set_bit(PLACED_BIT);
        binary.0 |= (y as u8 as u64) << Y_START;
        binary.0 |= (x as u8 as u64) << X_START;
        Ok(binary)
    }

    fn add_feature(&mut self, feature: &Feature, has_meeple: bool) {
        match feature.feature_type {
            FeatureType::Monastery => {
                self.set_bit(MONASTERY_BIT);
                if has_meeple {
                    self.set_bit(MEEPLE_START + 8);
                }
            }
            FeatureType::Field if feature.sides.is_none() => {
                self.set_bit(UNCONNECTED_FIELD_BIT);
                if has_meeple {
                    self.set_bit(MEEPLE_START + 8);
                }
            }
            FeatureType::Field => {
                let slots = DIAGONAL_HALVES.map(|(halves, _)| feature.sides.overlaps_side(halves));
                self.add_slots(FIELD_START, slots, has_meeple.then_some(4), false);
            }
            FeatureType::Road | FeatureType::City => {
                let slots = PRIMARY_SIDES.map(|edge| feature.sides.has_side(edge));
                let start = if feature.feature_type == FeatureType::Road {
                    ROAD_START
                } else {
                    CITY_START
                };
                self.add_slots(start, slots, has_meeple.then_some(0), feature.has_shield());
            }
        }
    }

    fn add_slots(
        &mut self,
        start: u32,
        slots: [bool; 4],
        meeple_offset: Option<u32>,
        shield: bool,
    ) {
        let mut presence: u64 = 0;
        for (i, present) in slots.into_iter().enumerate() {
            if !present {
                continue;
            }
            presence |= 1 << i;
            if shield {
                self.set_bit(SHIELD_START + i as u32);
            }
            if let Some(offset) = meeple_offset {
                self.set_bit(MEEPLE_START + offset + i as u32);
            }
        }
        let mut bits = presence;
        for (i, mask) in CONNECTION_MASKS.iter().enumerate() {
            if presence & mask == *mask {
                bits |= 1 << (CONNECTION_OFFSET + i as u32);
            }
        }
        self.0 |= bits << start;
    }

    #[inline]
    fn set_bit(&mut self, bit: u32) {
        self.0 |= 1 << bit;
    }

    #[inline]
    fn bit(self, bit: u32) -> bool {
        self.0 & (1 << bit) != 0
    }

    pub fn position(self) -> Position {
        let x = (self.0 >> X_START) as u8 as i8;
        let y = (self.0 >> Y_START) as u8 as i8;
        Position::new(x as i16, y as i16)
    }

    pub fn is_placed(self) -> bool {
        self.bit(PLACED_BIT)
    }

    pub fn has_monastery(self) -> bool {
        self.bit(MONASTERY_BIT)
    }

    pub fn has_unconnected_field(self) -> bool {
        self.bit(UNCONNECTED_FIELD_BIT)
    }

    /// Edges carrying a shielded city.
    pub fn shield_sides(self) -> BinarySide {
        BinarySide(((self.0 >> SHIELD_START) & 0xF) as u16)
    }

    /// Slots holding a meeple.
    pub fn meeple_sides(self) -> BinarySide {
        BinarySide(((self.0 >> MEEPLE_START) & 0x1FF) as u16)
    }

    /// Owner of the meeples on this tile, if any.
    pub fn owner(self) -> Option<PlayerId> {
        let mask = (self.0 >> OWNER_START) & 0b11;
        (0..MAX_PLAYERS)
            .find(|&i| mask & (1 << i) != 0)
            .map(|i| PlayerId(i + 1))
    }

    fn feature_bits(self, feature_type: FeatureType) -> Option<(u64, u32)> {
        let (start, shift) = match feature_type {
            FeatureType::Field => (FIELD_START, 4),
            FeatureType::Road => (ROAD_START, 0),
            FeatureType::City => (CITY_START, 0),
            FeatureType::Monastery => return None,
        };
        Some(((self.0 >> start) & 0x3FF, shift))
    }

    /// Every slot occupied by a feature of `feature_type`.
    pub fn feature_sides(self, feature_type: FeatureType) -> BinarySide {
        match self.feature_bits(feature_type) {
            Some((bits, shift)) => BinarySide(((bits & 0xF) as u16) << shift),
            None if self.has_monastery() => BinarySide::CENTER,
            None => BinarySide::NONE,
        }
    }

    /// Slots of each distinct feature of `feature_type`, in slot order.
    /// Side-less fields are not listed; see `has_unconnected_field`.
    pub fn features_of_type(self, feature_type: FeatureType) -> Vec<BinarySide> {
        let Some((bits, shift)) = self.feature_bits(feature_type) else {
            return if self.has_monastery() { vec![BinarySide::CENTER] } else { Vec::new() };
        };
        let presence = bits & 0xF;
        let mut seen = 0u64;
        let mut groups = Vec::new();
        for i in 0..4 {
            let slot = 1u64 << i;
            if presence & slot == 0 || seen & slot != 0 {
                continue;
            }
            let mut group = slot;
            loop {
                let before = group;
                for (k, mask) in CONNECTION_MASKS.iter().enumerate() {
                    if bits & (1 << (CONNECTION_OFFSET + k as u32)) != 0 && group & mask != 0 {
                        group |= mask;
                    }
                }
                if group == before {
                    break;
                }
            }
            seen |= group;
            groups.push(BinarySide((group as u16) << shift));
        }
        groups
    }

    /// Union of the features of `feature_type` touching `side`.
    pub fn connected_sides(self, side: BinarySide, feature_type: FeatureType) -> BinarySide {
        self.features_of_type(feature_type)
            .into_iter()
            .filter(|group| group.overlaps_side(side))
            .fold(BinarySide::NONE, |acc, group| acc | group)
    }

    pub fn meeple_id_at_side(
        self,
        side: BinarySide,
        feature_type: FeatureType,
    ) -> Option<PlayerId> {
        let occupied = self.meeple_sides() & self.feature_sides(feature_type) & side;
        if occupied.is_none() {
            None
        } else {
            self.owner()
        }
    }

    pub fn meeple_id_at_center(self, feature_type: FeatureType) -> Option<PlayerId> {
        let present = match feature_type {
            FeatureType::Monastery => self.has_monastery(),
            FeatureType::Field => self.has_unconnected_field(),
            FeatureType::Road | FeatureType::City => false,
        };
        if present && self.meeple_sides().has_side(BinarySide::CENTER) {
            self.owner()
        } else {
            None
        }
    }

    /// Decode the geometry (cities, roads, fields, monastery in that order).
    pub fn to_tile(self) -> Tile {
        Tile::new(self.to_placed_tile().features.into_iter().map(|f| f.feature).collect())
    }

    /// Full decode. Features come out in canonical order, so compare with
    /// `PlacedTile::same_features` rather than `==`.
    pub fn to_placed_tile(self) -> PlacedTile {
        let owner = self.owner();
        let meeples = self.meeple_sides();
        let meeple_on = |slots: BinarySide| -> Option<Meeple> {
            if meeples.overlaps_side(slots) {
                owner.map(Meeple::new)
            } else {
                None
            }
        };

        let mut features = Vec::new();
        let shields = self.shield_sides();
        let city_sides = self.feature_sides(FeatureType::City).to_side();
        for group in self.features_of_type(FeatureType::City) {
            let modifier = if shields.overlaps_side(group) {
                Modifier::Shield
            } else {
                Modifier::None
            };
            features.push(PlacedFeature {
                feature: Feature {
                    feature_type: FeatureType::City,
                    sides: group.to_side(),
                    modifier,
                },
                meeple: meeple_on(group),
            });
        }
        for group in self.features_of_type(FeatureType::Road) {
            features.push(PlacedFeature {
                feature: Feature::new(FeatureType::Road, group.to_side()),
                meeple: meeple_on(group),
            });
        }
        for group in self.features_of_type(FeatureType::Field) {
            features.push(PlacedFeature {
                feature: Feature::new(FeatureType::Field, group.to_side() & !city_sides),
                meeple: meeple_on(group),
            });
        }
        if self.has_unconnected_field() {
            features.push(PlacedFeature {
                feature: Feature::new(FeatureType::Field, Side::NONE),
                meeple: self.meeple_id_at_center(FeatureType::Field).map(Meeple::new),
            });
        }
        if self.has_monastery() {
            features.push(PlacedFeature {
                feature: Feature::new(FeatureType::Monastery, Side::NONE),
                meeple: self.meeple_id_at_center(FeatureType::Monastery).map(Meeple::new),
            });
        }

        PlacedTile { features, position: self.position() }
    }
}

impl fmt::Binary for BinaryTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::carcassonne::tiles;

    fn placed(tile: Tile, x: i16, y: i16) -> PlacedTile {
        PlacedTile::from_tile(&tile, Position::new(x, y))
    }

    fn enclosed_field_tile() -> Tile {
        Tile::new(vec![
            Feature::new(FeatureType::Field, Side::NONE),
            Feature::new(FeatureType::City, Side::TOP),
            Feature::new(FeatureType::City, Side::RIGHT),
            Feature::new(FeatureType::City, Side::BOTTOM),
            Feature::shielded(FeatureType::City, Side::LEFT),
        ])
    }

    #[test]
    fn test_encode_city_with_shield() {
        let mut tile = placed(tiles::two_city_edges_corner_connected_road_turn(), 85, 42);
        tile.features[0].feature.modifier = Modifier::Shield;
        let tile = tile.with_meeple(0, Meeple::new(PlayerId(2)));

        let expected = 0b01010101_00101010_1_10_000000011_00_0011_0000010011_0001001100_1000001110;
        assert_eq!(BinaryTile::from_placed_tile(&tile).unwrap(), BinaryTile(expected));
    }

    #[test]
    fn test_encode_unconnected_field() {
        let tile = placed(enclosed_field_tile(), -21, -37).with_meeple(0, Meeple::new(PlayerId(1)));
        let expected = 0b11101011_11011011_1_01_100000000_10_1000_0000001111_0000000000_0000000000;
        assert_eq!(BinaryTile::from_placed_tile(&tile).unwrap(), BinaryTile(expected));
    }

    #[test]
    fn test_encode_monastery() {
        let tile = placed(tiles::monastery_with_single_road(), -128, 127)
            .with_meeple(2, Meeple::new(PlayerId(2)));
        let expected = 0b10000000_01111111_1_10_100000000_01_0000_0000000000_0000000100_1111111111;
        assert_eq!(BinaryTile::from_placed_tile(&tile).unwrap(), BinaryTile(expected));
    }

    #[test]
    fn test_encode_empty_tile() {
        assert_eq!(BinaryTile::from_tile(&Tile::new(Vec::new())), BinaryTile(0));
    }

    #[test]
    fn test_encode_errors() {
        let far = placed(tiles::roads_turn(), 128, 0);
        assert_eq!(
            BinaryTile::from_placed_tile(&far),
            Err(BinaryTileError::PositionOutOfRange(Position::new(128, 0)))
        );

        let third_player =
            placed(tiles::roads_turn(), 0, 0).with_meeple(0, Meeple::new(PlayerId(3)));
        assert_eq!(
            BinaryTile::from_placed_tile(&third_player),
            Err(BinaryTileError::OwnerOutOfRange(PlayerId(3)))
        );

        let two_owners = placed(tiles::roads_turn(), 0, 0)
            .with_meeple(0, Meeple::new(PlayerId(1)))
            .with_meeple(1, Meeple::new(PlayerId(2)));
        assert_eq!(BinaryTile::from_placed_tile(&two_owners), Err(BinaryTileError::MultipleOwners));
    }

    #[test]
    fn test_position() {
        for (x, y) in [(-127, 126), (85, -42), (0, 0), (-128, -128), (127, 127)] {
            let tile = placed(tiles::monastery_with_single_road(), x, y);
            let binary = BinaryTile::from_placed_tile(&tile).unwrap();
            assert_eq!(binary.position(), Position::new(x, y));
            assert!(binary.is_placed());
        }
        assert!(!BinaryTile::from_tile(&tiles::roads_turn()).is_placed());
    }

    #[test]
    fn test_has_monastery() {
        assert!(BinaryTile::from_tile(&tiles::monastery_with_single_road()).has_monastery());
        assert!(!BinaryTile::from_tile(&tiles::roads_turn()).has_monastery());
    }

    #[test]
    fn test_meeple_id_at_side() {
        let tile = placed(tiles::roads_turn(), 0, 0).with_meeple(1, Meeple::new(PlayerId(1)));
        let binary = BinaryTile::from_placed_tile(&tile).unwrap();

        assert_eq!(
            binary.meeple_id_at_side(BinarySide::BOTTOM_LEFT_CORNER, FeatureType::Field),
            Some(PlayerId(1))
        );
        assert_eq!(
            binary.meeple_id_at_side(BinarySide::TOP_RIGHT_CORNER, FeatureType::Field),
            None
        );
        let others = BinarySide::TOP_RIGHT_CORNER
            | BinarySide::TOP_LEFT_CORNER
            | BinarySide::BOTTOM_RIGHT_CORNER;
        assert_eq!(binary.meeple_id_at_side(others, FeatureType::Field), None);
        assert_eq!(binary.meeple_id_at_side(BinarySide::LEFT, FeatureType::Road), None);
    }

    #[test]
    fn test_meeple_id_at_center() {
        let tile = placed(enclosed_field_tile(), 0, 0).with_meeple(0, Meeple::new(PlayerId(1)));
        let binary = BinaryTile::from_placed_tile(&tile).unwrap();
        assert_eq!(binary.meeple_id_at_center(FeatureType::Field), Some(PlayerId(1)));
        assert_eq!(binary.meeple_id_at_center(FeatureType::Monastery), None);

        let tile = placed(tiles::monastery_with_single_road(), 0, 0)
            .with_meeple(2, Meeple::new(PlayerId(2)));
        let binary = BinaryTile::from_placed_tile(&tile).unwrap();
        assert_eq!(binary.meeple_id_at_center(FeatureType::Monastery), Some(PlayerId(2)));
        assert_eq!(binary.meeple_id_at_center(FeatureType::Field), None);
    }

    #[test]
    fn test_connected_sides() {
        let binary = BinaryTile::from_tile(&tiles::two_city_edges_corner_connected_road_turn());
        let cases = [
            (BinarySide::TOP, FeatureType::City, BinarySide::TOP | BinarySide::RIGHT),
            (BinarySide::RIGHT, FeatureType::City, BinarySide::TOP | BinarySide::RIGHT),
            (BinarySide::BOTTOM, FeatureType::Road, BinarySide::BOTTOM | BinarySide::LEFT),
            (BinarySide::LEFT, FeatureType::Road, BinarySide::BOTTOM | BinarySide::LEFT),
            (
                BinarySide::BOTTOM_RIGHT_CORNER,
                FeatureType::Field,
                BinarySide::BOTTOM_RIGHT_CORNER | BinarySide::TOP_LEFT_CORNER,
            ),
            (
                BinarySide::TOP_LEFT_CORNER,
                FeatureType::Field,
                BinarySide::BOTTOM_RIGHT_CORNER | BinarySide::TOP_LEFT_CORNER,
            ),
        ];
        for (side, feature_type, expected) in cases {
            assert_eq!(
                binary.connected_sides(side, feature_type),
                expected,
                "{side:?} {feature_type:?}"
            );
        }
    }

    #[test]
    fn test_connected_sides_without_connections() {
        let binary = BinaryTile::from_tile(&tiles::single_city_edge_cross_road());
        let cases = [
            (BinarySide::TOP, FeatureType::City),
            (BinarySide::RIGHT, FeatureType::Road),
            (BinarySide::BOTTOM, FeatureType::Road),
            (BinarySide::LEFT, FeatureType::Road),
            (BinarySide::BOTTOM_RIGHT_CORNER, FeatureType::Field),
            (BinarySide::BOTTOM_LEFT_CORNER, FeatureType::Field),
        ];
        for (side, feature_type) in cases {
            assert_eq!(binary.connected_sides(side, feature_type), side);
        }
    }

    #[test]
    fn test_connected_sides_missing_feature() {
        let binary = BinaryTile::from_tile(&tiles::two_city_edges_corner_connected_road_turn());
        let cases = [
            (BinarySide::TOP, FeatureType::Field),
            (BinarySide::RIGHT, FeatureType::Road),
            (BinarySide::BOTTOM, FeatureType::City),
            (BinarySide::LEFT, FeatureType::Field),
            (BinarySide::TOP_RIGHT_CORNER, FeatureType::Field),
            (BinarySide::TOP_RIGHT_CORNER, FeatureType::City),
            (BinarySide::BOTTOM_LEFT_CORNER, FeatureType::Road),
        ];
        for (side, feature_type) in cases {
            assert_eq!(binary.connected_sides(side, feature_type), BinarySide::NONE);
        }
    }

    #[test]
    fn test_connected_sides_spanning_features() {
        let binary = BinaryTile::from_tile(&tiles::straight_roads());
        assert_eq!(
            binary.connected_sides(BinarySide::TOP_RIGHT_CORNER, FeatureType::Field),
            BinarySide::TOP_RIGHT_CORNER | BinarySide::TOP_LEFT_CORNER
        );
        assert_eq!(
            binary.connected_sides(
                BinarySide::TOP_RIGHT_CORNER | BinarySide::BOTTOM_RIGHT_CORNER,
                FeatureType::Field
            ),
            BinarySide::ALL_DIAGONAL
        );
    }

    #[test]
    fn test_features_of_type() {
        let binary = BinaryTile::from_tile(&tiles::single_city_edge_cross_road());
        assert_eq!(
            binary.features_of_type(FeatureType::Field),
            vec![
                BinarySide::TOP_RIGHT_CORNER | BinarySide::TOP_LEFT_CORNER,
                BinarySide::BOTTOM_RIGHT_CORNER,
                BinarySide::BOTTOM_LEFT_CORNER,
            ]
        );
        assert_eq!(binary.features_of_type(FeatureType::City), vec![BinarySide::TOP]);
        assert_eq!(
            binary.features_of_type(FeatureType::Road),
            vec![BinarySide::RIGHT, BinarySide::BOTTOM, BinarySide::LEFT]
        );
    }

    #[test]
    fn test_feature_sides() {
        let binary = BinaryTile::from_tile(&tiles::single_city_edge_cross_road());
        assert_eq!(binary.feature_sides(FeatureType::Field), BinarySide::ALL_DIAGONAL);
        assert_eq!(binary.feature_sides(FeatureType::City), BinarySide::TOP);
        assert_eq!(
            binary.feature_sides(FeatureType::Road),
            BinarySide::RIGHT | BinarySide::BOTTOM | BinarySide::LEFT
        );
    }

    #[test]
    fn test_decode_restores_features() {
        let tile = placed(tiles::two_city_edges_corner_connected_road_turn_shield(), -3, 7)
            .with_meeple(3, Meeple::new(PlayerId(1)));
        let decoded = BinaryTile::from_placed_tile(&tile).unwrap().to_placed_tile();
        assert!(decoded.same_features(&tile), "{decoded:?}");
        assert_eq!(decoded.position, tile.position);
    }

    #[test]
    fn test_corners_to_sides() {
        let cases = [
            (BinarySide::TOP_LEFT_CORNER, BinarySide::TOP | BinarySide::LEFT),
            (
                BinarySide::BOTTOM_RIGHT_CORNER | BinarySide::BOTTOM_LEFT_CORNER,
                BinarySide::BOTTOM | BinarySide::RIGHT | BinarySide::LEFT,
            ),
            (BinarySide::BOTTOM_RIGHT_CORNER, BinarySide::BOTTOM | BinarySide::RIGHT),
            (BinarySide::ALL_DIAGONAL, BinarySide::ALL_ORTHOGONAL),
            (BinarySide::CENTER, BinarySide::NONE),
        ];
        for (corners, expected) in cases {
            assert_eq!(corners.corners_to_sides(), expected);
        }
    }

    #[test]
    fn test_sides_to_corners() {
        let cases = [
            (BinarySide::TOP, BinarySide::TOP_LEFT_CORNER | BinarySide::TOP_RIGHT_CORNER),
            (
                BinarySide::BOTTOM | BinarySide::RIGHT,
                BinarySide::BOTTOM_RIGHT_CORNER
                    | BinarySide::BOTTOM_LEFT_CORNER
                    | BinarySide::TOP_RIGHT_CORNER,
            ),
            (BinarySide::BOTTOM, BinarySide::BOTTOM_RIGHT_CORNER | BinarySide::BOTTOM_LEFT_CORNER),
            (BinarySide::ALL_ORTHOGONAL, BinarySide::ALL_DIAGONAL),
        ];
        for (sides, expected) in cases {
            assert_eq!(sides.sides_to_corners(), expected);
        }
    }

    #[test]
    fn test_corner_from_side() {
        let tl = BinarySide::TOP_LEFT_CORNER;
        let top_corners = BinarySide::TOP_LEFT_CORNER | BinarySide::TOP_RIGHT_CORNER;
        let cases = [
            (tl, BinarySide::TOP, BinarySide::BOTTOM_LEFT_CORNER),
            (tl, BinarySide::LEFT, BinarySide::TOP_RIGHT_CORNER),
            (
                top_corners,
                BinarySide::TOP,
                BinarySide::BOTTOM_RIGHT_CORNER | BinarySide::BOTTOM_LEFT_CORNER,
            ),
            (top_corners, BinarySide::RIGHT, BinarySide::TOP_LEFT_CORNER),
            (top_corners, BinarySide::LEFT, BinarySide::TOP_RIGHT_CORNER),
            (tl, BinarySide::RIGHT, BinarySide::NONE),
            (top_corners, BinarySide::BOTTOM, BinarySide::NONE),
        ];
        for (corner, direction, expected) in cases {
            assert_eq!(
                BinarySide::corner_from_side(corner, direction),
                expected,
                "{corner:?} {direction:?}"
            );
        }
    }

    #[test]
    fn test_position_from_side() {
        assert_eq!(BinarySide::TOP.position_from_side(), Position::new(0, 1));
        assert_eq!(BinarySide::RIGHT.position_from_side(), Position::new(1, 0));
        assert_eq!(BinarySide::BOTTOM.position_from_side(), Position::new(0, -1));
        assert_eq!(BinarySide::LEFT.position_from_side(), Position::new(-1, 0));
    }

    #[test]
    fn test_binary_side_mirror() {
        assert_eq!(BinarySide::NONE.mirror(), BinarySide::NONE);
        assert_eq!(BinarySide::ALL_ORTHOGONAL.mirror(), BinarySide::ALL_ORTHOGONAL);
        assert_eq!(BinarySide::ALL_DIAGONAL.mirror(), BinarySide::ALL_DIAGONAL);
        assert_eq!(BinarySide::RIGHT.mirror(), BinarySide::LEFT);
        assert_eq!(BinarySide::TOP_LEFT_CORNER.mirror(), BinarySide::BOTTOM_RIGHT_CORNER);
        assert_eq!(
            (BinarySide::TOP_RIGHT_CORNER | BinarySide::TOP).mirror(),
            BinarySide::BOTTOM_LEFT_CORNER | BinarySide::BOTTOM
        );
    }

    #[test]
    fn test_from_side_conversion() {
        let field = Side::LEFT_TOP_EDGE | Side::RIGHT_TOP_EDGE;
        assert_eq!(
            BinarySide::from_side(field, false),
            BinarySide::TOP_LEFT_CORNER | BinarySide::TOP_RIGHT_CORNER
        );
        assert_eq!(BinarySide::from_side(field, true), BinarySide::LEFT | BinarySide::RIGHT);
        assert_eq!(BinarySide::TOP.to_side(), Side::TOP);
        assert_eq!(
            BinarySide::BOTTOM_LEFT_CORNER.to_side(),
            Side::BOTTOM_LEFT_EDGE | Side::LEFT_BOTTOM_EDGE
        );
    }
}
