//! Side vocabulary: which edges and half-edges of a tile a feature touches.
//!
//! A tile edge is split into two halves so fields on either side of a road
//! can be told apart. Bits run clockwise starting from the left half of the
//! top edge, so rotating a tile is a circular shift of the byte.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Side(pub u8);

impl Side {
    pub const TOP_LEFT_EDGE: Side = Side(0b1000_0000);
    pub const TOP_RIGHT_EDGE: Side = Side(0b0100_0000);
    pub const RIGHT_TOP_EDGE: Side = Side(0b0010_0000);
    pub const RIGHT_BOTTOM_EDGE: Side = Side(0b0001_0000);
    pub const BOTTOM_RIGHT_EDGE: Side = Side(0b0000_1000);
    pub const BOTTOM_LEFT_EDGE: Side = Side(0b0000_0100);
    pub const LEFT_BOTTOM_EDGE: Side = Side(0b0000_0010);
    pub const LEFT_TOP_EDGE: Side = Side(0b0000_0001);

    pub const TOP: Side = Side(0b1100_0000);
    pub const RIGHT: Side = Side(0b0011_0000);
    pub const BOTTOM: Side = Side(0b0000_1100);
    pub const LEFT: Side = Side(0b0000_0011);

    pub const NONE: Side = Side(0);
    pub const ALL: Side = Side(0xFF);

    /// Whether every bit of `other` is set in `self`.
    #[inline]
    pub fn has_side(self, other: Side) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `self` and `other` share at least one bit.
    #[inline]
    pub fn overlaps_side(self, other: Side) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Rotate clockwise by `rotations` quarter turns.
    #[inline]
    pub fn rotate(self, rotations: u32) -> Side {
        Side(self.0.rotate_right(2 * (rotations % 4)))
    }

    /// The side of the neighbouring tile that touches this one.
    /// `TOP_LEFT_EDGE` faces `BOTTOM_LEFT_EDGE` of the tile above.
    #[inline]
    pub fn mirror(self) -> Side {
        self.rotate(2).flip_sides()
    }

    /// Swap the two halves of every edge.
    #[inline]
    pub fn flip_sides(self) -> Side {
        Side(((self.0 & 0b1010_1010) >> 1) | ((self.0 & 0b0101_0101) << 1))
    }

    /// Swap half-edges that meet at the same corner,
    /// e.g. `TOP_LEFT_EDGE` <-> `LEFT_TOP_EDGE`.
    #[inline]
    pub fn flip_corners(self) -> Side {
        let shifted = self.0.rotate_left(1);
        let swapped = ((shifted & 0b1010_1010) >> 1) | ((shifted & 0b0101_0101) << 1);
        Side(swapped.rotate_right(1))
    }

    /// The n-th full cardinal edge contained in `self`, scanning top, left,
    /// right, bottom. Returns `NONE` when there are fewer than `n + 1`.
    pub fn nth_cardinal_direction(self, n: usize) -> Side {
        CARDINAL_SCAN_ORDER
            .iter()
            .copied()
            .filter(|&c| self.has_side(c))
            .nth(n)
            .unwrap_or(Side::NONE)
    }

    /// Number of full cardinal edges contained in `self`.
    pub fn cardinal_directions_len(self) -> usize {
        CARDINAL_SCAN_ORDER.iter().filter(|&&c| self.has_side(c)).count()
    }
}

const CARDINAL_SCAN_ORDER: [Side; 4] = [Side::TOP, Side::LEFT, Side::RIGHT, Side::BOTTOM];

/// The four full edges, clockwise from the top.
pub const PRIMARY_SIDES: [Side; 4] = [Side::TOP, Side::RIGHT, Side::BOTTOM, Side::LEFT];

/// The eight half-edges, clockwise from the left half of the top edge.
pub const EDGE_SIDES: [Side; 8] = [
    Side::TOP_LEFT_EDGE,
    Side::TOP_RIGHT_EDGE,
    Side::RIGHT_TOP_EDGE,
    Side::RIGHT_BOTTOM_EDGE,
    Side::BOTTOM_RIGHT_EDGE,
    Side::BOTTOM_LEFT_EDGE,
    Side::LEFT_BOTTOM_EDGE,
    Side::LEFT_TOP_EDGE,
];

impl BitOr for Side {
    type Output = Side;
    fn bitor(self, rhs: Side) -> Side {
        Side(self.0 | rhs.0)
    }
}

impl BitOrAssign for Side {
    fn bitor_assign(&mut self, rhs: Side) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Side {
    type Output = Side;
    fn bitand(self, rhs: Side) -> Side {
        Side(self.0 & rhs.0)
    }
}

impl BitAndAssign for Side {
    fn bitand_assign(&mut self, rhs: Side) {
        self.0 &= rhs.0;
    }
}

impl Not for Side {
    type Output = Side;
    fn not(self) -> Side {
        Side(!self.0)
    }
}

const SIDE_NAMES: [(Side, &str, [(Side, &str); 2]); 4] = [
    (
        Side::TOP,
        "TOP",
        [(Side::TOP_LEFT_EDGE, "TOP_LEFT_EDGE"), (Side::TOP_RIGHT_EDGE, "TOP_RIGHT_EDGE")],
    ),
    (
        Side::RIGHT,
        "RIGHT",
        [(Side::RIGHT_TOP_EDGE, "RIGHT_TOP_EDGE"), (Side::RIGHT_BOTTOM_EDGE, "RIGHT_BOTTOM_EDGE")],
    ),
    (
        Side::BOTTOM,
        "BOTTOM",
        [
            (Side::BOTTOM_RIGHT_EDGE, "BOTTOM_RIGHT_EDGE"),
            (Side::BOTTOM_LEFT_EDGE, "BOTTOM_LEFT_EDGE"),
        ],
    ),
    (
        Side::LEFT,
        "LEFT",
        [(Side::LEFT_BOTTOM_EDGE, "LEFT_BOTTOM_EDGE"), (Side::LEFT_TOP_EDGE, "LEFT_TOP_EDGE")],
    ),
];

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = Vec::new();
        for (primary, primary_name, halves) in SIDE_NAMES {
            if self.has_side(primary) {
                names.push(primary_name);
                continue;
            }
            for (half, half_name) in halves {
                if self.has_side(half) {
                    names.push(half_name);
                }
            }
        }
        if names.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}
