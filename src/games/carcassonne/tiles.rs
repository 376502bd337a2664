//! Tile templates for the Carcassonne base game (24 types, 72 tiles) and
//! the tile sets built from them.
//!
//! Templates are canonical, unrotated feature lists. Feature order is part
//! of a template's identity, so keep it stable.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::side::Side;
use super::types::{Feature, FeatureType, Tile};

use FeatureType::{City, Field, Monastery, Road};

const TL: Side = Side::TOP_LEFT_EDGE;
const TR: Side = Side::TOP_RIGHT_EDGE;
const RT: Side = Side::RIGHT_TOP_EDGE;
const RB: Side = Side::RIGHT_BOTTOM_EDGE;
const BR: Side = Side::BOTTOM_RIGHT_EDGE;
const BL: Side = Side::BOTTOM_LEFT_EDGE;
const LB: Side = Side::LEFT_BOTTOM_EDGE;
const LT: Side = Side::LEFT_TOP_EDGE;

fn f(feature_type: FeatureType, sides: Side) -> Feature {
    Feature::new(feature_type, sides)
}

fn shielded(feature_type: FeatureType, sides: Side) -> Feature {
    Feature::shielded(feature_type, sides)
}

fn tile(features: &[Feature]) -> Tile {
    Tile::new(features.to_vec())
}

// --- Monasteries and roads ---

pub fn monastery_without_roads() -> Tile {
    tile(&[f(Field, Side::ALL), f(Monastery, Side::NONE)])
}

pub fn monastery_with_single_road() -> Tile {
    tile(&[f(Road, Side::BOTTOM), f(Field, Side::ALL), f(Monastery, Side::NONE)])
}

pub fn straight_roads() -> Tile {
    tile(&[
        f(Road, Side::LEFT | Side::RIGHT),
        f(Field, LB | BL | BR | RB),
        f(Field, LT | TL | TR | RT),
    ])
}

pub fn roads_turn() -> Tile {
    tile(&[
        f(Road, Side::LEFT | Side::BOTTOM),
        f(Field, LB | BL),
        f(Field, LT | TL | TR | RT | RB | BR),
    ])
}

pub fn t_cross_road() -> Tile {
    tile(&[
        f(Road, Side::LEFT),
        f(Road, Side::RIGHT),
        f(Road, Side::BOTTOM),
        f(Field, LB | BL),
        f(Field, RB | BR),
        f(Field, LT | TL | TR | RT),
    ])
}

pub fn x_cross_road() -> Tile {
    tile(&[
        f(Road, Side::LEFT),
        f(Road, Side::BOTTOM),
        f(Road, Side::RIGHT),
        f(Road, Side::TOP),
        f(Field, LB | BL),
        f(Field, RB | BR),
        f(Field, LT | TL),
        f(Field, TR | RT),
    ])
}

// --- One city edge ---

pub fn single_city_edge_no_roads() -> Tile {
    tile(&[f(City, Side::TOP), f(Field, LT | RT | RB | BR | LB | BL)])
}

pub fn single_city_edge_straight_roads() -> Tile {
    tile(&[
        f(City, Side::TOP),
        f(Road, Side::RIGHT | Side::LEFT),
        f(Field, RB | BR | LB | BL),
        f(Field, LT | RT),
    ])
}

pub fn single_city_edge_left_road_turn() -> Tile {
    tile(&[
        f(City, Side::TOP),
        f(Road, Side::LEFT | Side::BOTTOM),
        f(Field, RB | BR | LT | RT),
        f(Field, BL | LB),
    ])
}

pub fn single_city_edge_right_road_turn() -> Tile {
    tile(&[
        f(City, Side::TOP),
        f(Road, Side::RIGHT | Side::BOTTOM),
        f(Field, LT | RT | BL | LB),
        f(Field, RB | BR),
    ])
}

pub fn single_city_edge_cross_road() -> Tile {
    tile(&[
        f(City, Side::TOP),
        f(Road, Side::RIGHT),
        f(Road, Side::LEFT),
        f(Road, Side::BOTTOM),
        f(Field, LT | RT),
        f(Field, RB | BR),
        f(Field, BL | LB),
    ])
}

// --- Two city edges ---

pub fn two_city_edges_up_and_down_not_connected() -> Tile {
    tile(&[f(City, Side::TOP), f(City, Side::BOTTOM), f(Field, LT | RT | LB | RB)])
}

pub fn two_city_edges_corner_not_connected() -> Tile {
    tile(&[f(City, Side::TOP), f(City, Side::RIGHT), f(Field, LT | LB | BL | BR)])
}

fn two_city_edges_up_and_down(city: Feature) -> Tile {
    tile(&[city, f(Field, LT | LB), f(Field, RT | RB)])
}

pub fn two_city_edges_up_and_down_connected() -> Tile {
    two_city_edges_up_and_down(f(City, Side::TOP | Side::BOTTOM))
}

pub fn two_city_edges_up_and_down_connected_shield() -> Tile {
    two_city_edges_up_and_down(shielded(City, Side::TOP | Side::BOTTOM))
}

pub fn two_city_edges_corner_connected() -> Tile {
    tile(&[f(City, Side::TOP | Side::RIGHT), f(Field, LT | LB | BL | BR)])
}

pub fn two_city_edges_corner_connected_shield() -> Tile {
    tile(&[shielded(City, Side::TOP | Side::RIGHT), f(Field, LT | LB | BL | BR)])
}

fn two_city_edges_corner_road_turn(city: Feature) -> Tile {
    tile(&[
        city,
        f(Road, Side::LEFT | Side::BOTTOM),
        f(Field, LB | BL),
        f(Field, LT | BR),
    ])
}

pub fn two_city_edges_corner_connected_road_turn() -> Tile {
    two_city_edges_corner_road_turn(f(City, Side::TOP | Side::RIGHT))
}

pub fn two_city_edges_corner_connected_road_turn_shield() -> Tile {
    two_city_edges_corner_road_turn(shielded(City, Side::TOP | Side::RIGHT))
}

// --- Three and four city edges ---

const THREE_EDGES: Side = Side(Side::TOP.0 | Side::RIGHT.0 | Side::LEFT.0);

pub fn three_city_edges_connected() -> Tile {
    tile(&[f(City, THREE_EDGES), f(Field, BL | BR)])
}

pub fn three_city_edges_connected_shield() -> Tile {
    tile(&[shielded(City, THREE_EDGES), f(Field, BL | BR)])
}

fn three_city_edges_road(city: Feature) -> Tile {
    tile(&[city, f(Road, Side::BOTTOM), f(Field, BL), f(Field, BR)])
}

pub fn three_city_edges_connected_road() -> Tile {
    three_city_edges_road(f(City, THREE_EDGES))
}

pub fn three_city_edges_connected_road_shield() -> Tile {
    three_city_edges_road(shielded(City, THREE_EDGES))
}

pub fn four_city_edges_connected_shield() -> Tile {
    tile(&[shielded(City, Side::ALL)])
}

// --- Test-only templates ---

pub fn only_field() -> Tile {
    tile(&[f(Field, Side::TOP | Side::RIGHT | Side::LEFT | Side::BOTTOM)])
}

pub fn only_straight_road() -> Tile {
    tile(&[f(Road, Side::RIGHT | Side::LEFT)])
}

pub fn only_monastery() -> Tile {
    tile(&[f(Monastery, Side::NONE)])
}

// --- Tile sets ---

/// (template, copies in the base game). The starting tile is one of the
/// `single_city_edge_straight_roads` copies.
pub static BASE_GAME_TEMPLATES: Lazy<Vec<(Tile, usize)>> = Lazy::new(|| {
    vec![
        (monastery_without_roads(), 4),
        (monastery_with_single_road(), 2),
        (straight_roads(), 8),
        (roads_turn(), 9),
        (t_cross_road(), 4),
        (x_cross_road(), 1),
        (single_city_edge_no_roads(), 5),
        (single_city_edge_straight_roads(), 4),
        (single_city_edge_left_road_turn(), 3),
        (single_city_edge_right_road_turn(), 3),
        (single_city_edge_cross_road(), 3),
        (two_city_edges_up_and_down_not_connected(), 3),
        (two_city_edges_corner_not_connected(), 2),
        (two_city_edges_up_and_down_connected(), 1),
        (two_city_edges_up_and_down_connected_shield(), 2),
        (two_city_edges_corner_connected(), 3),
        (two_city_edges_corner_connected_shield(), 2),
        (two_city_edges_corner_connected_road_turn(), 3),
        (two_city_edges_corner_connected_road_turn_shield(), 2),
        (three_city_edges_connected(), 3),
        (three_city_edges_connected_shield(), 1),
        (three_city_edges_connected_road(), 1),
        (three_city_edges_connected_road_shield(), 2),
        (four_city_edges_connected_shield(), 1),
    ]
});

static STANDARD_TILE_SET: Lazy<TileSet> = Lazy::new(|| {
    let starting_tile = single_city_edge_straight_roads();
    let mut tiles: Vec<Tile> = BASE_GAME_TEMPLATES
        .iter()
        .flat_map(|(template, count)| std::iter::repeat(template.clone()).take(*count))
        .collect();
    if let Some(i) = tiles.iter().position(|t| t.exact_equals(&starting_tile)) {
        tiles.remove(i);
    }
    TileSet { starting_tile, tiles }
});

/// A starting tile plus the tiles players draw from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSet {
    pub starting_tile: Tile,
    pub tiles: Vec<Tile>,
}

impl TileSet {
    pub fn from_tiles(starting_tile: Tile, tiles: Vec<Tile>) -> Self {
        Self { starting_tile, tiles }
    }

    /// The 72-tile base game: 71 drawable tiles plus the starting tile.
    pub fn standard() -> Self {
        STANDARD_TILE_SET.clone()
    }

    /// Every base-game template exactly once.
    pub fn every_tile_once() -> Self {
        Self {
            starting_tile: single_city_edge_straight_roads(),
            tiles: BASE_GAME_TEMPLATES.iter().map(|(t, _)| t.clone()).collect(),
        }
    }

    /// Twelve road-and-field heavy tiles, handy for short games.
    pub fn mini() -> Self {
        let mut tiles = vec![monastery_with_single_road()];
        tiles.extend(std::iter::repeat(straight_roads()).take(2));
        tiles.push(single_city_edge_straight_roads());
        tiles.extend(std::iter::repeat(roads_turn()).take(3));
        tiles.extend(std::iter::repeat(t_cross_road()).take(2));
        tiles.extend(std::iter::repeat(two_city_edges_up_and_down_not_connected()).take(3));
        Self {
            starting_tile: single_city_edge_straight_roads(),
            tiles,
        }
    }

    /// Tiles on the board once every drawable tile has been placed.
    pub fn capacity(&self) -> usize {
        self.tiles.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_game_template_count() {
        assert_eq!(BASE_GAME_TEMPLATES.len(), 24);
        let total: usize = BASE_GAME_TEMPLATES.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 72);
    }

    #[test]
    fn test_standard_tile_set_size() {
        let set = TileSet::standard();
        assert_eq!(set.tiles.len(), 71);
        assert_eq!(set.capacity(), 72);
        let starting_copies = set
            .tiles
            .iter()
            .filter(|t| t.exact_equals(&single_city_edge_straight_roads()))
            .count();
        assert_eq!(starting_copies, 3);
    }

    #[test]
    fn test_small_tile_sets() {
        assert_eq!(TileSet::mini().tiles.len(), 12);
        assert_eq!(TileSet::every_tile_once().tiles.len(), 24);
    }

    #[test]
    fn test_templates_cover_every_edge() {
        // Roads and fields may overlap; everything else partitions the 8 half-edges.
        for (template, _) in BASE_GAME_TEMPLATES.iter() {
            let covered = template
                .features
                .iter()
                .filter(|f| f.feature_type != Road)
                .fold(Side::NONE, |acc, f| acc | f.sides);
            let has_enclosing_field = template
                .features
                .iter()
                .any(|f| f.feature_type == Field && f.sides == Side::ALL);
            assert!(
                covered == Side::ALL || has_enclosing_field,
                "template leaves edges uncovered: {template:?}"
            );
        }
    }

    #[test]
    fn test_starting_tile_layout() {
        let start = TileSet::standard().starting_tile;
        assert_eq!(start.features[0].feature_type, City);
        assert_eq!(start.features[0].sides, Side::TOP);
        assert_eq!(start.features[1].sides, Side::LEFT | Side::RIGHT);
    }
}
