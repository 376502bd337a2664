//! Point rules and the score report handed back to callers after each
//! placement and at game end.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{FeatureType, Meeple, PlayerId, Position};

/// A meeple leaving the board, with where it stood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReturnedMeeple {
    pub meeple: Meeple,
    pub position: Position,
    pub feature_index: usize,
}

/// Points gained and meeples returned, per player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub received_points: BTreeMap<PlayerId, u32>,
    pub returned_meeples: BTreeMap<PlayerId, Vec<ReturnedMeeple>>,
}

impl ScoreReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.received_points.is_empty() && self.returned_meeples.is_empty()
    }

    /// Majority rule: every player tied on the highest meeple count gets the
    /// full `points`, and every meeple goes back to its owner. Zero points
    /// leave `received_points` untouched.
    pub fn from_meeples(points: u32, meeples: &[ReturnedMeeple]) -> Self {
        let mut report = ScoreReport::new();
        if meeples.is_empty() {
            return report;
        }

        let mut counts: BTreeMap<PlayerId, usize> = BTreeMap::new();
        for m in meeples {
            *counts.entry(m.meeple.owner).or_insert(0) += 1;
        }
        let max_count = counts.values().copied().max().unwrap_or(0);
        for (&player, &count) in &counts {
            if count == max_count && points > 0 {
                report.received_points.insert(player, points);
            }
        }

        for m in meeples {
            report.returned_meeples.entry(m.meeple.owner).or_default().push(*m);
        }
        for list in report.returned_meeples.values_mut() {
            list.sort();
        }
        report
    }

    /// Merge `other` into `self`. Order of merging never matters.
    pub fn join(&mut self, other: &ScoreReport) {
        for (&player, &points) in &other.received_points {
            *self.received_points.entry(player).or_insert(0) += points;
        }
        for (&player, meeples) in &other.returned_meeples {
            let list = self.returned_meeples.entry(player).or_default();
            list.extend_from_slice(meeples);
            list.sort();
        }
    }

    pub fn joined(mut self, other: &ScoreReport) -> Self {
        self.join(other);
        self
    }

    pub fn contains_meeple(&self, meeple: &ReturnedMeeple) -> bool {
        self.returned_meeples.values().flatten().any(|m| m == meeple)
    }

    pub fn total_points(&self) -> u32 {
        self.received_points.values().sum()
    }

    pub fn meeples(&self) -> impl Iterator<Item = &ReturnedMeeple> {
        self.returned_meeples.values().flatten()
    }
}

// --- Point rules ---

pub fn road_points(tiles: usize) -> u32 {
    tiles as u32
}

/// Complete cities are worth double.
pub fn city_points(tiles: usize, shields: usize, completed: bool) -> u32 {
    let base = (tiles + shields) as u32;
    if completed {
        base * 2
    } else {
        base
    }
}

/// `present_tiles` counts the monastery tile itself, so a surrounded one is worth 9.
pub fn monastery_points(present_tiles: usize) -> u32 {
    present_tiles as u32
}

pub fn field_points(completed_cities: usize) -> u32 {
    3 * completed_cities as u32
}

// --- End game breakdown ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPoints {
    pub roads: u32,
    pub cities: u32,
    pub monasteries: u32,
    pub fields: u32,
}

impl CategoryPoints {
    pub fn total(&self) -> u32 {
        self.roads + self.cities + self.monasteries + self.fields
    }
}

/// End-game points per player, split by feature type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureBreakdown {
    pub players: BTreeMap<PlayerId, CategoryPoints>,
}

impl FeatureBreakdown {
    pub fn record(&mut self, feature_type: FeatureType, report: &ScoreReport) {
        for (&player, &points) in &report.received_points {
            let entry = self.players.entry(player).or_default();
            let slot = match feature_type {
                FeatureType::Road => &mut entry.roads,
                FeatureType::City => &mut entry.cities,
                FeatureType::Monastery => &mut entry.monasteries,
                FeatureType::Field => &mut entry.fields,
            };
            *slot += points;
        }
    }

    pub fn get(&self, player: PlayerId) -> CategoryPoints {
        self.players.get(&player).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn returned(owner: u8, x: i16, y: i16) -> ReturnedMeeple {
        ReturnedMeeple {
            meeple: Meeple::new(PlayerId(owner)),
            position: Position::new(x, y),
            feature_index: 0,
        }
    }

    #[test]
    fn test_majority_single_winner() {
        let meeples = [returned(1, 0, 0), returned(1, 1, 0), returned(2, 2, 0)];
        let report = ScoreReport::from_meeples(7, &meeples);
        assert_eq!(report.received_points.get(&PlayerId(1)), Some(&7));
        assert_eq!(report.received_points.get(&PlayerId(2)), None);
        assert_eq!(report.returned_meeples[&PlayerId(1)].len(), 2);
        assert_eq!(report.returned_meeples[&PlayerId(2)].len(), 1);
    }

    #[test]
    fn test_majority_tie_scores_everyone() {
        let meeples = [returned(1, 0, 0), returned(2, 1, 0)];
        let report = ScoreReport::from_meeples(4, &meeples);
        assert_eq!(report.received_points[&PlayerId(1)], 4);
        assert_eq!(report.received_points[&PlayerId(2)], 4);
        assert_eq!(report.total_points(), 8);
    }

    #[test]
    fn test_no_meeples_is_empty() {
        assert!(ScoreReport::from_meeples(10, &[]).is_empty());
    }

    #[test]
    fn test_zero_points_only_return_meeples() {
        let report = ScoreReport::from_meeples(0, &[returned(1, 0, 0), returned(2, 1, 0)]);
        assert!(report.received_points.is_empty());
        assert_eq!(report.meeples().count(), 2);
        assert_eq!(report.total_points(), 0);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_join_sums_points_and_meeples() {
        let mut a = ScoreReport::from_meeples(3, &[returned(1, 0, 0)]);
        let b = ScoreReport::from_meeples(
            5,
            &[returned(1, 4, 4), returned(2, 5, 5), returned(2, 6, 6)],
        );
        a.join(&b);
        assert_eq!(a.received_points[&PlayerId(1)], 3);
        assert_eq!(a.received_points[&PlayerId(2)], 5);
        assert_eq!(a.returned_meeples[&PlayerId(1)].len(), 2);
        assert!(a.contains_meeple(&returned(2, 6, 6)));
        assert!(!a.contains_meeple(&returned(1, 6, 6)));
    }

    #[test]
    fn test_join_is_commutative() {
        let a = ScoreReport::from_meeples(3, &[returned(1, 0, 0), returned(2, 9, 9)]);
        let b = ScoreReport::from_meeples(
            5,
            &[returned(2, 1, 0), returned(1, -1, 0), returned(2, 3, 3)],
        );
        assert_eq!(a.clone().joined(&b), b.clone().joined(&a));
    }

    #[test]
    fn test_join_with_empty_is_noop() {
        let a = ScoreReport::from_meeples(3, &[returned(1, 0, 0)]);
        assert_eq!(a.clone().joined(&ScoreReport::new()), a);
        assert_eq!(ScoreReport::new().joined(&a), a);
    }

    #[test]
    fn test_point_rules() {
        assert_eq!(road_points(4), 4);
        assert_eq!(city_points(3, 1, true), 8);
        assert_eq!(city_points(3, 1, false), 4);
        assert_eq!(monastery_points(9), 9);
        assert_eq!(field_points(2), 6);
    }

    #[test]
    fn test_breakdown_records_by_category() {
        let mut breakdown = FeatureBreakdown::default();
        breakdown.record(FeatureType::Road, &ScoreReport::from_meeples(3, &[returned(1, 0, 0)]));
        breakdown.record(FeatureType::Field, &ScoreReport::from_meeples(6, &[returned(1, 0, 0)]));
        let points = breakdown.get(PlayerId(1));
        assert_eq!(points.roads, 3);
        assert_eq!(points.fields, 6);
        assert_eq!(points.total(), 9);
        assert_eq!(breakdown.get(PlayerId(2)).total(), 0);
    }
}
