//! Spatial index: exact-coordinate lookup tables for a composed region.
//!
//! Built once per region load in O(n) over entity count; never mutated
//! incrementally. Settlements with a signpost are indexed under both the
//! primary and the signpost coordinate.

use crate::world::{PointOfInterest, Region, Settlement};
use std::collections::HashMap;

#[derive(Debug)]
pub struct SpatialIndex<'a> {
    settlements: HashMap<(i64, i64), &'a Settlement>,
    pois: HashMap<(i64, i64), &'a PointOfInterest>,
}

impl<'a> SpatialIndex<'a> {
    pub fn build(region: &'a Region) -> Self {
        let mut settlements = HashMap::new();
        for s in &region.settlements {
            settlements.insert((s.x, s.y), s);
            if let Some(post) = s.signpost {
                settlements.insert((post.x, post.y), s);
            }
        }

        let mut pois = HashMap::new();
        for p in &region.points_of_interest {
            pois.insert((p.x, p.y), p);
        }

        Self { settlements, pois }
    }

    pub fn settlement_at(&self, x: i64, y: i64) -> Option<&'a Settlement> {
        self.settlements.get(&(x, y)).copied()
    }

    pub fn poi_at(&self, x: i64, y: i64) -> Option<&'a PointOfInterest> {
        self.pois.get(&(x, y)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Coord, PoiKind, SettlementKind};

    fn region() -> Region {
        Region {
            id: "t".into(),
            name: "T".into(),
            width: 40,
            height: 30,
            legend: HashMap::new(),
            tiles: (0..30).map(|_| ".".repeat(40)).collect(),
            named_regions: vec![],
            settlements: vec![
                Settlement {
                    id: "brindlewick".into(),
                    name: "Brindlewick".into(),
                    kind: SettlementKind::Town,
                    x: 22,
                    y: 18,
                    signpost: Some(Coord::new(21, 18)),
                    travel_fee: None,
                    tier: None,
                    prosperity: None,
                },
                Settlement {
                    id: "fernholt".into(),
                    name: "Fernholt".into(),
                    kind: SettlementKind::Village,
                    x: 5,
                    y: 5,
                    signpost: None,
                    travel_fee: None,
                    tier: None,
                    prosperity: None,
                },
            ],
            points_of_interest: vec![PointOfInterest {
                id: "old-ruins".into(),
                name: "Old Ruins".into(),
                kind: PoiKind::Ruins,
                x: 10,
                y: 3,
                min_level: Some(2),
                note: None,
            }],
        }
    }

    #[test]
    fn both_settlement_coordinates_resolve() {
        let r = region();
        let idx = SpatialIndex::build(&r);
        assert_eq!(idx.settlement_at(22, 18).map(|s| s.id.as_str()), Some("brindlewick"));
        assert_eq!(idx.settlement_at(21, 18).map(|s| s.id.as_str()), Some("brindlewick"));
        assert_eq!(idx.settlement_at(5, 5).map(|s| s.id.as_str()), Some("fernholt"));
        assert!(idx.settlement_at(0, 0).is_none());
    }

    #[test]
    fn poi_lookup_is_exact() {
        let r = region();
        let idx = SpatialIndex::build(&r);
        assert_eq!(idx.poi_at(10, 3).map(|p| p.id.as_str()), Some("old-ruins"));
        assert!(idx.poi_at(10, 4).is_none());
    }
}
