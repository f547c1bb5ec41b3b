//! Built-in region catalog
//!
//! Sample farming regions drawn as polygons on the map. Picking one selects
//! the centre of its bounding box under the region's own name.

use crate::coord::Coordinate;
use serde::Serialize;

/// A named polygon region
#[derive(Debug, Clone, Serialize)]
pub struct Region {
    pub name: &'static str,
    /// Polygon vertices as (lat, lon)
    pub vertices: &'static [(f64, f64)],
}

impl Region {
    /// Centre of the polygon's bounding box
    pub fn center(&self) -> Coordinate {
        let (mut south, mut north) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut west, mut east) = (f64::INFINITY, f64::NEG_INFINITY);

        for &(lat, lon) in self.vertices {
            south = south.min(lat);
            north = north.max(lat);
            west = west.min(lon);
            east = east.max(lon);
        }

        Coordinate::new((south + north) / 2.0, (west + east) / 2.0)
    }
}

const REGIONS: &[Region] = &[
    Region {
        name: "Nairobi",
        vertices: &[
            (-1.3100, 36.7800),
            (-1.2500, 36.9200),
            (-1.2000, 36.8800),
            (-1.2600, 36.7600),
        ],
    },
    Region {
        name: "Mombasa",
        vertices: &[
            (-4.1000, 39.6500),
            (-4.0800, 39.7300),
            (-3.9800, 39.7200),
            (-4.0000, 39.6400),
        ],
    },
    Region {
        name: "Kisumu",
        vertices: &[
            (-0.1500, 34.7000),
            (-0.0500, 34.7600),
            (-0.0200, 34.7300),
            (-0.1000, 34.6800),
        ],
    },
];

/// All known regions
pub fn available_regions() -> &'static [Region] {
    REGIONS
}

/// Look up a region by name (case-insensitive)
pub fn find_region(name: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.name.eq_ignore_ascii_case(name))
}
