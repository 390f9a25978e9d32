//! Port approaches covered by the simulator.

use std::fmt;
use std::ops::Range;

/// A monitored port approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sector {
    Singapore,
    Mumbai,
    Visakhapatnam,
    Mangalore,
}

impl Sector {
    pub const ALL: [Sector; 4] = [
        Sector::Singapore,
        Sector::Mumbai,
        Sector::Visakhapatnam,
        Sector::Mangalore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sector::Singapore => "Singapore",
            Sector::Mumbai => "India",
            Sector::Visakhapatnam => "Visakhapatnam",
            Sector::Mangalore => "Mangalore",
        }
    }

    /// Point vessels are scattered around, as (lat, lon).
    pub fn anchor(&self) -> (f64, f64) {
        match self {
            Sector::Singapore => (1.25, 103.8),
            Sector::Mumbai => (18.9, 72.8),
            Sector::Visakhapatnam => (17.7, 83.3),
            Sector::Mangalore => (12.9, 74.8),
        }
    }

    /// Full width of the initial scatter, as (lat, lon) degrees.
    pub fn spread(&self) -> (f64, f64) {
        match self {
            Sector::Singapore => (0.1, 0.2),
            Sector::Mumbai => (0.1, 0.1),
            Sector::Visakhapatnam | Sector::Mangalore => (0.05, 0.05),
        }
    }

    /// Initial speed range in knots.
    pub fn speed_range(&self) -> Range<f64> {
        match self {
            Sector::Singapore => 10.0..20.0,
            Sector::Mumbai => 8.0..16.0,
            Sector::Visakhapatnam => 5.0..10.0,
            Sector::Mangalore => 6.0..12.0,
        }
    }

    /// MMSI of the `index`-th simulated vessel in this sector.
    pub fn mmsi(&self, index: u32) -> String {
        let base: u32 = match self {
            Sector::Singapore => 563_000,
            Sector::Mumbai => 419_000,
            Sector::Visakhapatnam => 419_500,
            Sector::Mangalore => 419_800,
        };
        (base + index).to_string()
    }

    /// Bounding box as (lat_min, lat_max, lon_min, lon_max), inclusive.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        match self {
            Sector::Singapore => (1.1, 1.5, 103.5, 104.1),
            Sector::Mumbai => (18.8, 19.2, 72.5, 73.0),
            Sector::Visakhapatnam => (17.6, 17.8, 83.2, 83.4),
            Sector::Mangalore => (12.8, 13.0, 74.7, 74.9),
        }
    }

    /// Sector whose bounding box contains the point, if any.
    pub fn locate(lat: f64, lon: f64) -> Option<Sector> {
        Self::ALL.into_iter().find(|sector| {
            let (lat_min, lat_max, lon_min, lon_max) = sector.bounds();
            (lat_min..=lat_max).contains(&lat) && (lon_min..=lon_max).contains(&lon)
        })
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
