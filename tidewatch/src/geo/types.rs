//! Grid cell type definitions

use std::fmt;

/// Edge length of a grid cell in degrees.
pub const CELL_SIZE_DEG: f64 = 0.25;

/// Identity of a weather grid square.
///
/// Derived by flooring latitude and longitude to [`CELL_SIZE_DEG`]. Two
/// positions map to the same cell iff both floored indices match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeoCell {
    /// `floor(lat / CELL_SIZE_DEG)`
    pub lat_index: i32,
    /// `floor(lon / CELL_SIZE_DEG)`
    pub lon_index: i32,
}

impl GeoCell {
    /// Computes the cell containing a point.
    ///
    /// Non-finite coordinates collapse to cell (0, 0); callers that care
    /// validate positions before they reach the cache.
    #[inline]
    pub fn containing(lat: f64, lon: f64) -> Self {
        Self {
            lat_index: floor_index(lat),
            lon_index: floor_index(lon),
        }
    }

    /// Returns the south-west corner of the cell.
    pub fn origin(&self) -> (f64, f64) {
        (
            self.lat_index as f64 * CELL_SIZE_DEG,
            self.lon_index as f64 * CELL_SIZE_DEG,
        )
    }

    /// Returns the centre of the cell.
    ///
    /// This is the point sent to the weather upstream so every vessel in the
    /// cell receives the observation for the same coordinate.
    pub fn center(&self) -> (f64, f64) {
        let (lat, lon) = self.origin();
        (lat + CELL_SIZE_DEG / 2.0, lon + CELL_SIZE_DEG / 2.0)
    }
}

impl fmt::Display for GeoCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lat, lon) = self.origin();
        write!(f, "{:.2},{:.2}", lat, lon)
    }
}

fn floor_index(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    (value / CELL_SIZE_DEG).floor() as i32
}
