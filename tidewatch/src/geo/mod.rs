//! Geographic grid cells used as weather cache keys.
//!
//! Positions are bucketed into fixed 0.25° × 0.25° cells. Every vessel inside
//! a cell shares one weather observation, which is what lets the weather
//! cache serve a whole anchorage from a single upstream call.

mod types;

pub use types::{GeoCell, CELL_SIZE_DEG};
