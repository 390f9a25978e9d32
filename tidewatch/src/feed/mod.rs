//! Vessel position feeds.
//!
//! The pipeline consumes any [`PositionSource`]. The only source shipped is
//! [`SimulatedFeed`], which models traffic off four Indian Ocean ports.

mod sector;
mod simulation;
mod source;

pub use sector::Sector;
pub use simulation::{
    SimulatedFeed, SimulatedVessel, SimulationConfig, DEFAULT_TICK, DEFAULT_VESSELS_PER_SECTOR,
    MAX_VESSELS_PER_SECTOR,
};
pub use source::PositionSource;
