//! Weather lookup for vessel positions.
//!
//! Positions are bucketed into 0.25° grid cells; each cell's observation is
//! fetched once from the upstream and reused until its TTL lapses.
//!
//! ```text
//! get(lat, lon) ──► GeoCell ──► WeatherGridCache ──hit──► WeatherObservation
//!                                     │ miss
//!                                     ▼
//!                               CellCoalescer ──leader──► WeatherClient
//! ```

mod cache;
mod client;
mod coalesce;
mod error;
mod observation;

pub use cache::{
    WeatherCacheConfig, WeatherCacheStats, WeatherGridCache, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_WEATHER_TTL,
};
pub use client::{
    OpenWeatherClient, WeatherClient, DEFAULT_WEATHER_HTTP_TIMEOUT, DEFAULT_WEATHER_URL,
};
pub use coalesce::{CellCoalescer, FetchOutcome};
pub use error::WeatherError;
pub use observation::{estimate_wave_height, RawWeather, WeatherObservation};
