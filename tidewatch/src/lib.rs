//! Tidewatch - weather-aware emissions tracking for live vessel traffic
//!
//! This library enriches a stream of vessel positions with weather-derived
//! hull resistance, recomputes CO₂ under that resistance, scores each vessel
//! for ESG risk, and fans the enriched records out to live subscribers.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use tidewatch::broadcast::BroadcastHub;
//! use tidewatch::config::ConfigFile;
//! use tidewatch::feed::SimulatedFeed;
//! use tidewatch::service::LiveService;
//!
//! let config = ConfigFile::load()?;
//! let hub = BroadcastHub::new(config.broadcast.subscriber_buffer);
//! let mut records = hub.subscribe();
//! let feed = SimulatedFeed::new(config.simulation_config());
//! let service = LiveService::start_from_config(&config, hub, feed)?;
//!
//! while let Some(record) = records.recv().await {
//!     println!("{}", record.to_json_line()?);
//! }
//! ```

pub mod broadcast;
pub mod config;
pub mod emissions;
pub mod feed;
pub mod geo;
pub mod logging;
pub mod pipeline;
pub mod service;
pub mod weather;

/// Version of the Tidewatch library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
