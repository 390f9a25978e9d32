//! Tidewatch CLI - live maritime emissions enrichment
//!
//! Streams simulated vessel positions through the weather-aware emissions
//! pipeline and prints one JSON record per line.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::run::RunArgs;
use commands::score::ScoreArgs;

#[derive(Parser)]
#[command(name = "tidewatch")]
#[command(version = tidewatch::VERSION)]
#[command(about = "Weather-adjusted emissions and ESG scoring for live vessel traffic", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the live service and stream enriched records to stdout
    Run {
        /// Simulated vessels per port sector (overrides config)
        #[arg(long)]
        vessels_per_sector: Option<u32>,

        /// Stop after this many seconds (runs until Ctrl-C if omitted)
        #[arg(long)]
        duration: Option<u64>,

        /// Enable debug logging
        #[arg(long)]
        debug: bool,
    },

    /// Score a single voyage offline
    Score {
        /// Wind speed in m/s
        #[arg(long)]
        wind: f64,

        /// Wave height in metres
        #[arg(long)]
        wave: f64,

        /// Baseline CO2 in kg, before weather
        #[arg(long)]
        base_co2: f64,

        /// Distance travelled in km
        #[arg(long)]
        distance: f64,

        /// Average speed in knots
        #[arg(long)]
        speed: f64,

        /// Acceleration events
        #[arg(long, default_value = "0")]
        accel: u32,

        /// Hours at sea
        #[arg(long, default_value = "24")]
        hours: f64,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            vessels_per_sector,
            duration,
            debug,
        } => commands::run::run(RunArgs {
            vessels_per_sector,
            duration,
            debug,
        }),
        Commands::Score {
            wind,
            wave,
            base_co2,
            distance,
            speed,
            accel,
            hours,
        } => commands::score::run(ScoreArgs {
            wind_speed_mps: wind,
            wave_height_m: wave,
            base_co2_kg: base_co2,
            distance_km: distance,
            speed_knots: speed,
            acceleration_events: accel,
            time_at_sea_hours: hours,
        }),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
