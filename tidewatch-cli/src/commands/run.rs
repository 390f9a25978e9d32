//! Run command - stream enriched vessel records to stdout.

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Duration;

use tidewatch::broadcast::BroadcastHub;
use tidewatch::config::ConfigFile;
use tidewatch::emissions::{EsgAssessment, FleetSummary, Rating};
use tidewatch::feed::{SimulatedFeed, MAX_VESSELS_PER_SECTOR};
use tidewatch::pipeline::EnrichedRecord;
use tidewatch::service::LiveService;
use tracing::{info, warn};

use crate::error::CliError;
use crate::runner::CliRunner;

/// How often pipeline statistics are logged while running.
const STATS_INTERVAL: Duration = Duration::from_secs(30);

/// Arguments for the run command.
#[derive(Debug, Default)]
pub struct RunArgs {
    pub vessels_per_sector: Option<u32>,
    pub duration: Option<u64>,
    pub debug: bool,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup("run");

    if let Some(count) = args.vessels_per_sector {
        if count == 0 || count > MAX_VESSELS_PER_SECTOR {
            return Err(CliError::Config(format!(
                "--vessels-per-sector must be between 1 and {}",
                MAX_VESSELS_PER_SECTOR
            )));
        }
        runner.config_mut().simulation.vessels_per_sector = count;
    }

    if runner.config().weather_api_key().is_none() {
        warn!("No weather API key configured, records will carry neutral weather");
    }

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    runtime.block_on(stream(runner.config(), args.duration.map(Duration::from_secs)))
}

async fn stream(config: &ConfigFile, duration: Option<Duration>) -> Result<(), CliError> {
    let hub = BroadcastHub::new(config.broadcast.subscriber_buffer);
    let mut records = hub.subscribe();
    let feed = SimulatedFeed::new(config.simulation_config());
    let service = LiveService::start_from_config(config, hub, feed)?;

    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut stats_tick = tokio::time::interval(STATS_INTERVAL);
    stats_tick.tick().await;

    let mut stdout = io::stdout().lock();
    let mut emitted: u64 = 0;
    let mut fleet = FleetBoard::default();

    let outcome = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, shutting down");
                break Ok(());
            }
            _ = &mut deadline => {
                info!("Run duration elapsed, shutting down");
                break Ok(());
            }
            _ = stats_tick.tick() => {
                service.log_stats();
                fleet.log_summary();
                let purged = service.purge_weather();
                if purged > 0 {
                    info!(purged, "Purged expired weather cells");
                }
            }
            maybe = records.recv() => match maybe {
                Some(record) => match write_record(&mut stdout, &record) {
                    Ok(()) => {
                        emitted += 1;
                        fleet.observe(&record);
                    }
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        info!("Output closed, shutting down");
                        break Ok(());
                    }
                    Err(e) => break Err(CliError::Output(e)),
                },
                None => break Ok(()),
            }
        }
    };

    if records.dropped() > 0 {
        warn!(
            dropped = records.dropped(),
            "Output fell behind, oldest records were dropped"
        );
    }
    drop(records);

    service.log_stats();
    fleet.log_summary();
    service.shutdown().await?;
    info!(emitted, "Run finished");

    outcome
}

fn write_record(out: &mut impl Write, record: &EnrichedRecord) -> io::Result<()> {
    let line = record.to_json_line()?;
    writeln!(out, "{}", line)?;
    out.flush()
}

/// Latest ESG assessment per vessel seen on the output stream.
#[derive(Debug, Default)]
struct FleetBoard {
    latest: HashMap<String, EsgAssessment>,
}

impl FleetBoard {
    fn observe(&mut self, record: &EnrichedRecord) {
        self.latest.insert(record.mmsi.clone(), record.assessment());
    }

    fn summary(&self) -> FleetSummary {
        FleetSummary::from_assessments(self.latest.values())
    }

    fn log_summary(&self) {
        if self.latest.is_empty() {
            return;
        }
        let summary = self.summary();
        let ratings = Rating::ALL
            .iter()
            .map(|r| format!("{}={}", r, summary.count(*r)))
            .collect::<Vec<_>>()
            .join(" ");
        info!(
            vessels = summary.total_vessels,
            average_score = summary.average_score,
            ratings = %ratings,
            with_risks = summary.vessels_with_risks,
            top_risks = ?summary.most_common_risks,
            "Fleet summary"
        );
    }
}
