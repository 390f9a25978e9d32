//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let api_key = config.weather.api_key.as_deref().unwrap_or("");
    let log_file = path_to_string(&config.logging.file);

    format!(
        r#"[weather]
; OpenWeatherMap API key (https://openweathermap.org/api)
; If empty, OPENWEATHER_API_KEY is used; with neither, vessels get neutral weather
api_key = {}
; Current-weather endpoint (queried with units=metric)
base_url = {}
; Seconds a grid cell's observation stays fresh (default: 600)
ttl_secs = {}
; Seconds before an upstream fetch is abandoned (default: 5)
fetch_timeout_secs = {}

[predictor]
; Baseline CO2 model endpoint (POST, JSON feature vector)
url = {}
; Seconds before a prediction is abandoned and the update skipped (default: 5)
timeout_secs = {}

[pipeline]
; Enrichments running at once across all vessels (default: 32)
max_concurrent = {}
; Updates buffered per vessel lane (default: 16)
lane_queue_depth = {}
; Seconds a vessel lane may sit idle before it is retired (default: 60)
lane_idle_secs = {}

[broadcast]
; Records buffered per subscriber; a slow subscriber loses its oldest (default: 256)
subscriber_buffer = {}

[esg]
; Score penalties for weather conditions, 0-100 (default: 0, flag only)
storm_penalty = {}
rough_sea_penalty = {}
; kg CO2 per km above which a vessel is flagged (default: 50)
co2_intensity_threshold = {}
; Acceleration events above which a vessel is flagged (default: 20)
acceleration_threshold = {}
; Average speed in knots above which a vessel is flagged (default: 18)
speed_threshold = {}
; Hours at sea above which a vessel is flagged (default: 720)
long_operation_hours = {}

[simulation]
; Simulated vessels in each of the four port sectors (default: 5, max: 300)
vessels_per_sector = {}
; Milliseconds between simulated position reports (default: 2000)
tick_ms = {}

[logging]
; Log file path (default: ~/.tidewatch/tidewatch.log)
file = {}
"#,
        api_key,
        config.weather.base_url,
        config.weather.ttl_secs,
        config.weather.fetch_timeout_secs,
        config.predictor.url,
        config.predictor.timeout_secs,
        config.pipeline.max_concurrent,
        config.pipeline.lane_queue_depth,
        config.pipeline.lane_idle_secs,
        config.broadcast.subscriber_buffer,
        config.esg.storm_penalty,
        config.esg.rough_sea_penalty,
        config.esg.co2_intensity_threshold,
        config.esg.acceleration_threshold,
        config.esg.speed_threshold_knots,
        config.esg.long_operation_hours,
        config.simulation.vessels_per_sector,
        config.simulation.tick_ms,
        log_file,
    )
}

/// Render a path, abbreviating the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_config_parses_back() {
        let mut config = ConfigFile::default();
        config.weather.api_key = Some("k3y".to_string());
        config.esg.storm_penalty = 7;
        config.esg.co2_intensity_threshold = 42.5;
        config.simulation.vessels_per_sector = 9;

        let text = to_config_string(&config);
        let ini = ini::Ini::load_from_str(&text).unwrap();
        let parsed = super::super::parser::parse_ini(&ini).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_empty_api_key_written_blank() {
        let text = to_config_string(&ConfigFile::default());
        assert!(text.contains("\napi_key = \n"));
        assert!(text.contains("[esg]"));
    }
}
