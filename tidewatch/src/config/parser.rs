//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::feed::MAX_VESSELS_PER_SECTOR;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [weather] section
    if let Some(section) = ini.section(Some("weather")) {
        if let Some(v) = section.get("api_key") {
            let v = v.trim();
            if !v.is_empty() {
                config.weather.api_key = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("base_url") {
            let v = v.trim();
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid("weather", "base_url", v, "must be an http(s) URL"));
            }
            config.weather.base_url = v.to_string();
        }
        if let Some(v) = positive(section, "weather", "ttl_secs", "must be a positive integer (seconds)")? {
            config.weather.ttl_secs = v;
        }
        if let Some(v) = positive(
            section,
            "weather",
            "fetch_timeout_secs",
            "must be a positive integer (seconds)",
        )? {
            config.weather.fetch_timeout_secs = v;
        }
    }

    // [predictor] section
    if let Some(section) = ini.section(Some("predictor")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid("predictor", "url", v, "must be an http(s) URL"));
            }
            config.predictor.url = v.to_string();
        }
        if let Some(v) = positive(
            section,
            "predictor",
            "timeout_secs",
            "must be a positive integer (seconds)",
        )? {
            config.predictor.timeout_secs = v;
        }
    }

    // [pipeline] section
    if let Some(section) = ini.section(Some("pipeline")) {
        if let Some(v) = positive(section, "pipeline", "max_concurrent", "must be a positive integer")? {
            config.pipeline.max_concurrent = v;
        }
        if let Some(v) = positive(section, "pipeline", "lane_queue_depth", "must be a positive integer")? {
            config.pipeline.lane_queue_depth = v;
        }
        if let Some(v) = positive(
            section,
            "pipeline",
            "lane_idle_secs",
            "must be a positive integer (seconds)",
        )? {
            config.pipeline.lane_idle_secs = v;
        }
    }

    // [broadcast] section
    if let Some(section) = ini.section(Some("broadcast")) {
        if let Some(v) = positive(section, "broadcast", "subscriber_buffer", "must be a positive integer")? {
            config.broadcast.subscriber_buffer = v;
        }
    }

    // [esg] section
    if let Some(section) = ini.section(Some("esg")) {
        if let Some(v) = penalty(section, "storm_penalty")? {
            config.esg.storm_penalty = v;
        }
        if let Some(v) = penalty(section, "rough_sea_penalty")? {
            config.esg.rough_sea_penalty = v;
        }
        if let Some(v) = threshold(section, "co2_intensity_threshold")? {
            config.esg.co2_intensity_threshold = v;
        }
        if let Some(v) = parsed::<u32>(section, "esg", "acceleration_threshold", "must be a non-negative integer")? {
            config.esg.acceleration_threshold = v;
        }
        if let Some(v) = threshold(section, "speed_threshold")? {
            config.esg.speed_threshold_knots = v;
        }
        if let Some(v) = threshold(section, "long_operation_hours")? {
            config.esg.long_operation_hours = v;
        }
    }

    // [simulation] section
    if let Some(section) = ini.section(Some("simulation")) {
        if let Some(v) = section.get("vessels_per_sector") {
            let count: u32 = v
                .trim()
                .parse()
                .ok()
                .filter(|n| (1..=MAX_VESSELS_PER_SECTOR).contains(n))
                .ok_or_else(|| {
                    invalid(
                        "simulation",
                        "vessels_per_sector",
                        v,
                        &format!("must be between 1 and {}", MAX_VESSELS_PER_SECTOR),
                    )
                })?;
            config.simulation.vessels_per_sector = count;
        }
        if let Some(v) = positive(
            section,
            "simulation",
            "tick_ms",
            "must be a positive integer (milliseconds)",
        )? {
            config.simulation.tick_ms = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses `key` if present. Empty values count as absent.
fn parsed<T: FromStr>(
    props: &Properties,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    match props.get(key).map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| invalid(section, key, v, reason)),
    }
}

/// Parses a strictly positive integer.
fn positive<T>(
    props: &Properties,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    match parsed::<T>(props, section, key, reason)? {
        Some(v) if v <= T::default() => Err(invalid(
            section,
            key,
            props.get(key).unwrap_or_default(),
            reason,
        )),
        other => Ok(other),
    }
}

fn penalty(props: &Properties, key: &str) -> Result<Option<u8>, ConfigFileError> {
    const REASON: &str = "must be an integer between 0 and 100";
    match parsed::<u8>(props, "esg", key, REASON)? {
        Some(v) if v > 100 => Err(invalid("esg", key, &v.to_string(), REASON)),
        other => Ok(other),
    }
}

fn threshold(props: &Properties, key: &str) -> Result<Option<f64>, ConfigFileError> {
    const REASON: &str = "must be a non-negative number";
    match parsed::<f64>(props, "esg", key, REASON)? {
        Some(v) if !v.is_finite() || v < 0.0 => Err(invalid("esg", key, &v.to_string(), REASON)),
        other => Ok(other),
    }
}

/// Expand `~/` to the user's home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
