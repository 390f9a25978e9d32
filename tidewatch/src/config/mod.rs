//! User configuration stored in `~/.tidewatch/config.ini`.
//!
//! ```ignore
//! let config = ConfigFile::load()?;
//! let cache = WeatherGridCache::new(client, config.weather_cache_config());
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{API_KEY_ENV_VAR, DEFAULT_LOG_FILE_NAME};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    BroadcastSettings, ConfigFile, LoggingSettings, PipelineSettings, PredictorSettings,
    SimulationSettings, WeatherSettings,
};
