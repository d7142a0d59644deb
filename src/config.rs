// config.rs

use crate::cli::Args;
use config::{Config, ConfigError, Environment, File};
use log::{debug, LevelFilter};
use std::path::Path;
use std::time::Duration;

pub const MIDI_BAUD_RATE: u32 = 31_250;
pub const TICKS_PER_BEAT: u32 = 24;
/// Number of per-beat samples averaged into the reported BPM.
pub const BPM_WINDOW: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;
pub const DEFAULT_FLUSH_TIMEOUT_MS: u64 = 10;
pub const DEFAULT_READ_BUFFER_SIZE: usize = 256;
/// Chunks the midir input callback may queue ahead of the receive flow.
pub const INPUT_CHUNK_CAPACITY: usize = 1_000;
pub const DEFAULT_DEMO_INTERVAL_MS: u64 = 2000;

const ENV_PREFIX: &str = "MIDIBRIDGE";

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub input_device: Option<String>,
    pub output_device: Option<String>,
    pub queue_capacity: usize,
    pub flush_timeout: Duration,
    pub read_buffer_size: usize,
    /// Period of the demo note sender, `None` when disabled.
    pub demo_interval: Option<Duration>,
    pub log_level: LevelFilter,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            input_device: None,
            output_device: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            flush_timeout: Duration::from_millis(DEFAULT_FLUSH_TIMEOUT_MS),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            demo_interval: Some(Duration::from_millis(DEFAULT_DEMO_INTERVAL_MS)),
            log_level: LevelFilter::Info,
        }
    }
}

impl BridgeConfig {
    /// Loads defaults, then the optional file, then `MIDIBRIDGE_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("queue_capacity", DEFAULT_QUEUE_CAPACITY as i64)?
            .set_default("flush_timeout_ms", DEFAULT_FLUSH_TIMEOUT_MS as i64)?
            .set_default("read_buffer_size", DEFAULT_READ_BUFFER_SIZE as i64)?
            .set_default("demo_interval_ms", DEFAULT_DEMO_INTERVAL_MS as i64)?
            .set_default("log_level", "info")?;

        if let Some(path) = path {
            debug!("Reading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Self::from_settings(&settings)
    }

    fn from_settings(settings: &Config) -> Result<Self, ConfigError> {
        let queue_capacity = positive(settings, "queue_capacity")?;
        let read_buffer_size = positive(settings, "read_buffer_size")?;
        let flush_timeout = Duration::from_millis(non_negative(settings, "flush_timeout_ms")?);
        let demo_ms = non_negative(settings, "demo_interval_ms")?;

        let level_name = settings.get_string("log_level")?;
        let log_level = level_name
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::Message(format!("invalid log_level '{}'", level_name)))?;

        let config = BridgeConfig {
            input_device: optional_string(settings, "input_device")?,
            output_device: optional_string(settings, "output_device")?,
            queue_capacity: queue_capacity as usize,
            flush_timeout,
            read_buffer_size: read_buffer_size as usize,
            demo_interval: (demo_ms > 0).then(|| Duration::from_millis(demo_ms)),
            log_level,
        };
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Command line values take precedence over every other layer.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(input) = &args.input {
            self.input_device = Some(input.clone());
        }
        if let Some(output) = &args.output {
            self.output_device = Some(output.clone());
        }
        if let Some(ms) = args.demo_interval_ms {
            self.demo_interval = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(level) = args.log_level {
            self.log_level = level;
        }
    }
}

fn optional_string(settings: &Config, key: &str) -> Result<Option<String>, ConfigError> {
    match settings.get_string(key) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn non_negative(settings: &Config, key: &str) -> Result<u64, ConfigError> {
    let value = settings.get_int(key)?;
    u64::try_from(value).map_err(|_| ConfigError::Message(format!("{} must not be negative", key)))
}

fn positive(settings: &Config, key: &str) -> Result<u64, ConfigError> {
    match non_negative(settings, key)? {
        0 => Err(ConfigError::Message(format!("{} must be greater than 0", key))),
        value => Ok(value),
    }
}
