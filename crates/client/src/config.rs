//! Client configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use inventory_content::ContentFactory;

/// How the final state is printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One debug dump per `Dump` step.
    #[default]
    Text,
    /// Scenario report plus the final snapshot as JSON.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub data_dir: PathBuf,
    pub scenario: String,
    pub log_dir: Option<PathBuf>,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
    pub output: OutputFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: ContentFactory::bundled().data_dir().to_path_buf(),
            scenario: "demo".to_owned(),
            log_dir: None,
            command_buffer_size: 32,
            event_buffer_size: 100,
            output: OutputFormat::Text,
        }
    }
}

impl ClientConfig {
    /// Construct client configuration from environment variables.
    ///
    /// Environment variables:
    /// - `INVENTORY_DATA_DIR` - Content directory (default: bundled data)
    /// - `INVENTORY_SCENARIO` - Scenario name under `scenarios/` (default: demo)
    /// - `INVENTORY_LOG_DIR` - Also write logs to `inventory.log` here
    /// - `INVENTORY_COMMAND_BUFFER` - Worker command queue size (default: 32)
    /// - `INVENTORY_EVENT_BUFFER` - Per-topic event buffer size (default: 100)
    /// - `INVENTORY_OUTPUT` - `text` or `json` (default: text)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("INVENTORY_DATA_DIR") {
            config.data_dir = dir;
        }
        if let Some(scenario) = read_env::<String>("INVENTORY_SCENARIO") {
            config.scenario = scenario;
        }
        config.log_dir = read_env::<PathBuf>("INVENTORY_LOG_DIR");
        if let Some(size) = read_env::<usize>("INVENTORY_COMMAND_BUFFER") {
            config.command_buffer_size = size.max(1);
        }
        if let Some(size) = read_env::<usize>("INVENTORY_EVENT_BUFFER") {
            config.event_buffer_size = size.max(1);
        }
        if let Some(output) = read_env::<OutputFormat>("INVENTORY_OUTPUT") {
            config.output = output;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok()?.parse().ok()
}
