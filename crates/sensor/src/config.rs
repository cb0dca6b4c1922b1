//! Driver configuration management

use crate::report::{Calibration, DEFAULT_PRECISION};
use anyhow::{Context, Result, anyhow};
use protocol::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest accepted per-transfer timeout
const MAX_TIMEOUT_MS: u64 = 60_000;
/// Most decimals accepted for the CSV value
const MAX_PRECISION: usize = 9;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemperConfig {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub usb: UsbSettings,
    #[serde(default)]
    pub calibration: Calibration,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "GeneralSettings::default_log_level")]
    pub log_level: String,
    /// Dump every transfer and enable libusb debug logging
    #[serde(default)]
    pub debug: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            debug: false,
        }
    }
}

impl GeneralSettings {
    fn default_log_level() -> String {
        "warn".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsbSettings {
    /// Per-transfer timeout in milliseconds
    #[serde(default = "UsbSettings::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UsbSettings {
    fn default() -> Self {
        Self {
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

impl UsbSettings {
    fn default_timeout_ms() -> u64 {
        DEFAULT_TIMEOUT.as_millis() as u64
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// What to do with a sensor that opened but did not report a temperature
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadFailurePolicy {
    /// Log the failure and leave the sensor out of the output
    #[default]
    Skip,
    /// Write the other readings, then exit with an error
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Decimals printed for each reading
    #[serde(default = "OutputSettings::default_precision")]
    pub precision: usize,
    #[serde(default)]
    pub on_read_error: ReadFailurePolicy,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            precision: Self::default_precision(),
            on_read_error: ReadFailurePolicy::default(),
        }
    }
}

impl OutputSettings {
    fn default_precision() -> usize {
        DEFAULT_PRECISION
    }
}

impl TemperConfig {
    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the first existing file in
    /// [`TemperConfig::search_paths`] is used, and built-in defaults apply
    /// only when none of them exists.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => {
                let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
                Self::from_file(&path)
            }
            None => Self::load_first(&Self::search_paths()),
        }
    }

    /// Load the first existing candidate, or defaults when there is none
    ///
    /// A candidate that exists but cannot be read, parsed or validated is an
    /// error; it never falls back to defaults.
    pub fn load_first(candidates: &[PathBuf]) -> Result<Self> {
        match candidates.iter().find(|path| path.exists()) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Read, parse and validate one configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: TemperConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write this configuration as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Locations searched when no path is given, in order
    pub fn search_paths() -> Vec<PathBuf> {
        vec![
            Self::default_path(),
            PathBuf::from("/etc/temper/temper.toml"),
        ]
    }

    /// Per-user configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("temper")
            .join("temper.toml")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.general.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.usb.timeout_ms == 0 || self.usb.timeout_ms > MAX_TIMEOUT_MS {
            return Err(anyhow!(
                "Invalid USB timeout {} ms, must be 1-{}",
                self.usb.timeout_ms,
                MAX_TIMEOUT_MS
            ));
        }

        let Calibration { scale, offset } = self.calibration;
        if !scale.is_finite() || !offset.is_finite() {
            return Err(anyhow!(
                "Invalid calibration (scale {}, offset {}), both must be finite",
                scale,
                offset
            ));
        }

        if self.output.precision > MAX_PRECISION {
            return Err(anyhow!(
                "Invalid output precision {}, must be 0-{}",
                self.output.precision,
                MAX_PRECISION
            ));
        }

        Ok(())
    }
}
