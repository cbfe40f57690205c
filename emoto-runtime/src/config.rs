use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::runtime::{Error, Result};

pub trait Configurable: Clone {
    fn global(&self) -> &GlobalConfig;
}

/// Emoto global configuration.
#[derive(Clone, Debug, Default)]
pub struct GlobalConfig {
    /// Name of the binary.
    pub bin_name: String,
    /// Whether the application runs as daemon.
    pub daemon: bool,
}

impl Configurable for GlobalConfig {
    fn global(&self) -> &GlobalConfig {
        self
    }
}

/// Battery model configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BatteryConfig {
    /// Capacity at which the battery level is 0%.
    pub min_capacity: i32,
    /// Capacity at which the battery level is 100%.
    pub max_capacity: i32,
    /// Lower bound of the sampled temperature.
    pub min_temperature: i32,
    /// Upper bound of the sampled temperature.
    pub max_temperature: i32,
    /// The fan runs when the temperature is above this threshold.
    pub fan_threshold: i32,
    /// Capacity decay interval in milliseconds.
    pub decay_interval_ms: u64,
    /// Temperature resample interval in milliseconds.
    pub drift_interval_ms: u64,
    /// Start with this capacity instead of a random one.
    pub initial_capacity: Option<i32>,
    /// Start with this temperature instead of a random one.
    pub initial_temperature: Option<i32>,
}

impl BatteryConfig {
    #[inline]
    pub fn decay_interval(&self) -> Duration {
        Duration::from_millis(self.decay_interval_ms)
    }

    #[inline]
    pub fn drift_interval(&self) -> Duration {
        Duration::from_millis(self.drift_interval_ms)
    }

    fn validate(&self) -> Result {
        if self.min_capacity >= self.max_capacity {
            return Err(Error::Config(format!(
                "battery capacity range {}..{} is empty",
                self.min_capacity, self.max_capacity
            )));
        }
        if self.min_temperature > self.max_temperature {
            return Err(Error::Config(format!(
                "battery temperature range {}..{} is inverted",
                self.min_temperature, self.max_temperature
            )));
        }
        if self.decay_interval_ms == 0 || self.drift_interval_ms == 0 {
            return Err(Error::Config("battery intervals must be non-zero".into()));
        }
        if let Some(capacity) = self.initial_capacity {
            if !(self.min_capacity..=self.max_capacity).contains(&capacity) {
                return Err(Error::Config(format!(
                    "initial capacity {} outside {}..{}",
                    capacity, self.min_capacity, self.max_capacity
                )));
            }
        }
        if let Some(temperature) = self.initial_temperature {
            if !(self.min_temperature..=self.max_temperature).contains(&temperature) {
                return Err(Error::Config(format!(
                    "initial temperature {} outside {}..{}",
                    temperature, self.min_temperature, self.max_temperature
                )));
            }
        }

        Ok(())
    }
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            min_capacity: 30,
            max_capacity: 70,
            min_temperature: 20,
            max_temperature: 80,
            fan_threshold: 50,
            decay_interval_ms: 4_000,
            drift_interval_ms: 3_000,
            initial_capacity: None,
            initial_temperature: None,
        }
    }
}

/// Dashboard control loop configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Control loop period in milliseconds.
    pub tick_interval_ms: u64,
    /// Maximum time the input reader blocks on a single key read.
    pub input_poll_ms: u64,
    /// Vehicle speed on startup.
    pub default_speed: i32,
    /// Exit the program when the vehicle is powered off.
    pub exit_on_power_off: bool,
}

impl DashboardConfig {
    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[inline]
    pub fn input_poll(&self) -> Duration {
        Duration::from_millis(self.input_poll_ms)
    }

    fn validate(&self) -> Result {
        if self.tick_interval_ms == 0 || self.input_poll_ms == 0 {
            return Err(Error::Config("dashboard intervals must be non-zero".into()));
        }

        Ok(())
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            input_poll_ms: 50,
            default_speed: crate::consts::DEFAULT_SPEED,
            exit_on_power_off: true,
        }
    }
}

/// Emoto configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for the random source. A missing seed draws from the OS.
    pub seed: Option<u64>,
    /// Battery configuration.
    pub battery: BatteryConfig,
    /// Dashboard configuration.
    pub dashboard: DashboardConfig,
    /// Global configuration.
    #[serde(skip)]
    pub global: GlobalConfig,
}

impl Config {
    /// Read the configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        let config: Config = toml::from_str(&contents)?;

        log::debug!("Read configuration from {}", path.display());

        Ok(config)
    }

    /// Read the configuration from the first existing file.
    ///
    /// If none of the files exist the default configuration is returned.
    pub fn try_from_file<P: AsRef<Path>>(paths: Vec<P>) -> Result<Self> {
        for path in paths {
            if path.as_ref().exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result {
        self.battery.validate()?;
        self.dashboard.validate()
    }
}

impl Configurable for Config {
    fn global(&self) -> &GlobalConfig {
        &self.global
    }
}
