use std::sync::Arc;

use parking_lot::Mutex;

use super::random::RandomSource;
use crate::{
    config::BatteryConfig,
    runtime::{self, Error, ShutdownSignal, TaskPool},
};

const TASK_CAPACITY_DECAY: &str = "capacity decay";
const TASK_TEMPERATURE_DRIFT: &str = "temperature drift";

/// Battery charge.
///
/// The capacity and the level derived from it. Both values are always
/// read and written together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charge {
    /// Raw capacity in charge units.
    pub capacity: i32,
    /// Capacity normalized to a percentage.
    pub level: i32,
}

impl Charge {
    /// Derive the charge from the raw capacity.
    ///
    /// The level is computed in 64 bits so any capacity range fits.
    pub fn from_capacity(capacity: i32, config: &BatteryConfig) -> Self {
        let span = i64::from(config.max_capacity) - i64::from(config.min_capacity);
        let level = (i64::from(capacity) - i64::from(config.min_capacity)) * 100 / span;

        Self {
            capacity,
            level: level as i32,
        }
    }

    /// Check if the battery is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.level == 0
    }

    fn assert_bounds(&self, config: &BatteryConfig) {
        assert!(
            (config.min_capacity..=config.max_capacity).contains(&self.capacity),
            "battery capacity {} outside {}..{}",
            self.capacity,
            config.min_capacity,
            config.max_capacity
        );
        assert!(
            (0..=100).contains(&self.level),
            "battery level {} outside 0..100",
            self.level
        );
    }
}

impl std::fmt::Display for Charge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Capacity: {} Level: {}%", self.capacity, self.level)
    }
}

/// Battery thermal reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thermal {
    /// Battery temperature.
    pub temperature: i32,
    /// Cooling fan state.
    pub fan_on: bool,
}

impl Thermal {
    /// Derive the thermal reading from the temperature.
    pub fn from_temperature(temperature: i32, config: &BatteryConfig) -> Self {
        Self {
            temperature,
            fan_on: temperature > config.fan_threshold,
        }
    }
}

impl std::fmt::Display for Thermal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Temperature: {} Fan: {}",
            self.temperature,
            if self.fan_on { "ON" } else { "OFF" }
        )
    }
}

struct ThermalCell {
    reading: Thermal,
    random: Box<dyn RandomSource + Send>,
}

struct Cells {
    config: BatteryConfig,
    charge: Mutex<Charge>,
    thermal: Mutex<ThermalCell>,
}

impl Cells {
    fn decay(&self) -> Charge {
        let mut charge = self.charge.lock();

        if charge.capacity > self.config.min_capacity {
            *charge = Charge::from_capacity(charge.capacity - 1, &self.config);
            charge.assert_bounds(&self.config);
        }

        *charge
    }

    fn resample_temperature(&self) -> Thermal {
        let mut cell = self.thermal.lock();

        let temperature = cell
            .random
            .next(self.config.min_temperature, self.config.max_temperature);
        cell.reading = Thermal::from_temperature(temperature, &self.config);

        cell.reading
    }
}

/// Battery model.
///
/// The battery owns two independent critical sections: one for the charge
/// (capacity and level) and one for the thermal reading (temperature and fan).
/// Each is mutated by its own background task at its own cadence.
pub struct Battery {
    cells: Arc<Cells>,
    cancel: ShutdownSignal,
    tasks: Mutex<TaskPool>,
}

impl Battery {
    /// Construct the battery with a random initial state.
    ///
    /// Initial values configured in `config` take precedence over random draws.
    pub fn initialize(config: BatteryConfig, mut random: Box<dyn RandomSource + Send>) -> Self {
        let capacity = config
            .initial_capacity
            .unwrap_or_else(|| random.next(config.min_capacity, config.max_capacity));
        let temperature = config
            .initial_temperature
            .unwrap_or_else(|| random.next(config.min_temperature, config.max_temperature));

        Self::with_state(config, capacity, temperature, random)
    }

    /// Construct the battery with a known initial state.
    pub fn with_state(
        config: BatteryConfig,
        capacity: i32,
        temperature: i32,
        random: Box<dyn RandomSource + Send>,
    ) -> Self {
        let charge = Charge::from_capacity(capacity, &config);
        charge.assert_bounds(&config);

        let reading = Thermal::from_temperature(temperature, &config);

        log::debug!("Battery initialized: {}, {}", charge, reading);

        Self {
            cells: Arc::new(Cells {
                config,
                charge: Mutex::new(charge),
                thermal: Mutex::new(ThermalCell { reading, random }),
            }),
            cancel: ShutdownSignal::new(),
            tasks: Mutex::new(TaskPool::default()),
        }
    }

    #[inline]
    pub fn config(&self) -> &BatteryConfig {
        &self.cells.config
    }

    /// Read capacity and level in one critical section.
    #[inline]
    pub fn charge(&self) -> Charge {
        *self.cells.charge.lock()
    }

    /// Read temperature and fan state in one critical section.
    #[inline]
    pub fn thermal(&self) -> Thermal {
        self.cells.thermal.lock().reading
    }

    pub fn capacity(&self) -> i32 {
        self.charge().capacity
    }

    pub fn level(&self) -> i32 {
        self.charge().level
    }

    pub fn temperature(&self) -> i32 {
        self.thermal().temperature
    }

    pub fn fan_on(&self) -> bool {
        self.thermal().fan_on
    }

    /// Decrease the capacity by a single unit.
    ///
    /// Once the minimum capacity is reached this is a no-op.
    pub fn decay(&self) -> Charge {
        self.cells.decay()
    }

    /// Draw a new temperature and derive the fan state from it.
    pub fn resample_temperature(&self) -> Thermal {
        self.cells.resample_temperature()
    }

    /// Start the periodic capacity decay.
    pub fn start_capacity_decay(&self) -> runtime::Result {
        let cells = self.cells.clone();
        let period = self.cells.config.decay_interval();

        self.spawn(TASK_CAPACITY_DECAY, async move {
            loop {
                tokio::time::sleep(period).await;

                let charge = cells.decay();
                log::trace!("Battery {}", charge);
            }
        })
    }

    /// Start the periodic temperature drift.
    pub fn start_temperature_drift(&self) -> runtime::Result {
        let cells = self.cells.clone();
        let period = self.cells.config.drift_interval();

        self.spawn(TASK_TEMPERATURE_DRIFT, async move {
            loop {
                tokio::time::sleep(period).await;

                let thermal = cells.resample_temperature();
                log::trace!("Battery {}", thermal);
            }
        })
    }

    fn spawn<T>(&self, name: &'static str, task: T) -> runtime::Result
    where
        T: std::future::Future<Output = ()> + Send + 'static,
    {
        if self.cancel.is_triggered() {
            return Err(Error::Startup(format!("{}: battery was stopped", name)));
        }

        let mut tasks = self.tasks.lock();
        if tasks.contains(name) {
            log::warn!("Battery task {} is already running", name);
            return Ok(());
        }

        tasks.spawn(name, self.cancel.listener(), task)
    }

    /// Stop all battery tasks and wait for their termination.
    ///
    /// Calling this method more than once, or without any running
    /// task, is safe. A stopped battery cannot be restarted.
    pub async fn stop(&self) -> runtime::Result {
        self.cancel.trigger();

        let mut tasks = std::mem::take(&mut *self.tasks.lock());
        if tasks.is_empty() {
            return Ok(());
        }

        log::debug!("Stopping {} battery task(s)", tasks.len());

        tasks.join().await
    }
}

impl Drop for Battery {
    fn drop(&mut self) {
        self.cancel.trigger();
    }
}
