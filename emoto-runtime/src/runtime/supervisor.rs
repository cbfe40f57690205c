use std::{sync::Arc, thread};

use tokio::time::MissedTickBehavior;

use super::{Error, ShutdownSignal};
use crate::{
    config::{Config, DashboardConfig},
    core::{Action, Battery, KeyCode, KeyLatch, KeyMap, Snapshot, Vehicle},
    device::{InputSource, Renderer},
};

const INPUT_THREAD_NAME: &str = "input";

/// Reason the dashboard terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The battery level reached zero.
    BatteryEmpty,
    /// The user requested exit.
    UserExit,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::BatteryEmpty => write!(f, "Battery is empty"),
            Termination::UserExit => write!(f, "The program has exited."),
        }
    }
}

/// Dashboard supervisor.
///
/// The supervisor owns the vehicle and drives the control loop. It starts
/// the battery tasks and the input reader, applies keys to the vehicle,
/// hands snapshots to the renderer and decides when the program ends.
pub struct Supervisor {
    config: DashboardConfig,
    battery: Arc<Battery>,
    vehicle: Vehicle,
    keymap: KeyMap,
    exit: ShutdownSignal,
    latch: Arc<KeyLatch>,
    termination: Option<Termination>,
}

impl Supervisor {
    /// Construct a supervisor with a powered off vehicle.
    pub fn new(config: &Config, battery: Arc<Battery>) -> Self {
        Self {
            config: config.dashboard.clone(),
            battery,
            vehicle: Vehicle::new(config.dashboard.default_speed),
            keymap: KeyMap::default(),
            exit: ShutdownSignal::new(),
            latch: Arc::new(KeyLatch::default()),
            termination: None,
        }
    }

    /// Replace the default key map.
    pub fn with_keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    #[inline]
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    #[inline]
    pub fn battery(&self) -> &Arc<Battery> {
        &self.battery
    }

    /// Program exit flag.
    ///
    /// Triggering the returned signal ends the control loop on its next
    /// tick as a user exit.
    pub fn exit_signal(&self) -> ShutdownSignal {
        self.exit.clone()
    }

    #[inline]
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    fn terminate(&mut self, termination: Termination) {
        if self.termination.is_none() {
            log::debug!("Terminating: {}", termination);
            self.termination = Some(termination);
        }
        self.exit.trigger();
    }

    fn dispatch(&mut self, action: Action) {
        if action == Action::Quit {
            log::info!("Exit requested");
            self.terminate(Termination::UserExit);
            return;
        }

        let was_powered_on = self.vehicle.is_powered_on();
        self.vehicle.apply(action);

        if self.vehicle.is_powered_on() != was_powered_on {
            log::info!(
                "Vehicle powered {}",
                if self.vehicle.is_powered_on() { "on" } else { "off" }
            );
        }

        if action == Action::PowerOff && self.config.exit_on_power_off {
            self.terminate(Termination::UserExit);
        }
    }

    /// Run a single control loop iteration.
    ///
    /// The key, if any, is applied to the vehicle, a snapshot is rendered
    /// and the battery is checked. Once the exit flag is set no further
    /// changes are applied and the termination is returned immediately.
    pub fn step(
        &mut self,
        key: Option<KeyCode>,
        renderer: &mut dyn Renderer,
    ) -> Option<Termination> {
        if self.exit.is_triggered() {
            return Some(*self.termination.get_or_insert(Termination::UserExit));
        }

        if let Some(key) = key {
            match self.keymap.action(key) {
                Some(action) => self.dispatch(action),
                None => log::trace!("Key {} is not mapped", key),
            }
        }

        let snapshot = Snapshot::capture(&self.vehicle, &self.battery);
        if let Err(e) = renderer.render(&snapshot) {
            log::warn!("Failed to render on {}: {}", renderer.name(), e);
        }

        if self.termination.is_none() && snapshot.battery_level == 0 {
            log::info!("Battery is empty");
            self.terminate(Termination::BatteryEmpty);
        }

        self.termination
    }

    fn spawn_input_reader(
        &self,
        mut input: Box<dyn InputSource>,
    ) -> super::Result<thread::JoinHandle<()>> {
        let exit = self.exit.clone();
        let latch = self.latch.clone();
        let poll = self.config.input_poll();

        thread::Builder::new()
            .name(INPUT_THREAD_NAME.to_owned())
            .spawn(move || {
                log::debug!("Input reader started on {}", input.name());

                while !exit.is_triggered() {
                    match input.read_key(poll) {
                        Ok(Some(key)) => {
                            log::trace!("Key {} pressed", key);
                            latch.store(key);
                        }
                        Ok(None) => {}
                        Err(e) => {
                            log::error!("Input device {} failed: {}", input.name(), e);
                            exit.trigger();
                        }
                    }
                }

                log::debug!("Input reader stopped");
            })
            .map_err(|e| Error::Startup(format!("{}: {}", INPUT_THREAD_NAME, e)))
    }

    async fn join_input_reader(reader: thread::JoinHandle<()>) -> super::Result {
        match tokio::task::spawn_blocking(move || reader.join()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(Error::Join(format!("{} panicked", INPUT_THREAD_NAME))),
            Err(e) => Err(Error::Join(format!("{}: {}", INPUT_THREAD_NAME, e))),
        }
    }

    /// Stop every background context and wait until all have terminated.
    async fn shutdown(&self, reader: thread::JoinHandle<()>) -> super::Result {
        self.exit.trigger();

        let battery = self.battery.stop().await;
        let input = Self::join_input_reader(reader).await;

        log::debug!("All background work stopped");

        battery.and(input)
    }

    /// Run the dashboard until the battery is empty or the user exits.
    ///
    /// All background work is stopped and joined before this method
    /// returns. The renderer is finished last with the termination reason.
    pub async fn run(
        mut self,
        input: Box<dyn InputSource>,
        mut renderer: Box<dyn Renderer>,
    ) -> super::Result<Termination> {
        log::debug!("Input on {}, display on {}", input.name(), renderer.name());

        let reader = self.spawn_input_reader(input)?;

        if let Err(e) = self
            .battery
            .start_capacity_decay()
            .and_then(|_| self.battery.start_temperature_drift())
        {
            log::error!("Failed to start battery: {}", e);
            if let Err(e) = self.shutdown(reader).await {
                log::warn!("Shutdown after failed start: {}", e);
            }
            return Err(e);
        }

        log::info!("Dashboard started");

        let mut interval = tokio::time::interval(self.config.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut exit = self.exit.listener();

        let termination = loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = exit.recv() => {}
            }

            let key = self.latch.take();
            if let Some(termination) = self.step(key, renderer.as_mut()) {
                break termination;
            }
        };

        self.shutdown(reader).await?;

        log::info!("{}", termination);

        if let Err(e) = renderer.finish(termination) {
            log::warn!("Failed to finish {}: {}", renderer.name(), e);
        }

        Ok(termination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::BatteryConfig,
        core::{SeededRandom, TurnSignal},
        device::RecordingRenderer,
    };

    fn supervisor(capacity: i32) -> Supervisor {
        let config = Config::default();
        let battery = Battery::with_state(
            BatteryConfig::default(),
            capacity,
            40,
            Box::new(SeededRandom::new(3)),
        );

        Supervisor::new(&config, Arc::new(battery))
    }

    fn press(supervisor: &mut Supervisor, renderer: &mut RecordingRenderer, keys: &str) {
        for c in keys.chars() {
            supervisor.step(Some(KeyCode::Char(c)), renderer);
        }
    }

    #[test]
    fn test_power_on_speed_up() {
        let mut supervisor = supervisor(70);
        let mut renderer = RecordingRenderer::new();

        press(&mut supervisor, &mut renderer, "1HHH");

        assert!(supervisor.vehicle().is_powered_on());
        assert_eq!(supervisor.vehicle().speed(), 53);
        assert_eq!(supervisor.termination(), None);

        let last = renderer.last().unwrap();
        assert!(last.powered_on);
        assert_eq!(last.speed, 53);
        assert_eq!(last.battery_level, 100);
        assert_eq!(renderer.snapshots().len(), 4);
    }

    #[test]
    fn test_keys_ignored_before_power_on() {
        let mut supervisor = supervisor(70);
        let mut renderer = RecordingRenderer::new();

        press(&mut supervisor, &mut renderer, "KHx");

        assert!(!supervisor.vehicle().is_powered_on());
        assert_eq!(supervisor.vehicle().signal(), TurnSignal::Off);
        assert_eq!(supervisor.vehicle().speed(), 50);
    }

    #[test]
    fn test_signal_last_write_wins() {
        let mut supervisor = supervisor(70);
        let mut renderer = RecordingRenderer::new();

        press(&mut supervisor, &mut renderer, "1KMO");

        assert_eq!(supervisor.vehicle().signal(), TurnSignal::Off);
    }

    #[test]
    fn test_battery_empty_stops_mutation() {
        let mut supervisor = supervisor(30);
        let mut renderer = RecordingRenderer::new();

        assert_eq!(
            supervisor.step(None, &mut renderer),
            Some(Termination::BatteryEmpty)
        );
        assert!(supervisor.exit_signal().is_triggered());

        assert_eq!(
            supervisor.step(Some(KeyCode::Char('1')), &mut renderer),
            Some(Termination::BatteryEmpty)
        );
        assert!(!supervisor.vehicle().is_powered_on());
        assert_eq!(renderer.snapshots().len(), 1);
    }

    #[test]
    fn test_battery_empty_after_decay() {
        let mut supervisor = supervisor(31);
        let mut renderer = RecordingRenderer::new();

        assert_eq!(supervisor.step(Some(KeyCode::Char('1')), &mut renderer), None);

        supervisor.battery().decay();

        assert_eq!(
            supervisor.step(None, &mut renderer),
            Some(Termination::BatteryEmpty)
        );
        assert_eq!(renderer.last().map(|s| s.battery_level), Some(0));
    }

    #[test]
    fn test_quit() {
        let mut supervisor = supervisor(70);
        let mut renderer = RecordingRenderer::new();

        assert_eq!(
            supervisor.step(Some(KeyCode::Char('q')), &mut renderer),
            Some(Termination::UserExit)
        );
        assert_eq!(
            supervisor.step(Some(KeyCode::Char('1')), &mut renderer),
            Some(Termination::UserExit)
        );
        assert!(!supervisor.vehicle().is_powered_on());
    }

    #[test]
    fn test_power_off_exits() {
        let mut supervisor = supervisor(70);
        let mut renderer = RecordingRenderer::new();

        press(&mut supervisor, &mut renderer, "1H0");

        assert_eq!(supervisor.termination(), Some(Termination::UserExit));
        assert!(!supervisor.vehicle().is_powered_on());
        assert_eq!(supervisor.vehicle().speed(), 51);
        assert!(!renderer.last().unwrap().powered_on);
    }

    #[test]
    fn test_power_off_without_exit() {
        let mut config = Config::default();
        config.dashboard.exit_on_power_off = false;

        let battery = Battery::with_state(
            BatteryConfig::default(),
            70,
            40,
            Box::new(SeededRandom::new(3)),
        );
        let mut supervisor = Supervisor::new(&config, Arc::new(battery));
        let mut renderer = RecordingRenderer::new();

        press(&mut supervisor, &mut renderer, "10H1");

        assert_eq!(supervisor.termination(), None);
        assert!(supervisor.vehicle().is_powered_on());
        assert_eq!(supervisor.vehicle().speed(), 50);
    }

    #[test]
    fn test_external_exit() {
        let mut supervisor = supervisor(70);
        let mut renderer = RecordingRenderer::new();

        supervisor.exit_signal().trigger();

        assert_eq!(
            supervisor.step(Some(KeyCode::Char('1')), &mut renderer),
            Some(Termination::UserExit)
        );
        assert!(!supervisor.vehicle().is_powered_on());
        assert!(renderer.snapshots().is_empty());
    }

    #[test]
    fn test_custom_keymap() {
        let mut keymap = KeyMap::default();
        keymap.bind(KeyCode::Char('w'), Action::SpeedUp);

        let mut supervisor = supervisor(70).with_keymap(keymap);
        let mut renderer = RecordingRenderer::new();

        press(&mut supervisor, &mut renderer, "1ww");

        assert_eq!(supervisor.vehicle().speed(), 52);
    }

    #[test]
    fn test_termination_message() {
        assert_eq!(Termination::BatteryEmpty.to_string(), "Battery is empty");
        assert_eq!(Termination::UserExit.to_string(), "The program has exited.");
    }
}
