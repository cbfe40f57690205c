use super::input::Action;

/// Turn signal selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TurnSignal {
    /// No turn signal active.
    #[default]
    Off,
    /// Left turn signal active.
    Left,
    /// Right turn signal active.
    Right,
}

impl std::fmt::Display for TurnSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnSignal::Off => write!(f, "OFF"),
            TurnSignal::Left => write!(f, "LEFT"),
            TurnSignal::Right => write!(f, "RIGHT"),
        }
    }
}

/// Vehicle state.
///
/// Only the control loop mutates the vehicle. Signal and speed changes
/// take effect only while the vehicle is powered on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vehicle {
    powered_on: bool,
    signal: TurnSignal,
    speed: i32,
}

impl Vehicle {
    /// Construct a powered off vehicle.
    pub fn new(speed: i32) -> Self {
        Self {
            powered_on: false,
            signal: TurnSignal::Off,
            speed,
        }
    }

    #[inline]
    pub fn is_powered_on(&self) -> bool {
        self.powered_on
    }

    #[inline]
    pub fn signal(&self) -> TurnSignal {
        self.signal
    }

    #[inline]
    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Apply an action to the vehicle.
    ///
    /// Returns true if the vehicle state changed. Powering off keeps the
    /// signal and speed as they were. `Action::Quit` does not affect the
    /// vehicle.
    pub fn apply(&mut self, action: Action) -> bool {
        let before = self.clone();

        match action {
            Action::PowerOn => self.powered_on = true,
            Action::PowerOff => self.powered_on = false,
            _ if !self.powered_on => {}
            Action::SignalLeft => self.signal = TurnSignal::Left,
            Action::SignalRight => self.signal = TurnSignal::Right,
            Action::SignalOff => self.signal = TurnSignal::Off,
            Action::SpeedUp => self.speed = self.speed.saturating_add(1),
            Action::SpeedDown => self.speed = self.speed.saturating_sub(1),
            Action::Quit => {}
        }

        let changed = *self != before;
        if changed {
            log::debug!("{:?}: {}", action, self);
        }

        changed
    }
}

impl Default for Vehicle {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_SPEED)
    }
}

impl std::fmt::Display for Vehicle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Power: {} Signal: {} Speed: {}",
            if self.powered_on { "ON" } else { "OFF" },
            self.signal,
            self.speed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let vehicle = Vehicle::default();

        assert!(!vehicle.is_powered_on());
        assert_eq!(vehicle.signal(), TurnSignal::Off);
        assert_eq!(vehicle.speed(), 50);
    }

    #[test]
    fn test_speed_up_after_power_on() {
        let mut vehicle = Vehicle::default();

        vehicle.apply(Action::PowerOn);
        vehicle.apply(Action::SpeedUp);
        vehicle.apply(Action::SpeedUp);
        vehicle.apply(Action::SpeedUp);

        assert!(vehicle.is_powered_on());
        assert_eq!(vehicle.speed(), 53);
    }

    #[test]
    fn test_signal_last_write_wins() {
        let mut vehicle = Vehicle::default();

        vehicle.apply(Action::PowerOn);
        vehicle.apply(Action::SignalLeft);
        assert_eq!(vehicle.signal(), TurnSignal::Left);
        vehicle.apply(Action::SignalRight);
        assert_eq!(vehicle.signal(), TurnSignal::Right);
        vehicle.apply(Action::SignalOff);

        assert_eq!(vehicle.signal(), TurnSignal::Off);
    }

    #[test]
    fn test_ignored_while_powered_off() {
        let mut vehicle = Vehicle::default();

        assert!(!vehicle.apply(Action::SignalLeft));
        assert!(!vehicle.apply(Action::SpeedUp));
        assert!(!vehicle.apply(Action::SpeedDown));

        assert_eq!(vehicle, Vehicle::default());
    }

    #[test]
    fn test_power_off_keeps_state() {
        let mut vehicle = Vehicle::default();

        vehicle.apply(Action::PowerOn);
        vehicle.apply(Action::SignalRight);
        vehicle.apply(Action::SpeedDown);
        assert!(vehicle.apply(Action::PowerOff));

        assert!(!vehicle.is_powered_on());
        assert_eq!(vehicle.signal(), TurnSignal::Right);
        assert_eq!(vehicle.speed(), 49);

        vehicle.apply(Action::SpeedDown);
        assert_eq!(vehicle.speed(), 49);
    }

    #[test]
    fn test_repeated_power_on() {
        let mut vehicle = Vehicle::default();

        assert!(vehicle.apply(Action::PowerOn));
        assert!(!vehicle.apply(Action::PowerOn));
    }

    #[test]
    fn test_speed_unbounded() {
        let mut vehicle = Vehicle::new(0);
        vehicle.apply(Action::PowerOn);

        vehicle.apply(Action::SpeedDown);
        assert_eq!(vehicle.speed(), -1);

        let mut vehicle = Vehicle::new(i32::MAX);
        vehicle.apply(Action::PowerOn);

        assert!(!vehicle.apply(Action::SpeedUp));
        assert_eq!(vehicle.speed(), i32::MAX);
    }

    #[test]
    fn test_quit_no_effect() {
        let mut vehicle = Vehicle::default();
        vehicle.apply(Action::PowerOn);

        assert!(!vehicle.apply(Action::Quit));
    }
}
