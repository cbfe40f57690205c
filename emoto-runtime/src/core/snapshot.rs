use super::{battery::Battery, vehicle::TurnSignal, vehicle::Vehicle};

/// Dashboard snapshot.
///
/// Read-only copy of everything the dashboard displays. The vehicle part and
/// each battery pair are internally consistent; the battery pairs may be
/// captured slightly apart from each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub powered_on: bool,
    pub signal: TurnSignal,
    pub speed: i32,
    pub battery_level: i32,
    pub battery_temperature: i32,
    pub fan_on: bool,
}

impl Snapshot {
    /// Capture the current vehicle and battery state.
    pub fn capture(vehicle: &Vehicle, battery: &Battery) -> Self {
        let charge = battery.charge();
        let thermal = battery.thermal();

        Self {
            powered_on: vehicle.is_powered_on(),
            signal: vehicle.signal(),
            speed: vehicle.speed(),
            battery_level: charge.level,
            battery_temperature: thermal.temperature,
            fan_on: thermal.fan_on,
        }
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Start: {} Signal: {} Speed: {} Battery: {}% {}C Fan: {}",
            if self.powered_on { "ON" } else { "OFF" },
            self.signal,
            self.speed,
            self.battery_level,
            self.battery_temperature,
            if self.fan_on { "ON" } else { "OFF" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::BatteryConfig, core::input::Action, core::random::SeededRandom};

    #[test]
    fn test_capture() {
        let battery =
            Battery::with_state(BatteryConfig::default(), 69, 65, Box::new(SeededRandom::new(1)));
        let mut vehicle = Vehicle::default();
        vehicle.apply(Action::PowerOn);
        vehicle.apply(Action::SignalLeft);

        let snapshot = Snapshot::capture(&vehicle, &battery);

        assert_eq!(
            snapshot,
            Snapshot {
                powered_on: true,
                signal: TurnSignal::Left,
                speed: 50,
                battery_level: 97,
                battery_temperature: 65,
                fan_on: true,
            }
        );
        assert_eq!(
            snapshot.to_string(),
            "Start: ON Signal: LEFT Speed: 50 Battery: 97% 65C Fan: ON"
        );
    }
}
