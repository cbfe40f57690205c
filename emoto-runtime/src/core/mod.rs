pub use self::battery::{Battery, Charge, Thermal};
pub use self::input::{Action, KeyCode, KeyLatch, KeyMap};
pub use self::random::{OsRandom, RandomSource, SeededRandom};
pub use self::snapshot::Snapshot;
pub use self::vehicle::{TurnSignal, Vehicle};

mod battery;
mod input;
mod random;
mod snapshot;
mod vehicle;
