use std::collections::HashMap;

use parking_lot::Mutex;

/// Input device key code.
///
/// Key codes are indirectly mapped to dashboard actions. Any input
/// source can emit these codes. Their effect is decided by the key map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Printable character.
    Char(char),
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Escape key.
    Esc,
    /// Interrupt (Ctrl-C).
    Interrupt,
}

impl KeyCode {
    /// Letters are matched case insensitive.
    fn normalize(self) -> Self {
        match self {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_uppercase()),
            key => key,
        }
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "'{}'", c),
            KeyCode::Left => write!(f, "Left"),
            KeyCode::Right => write!(f, "Right"),
            KeyCode::Up => write!(f, "Up"),
            KeyCode::Down => write!(f, "Down"),
            KeyCode::Esc => write!(f, "Esc"),
            KeyCode::Interrupt => write!(f, "Ctrl-C"),
        }
    }
}

/// Dashboard action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Power on the vehicle.
    PowerOn,
    /// Power off the vehicle.
    PowerOff,
    /// Activate the left turn signal.
    SignalLeft,
    /// Activate the right turn signal.
    SignalRight,
    /// Turn off the turn signal.
    SignalOff,
    /// Increase speed by one.
    SpeedUp,
    /// Decrease speed by one.
    SpeedDown,
    /// Exit the program.
    Quit,
}

/// Mapping from key codes to actions.
#[derive(Clone, Debug)]
pub struct KeyMap {
    bindings: HashMap<KeyCode, Action>,
}

impl KeyMap {
    /// Construct an empty key map.
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind a key to an action.
    ///
    /// An existing binding for the key is replaced.
    pub fn bind(&mut self, key: KeyCode, action: Action) -> &mut Self {
        self.bindings.insert(key.normalize(), action);
        self
    }

    /// Resolve the action for a key, if any.
    pub fn action(&self, key: KeyCode) -> Option<Action> {
        self.bindings.get(&key.normalize()).copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut keymap = Self::empty();

        keymap
            .bind(KeyCode::Char('1'), Action::PowerOn)
            .bind(KeyCode::Char('0'), Action::PowerOff)
            .bind(KeyCode::Char('K'), Action::SignalLeft)
            .bind(KeyCode::Left, Action::SignalLeft)
            .bind(KeyCode::Char('M'), Action::SignalRight)
            .bind(KeyCode::Right, Action::SignalRight)
            .bind(KeyCode::Char('O'), Action::SignalOff)
            .bind(KeyCode::Char('H'), Action::SpeedUp)
            .bind(KeyCode::Up, Action::SpeedUp)
            .bind(KeyCode::Char('P'), Action::SpeedDown)
            .bind(KeyCode::Down, Action::SpeedDown)
            .bind(KeyCode::Char('Q'), Action::Quit)
            .bind(KeyCode::Esc, Action::Quit)
            .bind(KeyCode::Interrupt, Action::Quit);

        keymap
    }
}

/// Holds the most recently captured key.
///
/// The input reader stores keys, the control loop takes them. A key
/// that is not taken before the next one arrives is overwritten.
#[derive(Default)]
pub struct KeyLatch(Mutex<Option<KeyCode>>);

impl KeyLatch {
    pub fn store(&self, key: KeyCode) {
        if let Some(dropped) = self.0.lock().replace(key) {
            log::trace!("Key {} overwritten by {}", dropped, key);
        }
    }

    pub fn take(&self) -> Option<KeyCode> {
        self.0.lock().take()
    }
}
