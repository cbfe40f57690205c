use std::{
    io::{Stdout, Write},
    time::{Duration, Instant},
};

use ansi_term::Colour::{Green, Red, Yellow};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    terminal::{self, Clear, ClearType},
};

use super::{InputSource, Renderer};
use crate::{
    core::{KeyCode, Snapshot, TurnSignal},
    runtime::Termination,
};

const DEVICE_NAME_INPUT: &str = "terminal keyboard";
const DEVICE_NAME_DISPLAY: &str = "terminal display";

const TITLE: &str = "****ELECTRIC MOTORCYCLE****";
const RULE_WIDTH: usize = 28;
const PLACEHOLDER: &str = "----";
const LEVEL_LOW: i32 = 20;

/// Keyboard input from the controlling terminal.
///
/// The terminal is in raw mode for as long as this device exists.
pub struct TerminalInput;

impl TerminalInput {
    pub fn new() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;

        log::debug!("Terminal switched to raw mode");

        Ok(Self)
    }

    fn translate(event: KeyEvent) -> Option<KeyCode> {
        if event.kind == KeyEventKind::Release {
            return None;
        }

        match event.code {
            event::KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(KeyCode::Interrupt)
            }
            event::KeyCode::Char(c) => Some(KeyCode::Char(c)),
            event::KeyCode::Left => Some(KeyCode::Left),
            event::KeyCode::Right => Some(KeyCode::Right),
            event::KeyCode::Up => Some(KeyCode::Up),
            event::KeyCode::Down => Some(KeyCode::Down),
            event::KeyCode::Esc => Some(KeyCode::Esc),
            _ => None,
        }
    }
}

impl InputSource for TerminalInput {
    fn name(&self) -> &str {
        DEVICE_NAME_INPUT
    }

    fn read_key(&mut self, timeout: Duration) -> std::io::Result<Option<KeyCode>> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(None);
            }

            if let Event::Key(key_event) = event::read()? {
                if let Some(key) = Self::translate(key_event) {
                    return Ok(Some(key));
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}

/// Dashboard drawn on the controlling terminal.
pub struct TerminalRenderer {
    stdout: Stdout,
    colored: bool,
    cursor_hidden: bool,
    last: Option<Snapshot>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: std::io::stdout(),
            colored: true,
            cursor_hidden: false,
            last: None,
        }
    }

    /// Draw without ANSI colours.
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn on_off(&self, value: bool) -> String {
        match (value, self.colored) {
            (true, true) => Green.paint("ON").to_string(),
            (false, true) => Red.paint("OFF").to_string(),
            (true, false) => "ON".to_owned(),
            (false, false) => "OFF".to_owned(),
        }
    }

    fn signal_glyph(signal: TurnSignal) -> [String; 3] {
        match signal {
            TurnSignal::Off => [
                format!("---/{:>20}---", "\\"),
                format!("|{:>2}{:>22} |", "/", "\\"),
                format!("|/{:>24}|", "\\"),
            ],
            TurnSignal::Left => ["***".to_owned(), "**".to_owned(), "*".to_owned()],
            TurnSignal::Right => [
                format!("{:>27}", "***"),
                format!("{:>27}", "**"),
                format!("{:>27}", "*"),
            ],
        }
    }

    /// Compose the dashboard lines for a snapshot.
    pub(crate) fn compose(&self, snapshot: &Snapshot) -> Vec<String> {
        let rule = "-".repeat(RULE_WIDTH);

        let mut lines = Vec::with_capacity(14);
        lines.extend(Self::signal_glyph(snapshot.signal));
        lines.push(TITLE.to_owned());
        lines.push(rule.clone());

        if snapshot.powered_on {
            let level = if self.colored && snapshot.battery_level <= LEVEL_LOW {
                Red.bold().paint(snapshot.battery_level.to_string()).to_string()
            } else {
                snapshot.battery_level.to_string()
            };

            lines.push(format!(
                "Battery temperature: {}",
                snapshot.battery_temperature
            ));
            lines.push(format!("Battery level: {}", level));
            lines.push(format!("Turn signal: {}", snapshot.signal));
            lines.push(format!("Fan mode: {}", self.on_off(snapshot.fan_on)));
            lines.push(format!("Speed: {}", snapshot.speed));
        } else {
            lines.push(format!("Battery temperature: {}", PLACEHOLDER));
            lines.push(format!("Battery level: {}", PLACEHOLDER));
            lines.push(format!("Turn signal: {}", PLACEHOLDER));
            lines.push(format!("Fan mode: {}", PLACEHOLDER));
            lines.push(format!("Speed: {}", PLACEHOLDER));
        }

        lines.push(rule);
        lines.push(format!("Start : {}", self.on_off(snapshot.powered_on)));
        lines.push(String::new());

        let help = "[1] start [0] stop [K/M/O] signal [H/P] speed [Q] quit";
        if self.colored {
            lines.push(Yellow.paint(help).to_string());
        } else {
            lines.push(help.to_owned());
        }

        lines
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TerminalRenderer {
    fn name(&self) -> &str {
        DEVICE_NAME_DISPLAY
    }

    fn render(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        if self.last.as_ref() == Some(snapshot) {
            return Ok(());
        }

        let lines = self.compose(snapshot);

        if !self.cursor_hidden {
            queue!(self.stdout, Hide)?;
            self.cursor_hidden = true;
        }

        queue!(self.stdout, MoveTo(0, 0), Clear(ClearType::All))?;
        // Raw mode does not translate newlines.
        write!(self.stdout, "{}\r\n", lines.join("\r\n"))?;
        self.stdout.flush()?;

        self.last = Some(*snapshot);

        Ok(())
    }

    fn finish(&mut self, termination: Termination) -> std::io::Result<()> {
        queue!(self.stdout, Show)?;
        self.cursor_hidden = false;

        write!(self.stdout, "\r\n{}\r\n", termination)?;
        self.stdout.flush()
    }
}
