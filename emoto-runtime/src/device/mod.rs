use std::time::Duration;

use crate::{
    core::{KeyCode, Snapshot},
    runtime::Termination,
};

mod headless;
mod terminal;

pub use headless::{LogRenderer, RecordingRenderer, ScriptedInput};
pub use terminal::{TerminalInput, TerminalRenderer};

/// Device which can read keys.
///
/// Input sources are driven from a dedicated thread.
pub trait InputSource: Send {
    /// Return the device name.
    fn name(&self) -> &str;

    /// Wait at most `timeout` for the next key.
    ///
    /// Returns `None` when no key arrived in time. Implementations must
    /// honor the timeout so the reader can observe shutdown.
    fn read_key(&mut self, timeout: Duration) -> std::io::Result<Option<KeyCode>>;
}

/// Device which can display the dashboard.
pub trait Renderer {
    /// Return the device name.
    fn name(&self) -> &str;

    /// Display a dashboard snapshot.
    fn render(&mut self, snapshot: &Snapshot) -> std::io::Result<()>;

    /// Display the termination reason and release the display.
    ///
    /// Called once after all background work has stopped.
    fn finish(&mut self, _termination: Termination) -> std::io::Result<()> {
        Ok(())
    }
}
