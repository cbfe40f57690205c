use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use super::{InputSource, Renderer};
use crate::{
    core::{KeyCode, Snapshot},
    runtime::Termination,
};

/// Input source replaying a fixed key sequence.
///
/// Keys are released one per interval. Once the sequence is exhausted the
/// source stays idle.
pub struct ScriptedInput {
    keys: VecDeque<KeyCode>,
    interval: Duration,
    next_due: Option<Instant>,
}

impl ScriptedInput {
    /// Construct a scripted input from key codes.
    pub fn new(keys: impl IntoIterator<Item = KeyCode>, interval: Duration) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            interval,
            next_due: None,
        }
    }

    /// Construct a scripted input from a string of characters.
    ///
    /// Every character is a key press. Whitespace is ignored.
    pub fn parse(script: &str, interval: Duration) -> Self {
        Self::new(
            script
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(KeyCode::Char),
            interval,
        )
    }

    /// Construct a scripted input that never emits a key.
    pub fn empty() -> Self {
        Self {
            keys: VecDeque::new(),
            interval: Duration::ZERO,
            next_due: None,
        }
    }

    #[cfg(test)]
    fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl InputSource for ScriptedInput {
    fn name(&self) -> &str {
        "scripted input"
    }

    fn read_key(&mut self, timeout: Duration) -> std::io::Result<Option<KeyCode>> {
        if self.keys.is_empty() {
            std::thread::sleep(timeout);
            return Ok(None);
        }

        let now = Instant::now();
        let due = *self.next_due.get_or_insert(now + self.interval);

        if due > now {
            let wait = due - now;
            if wait > timeout {
                std::thread::sleep(timeout);
                return Ok(None);
            }
            std::thread::sleep(wait);
        }

        self.next_due = Some(Instant::now() + self.interval);

        Ok(self.keys.pop_front())
    }
}

/// Headless renderer writing dashboard changes to the log.
#[derive(Default)]
pub struct LogRenderer {
    last: Option<Snapshot>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for LogRenderer {
    fn name(&self) -> &str {
        "log"
    }

    fn render(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        if self.last.as_ref() != Some(snapshot) {
            log::info!("{}", snapshot);
            self.last = Some(*snapshot);
        }

        Ok(())
    }

    fn finish(&mut self, termination: Termination) -> std::io::Result<()> {
        log::info!("{}", termination);

        Ok(())
    }
}

#[derive(Default)]
struct Recording {
    snapshots: Vec<Snapshot>,
    termination: Option<Termination>,
}

/// Renderer recording every snapshot it is given.
///
/// Clones share the same recording, so a handle can be kept while the
/// renderer itself is moved into the supervisor.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded snapshots in render order.
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.inner.lock().snapshots.clone()
    }

    /// The most recently recorded snapshot.
    pub fn last(&self) -> Option<Snapshot> {
        self.inner.lock().snapshots.last().copied()
    }

    /// The termination passed to `finish`, if called.
    pub fn termination(&self) -> Option<Termination> {
        self.inner.lock().termination
    }
}

impl Renderer for RecordingRenderer {
    fn name(&self) -> &str {
        "recording"
    }

    fn render(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        self.inner.lock().snapshots.push(*snapshot);

        Ok(())
    }

    fn finish(&mut self, termination: Termination) -> std::io::Result<()> {
        self.inner.lock().termination = Some(termination);

        Ok(())
    }
}
