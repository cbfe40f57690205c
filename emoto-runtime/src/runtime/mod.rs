use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};

mod error;
mod supervisor;

pub use self::error::Error;
pub use self::supervisor::{Supervisor, Termination};

pub type Result<T = ()> = std::result::Result<T, error::Error>;

/// Runtime shutdown signal.
///
/// The signal is a latch: once triggered it stays triggered. It can be
/// observed synchronously (from plain threads) and awaited (from tasks).
#[derive(Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Construct a new, untriggered, shutdown signal.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger the shutdown signal.
    ///
    /// Triggering an already triggered signal has no effect.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Check if the shutdown signal was triggered.
    #[inline]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Listen for the shutdown signal.
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener(self.tx.subscribe())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ShutdownListener(watch::Receiver<bool>);

impl ShutdownListener {
    /// Wait until the shutdown signal is triggered.
    ///
    /// Returns immediately if the signal was already triggered.
    pub async fn recv(&mut self) {
        // A dropped sender can never trigger again; treat it as shutdown.
        let _ = self.0.wait_for(|triggered| *triggered).await;
    }
}

/// Pool of background tasks.
///
/// Every task in the pool is bound to a shutdown listener. Tasks are never
/// detached: the owner of the pool must `join` it after the shutdown signal
/// was triggered.
#[derive(Default)]
pub struct TaskPool {
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl TaskPool {
    /// Spawn an asynchronous task in the background.
    ///
    /// The task will be terminated when the shutdown signal is received. This
    /// method fails if there is no runtime to spawn the task on.
    pub fn spawn<T>(
        &mut self,
        name: &'static str,
        mut shutdown: ShutdownListener,
        task: T,
    ) -> Result
    where
        T: std::future::Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Startup(format!("{}: {}", name, e)))?;

        let task_handle = handle.spawn(async move {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::debug!("Shutting down background task: {}", name);
                }
                _ = task => {}
            }
        });

        log::debug!("Started background task: {}", name);

        self.tasks.push((name, task_handle));

        Ok(())
    }

    /// Check if a task with this name was spawned on the pool.
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.iter().any(|(task_name, _)| *task_name == name)
    }

    /// Number of tasks in the pool.
    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if the pool is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for all tasks in the pool to terminate.
    ///
    /// The pool is empty afterwards. Panicked tasks are reported as join
    /// errors once all remaining tasks have been awaited.
    pub async fn join(&mut self) -> Result {
        let mut failed = None;

        for (name, handle) in self.tasks.drain(..) {
            match handle.await {
                Ok(()) => log::trace!("Background task joined: {}", name),
                Err(e) => {
                    log::error!("Background task {} failed: {}", name, e);
                    failed.get_or_insert_with(|| Error::Join(format!("{}: {}", name, e)));
                }
            }
        }

        match failed {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
