// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

/// The `emoto` library provides the electric motorcycle dashboard runtime.
///
/// The `core` module contains the battery model, the vehicle state, the key
/// map and the random sources feeding the battery. The battery is mutated by
/// two background tasks, each guarding its own pair of values.
///
/// The `device` module contains the input sources and renderers the dashboard
/// is driven by, both for an interactive terminal and for headless runs.
///
/// The `runtime` module provides the `Supervisor` which runs the control loop,
/// along with the shutdown signal, the task pool and the `Error` enum.
pub mod core;
pub mod device;
pub mod runtime;

mod config;

pub use self::config::*;

pub use self::runtime::Error;
pub use self::runtime::{Supervisor, Termination};

/// Emoto runtime module containing various constants.
pub mod consts {
    /// Emoto runtime version.
    ///
    /// # Example
    ///
    /// ```
    /// use emoto::consts::VERSION;
    ///
    /// println!("Emoto runtime version: {}", VERSION);
    /// ```
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Emoto default configuration path.
    ///
    /// # Remarks
    ///
    /// This is the system wide configuration. A configuration file in the
    /// working directory takes precedence.
    pub const DEFAULT_CONFIG_PATH: &str = "/etc/emoto/emoto.toml";

    /// Emoto local configuration path.
    pub const LOCAL_CONFIG_PATH: &str = "emoto.toml";

    /// Emoto default vehicle speed.
    ///
    /// # Example
    ///
    /// ```
    /// use emoto::consts::DEFAULT_SPEED;
    ///
    /// assert_eq!(DEFAULT_SPEED, 50);
    /// ```
    pub const DEFAULT_SPEED: i32 = 50;
}
