// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use emoto::{
    core::{Battery, OsRandom, RandomSource, SeededRandom},
    device::{
        InputSource, LogRenderer, Renderer, ScriptedInput, TerminalInput, TerminalRenderer,
    },
    Configurable, Supervisor,
};

mod config;

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Electric Motorcycle Dashboard", long_about = None)]
pub(crate) struct Args {
    /// Configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for the battery random source.
    #[arg(long)]
    seed: Option<u64>,
    /// Dashboard refresh interval in milliseconds.
    #[arg(long, value_name = "MS")]
    tick: Option<u64>,
    /// Initial battery capacity.
    #[arg(long)]
    capacity: Option<i32>,
    /// Log the dashboard instead of drawing it.
    #[arg(long)]
    headless: bool,
    /// Replay these keys instead of reading the keyboard.
    #[arg(long, value_name = "KEYS")]
    script: Option<String>,
    /// Interval between scripted keys in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 500)]
    script_interval: u64,
    /// Write log messages to this file.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
    /// Disable all log messages.
    #[arg(short, long)]
    quiet: bool,
    /// Daemonize the service.
    #[arg(long)]
    daemon: bool,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(config: &impl Configurable, args: &Args) -> log::LevelFilter {
    if args.quiet {
        return log::LevelFilter::Off;
    }

    let unattended = config.global().daemon || args.headless || args.log_file.is_some();

    match args.verbose {
        0 if unattended => log::LevelFilter::Info,
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn init_logger(config: &impl Configurable, args: &Args) -> anyhow::Result<()> {
    let daemon = config.global().daemon;

    let mut log_config = simplelog::ConfigBuilder::new();
    if daemon {
        log_config.set_time_level(log::LevelFilter::Off);
        log_config.set_thread_level(log::LevelFilter::Off);
    } else {
        log_config.set_time_offset_to_local().ok();
        log_config.set_time_format_rfc2822();
    }

    log_config.set_target_level(log::LevelFilter::Off);
    log_config.set_location_level(log::LevelFilter::Off);
    log_config.add_filter_ignore_str("mio");

    let log_level = log_level(config, args);

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)?;
        simplelog::WriteLogger::init(log_level, log_config.build(), file)?;
        return Ok(());
    }

    let color_choice = if daemon {
        simplelog::ColorChoice::Never
    } else {
        simplelog::ColorChoice::Auto
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Stderr,
        color_choice,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = config::load(&args)?;

    init_logger(&config, &args)?;

    if config.global().daemon {
        log::debug!("Running {} as daemon", config.global().bin_name);
    }

    log::trace!("{:#?}", config);

    log::info!("Emoto dashboard {}", emoto::consts::VERSION);

    let random: Box<dyn RandomSource + Send> = match config.seed {
        Some(seed) => {
            log::debug!("Using random seed {}", seed);
            Box::new(SeededRandom::new(seed))
        }
        None => Box::new(OsRandom),
    };

    let battery = Arc::new(Battery::initialize(config.battery.clone(), random));

    let headless = args.headless || config.global().daemon;

    let input: Box<dyn InputSource> = match &args.script {
        Some(script) => Box::new(ScriptedInput::parse(
            script,
            Duration::from_millis(args.script_interval),
        )),
        None if headless => Box::new(ScriptedInput::empty()),
        None => Box::new(TerminalInput::new()?),
    };

    let renderer: Box<dyn Renderer> = if headless {
        Box::new(LogRenderer::new())
    } else {
        Box::new(TerminalRenderer::new())
    };

    let supervisor = Supervisor::new(&config, battery);

    let exit = supervisor.exit_signal();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Termination requested");
            exit.trigger();
        }
    });

    let result = supervisor.run(input, renderer).await;

    interrupt.abort();

    let termination = result?;

    log::debug!("{} exited: {:?}", config.global().bin_name, termination);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(daemon: bool) -> emoto::Config {
        let mut config = emoto::Config::default();
        config.global.daemon = daemon;
        config
    }

    #[test]
    fn test_log_level_interactive() {
        let args = Args::parse_from(["emoto-dash"]);

        assert_eq!(log_level(&config(false), &args), log::LevelFilter::Error);
    }

    #[test]
    fn test_log_level_daemon() {
        let args = Args::parse_from(["emoto-dash"]);

        assert_eq!(log_level(&config(true), &args), log::LevelFilter::Info);
        assert_eq!(log_level(&config(true).global, &args), log::LevelFilter::Info);
    }

    #[test]
    fn test_log_level_verbosity() {
        let args = Args::parse_from(["emoto-dash", "-vv"]);
        assert_eq!(log_level(&config(false), &args), log::LevelFilter::Trace);

        let args = Args::parse_from(["emoto-dash", "-v", "--quiet"]);
        assert_eq!(log_level(&config(true), &args), log::LevelFilter::Off);
    }
}
