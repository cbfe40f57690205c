use emoto::{consts, Config};

use crate::Args;

/// Load the configuration and apply the command line overrides.
///
/// An explicit configuration file must exist. Otherwise the local and the
/// system wide configuration are tried in that order.
pub fn load(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::try_from_file(vec![
            consts::LOCAL_CONFIG_PATH,
            consts::DEFAULT_CONFIG_PATH,
        ])?,
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(tick) = args.tick {
        config.dashboard.tick_interval_ms = tick;
    }
    if let Some(capacity) = args.capacity {
        config.battery.initial_capacity = Some(capacity);
    }

    config.global.bin_name = env!("CARGO_BIN_NAME").to_string();
    config.global.daemon = args.daemon;

    config.validate()?;

    Ok(config)
}
