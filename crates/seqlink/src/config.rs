//! CLI-side configuration resolution.
//!
//! Loads the layered config, applies command-line overrides and the pairs
//! file, and produces the `ConnectorConfig` core consumes.

use std::path::PathBuf;

use seqlink_config::Config;
use seqlink_core::ConnectorConfig;

use crate::cli::{ConnectArgs, GlobalOpts};
use crate::error::CliError;

/// Load the config file named by `--config`, or the default one.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(seqlink_config::load_config(global.config.as_deref())?)
}

/// Path of the config file in effect.
pub fn path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(seqlink_config::config_path)
}

/// Resolve everything the connector needs.
///
/// `--client-name` overrides the file, `--pairs` replaces `pairs_file`, and
/// pairs from the file are appended after the configured ones.
pub fn resolve(args: &ConnectArgs, global: &GlobalOpts) -> Result<ConnectorConfig, CliError> {
    let mut config = load(global)?;

    if let Some(ref name) = args.client_name {
        config.client_name.clone_from(name);
        config.validate()?;
    }

    let pairs_file = args.pairs.clone().or_else(|| config.pairs_file.clone());
    let file_pairs = match pairs_file {
        Some(ref path) => seqlink_config::load_pairs_csv(path)?,
        None => Vec::new(),
    };

    Ok(config.into_connector_config(file_pairs))
}
