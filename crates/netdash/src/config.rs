//! CLI configuration: thin wrapper around `netdash_config` that applies
//! `GlobalOpts` flag overrides (--base-url, --api-key, etc.).

use std::path::PathBuf;

use netdash_core::CoreConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use netdash_config::{Config, config_path, load_config_from, save_config_to};

/// `--config` if given, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// File + environment, then flags on top.
pub fn effective_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config_from(&config_file(global))?;

    if let Some(ref url) = global.base_url {
        cfg.api.base_url.clone_from(url);
    }
    // A token on the command line beats both config sources.
    if let Some(ref key) = global.api_key {
        cfg.api.api_key = Some(key.clone());
        cfg.api.api_key_env = None;
    }
    if global.insecure {
        cfg.api.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.api.timeout_secs = timeout;
    }
    Ok(cfg)
}

pub fn core_config(global: &GlobalOpts) -> Result<CoreConfig, CliError> {
    let cfg = effective_config(global)?;
    Ok(netdash_config::to_core_config(&cfg)?)
}
