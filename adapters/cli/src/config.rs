//! Loading of session tuning from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use arena_combat_world::SessionConfig;

/// Reads the session configuration from `path`, or returns the defaults.
///
/// Missing keys fall back to their default values so a file only needs to
/// name the knobs it changes.
pub(crate) fn load(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

fn parse(contents: &str) -> Result<SessionConfig> {
    let config: SessionConfig =
        toml::from_str(contents).context("failed to parse session config toml contents")?;
    config
        .validate()
        .context("session config failed validation")?;
    Ok(config)
}
