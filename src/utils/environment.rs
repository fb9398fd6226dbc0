use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;

/// Get the Claude directory path (~/.claude)
pub fn get_claude_dir() -> Result<PathBuf> {
    let home = env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".claude"))
}

/// Resolve the data directory: the configured override if set, else `~/.claude`
pub fn resolve_claude_dir(config: &Config) -> Result<PathBuf> {
    match &config.claude_dir {
        Some(dir) => Ok(dir.clone()),
        None => get_claude_dir(),
    }
}
