use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$CAMPFIN_HOME`, or `~/.campfin`.
pub fn campfin_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CAMPFIN_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".campfin"))
}

pub fn ensure_campfin_home() -> Result<PathBuf> {
    let dir = campfin_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
