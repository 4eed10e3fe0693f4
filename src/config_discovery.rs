use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::LuarunConfig;

/// Project-level config file name
pub const CONFIG_FILE_NAME: &str = "luarun.toml";

/// Discovers Luarun configuration by traversing up the directory tree
pub fn discover_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Ok(Some(config_path));
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    // Fallback to global config
    if let Some(home) = dirs::home_dir() {
        let global_config = home.join(".config/luarun/config.toml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Load a config file, anchoring a relative `scripts.dir` at the file's directory
pub fn load_config_file(path: &Path) -> Result<LuarunConfig> {
    let mut config = LuarunConfig::from_file(path)?;

    let dir = Path::new(&config.scripts.dir);
    if dir.is_relative() {
        if let Some(base) = path.parent() {
            config.scripts.dir = base.join(dir).display().to_string();
        }
    }

    config.validate().with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}

/// Loads configuration with auto-discovery support
///
/// If `explicit_path` is provided, loads config from that path.
/// Otherwise, auto-discovers config by traversing up directory tree from cwd.
///
/// Returns Ok(None) if no config is found (neither explicit nor discovered).
pub fn load_config_with_discovery(explicit_path: Option<&str>) -> Result<Option<LuarunConfig>> {
    if let Some(config_path) = explicit_path {
        return Ok(Some(load_config_file(Path::new(config_path))?));
    }

    let current_dir =
        std::env::current_dir().context("Failed to get current directory for config discovery")?;

    match discover_config(&current_dir)? {
        Some(discovered_path) => {
            tracing::debug!(path = %discovered_path.display(), "using discovered config");
            Ok(Some(load_config_file(&discovered_path)?))
        }
        None => Ok(None),
    }
}
