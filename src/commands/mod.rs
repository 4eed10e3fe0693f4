pub mod config;
pub mod explain;
pub mod list;
pub mod resolve;

use anyhow::Result;

use crate::cli::CommonConfigArgs;
use luarun::config::LuarunConfig;
use luarun::config_discovery::load_config_with_discovery;
use luarun::script::{ScriptCache, ScriptLoader};

/// Effective configuration: defaults, then config file, then CLI flags
pub fn load_config(common: &CommonConfigArgs) -> Result<LuarunConfig> {
    let mut config = load_config_with_discovery(common.config.as_deref())?.unwrap_or_default();

    if let Some(dir) = &common.scripts_dir {
        config.scripts.dir = dir.clone();
    }
    if let Some(level) = &common.log_level {
        config.observability.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

pub fn script_cache(config: &LuarunConfig) -> ScriptCache {
    ScriptCache::new(ScriptLoader::from_config(&config.scripts))
}
