use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete Luarun configuration (loaded from TOML file)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LuarunConfig {
    #[serde(default)]
    pub scripts: ScriptsConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Where scripts are looked up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptsConfig {
    /// Primary script directory
    #[serde(default = "default_scripts_dir")]
    pub dir: String,

    /// Module subdirectory, searched after `dir`
    #[serde(default = "default_lib_dir")]
    pub lib_dir: String,

    /// Script file extension (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            dir: default_scripts_dir(),
            lib_dir: default_lib_dir(),
            extension: default_extension(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Log level, used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_scripts_dir() -> String {
    "lua".to_string()
}

fn default_lib_dir() -> String {
    "lib".to_string()
}

fn default_extension() -> String {
    "lua".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LuarunConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: LuarunConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Generate example configuration as TOML string
    pub fn example() -> Result<String> {
        toml::to_string_pretty(&LuarunConfig::default())
            .context("Failed to serialize example configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scripts.dir.is_empty() {
            anyhow::bail!("scripts.dir must be set");
        }

        if self.scripts.extension.is_empty() || self.scripts.extension.contains(['.', '/']) {
            anyhow::bail!("scripts.extension must be a bare extension like \"lua\"");
        }

        if self.scripts.lib_dir.is_empty() || Path::new(&self.scripts.lib_dir).is_absolute() {
            anyhow::bail!("scripts.lib_dir must be a relative directory name");
        }

        if !["trace", "debug", "info", "warn", "error"]
            .contains(&self.observability.log_level.as_str())
        {
            anyhow::bail!("observability.log_level must be one of: trace, debug, info, warn, error");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LuarunConfig::default();
        assert_eq!(config.scripts.dir, "lua");
        assert_eq!(config.scripts.lib_dir, "lib");
        assert_eq!(config.scripts.extension, "lua");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("luarun.toml");
        fs::write(&path, "[scripts]\ndir = \"redis/lua\"\n").unwrap();

        let config = LuarunConfig::from_file(&path).unwrap();
        assert_eq!(config.scripts.dir, "redis/lua");
        assert_eq!(config.scripts.lib_dir, "lib");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_example_round_trips() {
        let example = LuarunConfig::example().unwrap();
        let parsed: LuarunConfig = toml::from_str(&example).unwrap();
        assert_eq!(parsed, LuarunConfig::default());
    }

    #[test]
    fn test_invalid_extension() {
        let mut config = LuarunConfig::default();
        config.scripts.extension = ".lua".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = LuarunConfig::default();
        config.observability.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unparseable_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("luarun.toml");
        fs::write(&path, "[scripts\n").unwrap();

        let err = LuarunConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
