use anyhow::Result;
use tracing::info;

use crate::cli::{CommonConfigArgs, ConfigCommands};
use luarun::config::LuarunConfig;
use luarun::config_discovery::load_config_file;

pub fn run(command: ConfigCommands, common: &CommonConfigArgs) -> Result<()> {
    match command {
        ConfigCommands::Validate { path } => validate(&path),
        ConfigCommands::Example => example(),
        ConfigCommands::Show => show(common),
    }
}

fn validate(path: &str) -> Result<()> {
    info!("Validating config file: {}", path);

    let config = load_config_file(std::path::Path::new(path))?;

    println!("✓ Configuration file is valid: {}", path);
    println!("\nSummary:");
    println!("  - Script directory: {}", config.scripts.dir);
    println!("  - Module directory: {}", config.scripts.lib_dir);
    println!("  - Extension: .{}", config.scripts.extension);

    Ok(())
}

fn example() -> Result<()> {
    println!("{}", LuarunConfig::example()?);
    Ok(())
}

fn show(common: &CommonConfigArgs) -> Result<()> {
    let config = super::load_config(common)?;

    println!("Effective Configuration:\n");
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}
