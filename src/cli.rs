use clap::{Parser, Subcommand};

/// Luarun - modular Lua scripts for Redis
///
/// Inspect how scripts are flattened before they are sent with EVAL/EVALSHA,
/// and map Redis script errors back to the source lines that raised them.
#[derive(Parser, Debug)]
#[command(name = "luarun")]
#[command(author = "Luarun Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Modular Lua scripts for Redis", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Common configuration arguments shared across commands
#[derive(Parser, Debug, Clone)]
pub struct CommonConfigArgs {
    /// Config file path
    #[arg(short = 'c', long, global = true, env = "LUARUN_CONFIG")]
    pub config: Option<String>,

    /// Script directory (overrides scripts.dir)
    #[arg(long, global = true, env = "LUARUN_SCRIPTS_DIR")]
    pub scripts_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "LUARUN_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a script with all required modules inlined
    Resolve {
        /// Script name (e.g. "sum" or "lib/util")
        name: String,
    },

    /// Print the SHA1 used for EVALSHA
    Sha {
        /// Script name (e.g. "sum" or "lib/util")
        name: String,
    },

    /// List available scripts with their SHA1
    List,

    /// Map a Redis script error back to script name and line
    Explain {
        /// Error message as returned by Redis (read from stdin when omitted)
        message: Option<String>,
    },

    /// Configuration management utilities
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Validate {
        /// Path to config file
        path: String,
    },
    /// Print an example config file
    Example,
    /// Show effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::try_parse_from(["luarun", "sha", "sum", "--scripts-dir", "/tmp/lua"]).unwrap();

        assert_eq!(cli.common.scripts_dir.as_deref(), Some("/tmp/lua"));
        assert!(matches!(cli.command, Commands::Sha { ref name } if name == "sum"));
    }
}
