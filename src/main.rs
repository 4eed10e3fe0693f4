mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, CommonConfigArgs};
use luarun::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => {
            logging::init(cli.common.log_level.as_deref().unwrap_or("info"));
            commands::config::run(args.command, &cli.common)
        }
        command => run_script_command(command, &cli.common),
    }
}

fn run_script_command(command: Commands, common: &CommonConfigArgs) -> Result<()> {
    let config = commands::load_config(common)?;

    // Config file level, unless --log-level or LUARUN_LOG_LEVEL overrides it
    logging::init(&config.observability.log_level);

    let cache = commands::script_cache(&config);

    match command {
        Commands::Resolve { name } => commands::resolve::resolve(&cache, &name),
        Commands::Sha { name } => commands::resolve::sha(&cache, &name),
        Commands::List => commands::list::run(&cache),
        Commands::Explain { message } => commands::explain::run(&cache, message),
        Commands::Config(args) => commands::config::run(args.command, common),
    }
}
