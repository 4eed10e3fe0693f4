/// `luarun explain` command implementation
///
/// Loads every script so the SHA1 in the message can be matched, then prints
/// the message in terms of script name and line.
use anyhow::{Context, Result};
use std::io::Read;
use tracing::warn;

use luarun::remote::RemoteError;
use luarun::script::{error_context::translate, ScriptCache};

pub fn run(cache: &ScriptCache, message: Option<String>) -> Result<()> {
    let message = match message {
        Some(message) => message,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read error message from stdin")?;
            buf.trim_end().to_string()
        }
    };

    for name in cache.loader().script_names() {
        if let Err(err) = cache.entry(name.as_str()) {
            warn!(script = %name, "skipping script: {}", err);
        }
    }

    println!("{}", translate(cache, RemoteError::new(message)));
    Ok(())
}
