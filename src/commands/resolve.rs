/// `luarun resolve` and `luarun sha`
use anyhow::{Context, Result};

use luarun::script::ScriptCache;

/// Print the flattened body of `name`
pub fn resolve(cache: &ScriptCache, name: &str) -> Result<()> {
    let body = cache
        .body(name)
        .with_context(|| format!("Failed to resolve script: {}", name))?;

    print!("{}", body);
    Ok(())
}

/// Print the EVALSHA checksum of `name`
pub fn sha(cache: &ScriptCache, name: &str) -> Result<()> {
    let sha = cache
        .sha(name)
        .with_context(|| format!("Failed to resolve script: {}", name))?;

    println!("{}", sha);
    Ok(())
}
