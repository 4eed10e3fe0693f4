/// `luarun list` command implementation
use anyhow::Result;
use tracing::warn;

use luarun::script::ScriptCache;

pub fn run(cache: &ScriptCache) -> Result<()> {
    let names = cache.loader().script_names();

    if names.is_empty() {
        eprintln!(
            "[luarun] No scripts found in {}",
            cache.loader().root().display()
        );
        return Ok(());
    }

    for name in names {
        match cache.entry(name.as_str()) {
            Ok(script) => println!("{}  {}", script.sha, script.name),
            Err(err) => warn!(script = %name, "skipping script: {}", err),
        }
    }

    Ok(())
}
