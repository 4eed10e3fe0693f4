// Library interface for Luarun
// Embedding applications supply a Redis connection implementing
// `ScriptCommands` (or `AsyncScriptCommands`) and run scripts by name.

pub mod config;
pub mod config_discovery;
pub mod error;
pub mod info;
pub mod logging;
pub mod remote;
pub mod reply;
pub mod script;

// Re-export commonly used types
pub use error::{ScriptError, ScriptRuntimeError};
pub use remote::{AsyncScriptCommands, Param, RemoteError, ScriptCommands};
pub use script::{AsyncScriptRunner, ScriptCache, ScriptLoader, ScriptName, ScriptRunner};
