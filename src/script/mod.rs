//! Lua scripts for Redis
//!
//! - [`loader`]: reads scripts from disk and inlines `require()`d modules
//! - [`cache`]: memoizes flattened bodies and their SHA1 per script name
//! - [`runner`] / [`async_runner`]: `EVALSHA` with a single `EVAL` fallback
//! - [`error_context`]: maps Redis runtime errors back to script lines

pub mod async_runner;
pub mod cache;
pub mod error_context;
pub mod loader;
pub mod name;
pub mod runner;

pub use async_runner::AsyncScriptRunner;
pub use cache::{script_sha, CachedScript, ScriptCache};
pub use loader::{LocalFs, ScriptLoader, ScriptSource};
pub use name::ScriptName;
pub use runner::ScriptRunner;
