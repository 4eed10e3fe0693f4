use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::remote::RemoteError;

/// Errors surfaced by script loading and execution
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Trying to access invalid lua script: {name}")]
    InvalidName { name: String },

    #[error("Cannot load lua script \"{name}\" (searched {})", display_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },

    #[error("Could not load {}: {source}", .path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Runtime(#[from] ScriptRuntimeError),
}

impl ScriptError {
    /// Message text as reported by Redis, even after translation
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Remote(err) => Some(err.message()),
            Self::Runtime(err) => Some(err.original.as_str()),
            _ => None,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A Redis failure mapped back to the script that raised it
///
/// Renders as `<name>:<line>: <message>` followed by the numbered source
/// lines surrounding `line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRuntimeError {
    pub script: String,
    pub line: usize,
    pub message: String,
    /// `(line number, source)` pairs, 1-based
    pub context: Vec<(usize, String)>,
    /// Untranslated message from Redis
    pub original: String,
}

impl fmt::Display for ScriptRuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.script, self.line, self.message)?;
        for (number, source) in &self.context {
            write!(f, "\n    {}: {}", number, source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScriptRuntimeError {}
