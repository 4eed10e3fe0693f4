/// Validated script names
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ScriptError;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:lib/)?[a-z0-9]+$").expect("valid regex"));

/// Name of a Lua script, e.g. `sum` or `lib/util`
///
/// Checked before it is ever turned into a path, so `..` and absolute paths
/// never reach the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptName(String);

impl ScriptName {
    pub fn new(name: &str) -> Result<Self, ScriptError> {
        if NAME_RE.is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(ScriptError::InvalidName {
                name: name.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ScriptName {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ScriptName {
    type Error = ScriptError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for ScriptName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
