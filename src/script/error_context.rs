/// Map Redis script errors back to the script that raised them
///
/// Redis reports runtime errors against the SHA1 of the flattened body, e.g.
///
/// ```text
/// ERR Error running script (call to f_e0e1f9...db): @user_script:5: user_script:5: attempt to call a nil value
/// ```
///
/// With the SHA1 found in the [`ScriptCache`] reverse index this becomes
/// `sum:5: attempt to call a nil value` plus the surrounding source lines.
use std::sync::LazyLock;

use regex::Regex;

use super::cache::ScriptCache;
use crate::error::{ScriptError, ScriptRuntimeError};
use crate::remote::RemoteError;

/// Lines shown before the failing line
const LINES_BEFORE: usize = 3;
/// Lines shown after the failing line
const LINES_AFTER: usize = 2;

// Redis < 7
static LEGACY_FAILURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"call to f_([a-f0-9]{40})\): @user_script:(\d+): (?:user_script:\d+: )?(.+?)\r?\n?$")
        .expect("valid regex")
});

// Redis >= 7
static FAILURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"user_script:(\d+): (.+?) script: ([a-f0-9]{40}), on @user_script:\d+\.?\r?\n?$")
        .expect("valid regex")
});

/// Location of a runtime error inside a flattened script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFailure {
    pub sha: String,
    /// 1-based line within the flattened body
    pub line: usize,
    pub message: String,
}

/// Extract SHA1, line and message from a Redis error message
pub fn parse_script_failure(message: &str) -> Option<ScriptFailure> {
    if let Some(caps) = LEGACY_FAILURE_RE.captures(message) {
        return Some(ScriptFailure {
            sha: caps.get(1)?.as_str().to_string(),
            line: caps.get(2)?.as_str().parse().ok()?,
            message: caps.get(3)?.as_str().to_string(),
        });
    }

    let caps = FAILURE_RE.captures(message)?;
    Some(ScriptFailure {
        sha: caps.get(3)?.as_str().to_string(),
        line: caps.get(1)?.as_str().parse().ok()?,
        message: caps.get(2)?.as_str().to_string(),
    })
}

/// Numbered source lines around `line`, clamped to the body
pub fn render_context(body: &str, line: usize) -> Vec<(usize, String)> {
    let lines: Vec<&str> = body.split('\n').collect();
    let start = line.saturating_sub(LINES_BEFORE + 1);
    let end = lines.len().min(line.saturating_add(LINES_AFTER));

    if start >= end {
        return Vec::new();
    }

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(offset, source)| (start + offset + 1, source.to_string()))
        .collect()
}

/// Rewrite `err` in terms of script name and line when possible
///
/// Never fails: messages that don't match, or that reference a script this
/// cache never loaded, come back as [`ScriptError::Remote`] unchanged.
pub fn translate(cache: &ScriptCache, err: RemoteError) -> ScriptError {
    let Some(failure) = parse_script_failure(err.message()) else {
        return ScriptError::Remote(err);
    };
    let Some(script) = cache.script_for_sha(&failure.sha) else {
        return ScriptError::Remote(err);
    };

    ScriptError::Runtime(ScriptRuntimeError {
        script: script.name.to_string(),
        line: failure.line,
        context: render_context(&script.body, failure.line),
        message: failure.message,
        original: err.message().to_string(),
    })
}
