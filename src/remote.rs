//! Command interface consumed from the Redis connection
//!
//! The transport is supplied by the embedding application. Luarun only needs
//! `EVALSHA` and `EVAL`, both taking the usual
//! `<sha|script> numkeys key [key ...] arg [arg ...]` parameter list.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Marker Redis puts in the error when an SHA1 is not in its script cache
pub const NOSCRIPT_MARKER: &str = "NOSCRIPT";

/// An opaque key or argument, passed through to Redis unchanged
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Param {
    Str(String),
    Int(i64),
    Bytes(Vec<u8>),
}

impl Param {
    /// Wire representation of the parameter
    pub fn as_bytes(&self) -> std::borrow::Cow<'_, [u8]> {
        match self {
            Self::Str(s) => s.as_bytes().into(),
            Self::Int(i) => i.to_string().into_bytes().into(),
            Self::Bytes(b) => b.as_slice().into(),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for Param {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<Vec<u8>> for Param {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Error reply (or transport failure) reported by the command interface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether a retry by script body can fix this failure
    pub fn class(&self) -> FailureClass {
        if self.message.contains(NOSCRIPT_MARKER) {
            FailureClass::UnknownScript
        } else {
            FailureClass::Terminal
        }
    }
}

/// Outcome of a failed `EVALSHA`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Redis does not know the SHA1 yet; send the body instead
    UnknownScript,
    /// Anything else, reported to the caller as-is
    Terminal,
}

/// Blocking script commands
pub trait ScriptCommands {
    type Reply;

    /// `EVALSHA sha numkeys keys... args...`
    fn evalsha(&self, params: &[Param]) -> Result<Self::Reply, RemoteError>;

    /// `EVAL script numkeys keys... args...`
    fn eval(&self, params: &[Param]) -> Result<Self::Reply, RemoteError>;
}

/// Non-blocking script commands
#[async_trait]
pub trait AsyncScriptCommands: Send + Sync {
    type Reply: Send;

    /// `EVALSHA sha numkeys keys... args...`
    async fn evalsha(&self, params: &[Param]) -> Result<Self::Reply, RemoteError>;

    /// `EVAL script numkeys keys... args...`
    async fn eval(&self, params: &[Param]) -> Result<Self::Reply, RemoteError>;
}

impl<T: ScriptCommands + ?Sized> ScriptCommands for &T {
    type Reply = T::Reply;

    fn evalsha(&self, params: &[Param]) -> Result<Self::Reply, RemoteError> {
        (**self).evalsha(params)
    }

    fn eval(&self, params: &[Param]) -> Result<Self::Reply, RemoteError> {
        (**self).eval(params)
    }
}

/// Build `[head, numkeys, keys..., args...]`
pub fn eval_params(head: &str, keys: &[Param], args: &[Param]) -> Vec<Param> {
    let mut params = Vec::with_capacity(2 + keys.len() + args.len());
    params.push(Param::from(head));
    params.push(Param::from(keys.len()));
    params.extend(keys.iter().cloned());
    params.extend(args.iter().cloned());
    params
}
