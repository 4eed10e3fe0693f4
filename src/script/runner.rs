/// Blocking script execution
///
/// Every call first tries `EVALSHA` with the cached checksum. When Redis
/// answers `NOSCRIPT`, the flattened body is sent once with `EVAL`, which
/// also makes Redis remember the script for later `EVALSHA` calls.
use std::sync::Arc;

use tracing::info;

use super::cache::{CachedScript, ScriptCache};
use super::error_context::translate;
use crate::error::ScriptError;
use crate::logging::{operations, status};
use crate::remote::{eval_params, FailureClass, Param, RemoteError, ScriptCommands};

/// Runs cached Lua scripts through a blocking command interface
pub struct ScriptRunner<C> {
    commands: C,
    cache: Arc<ScriptCache>,
}

impl<C: ScriptCommands> ScriptRunner<C> {
    pub fn new(commands: C, cache: Arc<ScriptCache>) -> Self {
        Self { commands, cache }
    }

    pub fn cache(&self) -> &Arc<ScriptCache> {
        &self.cache
    }

    pub fn commands(&self) -> &C {
        &self.commands
    }

    /// Run script `name` with the given keys and arguments
    pub fn run(&self, name: &str, keys: &[Param], args: &[Param]) -> Result<C::Reply, ScriptError> {
        let script = self.cache.entry(name)?;
        let params = eval_params(&script.sha, keys, args);

        match self.commands.evalsha(&params) {
            Ok(reply) => Ok(reply),
            Err(err) => match err.class() {
                FailureClass::UnknownScript => self.send_script(&script, params),
                FailureClass::Terminal => Err(self.fail(err)),
            },
        }
    }

    // Second and last attempt: whatever EVAL returns is final.
    fn send_script(
        &self,
        script: &CachedScript,
        mut params: Vec<Param>,
    ) -> Result<C::Reply, ScriptError> {
        info!(
            operation = operations::EVAL,
            status = status::NOSCRIPT,
            object_id = %script.sha,
            script = %script.name,
            "No SCRIPT with SHA1 == {}, pushing {}",
            script.sha,
            script.name
        );

        params[0] = Param::from(script.body.as_str());
        self.commands.eval(&params).map_err(|err| self.fail(err))
    }

    fn fail(&self, err: RemoteError) -> ScriptError {
        translate(&self.cache, err)
    }
}
