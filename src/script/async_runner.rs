/// Non-blocking script execution
///
/// Same protocol as [`ScriptRunner`](super::runner::ScriptRunner): `EVALSHA`
/// first, one `EVAL` when Redis answers `NOSCRIPT`. The fallback lives in its
/// own stage that never looks at the error class, so there is no way to get a
/// third attempt, no matter how many calls run concurrently.
use std::sync::Arc;

use tracing::info;

use super::cache::{CachedScript, ScriptCache};
use super::error_context::translate;
use crate::error::ScriptError;
use crate::logging::{operations, status};
use crate::remote::{eval_params, AsyncScriptCommands, FailureClass, Param};

/// Runs cached Lua scripts through an async command interface
pub struct AsyncScriptRunner<C> {
    commands: C,
    cache: Arc<ScriptCache>,
}

/// Result of the `EVALSHA` stage
enum FirstAttempt<R> {
    Done(Result<R, ScriptError>),
    Upload(Vec<Param>),
}

impl<C: AsyncScriptCommands> AsyncScriptRunner<C> {
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
    pub async fn run(
        &self,
        name: &str,
        keys: &[Param],
        args: &[Param],
    ) -> Result<C::Reply, ScriptError> {
        let script = self.cache.entry(name)?;

        match self.run_by_sha(&script, keys, args).await {
            FirstAttempt::Done(result) => result,
            FirstAttempt::Upload(params) => self.send_script(&script, params).await,
        }
    }

    async fn run_by_sha(
        &self,
        script: &CachedScript,
        keys: &[Param],
        args: &[Param],
    ) -> FirstAttempt<C::Reply> {
        let params = eval_params(&script.sha, keys, args);

        match self.commands.evalsha(&params).await {
            Ok(reply) => FirstAttempt::Done(Ok(reply)),
            Err(err) => match err.class() {
                FailureClass::UnknownScript => FirstAttempt::Upload(params),
                FailureClass::Terminal => FirstAttempt::Done(Err(translate(&self.cache, err))),
            },
        }
    }

    async fn send_script(
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
        self.commands
            .eval(&params)
            .await
            .map_err(|err| translate(&self.cache, err))
    }
}
