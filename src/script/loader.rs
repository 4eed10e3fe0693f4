/// Script loading and `require()` inlining
///
/// Scripts live as `<dir>/<name>.lua`, modules usually under `<dir>/lib/`.
/// A line like `require('lib/util')` is replaced by the flattened body of
/// that module, so Redis always receives one self-contained script.
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::name::ScriptName;
use crate::config::ScriptsConfig;
use crate::error::ScriptError;
use crate::logging::{operations, status};

static REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?mi)^[ \t]*require\([ \t]*(?:'([^'\r\n]*)'|"([^"\r\n]*)")[ \t]*\);?"#)
        .expect("valid regex")
});

/// Read access to script files
pub trait ScriptSource: Send + Sync {
    /// Whether something exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Read the file at `path` as UTF-8
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl ScriptSource for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Loads raw scripts and flattens their `require()` directives
pub struct ScriptLoader {
    root: PathBuf,
    lib_dir: String,
    extension: String,
    source: Box<dyn ScriptSource>,
}

impl ScriptLoader {
    /// Loader for `root` with the default layout (`lib/`, `.lua`)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let defaults = ScriptsConfig::default();
        Self {
            root: root.into(),
            lib_dir: defaults.lib_dir,
            extension: defaults.extension,
            source: Box::new(LocalFs),
        }
    }

    pub fn from_config(config: &ScriptsConfig) -> Self {
        Self {
            root: PathBuf::from(&config.dir),
            lib_dir: config.lib_dir.clone(),
            extension: config.extension.clone(),
            source: Box::new(LocalFs),
        }
    }

    /// Replace the filesystem access layer
    pub fn with_source(mut self, source: impl ScriptSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Directories searched for scripts, in lookup order
    pub fn search_dirs(&self) -> [PathBuf; 2] {
        [self.root.clone(), self.root.join(&self.lib_dir)]
    }

    /// Names of all scripts in the search directories on the local filesystem
    ///
    /// Files whose stem is not a valid script name are skipped.
    pub fn script_names(&self) -> Vec<ScriptName> {
        let mut names = BTreeSet::new();

        for dir in self.search_dirs() {
            let pattern = format!(
                "{}/*.{}",
                glob::Pattern::escape(&dir.display().to_string()),
                glob::Pattern::escape(&self.extension)
            );
            let Ok(paths) = glob::glob(&pattern) else {
                continue;
            };

            for path in paths.flatten() {
                let name = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| ScriptName::new(stem).ok());
                if let Some(name) = name {
                    names.insert(name);
                }
            }
        }

        names.into_iter().collect()
    }

    /// Read the unmodified script body for `name`
    pub fn load_raw(&self, name: &str) -> Result<String, ScriptError> {
        let name = ScriptName::new(name)?;
        self.read_script(&name)
    }

    /// Flatten `name` by inlining every required module
    ///
    /// A module is inlined at its first `require()` within one call; later
    /// requires of the same module are dropped. Each call starts with an
    /// empty set of inlined modules.
    pub fn resolve(&self, name: &str) -> Result<String, ScriptError> {
        let name = ScriptName::new(name)?;
        let mut inlined = HashSet::new();
        self.resolve_with(&name, &mut inlined)
    }

    fn resolve_with(
        &self,
        name: &ScriptName,
        inlined: &mut HashSet<String>,
    ) -> Result<String, ScriptError> {
        let raw = self.read_script(name)?;
        let mut resolved = String::with_capacity(raw.len());
        let mut last = 0;

        for caps in REQUIRE_RE.captures_iter(&raw) {
            let (Some(directive), Some(module)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2)))
            else {
                continue;
            };
            let module = ScriptName::new(module.as_str())?;

            resolved.push_str(&raw[last..directive.start()]);
            last = directive.end();

            // Names are case-insensitive. Marked before descending so a
            // require cycle ends after one lap.
            if inlined.insert(module.as_str().to_ascii_lowercase()) {
                let body = self.resolve_with(&module, inlined)?;
                resolved.push_str(&body);
            }
        }

        resolved.push_str(&raw[last..]);
        Ok(resolved)
    }

    fn read_script(&self, name: &ScriptName) -> Result<String, ScriptError> {
        let file_name = format!("{}.{}", name, self.extension);
        let candidates = self.search_dirs().map(|dir| dir.join(&file_name));

        for path in &candidates {
            if !self.source.exists(path) {
                continue;
            }

            let body = self
                .source
                .read(path)
                .map_err(|source| ScriptError::LoadFailure {
                    path: path.clone(),
                    source,
                })?;

            debug!(
                operation = operations::LOAD,
                status = status::SUCCESS,
                script = %name,
                path = %path.strip_prefix(&self.root).unwrap_or(path).display(),
                size_bytes = body.len(),
                "loaded script"
            );

            return Ok(body);
        }

        Err(ScriptError::NotFound {
            name: name.to_string(),
            searched: candidates.to_vec(),
        })
    }
}
