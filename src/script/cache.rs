/// Process-wide cache of flattened scripts and their SHA1 checksums
///
/// Entries are computed on first use and kept for the lifetime of the cache.
/// There is no invalidation: editing a script file after it was loaded has no
/// effect until a new cache is built. Memory grows with the number of
/// distinct scripts referenced.
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use sha1::{Digest, Sha1};

use super::loader::ScriptLoader;
use super::name::ScriptName;
use crate::error::ScriptError;

/// A flattened script and its checksum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedScript {
    pub name: ScriptName,
    pub body: String,
    /// Lowercase hex SHA1 of `body`, as used by `EVALSHA`
    pub sha: String,
}

/// SHA1 of a script body, hex-encoded
pub fn script_sha(body: &str) -> String {
    hex::encode(Sha1::digest(body.as_bytes()))
}

/// Memoizes resolved scripts by name, with a reverse SHA1 index
///
/// Locks are only held to read or insert map entries, never while a script
/// is being resolved. Two threads resolving the same script at once both do
/// the work and produce the same entry; the first insert is kept.
pub struct ScriptCache {
    loader: ScriptLoader,
    entries: RwLock<HashMap<ScriptName, Arc<CachedScript>>>,
    names_by_sha: RwLock<HashMap<String, ScriptName>>,
}

impl ScriptCache {
    pub fn new(loader: ScriptLoader) -> Self {
        Self {
            loader,
            entries: RwLock::new(HashMap::new()),
            names_by_sha: RwLock::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &ScriptLoader {
        &self.loader
    }

    /// Cached entry for `name`, resolving it on first use
    pub fn entry(&self, name: &str) -> Result<Arc<CachedScript>, ScriptError> {
        let name = ScriptName::new(name)?;

        if let Some(entry) = self.lookup(&name) {
            return Ok(entry);
        }

        let body = self.loader.resolve(name.as_str())?;
        let sha = script_sha(&body);
        let computed = Arc::new(CachedScript {
            name: name.clone(),
            body,
            sha,
        });

        let entry = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.clone())
            .or_insert(computed)
            .clone();

        self.names_by_sha
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(entry.sha.clone())
            .or_insert(name);

        Ok(entry)
    }

    /// Flattened body for `name`
    pub fn body(&self, name: &str) -> Result<String, ScriptError> {
        Ok(self.entry(name)?.body.clone())
    }

    /// SHA1 of the flattened body for `name`
    pub fn sha(&self, name: &str) -> Result<String, ScriptError> {
        Ok(self.entry(name)?.sha.clone())
    }

    /// Resolve a fixed set of scripts up front
    ///
    /// Makes the reverse index complete for these names before any of them
    /// runs, so errors can be mapped back even for scripts Redis already had
    /// cached from an earlier process.
    pub fn preload<I, S>(&self, names: I) -> Result<Vec<Arc<CachedScript>>, ScriptError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| self.entry(name.as_ref()))
            .collect()
    }

    /// Script whose flattened body hashes to `sha`, if it was loaded
    pub fn script_for_sha(&self, sha: &str) -> Option<Arc<CachedScript>> {
        let name = self
            .names_by_sha
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(sha)
            .cloned()?;

        self.lookup(&name)
    }

    /// Number of cached scripts
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, name: &ScriptName) -> Option<Arc<CachedScript>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::thread;
    use tempfile::TempDir;

    fn cache_for(dir: &Path) -> ScriptCache {
        ScriptCache::new(ScriptLoader::new(dir))
    }

    #[test]
    fn test_script_sha_matches_redis() {
        // redis-cli SCRIPT LOAD "return 1"
        assert_eq!(script_sha("return 1"), "e0e1f9fabfc9d4800c877a703b823ac0578ff8db");
    }

    #[test]
    fn test_entry_is_memoized() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("sum.lua"), "return 1").unwrap();

        let cache = cache_for(temp.path());
        let first = cache.entry("sum").unwrap();

        // Changes on disk are not picked up
        fs::write(temp.path().join("sum.lua"), "return 2").unwrap();
        let second = cache.entry("sum").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.body("sum").unwrap(), "return 1");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_same_body_same_sha() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("one.lua"), "return KEYS[1]").unwrap();
        fs::write(temp.path().join("two.lua"), "return KEYS[1]").unwrap();

        let cache = cache_for(temp.path());
        assert_eq!(cache.sha("one").unwrap(), cache.sha("two").unwrap());
    }

    #[test]
    fn test_reverse_index() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("sum.lua"), "return 1").unwrap();

        let cache = cache_for(temp.path());
        assert!(cache.script_for_sha(&script_sha("return 1")).is_none());

        let sha = cache.sha("sum").unwrap();
        let script = cache.script_for_sha(&sha).unwrap();
        assert_eq!(script.name.as_str(), "sum");
        assert_eq!(script.body, "return 1");
    }

    #[test]
    fn test_preload() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.lua"), "return 'a'").unwrap();
        fs::write(temp.path().join("b.lua"), "return 'b'").unwrap();

        let cache = cache_for(temp.path());
        let loaded = cache.preload(["a", "b"]).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(cache.len(), 2);
        assert!(cache.preload(["a", "missing"]).is_err());
    }

    #[test]
    fn test_errors_are_not_cached() {
        let temp = TempDir::new().unwrap();
        let cache = cache_for(temp.path());

        assert!(matches!(
            cache.entry("late").unwrap_err(),
            ScriptError::NotFound { .. }
        ));

        fs::write(temp.path().join("late.lua"), "return 1").unwrap();
        assert_eq!(cache.body("late").unwrap(), "return 1");
    }

    #[test]
    fn test_concurrent_first_use() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("lib")).unwrap();
        fs::write(temp.path().join("lib/util.lua"), "local u = 1\n").unwrap();
        fs::write(temp.path().join("sum.lua"), "require('lib/util')\nreturn u\n").unwrap();

        let cache = Arc::new(cache_for(temp.path()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                thread::spawn(move || cache.entry("sum").unwrap())
            })
            .collect();

        let entries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for entry in &entries {
            assert_eq!(**entry, *entries[0]);
        }
        assert_eq!(cache.len(), 1);
    }
}
