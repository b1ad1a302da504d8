use super::Script;
use crate::error::{Error, Result};
use crate::io::FileIo;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Turns a `manipulationScripts` location into a runnable script
pub trait ScriptLoader: Send + Sync {
    fn load(&self, location: &str, file_io: &FileIo) -> Result<Arc<dyn Script>>;
}

/// Scripts compiled into the host, registered under a location or a file name.
///
/// A location is first looked up as given. Otherwise it is fetched through
/// [`FileIo`] (so URLs are downloaded and missing files fail) and looked up
/// by its file name.
#[derive(Default, Clone)]
pub struct RegisteredScriptLoader {
    scripts: HashMap<String, Arc<dyn Script>>,
}

impl std::fmt::Debug for RegisteredScriptLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.scripts.keys().collect();
        names.sort();
        f.debug_struct("RegisteredScriptLoader")
            .field("scripts", &names)
            .finish()
    }
}

impl RegisteredScriptLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, key: impl Into<String>, script: Arc<dyn Script>) -> Self {
        self.register(key, script);
        self
    }

    pub fn register(&mut self, key: impl Into<String>, script: Arc<dyn Script>) {
        self.scripts.insert(key.into(), script);
    }
}

impl ScriptLoader for RegisteredScriptLoader {
    fn load(&self, location: &str, file_io: &FileIo) -> Result<Arc<dyn Script>> {
        if let Some(script) = self.scripts.get(location) {
            return Ok(Arc::clone(script));
        }

        let path = file_io.resolve_file(location)?;
        if !path.is_file() {
            return Err(Error::Resolution(format!("Unable to find script {location}")));
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("Resolved script {} to {}", location, path.display());

        self.scripts
            .get(&file_name)
            .map(Arc::clone)
            .ok_or_else(|| Error::Config(format!("No script registered for {location}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptContext;
    use crate::test_support::write_file;

    struct Noop;

    impl Script for Noop {
        fn name(&self) -> &str {
            "noop"
        }

        fn run(&self, _context: &mut ScriptContext<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lookup_by_location_then_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let file_io = FileIo::new(dir.path(), dir.path().join("cache"));
        let loader = RegisteredScriptLoader::new()
            .with_script("builtin:noop", Arc::new(Noop))
            .with_script("fix.groovy", Arc::new(Noop));

        assert_eq!(loader.load("builtin:noop", &file_io).unwrap().name(), "noop");

        write_file(dir.path(), "scripts/fix.groovy", "// fix");
        assert_eq!(loader.load("scripts/fix.groovy", &file_io).unwrap().name(), "noop");

        assert!(matches!(loader.load("scripts/missing.groovy", &file_io), Err(Error::Resolution(_))));
        write_file(dir.path(), "other.groovy", "");
        assert!(matches!(loader.load("other.groovy", &file_io), Err(Error::Config(_))));
    }
}
