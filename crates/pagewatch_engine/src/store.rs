use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use watch_logging::watch_trace;

use crate::key::derive_key;
use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("cannot resolve home directory for state dir {0}")]
    HomeDir(String),
    #[error("reading snapshot {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("writing snapshot: {0}")]
    Persist(#[from] PersistError),
}

type HomeResolver = fn() -> Option<PathBuf>;

/// One snapshot file per URL under the state directory.
///
/// The directory is resolved on every access, so an unresolvable `~` surfaces
/// as a per-URL error instead of failing startup.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: String,
    home: HomeResolver,
}

impl StateStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            home: dirs::home_dir,
        }
    }

    /// Replaces the home directory lookup used to expand a leading `~`.
    pub fn with_home_resolver(mut self, home: HomeResolver) -> Self {
        self.home = home;
        self
    }

    pub fn resolve_dir(&self) -> Result<PathBuf, StateError> {
        let Some(rest) = self.dir.strip_prefix('~') else {
            return Ok(PathBuf::from(&self.dir));
        };
        let home = (self.home)().ok_or_else(|| StateError::HomeDir(self.dir.clone()))?;
        Ok(home.join(rest.trim_start_matches(&['/', '\\'][..])))
    }

    pub fn path_for(&self, url: &str) -> Result<PathBuf, StateError> {
        Ok(self.resolve_dir()?.join(derive_key(url)))
    }

    /// Last snapshot of `url`, or `None` when it has never been stored.
    pub fn read(&self, url: &str) -> Result<Option<String>, StateError> {
        let path = self.path_for(url)?;
        match fs::read_to_string(&path) {
            Ok(text) => {
                watch_trace!(
                    "Address {} snapshot loaded from {:?} ({} bytes)",
                    url,
                    path,
                    text.len()
                );
                Ok(Some(text))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StateError::Io { path, source }),
        }
    }

    pub fn write(&self, url: &str, text: &str) -> Result<PathBuf, StateError> {
        let writer = AtomicFileWriter::new(self.resolve_dir()?);
        let path = writer.write(&derive_key(url), text)?;
        watch_trace!(
            "Address {} stored in {:?} ({} bytes)",
            url,
            path,
            text.len()
        );
        Ok(path)
    }
}
