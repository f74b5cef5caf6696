//! Session persistence.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};
use crate::session::Session;

/// Environment variable overriding the directory that holds `.stratus/`.
pub const HOME_ENV: &str = "STRATUS_HOME";

/// Directory created under the home directory.
const CONFIG_DIR: &str = ".stratus";

/// Session file name.
const CONFIG_FILE: &str = "config.json";

/// Reads and replaces the persisted session.
///
/// Writers replace the whole session in one step; readers never observe a
/// partially written session.
pub trait SessionStore: Send + Sync {
    /// Returns the current session, or an empty one if none was saved.
    fn read(&self) -> Result<Session>;

    /// Replaces the session with `session`, all fields together.
    fn write_atomic(&self, session: &Session) -> Result<()>;
}

/// JSON file store at `<home>/.stratus/config.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store for an explicit session file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store under `home`, or the user's home directory if `None`.
    pub fn in_home(home: Option<&Path>) -> Result<Self> {
        let home = match home {
            Some(dir) => dir.to_path_buf(),
            None => dirs::home_dir().ok_or(Error::NoHome)?,
        };
        Ok(Self::new(home.join(CONFIG_DIR).join(CONFIG_FILE)))
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self) -> Result<Session> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved session");
                return Ok(Session::default());
            }
            Err(e) => return Err(Error::io(&self.path, e)),
        };
        if contents.trim().is_empty() {
            return Ok(Session::default());
        }
        serde_json::from_str(&contents).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write_atomic(&self, session: &Session) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let bytes = serde_json::to_vec_pretty(session).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| Error::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| Error::io(&self.path, e.error))?;

        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use memory::MemorySessionStore;

#[cfg(any(test, feature = "test-util"))]
mod memory {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::{Result, Session, SessionStore};

    /// In-memory store that counts writes.
    #[derive(Debug, Clone, Default)]
    pub struct MemorySessionStore {
        inner: Arc<Mutex<Inner>>,
    }

    #[derive(Debug, Default)]
    struct Inner {
        session: Session,
        writes: usize,
    }

    impl MemorySessionStore {
        /// Creates a store holding `session`.
        #[must_use]
        pub fn with_session(session: Session) -> Self {
            Self {
                inner: Arc::new(Mutex::new(Inner { session, writes: 0 })),
            }
        }

        /// The current session.
        #[must_use]
        pub fn session(&self) -> Session {
            self.inner.lock().session.clone()
        }

        /// Number of `write_atomic` calls so far.
        #[must_use]
        pub fn writes(&self) -> usize {
            self.inner.lock().writes
        }
    }

    impl SessionStore for MemorySessionStore {
        fn read(&self) -> Result<Session> {
            Ok(self.session())
        }

        fn write_atomic(&self, session: &Session) -> Result<()> {
            let mut inner = self.inner.lock();
            inner.session = session.clone();
            inner.writes += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TargetRef;
    use stratus_api::AuthMethod;

    fn sample() -> Session {
        Session {
            api_endpoint: Some("https://api.example.com".into()),
            api_version: Some("2.150.0".into()),
            authorization_endpoint: Some("https://login.example.com".into()),
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
            auth_method: Some(AuthMethod::Password),
            organization: Some(TargetRef {
                guid: "org-guid".into(),
                name: "my-org".into(),
            }),
            ..Session::default()
        }
    }

    #[test]
    fn missing_file_reads_as_empty_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::in_home(Some(dir.path())).expect("store");
        assert_eq!(store.read().expect("read"), Session::default());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::in_home(Some(dir.path())).expect("store");

        store.write_atomic(&sample()).expect("write");

        assert!(store.path().ends_with(".stratus/config.json"));
        assert_eq!(store.read().expect("read"), sample());
    }

    #[test]
    fn write_replaces_whole_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::in_home(Some(dir.path())).expect("store");

        store.write_atomic(&sample()).expect("first write");
        store
            .write_atomic(&sample().logged_out())
            .expect("second write");

        let session = store.read().expect("read");
        assert!(session.access_token.is_none());
        assert!(session.organization.is_none());
        assert_eq!(session.api_endpoint.as_deref(), Some("https://api.example.com"));
    }

    #[test]
    fn write_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::in_home(Some(dir.path())).expect("store");
        store.write_atomic(&sample()).expect("write");

        let entries: Vec<_> = std::fs::read_dir(dir.path().join(".stratus"))
            .expect("read dir")
            .filter_map(std::result::Result::ok)
            .map(|e| e.file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("config.json")]);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::in_home(Some(dir.path())).expect("store");
        std::fs::create_dir_all(dir.path().join(".stratus")).expect("mkdir");
        std::fs::write(store.path(), "{not json").expect("write");

        assert!(matches!(store.read(), Err(Error::Json { .. })));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("config.json"));
        std::fs::write(
            store.path(),
            r#"{"api_endpoint":"https://api.example.com","color":true}"#,
        )
        .expect("write");

        let session = store.read().expect("read");
        assert_eq!(session.api_endpoint.as_deref(), Some("https://api.example.com"));
    }

    #[test]
    fn memory_store_counts_writes() {
        let store = MemorySessionStore::with_session(sample());
        assert_eq!(store.read().expect("read"), sample());
        assert_eq!(store.writes(), 0);

        store.write_atomic(&Session::default()).expect("write");
        assert_eq!(store.writes(), 1);
        assert_eq!(store.session(), Session::default());
    }
}
