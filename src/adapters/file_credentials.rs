//! File-based credential store adapter.
//!
//! Persists the [`StoredSession`] as pretty-printed JSON, by default at
//! `~/.sessionkit/credentials.json`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::credentials::{Credentials, StoredSession, UserProfile};
use crate::config::default_credentials_path;
use crate::traits::{CredentialStore, CredentialsError};

/// File-based credential store.
///
/// Every write goes to a sibling temporary file that is then renamed over
/// the real one, so a reader never sees a half-written file. On Unix the
/// file is only readable by its owner. An internal mutex serializes the
/// read-modify-write cycles of this instance.
///
/// # Example
///
/// ```ignore
/// use sessionkit::adapters::FileCredentialStore;
/// use sessionkit::traits::CredentialStore;
///
/// let store = FileCredentialStore::from_default_path()?;
/// if let Some(creds) = store.load()? {
///     if !creds.is_expired() {
///         println!("Using stored credentials");
///     }
/// }
/// ```
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Create a store backed by the file at `path`.
    ///
    /// Nothing is touched on disk until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create a store at `~/.sessionkit/credentials.json`.
    pub fn from_default_path() -> Result<Self, CredentialsError> {
        default_credentials_path()
            .map(Self::new)
            .ok_or_else(|| CredentialsError::Io("Failed to determine home directory".to_string()))
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &Path {
        &self.path
    }

    /// Read the whole session from disk.
    ///
    /// A missing file is an empty session. So is a file that isn't valid
    /// JSON; that case is logged since it means something else wrote it.
    fn read(&self) -> Result<StoredSession, CredentialsError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredSession::default())
            }
            Err(e) => return Err(CredentialsError::LoadFailed(e.to_string())),
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable credentials file");
                Ok(StoredSession::default())
            }
        }
    }

    /// Replace the file contents with `value`.
    ///
    /// On any failure the temporary file is removed and the existing file
    /// is left as it was.
    fn write<T: Serialize>(&self, value: &T) -> Result<(), CredentialsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| CredentialsError::Io(e.to_string()))?;
            }
        }

        let tmp_path = self.tmp_path();
        let written = write_private(&tmp_path, value).and_then(|()| {
            fs::rename(&tmp_path, &self.path).map_err(|e| CredentialsError::SaveFailed(e.to_string()))
        });
        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        written?;

        debug!(path = %self.path.display(), "Credentials written");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read, apply `f`, write back, all under the instance lock.
    fn update(&self, f: impl FnOnce(&mut StoredSession)) -> Result<(), CredentialsError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut session = self.read()?;
        f(&mut session);
        self.write(&session)
    }

    fn snapshot(&self) -> Result<StoredSession, CredentialsError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read()
    }
}

/// Write `value` as pretty JSON to a fresh owner-only file at `path`.
fn write_private<T: Serialize>(path: &Path, value: &T) -> Result<(), CredentialsError> {
    let file = create_private(path).map_err(|e| CredentialsError::SaveFailed(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| CredentialsError::Serialization(e.to_string()))?;
    writer
        .flush()
        .map_err(|e| CredentialsError::SaveFailed(e.to_string()))
}

#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<File> {
    File::create(path)
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, credentials: &Credentials) -> Result<(), CredentialsError> {
        self.update(|session| session.set_credentials(credentials))
    }

    fn load(&self) -> Result<Option<Credentials>, CredentialsError> {
        Ok(self.snapshot()?.credentials())
    }

    fn access_token(&self) -> Result<Option<String>, CredentialsError> {
        Ok(self.snapshot()?.access_token)
    }

    fn refresh_token(&self) -> Result<Option<String>, CredentialsError> {
        Ok(self.snapshot()?.refresh_token)
    }

    fn clear(&self) -> Result<(), CredentialsError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Credentials removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialsError::ClearFailed(e.to_string())),
        }
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<(), CredentialsError> {
        self.update(|session| session.profile = Some(profile.clone()))
    }

    fn load_profile(&self) -> Result<Option<UserProfile>, CredentialsError> {
        Ok(self.snapshot()?.profile)
    }

    fn clear_profile(&self) -> Result<(), CredentialsError> {
        self.update(|session| session.profile = None)
    }
}
