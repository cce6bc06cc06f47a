//! File-backed token store rooted in a capability directory.
//!
//! The token is written to a staging file next to the target and renamed
//! over it, so a crash mid-write never leaves a truncated token behind. On
//! Unix the file is created owner-only (`0600`).

use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use cap_std::fs::OpenOptionsExt;
use cap_std::{
    ambient_authority,
    fs::{Dir, OpenOptions},
};
use tracing::debug;

use crate::domain::AccessToken;
use crate::domain::ports::{TokenStore, TokenStoreError};

/// Token store persisting the bearer token in a single file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    directory: PathBuf,
    file_name: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`. Parent directories are created on save.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Io`] when `path` has no file name.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, TokenStoreError> {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| TokenStoreError::io(format!("{} is not a file path", path.display())))?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            directory,
            file_name,
        })
    }

    /// Full path of the token file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    fn staging_name(&self) -> PathBuf {
        let mut name = self.file_name.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn io_error(&self, error: &io::Error) -> TokenStoreError {
        TokenStoreError::io(format!("{}: {error}", self.path().display()))
    }

    fn open_existing(&self) -> Result<Option<Dir>, TokenStoreError> {
        match Dir::open_ambient_dir(&self.directory, ambient_authority()) {
            Ok(dir) => Ok(Some(dir)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(&error)),
        }
    }
}

#[cfg(unix)]
const TOKEN_FILE_MODE: u32 = 0o600;

fn remove_if_exists(directory: &Dir, path: &Path) -> io::Result<()> {
    match directory.remove_file(path) {
        Err(error) if error.kind() != io::ErrorKind::NotFound => Err(error),
        _ => Ok(()),
    }
}

/// Create `path` fresh and write `contents`. Readable by the owner only.
fn write_private(directory: &Dir, path: &Path, contents: &[u8]) -> io::Result<()> {
    remove_if_exists(directory, path)?;
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(TOKEN_FILE_MODE);
    let mut file = directory.open_with(path, &options)?;
    file.write_all(contents)?;
    file.sync_all()
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<AccessToken>, TokenStoreError> {
        let Some(dir) = self.open_existing()? else {
            return Ok(None);
        };
        let raw = match dir.read_to_string(&self.file_name) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_error(&error)),
        };
        AccessToken::new(raw)
            .map(Some)
            .map_err(|err| TokenStoreError::corrupt(format!("{}: {err}", self.path().display())))
    }

    fn save(&self, token: &AccessToken) -> Result<(), TokenStoreError> {
        Dir::create_ambient_dir_all(&self.directory, ambient_authority())
            .map_err(|error| self.io_error(&error))?;
        let dir = Dir::open_ambient_dir(&self.directory, ambient_authority())
            .map_err(|error| self.io_error(&error))?;
        let staging = self.staging_name();
        write_private(&dir, &staging, token.expose().as_bytes())
            .map_err(|error| self.io_error(&error))?;
        if let Err(error) = dir.rename(&staging, &dir, &self.file_name) {
            let _cleanup_result = dir.remove_file(&staging);
            return Err(self.io_error(&error));
        }
        debug!(path = %self.path().display(), "session token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let Some(dir) = self.open_existing()? else {
            return Ok(());
        };
        remove_if_exists(&dir, &self.file_name).map_err(|error| self.io_error(&error))?;
        debug!(path = %self.path().display(), "session token cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the file token store.
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp() -> TempDir {
        TempDir::new().expect("temp dir")
    }

    #[rstest]
    fn missing_file_loads_as_logged_out(temp: TempDir) {
        let store = FileTokenStore::new(temp.path().join("nested/token")).expect("store");
        assert_eq!(store.load().expect("load"), None);
        store.clear().expect("clearing a missing file succeeds");
    }

    #[rstest]
    fn save_creates_parents_and_survives_a_new_store(temp: TempDir) {
        let path = temp.path().join("state/bloodbank/token");
        let token = AccessToken::new("eyJhbGciOi.payload.sig").expect("token");
        FileTokenStore::new(&path)
            .expect("store")
            .save(&token)
            .expect("save");

        let reopened = FileTokenStore::new(&path).expect("store");
        assert_eq!(reopened.load().expect("load"), Some(token));
        assert!(!temp.path().join("state/bloodbank/token.tmp").exists());
    }

    #[cfg(unix)]
    #[rstest]
    fn saved_token_is_readable_by_owner_only(temp: TempDir) {
        use std::os::unix::fs::PermissionsExt;

        let store = FileTokenStore::new(temp.path().join("token")).expect("store");
        store
            .save(&AccessToken::new("first").expect("token"))
            .expect("save");
        store
            .save(&AccessToken::new("second").expect("token"))
            .expect("overwrite");

        let mode = std::fs::metadata(store.path())
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, TOKEN_FILE_MODE);
    }

    #[rstest]
    fn clear_removes_the_file(temp: TempDir) {
        let store = FileTokenStore::new(temp.path().join("token")).expect("store");
        store
            .save(&AccessToken::new("abc").expect("token"))
            .expect("save");
        store.clear().expect("clear");
        assert!(!store.path().exists());
        assert_eq!(store.load().expect("load"), None);
    }

    #[rstest]
    fn blank_file_is_reported_as_corrupt(temp: TempDir) {
        std::fs::write(temp.path().join("token"), "  \n").expect("write");
        let store = FileTokenStore::new(temp.path().join("token")).expect("store");
        let err = store.load().expect_err("blank token");
        assert!(matches!(err, TokenStoreError::Corrupt { .. }));
    }
}
