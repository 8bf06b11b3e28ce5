use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Holder of the two bearer tokens.
///
/// The store is the only state shared between requests: the HTTP pipeline
/// reads the access token before every call and rewrites it after a
/// refresh, the session controller writes both on login and wipes them on
/// logout or when a token turns out to be malformed.
///
/// Operations are synchronous and never touch the network. Token shape is
/// not validated here; that is the decoder's job.
///
/// # Example
///
/// ```
/// use trimify::management::{MemoryTokenStore, TokenStore};
///
/// # fn main() -> Result<(), trimify::error::StoreError> {
/// let store = MemoryTokenStore::new();
/// store.save("access", "refresh")?;
/// store.set_access("rotated")?;
/// assert_eq!(store.refresh_token().as_deref(), Some("refresh"));
/// store.clear()?;
/// assert_eq!(store.access_token(), None);
/// # Ok(())
/// # }
/// ```
pub trait TokenStore: Send + Sync {
    /// Stores both tokens, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the tokens cannot be persisted. The
    /// previous tokens are kept in that case.
    fn save(&self, access: &str, refresh: &str) -> Result<(), StoreError>;

    /// Replaces the access token and keeps the refresh token.
    fn set_access(&self, access: &str) -> Result<(), StoreError>;

    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    /// Removes both tokens. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}

/// On-disk document. The field names are the fixed storage keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(rename = "access_token", default, skip_serializing_if = "Option::is_none")]
    access: Option<String>,
    #[serde(rename = "refresh_token", default, skip_serializing_if = "Option::is_none")]
    refresh: Option<String>,
}

fn lock(tokens: &Mutex<StoredTokens>) -> MutexGuard<'_, StoredTokens> {
    tokens.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Durable token store backed by a small JSON file.
///
/// The file is read once when the store is opened and written through on
/// every change, so reads never hit the disk.
pub struct FileTokenStore {
    path: PathBuf,
    tokens: Mutex<StoredTokens>,
}

impl FileTokenStore {
    /// Opens (or prepares) the store at `path`.
    ///
    /// Creates the parent directory when needed and loads whatever session
    /// the file holds.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the session document, usually
    ///   [`config::token_file`](crate::config::token_file)
    ///
    /// # Returns
    ///
    /// A store holding the persisted tokens. A missing or empty file yields
    /// an empty store. So does a file that is not a valid session document:
    /// it is removed and the user simply has to sign in again.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the directory cannot be created or
    /// the file exists but cannot be read or removed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tokens = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => StoredTokens::default(),
            Ok(content) => match serde_json::from_str(&content) {
                Ok(tokens) => tokens,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "discarding unreadable session file"
                    );
                    remove_if_present(&path)?;
                    StoredTokens::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoredTokens::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            tokens: Mutex::new(tokens),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Write-then-rename so an interrupted write never leaves half a document.
    fn persist(&self, tokens: &StoredTokens) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(tokens)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        // A leftover from a crashed write would keep its old permissions.
        remove_if_present(&tmp)?;

        let written = create_private(&tmp).and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

// Tokens are credentials: owner read/write only.
#[cfg(unix)]
fn create_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, access: &str, refresh: &str) -> Result<(), StoreError> {
        let mut tokens = lock(&self.tokens);
        let next = StoredTokens {
            access: Some(access.to_string()),
            refresh: Some(refresh.to_string()),
        };
        self.persist(&next)?;
        *tokens = next;
        Ok(())
    }

    fn set_access(&self, access: &str) -> Result<(), StoreError> {
        let mut tokens = lock(&self.tokens);
        let next = StoredTokens {
            access: Some(access.to_string()),
            refresh: tokens.refresh.clone(),
        };
        self.persist(&next)?;
        *tokens = next;
        Ok(())
    }

    fn access_token(&self) -> Option<String> {
        lock(&self.tokens).access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        lock(&self.tokens).refresh.clone()
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut tokens = lock(&self.tokens);
        *tokens = StoredTokens::default();
        remove_if_present(&self.path)?;
        Ok(())
    }
}

/// Process-local store, for tests and `--ephemeral` runs.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        Self {
            tokens: Mutex::new(StoredTokens {
                access: Some(access.to_string()),
                refresh: Some(refresh.to_string()),
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, access: &str, refresh: &str) -> Result<(), StoreError> {
        let mut tokens = lock(&self.tokens);
        tokens.access = Some(access.to_string());
        tokens.refresh = Some(refresh.to_string());
        Ok(())
    }

    fn set_access(&self, access: &str) -> Result<(), StoreError> {
        lock(&self.tokens).access = Some(access.to_string());
        Ok(())
    }

    fn access_token(&self) -> Option<String> {
        lock(&self.tokens).access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        lock(&self.tokens).refresh.clone()
    }

    fn clear(&self) -> Result<(), StoreError> {
        *lock(&self.tokens) = StoredTokens::default();
        Ok(())
    }
}
