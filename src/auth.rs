//! # Request Authorization
//!
//! Every outgoing request passes through [`authorize_request`], which attaches the
//! member's bearer token when one is available and leaves the request untouched
//! otherwise. Tokens come from a [`CredentialStore`].

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::RwLock,
};

use reqwest::{
    Request,
    header::{AUTHORIZATION, HeaderValue},
};

use crate::error::ClientError;

/// Source of the bearer credential.
pub trait CredentialStore: Send + Sync {
    /// Current token, if any. Called once per outgoing request.
    fn get(&self) -> Option<String>;

    /// Replace the stored token, e.g. after a successful login.
    fn set(&self, token: &str) -> Result<(), ClientError>;
}

/// Attach `Authorization: Bearer <token>` when the store holds a non-empty token.
///
/// An existing `Authorization` header is replaced. Without a token the request is
/// returned unchanged.
pub fn authorize_request(
    mut request: Request,
    store: &dyn CredentialStore,
) -> Result<Request, ClientError> {
    let Some(token) = store.get().filter(|t| !t.is_empty()) else {
        return Ok(request);
    };

    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| ClientError::InvalidCredential)?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);

    Ok(request)
}

/// In-process token holder.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn clear(&self) {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(|poison| poison.into_inner());
        *guard = None;
    }
}

impl CredentialStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    fn set(&self, token: &str) -> Result<(), ClientError> {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(|poison| poison.into_inner());
        *guard = Some(token.to_string());
        Ok(())
    }
}

/// Token persisted in a file between CLI invocations.
///
/// The file is re-read on every [`CredentialStore::get`] so a login performed by
/// another process is picked up immediately.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the persisted token. Missing files are not an error.
    pub fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl CredentialStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "Failed to read token file");
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;
        tracing::debug!(path = %self.path.display(), "Stored credential");
        Ok(())
    }
}
