use super::{ApiError, ApiResult, AuthResponse, LoginRequest, SignupRequest, SubmissionService, User};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAuth {
    pub token: String,
    pub user: User,
}

pub trait SessionStore {
    fn read(&self) -> io::Result<Option<String>>;
    fn write(&mut self, raw: &str) -> io::Result<()>;
    fn remove(&mut self) -> io::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    slot: Option<String>,
}

impl MemorySessionStore {
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.slot.clone())
    }

    fn write(&mut self, raw: &str) -> io::Result<()> {
        self.slot = Some(raw.to_string());
        Ok(())
    }

    fn remove(&mut self) -> io::Result<()> {
        self.slot = None;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, raw: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, raw)
    }

    fn remove(&mut self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// The signed-in user, if any. Callers hold this handle explicitly and pass
/// its token to the calls that need one.
pub struct AuthSession {
    store: Box<dyn SessionStore>,
    current: Option<StoredAuth>,
}

impl AuthSession {
    /// Restores any stored session. Unreadable or malformed data is cleared
    /// and treated as signed out.
    pub fn init(mut store: Box<dyn SessionStore>) -> Self {
        let current = match store.read() {
            Ok(Some(raw)) => match serde_json::from_str::<StoredAuth>(&raw) {
                Ok(auth) => Some(auth),
                Err(err) => {
                    log::error!("[session] failed to load stored auth: {err}");
                    if let Err(err) = store.remove() {
                        log::warn!("[session] could not clear stored auth: {err}");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::error!("[session] failed to read stored auth: {err}");
                None
            }
        };
        if let Some(auth) = &current {
            log::debug!("[session] restored session for {}", auth.user.username);
        }
        Self { store, current }
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.current.as_ref().map(|auth| &auth.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|auth| auth.token.as_str())
    }

    pub fn require_token(&self) -> ApiResult<&str> {
        self.token().ok_or(ApiError::AuthRequired)
    }

    pub async fn login<S: SubmissionService>(
        &mut self,
        service: &mut S,
        email: &str,
        password: &str,
    ) -> ApiResult<&User> {
        let response = service
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.establish(response)
    }

    pub async fn signup<S: SubmissionService>(
        &mut self,
        service: &mut S,
        username: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<&User> {
        let response = service
            .signup(&SignupRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.establish(response)
    }

    fn establish(&mut self, response: AuthResponse) -> ApiResult<&User> {
        let auth = StoredAuth {
            token: response.token,
            user: response.user,
        };
        let raw = serde_json::to_string(&auth)?;
        if let Err(err) = self.store.write(&raw) {
            log::warn!("[session] session will not survive a restart: {err}");
        }
        log::info!("[session] signed in as {}", auth.user.username);
        Ok(&self.current.insert(auth).user)
    }

    pub fn logout(&mut self) {
        if self.current.take().is_some() {
            log::info!("[session] signed out");
        }
        if let Err(err) = self.store.remove() {
            log::warn!("[session] could not clear stored auth: {err}");
        }
    }

    /// Drops the in-memory session and returns the store, leaving any
    /// persisted session in place for the next [`AuthSession::init`].
    pub fn teardown(self) -> Box<dyn SessionStore> {
        self.store
    }
}
