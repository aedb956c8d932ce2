use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::AdminProfile;
use crate::utils;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("session lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub admin: AdminProfile,
    pub token: String,
}

/// Signed-in admin state. Populated at login, cleared at logout or when the
/// backend rejects the token. Callers pass it explicitly to authenticated
/// requests.
pub struct SessionStore {
    path: Option<PathBuf>,
    data: Mutex<Option<Session>>,
}

impl SessionStore {
    /// Restores the session persisted under the data directory.
    pub fn load() -> Self {
        Self::load_from(utils::session_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        let data = match read_session(&path) {
            Ok(session) => session,
            Err(err) => {
                warn!(path = ?path, %err, "discarding unreadable session");
                if let Err(err) = fs::remove_file(&path) {
                    warn!(path = ?path, %err, "failed to remove session file");
                }
                None
            }
        };
        Self {
            path: Some(path),
            data: Mutex::new(data),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.data.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|session| session.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn login(&self, admin: AdminProfile, token: String) -> Result<Session, SessionError> {
        let session = Session { admin, token };
        self.replace(Some(session.clone()))?;
        info!(admin = %session.admin.email, "admin signed in");
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.replace(None)?;
        info!("admin signed out");
        Ok(())
    }

    fn replace(&self, session: Option<Session>) -> Result<(), SessionError> {
        let mut guard = self.data.lock().map_err(|_| SessionError::Poisoned)?;
        *guard = session;
        if let Some(path) = &self.path {
            write_session(path, guard.as_ref())?;
        }
        Ok(())
    }
}

fn read_session(path: &Path) -> Result<Option<Session>, SessionError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

fn write_session(path: &Path, session: Option<&Session>) -> Result<(), SessionError> {
    match session {
        Some(session) => {
            utils::ensure_parent(path);
            let contents = serde_json::to_string_pretty(session)?;
            fs::write(path, contents)?;
        }
        None => {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
    }
    Ok(())
}
