//! Logged-in user record and its client-local persistence.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::{Role, StudentId, TeacherId, UserId};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: UserId,
    pub role: Role,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "Utc::now")]
    pub logged_in_at: DateTime<Utc>,
}

impl SessionUser {
    pub fn new(
        user_id: UserId,
        role: Role,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            role,
            name: name.into(),
            email: email.into(),
            logged_in_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The user's own student id, for student accounts.
    pub fn student_id(&self) -> Option<StudentId> {
        (self.role == Role::Student).then_some(StudentId(self.user_id.0))
    }

    /// The user's own teacher id, for teacher accounts.
    pub fn teacher_id(&self) -> Option<TeacherId> {
        (self.role == Role::Teacher).then_some(TeacherId(self.user_id.0))
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("session file '{}' is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("not logged in")]
    NotLoggedIn,
}

/// JSON file holding at most one [`SessionUser`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<SessionUser>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() || raw.trim() == "null" {
            return Ok(None);
        }
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    pub fn require(&self) -> Result<SessionUser, SessionError> {
        self.load()?.ok_or(SessionError::NotLoggedIn)
    }

    pub fn save(&self, user: &SessionUser) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(user).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, body).map_err(io_err)?;
        debug!(path = %self.path.display(), user_id = user.user_id.0, "session saved");
        Ok(())
    }

    /// Removes the stored session. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => {
                warn!(path = %self.path.display(), error = %source, "failed to remove session file");
                Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
