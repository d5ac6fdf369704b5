use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::SessionError;
use crate::domain::{Identity, Session};

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    identity: Identity,
    token: String,
}

/// JSON file holding the last authenticated session between runs.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when nothing has been persisted yet.
    #[instrument(fields(path = %self.path.display()), skip(self))]
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No persisted session");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let persisted: PersistedSession = serde_json::from_str(&raw)?;
        debug!(user_id = persisted.identity.id, "Loaded persisted session");
        Ok(Some(Session::authenticated(persisted.identity, persisted.token)))
    }

    /// Writes an authenticated session; a guest session clears the file.
    #[instrument(fields(path = %self.path.display()), skip(self, session))]
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let Session::Authenticated { identity, token } = session else {
            return self.clear();
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let persisted = PersistedSession {
            identity: identity.clone(),
            token: token.clone(),
        };
        fs::write(&self.path, serde_json::to_vec_pretty(&persisted)?)?;
        debug!("Persisted session");
        Ok(())
    }

    #[instrument(fields(path = %self.path.display()), skip(self))]
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
