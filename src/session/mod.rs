//! Persisted client session
//!
//! Keeps the auth token, the signed-in user and the theme preference in a
//! small JSON file in the XDG data directory (~/.local/share/agri-space/).
//! Every mutator writes through to disk immediately.

use crate::api::{AuthSession, User};
use crate::config::defaults::APP_DIR_NAME;
use crate::constants::storage::SESSION_FILE_NAME;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

fn default_dark_mode() -> bool {
    true
}

/// On-disk layout, keyed like the browser's local storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(rename = "agrispace_darkMode", default = "default_dark_mode")]
    pub dark_mode: bool,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            dark_mode: default_dark_mode(),
        }
    }
}

/// Session storage manager
#[derive(Debug)]
pub struct SessionStore {
    data: SessionData,
    path: PathBuf,
}

impl SessionStore {
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Session("Could not determine data directory".to_string()))
    }

    pub fn session_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(SESSION_FILE_NAME))
    }

    /// Load the session from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(Self::session_path()?)
    }

    /// Load the session from a specific path; a missing file is an empty session
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Session(format!("Failed to read session file: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| Error::Session(format!("Failed to parse session file: {}", e)))?
        } else {
            SessionData::default()
        };

        Ok(Self { data, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Session(format!("Failed to create session directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, content)
            .map_err(|e| Error::Session(format!("Failed to write session file: {}", e)))?;

        debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.data.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.data.user.as_ref()
    }

    pub fn dark_mode(&self) -> bool {
        self.data.dark_mode
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.token.is_some()
    }

    /// Store the result of a successful login
    pub fn set_session(&mut self, session: AuthSession) -> Result<()> {
        self.data.token = session.token;
        self.data.user = session.user;
        self.save()
    }

    /// Forget the token and user, keeping the theme
    pub fn clear_session(&mut self) -> Result<()> {
        self.data.token = None;
        self.data.user = None;
        self.save()
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) -> Result<()> {
        self.data.dark_mode = dark_mode;
        self.save()
    }

    /// Flip the theme and return the new value
    pub fn toggle_theme(&mut self) -> Result<bool> {
        self.set_dark_mode(!self.data.dark_mode)?;
        Ok(self.data.dark_mode)
    }
}
