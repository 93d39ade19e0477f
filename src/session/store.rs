use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Student,
    Faculty,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Faculty => "faculty",
        }
    }
}

/// The client-owned persisted state: two opaque tokens and the user type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_type: Option<UserType>,
}

impl StoredSession {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Storage for session credentials. The browser front end kept these in
/// local storage; implementations here decide where the strings live.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn user_type(&self) -> Option<UserType>;
    fn set_access_token(&self, token: &str) -> Result<()>;
    fn set_refresh_token(&self, token: &str) -> Result<()>;
    fn set_session(&self, session: StoredSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Write-through store backed by a JSON file next to the caller's working
/// directory. A missing or unreadable file starts as an empty session.
pub struct FileTokenStore {
    path: PathBuf,
    cache: RwLock<StoredSession>,
}

impl FileTokenStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = fs::read(&path)
            .ok()
            .and_then(|raw| serde_json::from_slice(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    fn persist(&self, session: &StoredSession) -> Result<()> {
        if session.is_empty() && session.user_type.is_none() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        let raw = serde_json::to_vec_pretty(session)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn update(&self, mutate: impl FnOnce(&mut StoredSession)) -> Result<()> {
        let mut cache = self.cache.write().expect("token store lock poisoned");
        mutate(&mut cache);
        self.persist(&cache)
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.cache.read().expect("token store lock poisoned").access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.cache.read().expect("token store lock poisoned").refresh_token.clone()
    }

    fn user_type(&self) -> Option<UserType> {
        self.cache.read().expect("token store lock poisoned").user_type
    }

    fn set_access_token(&self, token: &str) -> Result<()> {
        self.update(|s| s.access_token = Some(token.to_string()))
    }

    fn set_refresh_token(&self, token: &str) -> Result<()> {
        self.update(|s| s.refresh_token = Some(token.to_string()))
    }

    fn set_session(&self, session: StoredSession) -> Result<()> {
        self.update(|s| *s = session)
    }

    fn clear(&self) -> Result<()> {
        self.update(|s| *s = StoredSession::default())
    }
}

/// In-process store for tests and short-lived sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    cache: RwLock<StoredSession>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            cache: RwLock::new(session),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.cache.read().expect("token store lock poisoned").access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.cache.read().expect("token store lock poisoned").refresh_token.clone()
    }

    fn user_type(&self) -> Option<UserType> {
        self.cache.read().expect("token store lock poisoned").user_type
    }

    fn set_access_token(&self, token: &str) -> Result<()> {
        self.cache.write().expect("token store lock poisoned").access_token =
            Some(token.to_string());
        Ok(())
    }

    fn set_refresh_token(&self, token: &str) -> Result<()> {
        self.cache.write().expect("token store lock poisoned").refresh_token =
            Some(token.to_string());
        Ok(())
    }

    fn set_session(&self, session: StoredSession) -> Result<()> {
        *self.cache.write().expect("token store lock poisoned") = session;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.cache.write().expect("token store lock poisoned") = StoredSession::default();
        Ok(())
    }
}
