// src/utils/token.rs

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::TokenStoreError;

/// Opaque bearer credential issued by the backend at login.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Trims surrounding whitespace; an empty token is no token.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Persists the session token in a plain file so it survives restarts.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or blank file means no one is logged in.
    pub fn load(&self) -> Result<Option<SessionToken>, TokenStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(SessionToken::new(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    pub fn save(&self, raw: &str) -> Result<SessionToken, TokenStoreError> {
        let token = SessionToken::new(raw).ok_or(TokenStoreError::Empty)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, token.expose()).map_err(|e| self.io_error(e))?;

        tracing::info!("Session token saved to {}", self.path.display());
        Ok(token)
    }

    /// Removes the token. Clearing an absent token is not an error.
    pub fn clear(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Session token removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> TokenStore {
        let dir = std::env::temp_dir().join(format!("exam-client-{}", uuid::Uuid::new_v4()));
        TokenStore::new(dir.join("token"))
    }

    #[test]
    fn test_blank_token_is_none() {
        assert!(SessionToken::new("   \n").is_none());
        assert_eq!(SessionToken::new(" abc \n").unwrap().expose(), "abc");
    }

    #[test]
    fn test_debug_hides_token() {
        let token = SessionToken::new("secret-value").unwrap();
        assert!(!format!("{:?}", token).contains("secret-value"));
    }

    #[test]
    fn test_save_load_clear() {
        let store = temp_store();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);

        store.save("eyJhbGciOi.payload.sig\n").unwrap();
        assert_eq!(store.load().unwrap().unwrap().expose(), "eyJhbGciOi.payload.sig");

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_save_rejects_empty() {
        let store = temp_store();
        assert!(matches!(store.save("  "), Err(TokenStoreError::Empty)));
    }
}
