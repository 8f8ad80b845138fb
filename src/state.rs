use crate::utils::token::SessionToken;

/// Read-only context a session is constructed with.
///
/// Replaces a process-wide token store: whoever builds the runner decides
/// which credential it uses, and the session can only read it.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    token: Option<SessionToken>,
}

impl SessionContext {
    pub fn new(token: Option<SessionToken>) -> Self {
        Self { token }
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }
}
