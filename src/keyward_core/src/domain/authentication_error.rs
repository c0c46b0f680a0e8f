use std::borrow::Cow;

use thiserror::Error;

/// The single failure kind surfaced by the token lifecycle.
///
/// Every rejected credential (unknown client, wrong secret, expired code, revoked token...)
/// is reported through this type. The reason is short and deliberately coarse so callers
/// cannot tell which validation step failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Authentication failed: {reason}")]
pub struct AuthenticationError {
    reason: Cow<'static, str>,
}

impl AuthenticationError {
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn invalid_client() -> Self {
        Self::new("invalid client")
    }

    pub fn invalid_client_code() -> Self {
        Self::new("invalid client code")
    }

    pub fn client_not_found() -> Self {
        Self::new("client not found")
    }

    pub fn redirect_url_mismatch() -> Self {
        Self::new("redirect url mismatch")
    }

    pub fn invalid_token() -> Self {
        Self::new("invalid token")
    }

    pub fn invalid_refresh_token() -> Self {
        Self::new("invalid refresh token")
    }

    pub fn signing_failed() -> Self {
        Self::new("unable to sign token")
    }
}
