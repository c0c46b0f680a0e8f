use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::{
    authentication_error::AuthenticationError,
    token_signer::{IdentityClaims, TokenError, TokenSigner},
};

pub const ACCESS_TOKEN_TTL_HOURS: i64 = 2;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Token strings handed back to the caller after a grant or a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

/// Access, refresh and optional ID token minted together for one issuer.
///
/// Refreshing swaps the access token in place; the refresh token, the ID token and the
/// issuer never change for the lifetime of the set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensSet {
    access_token: String,
    refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id_token: Option<String>,
    issuer: String,
}

impl TokensSet {
    pub fn generate_for(signer: &TokenSigner, issuer: &str) -> Result<Self, AuthenticationError> {
        Ok(Self {
            access_token: sign_access_token(signer, issuer)?,
            refresh_token: sign_refresh_token(signer, issuer)?,
            id_token: None,
            issuer: issuer.to_owned(),
        })
    }

    pub fn generate_with_identity(
        signer: &TokenSigner,
        issuer: &str,
        identity: &IdentityClaims,
    ) -> Result<Self, AuthenticationError> {
        let id_token = signer
            .sign_identity(issuer, identity)
            .map_err(signing_failed)?;

        Ok(Self {
            access_token: sign_access_token(signer, issuer)?,
            refresh_token: sign_refresh_token(signer, issuer)?,
            id_token: Some(id_token),
            issuer: issuer.to_owned(),
        })
    }

    /// Rebuilds a set from persisted state.
    pub fn new(
        access_token: String,
        refresh_token: String,
        id_token: Option<String>,
        issuer: String,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            id_token,
            issuer,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn values(&self) -> IssuedTokens {
        IssuedTokens {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            id_token: self.id_token.clone(),
        }
    }

    pub fn access_token_equals(&self, candidate: &str) -> bool {
        self.access_token == candidate
    }

    pub fn refresh_token_equals(&self, candidate: &str) -> bool {
        self.refresh_token == candidate
    }

    /// Re-verifies signature and expiry on every call. Never errors.
    pub fn is_access_token_still_valid(&self, signer: &TokenSigner) -> bool {
        signer.verify(&self.access_token).is_ok()
    }

    /// Mint a new access token if `candidate` is this set's refresh token and that token
    /// still verifies. The refresh token itself is not rotated.
    pub fn refresh(
        &mut self,
        signer: &TokenSigner,
        candidate: &str,
    ) -> Result<(), AuthenticationError> {
        if !self.refresh_token_equals(candidate) {
            return Err(AuthenticationError::invalid_refresh_token());
        }

        signer
            .verify(&self.refresh_token)
            .map_err(|_| AuthenticationError::invalid_refresh_token())?;

        self.access_token = sign_access_token(signer, &self.issuer)?;
        Ok(())
    }
}

fn sign_access_token(signer: &TokenSigner, issuer: &str) -> Result<String, AuthenticationError> {
    signer
        .sign_expiring(issuer, Duration::hours(ACCESS_TOKEN_TTL_HOURS))
        .map_err(signing_failed)
}

fn sign_refresh_token(signer: &TokenSigner, issuer: &str) -> Result<String, AuthenticationError> {
    signer
        .sign_expiring(issuer, Duration::days(REFRESH_TOKEN_TTL_DAYS))
        .map_err(signing_failed)
}

fn signing_failed(_: TokenError) -> AuthenticationError {
    AuthenticationError::signing_failed()
}
