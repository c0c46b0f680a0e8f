use std::{collections::HashMap, fmt};

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Caller-supplied identity claims embedded verbatim in an ID token.
pub type IdentityClaims = HashMap<String, String>;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Registered claim names the signer sets itself; identity claims cannot override them.
const RESERVED_CLAIMS: [&str; 5] = ["iss", "iat", "jti", "exp", "nbf"];

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Token lifetime out of range")]
    LifetimeOutOfRange,
}

/// Claims carried by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Claims carried by an ID token. There is no `exp`: ID tokens do not expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityTokenClaims {
    pub iss: String,
    pub iat: i64,
    pub jti: String,
    #[serde(flatten)]
    pub identity: IdentityClaims,
}

/// Signs and verifies every token with the single shared HS256 secret.
///
/// The issuer travels as the `iss` claim; it never selects a key. Each token also gets a
/// random `jti` so two tokens minted within the same second never collide.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &Secret<String>) -> Self {
        let secret = secret.expose_secret().as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Sign a token for `issuer` that expires `lifetime` from now.
    pub fn sign_expiring(&self, issuer: &str, lifetime: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(lifetime)
            .ok_or(TokenError::LifetimeOutOfRange)?
            .timestamp();

        let claims = TokenClaims {
            iss: issuer.to_owned(),
            iat: now.timestamp(),
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        self.encode(&claims)
    }

    /// Sign an ID token carrying `identity` alongside the registered claims.
    ///
    /// Identity entries named like a registered claim are dropped, so `iss` is always the
    /// owner passed in here.
    pub fn sign_identity(
        &self,
        issuer: &str,
        identity: &IdentityClaims,
    ) -> Result<String, TokenError> {
        let identity = identity
            .iter()
            .filter(|(name, _)| !RESERVED_CLAIMS.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let claims = IdentityTokenClaims {
            iss: issuer.to_owned(),
            iat: Utc::now().timestamp(),
            jti: Uuid::new_v4().to_string(),
            identity,
        };

        self.encode(&claims)
    }

    /// Check signature, algorithm and expiration of an access or refresh token.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)?.claims;
        Ok(claims)
    }

    /// Check the signature of an ID token and return its claims.
    pub fn decode_identity(&self, id_token: &str) -> Result<IdentityTokenClaims, TokenError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims =
            decode::<IdentityTokenClaims>(id_token, &self.decoding_key, &validation)?.claims;
        Ok(claims)
    }

    fn encode<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let token = encode(&Header::new(ALGORITHM), claims, &self.encoding_key)?;
        Ok(token)
    }
}
