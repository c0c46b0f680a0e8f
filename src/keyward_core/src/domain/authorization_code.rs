use chrono::{DateTime, Duration, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Number of alphanumeric characters in a generated code.
pub const AUTHORIZATION_CODE_LENGTH: usize = 100;
pub const AUTHORIZATION_CODE_TTL_MINUTES: i64 = 5;

/// Short-lived, single-use credential handed to a client through its redirect URL.
///
/// A code is never mutated: a new authorization request replaces it with a fresh one,
/// and a successful exchange clears it from the owning client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCode {
    value: String,
    expiration_date: DateTime<Utc>,
}

impl AuthorizationCode {
    /// Draws a new code from the thread-local CSPRNG, valid for five minutes.
    pub fn generate() -> Self {
        let value = rand::rng()
            .sample_iter(Alphanumeric)
            .take(AUTHORIZATION_CODE_LENGTH)
            .map(char::from)
            .collect();

        Self {
            value,
            expiration_date: Utc::now() + Duration::minutes(AUTHORIZATION_CODE_TTL_MINUTES),
        }
    }

    /// Rebuilds a code from persisted state.
    pub fn new(value: String, expiration_date: DateTime<Utc>) -> Self {
        Self {
            value,
            expiration_date,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expiration_date(&self) -> DateTime<Utc> {
        self.expiration_date
    }

    /// True only for an exact match presented before the expiration date.
    pub fn is_valid_and_equals(&self, candidate: &str) -> bool {
        let matches: bool = self.value.as_bytes().ct_eq(candidate.as_bytes()).into();

        matches && !self.is_expired()
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expiration_date
    }
}
