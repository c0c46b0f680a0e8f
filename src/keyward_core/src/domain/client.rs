use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::domain::{
    authentication_error::AuthenticationError,
    authorization_code::AuthorizationCode,
    token_signer::TokenSigner,
    tokens_set::{IssuedTokens, TokensSet},
};

const CLIENT_SECRET_BYTES: usize = 16;

/// Data supplied when registering a third-party client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub label: String,
    pub redirect_url: String,
}

/// Public view of a registered client. Includes the secret, which is only ever shown to
/// the owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBasicInfo {
    pub id: String,
    pub secret: String,
    pub label: String,
    pub scope: Vec<String>,
    pub redirect_url: String,
}

/// The client, and the scope it was granted, behind an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientGrant {
    pub id: String,
    pub scope: Vec<String>,
}

/// An authorization request: where to send the user back, with which state and scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectUrlRequest {
    pub client_id: String,
    pub redirect_url: String,
    pub state: String,
    pub scope: Vec<String>,
}

/// A code exchange: the client proves who it is and presents the code it received.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokensRequest {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub code: String,
}

impl fmt::Debug for ClientTokensRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientTokensRequest")
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url)
            .finish_non_exhaustive()
    }
}

/// A third-party application registered by a user.
///
/// Holds at most one outstanding authorization code and at most one token set. Both are
/// replaced wholesale, never patched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    id: String,
    secret: String,
    label: String,
    redirect_url: String,
    #[serde(default)]
    scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tokens: Option<TokensSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<AuthorizationCode>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("redirect_url", &self.redirect_url)
            .field("scope", &self.scope)
            .field("has_tokens", &self.tokens.is_some())
            .field("has_code", &self.code.is_some())
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn generate(info: ClientInfo) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            secret: generate_secret(),
            label: info.label,
            redirect_url: info.redirect_url,
            scope: Vec::new(),
            tokens: None,
            code: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    pub fn code(&self) -> Option<&AuthorizationCode> {
        self.code.as_ref()
    }

    pub fn tokens(&self) -> Option<&TokensSet> {
        self.tokens.as_ref()
    }

    pub(crate) fn tokens_mut(&mut self) -> Option<&mut TokensSet> {
        self.tokens.as_mut()
    }

    pub fn id_equals(&self, candidate: &str) -> bool {
        self.id == candidate
    }

    pub fn basic_info(&self) -> ClientBasicInfo {
        ClientBasicInfo {
            id: self.id.clone(),
            secret: self.secret.clone(),
            label: self.label.clone(),
            scope: self.scope.clone(),
            redirect_url: self.redirect_url.clone(),
        }
    }

    pub fn grant(&self) -> ClientGrant {
        ClientGrant {
            id: self.id.clone(),
            scope: self.scope.clone(),
        }
    }

    /// Issue a fresh authorization code for this client and build the URL carrying it.
    ///
    /// Any code issued earlier is discarded and can no longer be exchanged.
    pub fn generate_redirect_url(
        &mut self,
        redirect_url: &str,
        state: &str,
        scope: Vec<String>,
    ) -> Result<String, AuthenticationError> {
        if redirect_url != self.redirect_url {
            return Err(AuthenticationError::redirect_url_mismatch());
        }

        let code = AuthorizationCode::generate();
        let url = format!("{}?code={}&state={}", self.redirect_url, code.value(), state);

        self.code = Some(code);
        self.scope = scope;

        Ok(url)
    }

    /// Exchange an authorization code for a new token set issued to this client.
    ///
    /// Checks run in a fixed order: secret, redirect URL, code presence, code value and
    /// expiry. The code is cleared only when the exchange succeeds.
    pub fn generate_tokens(
        &mut self,
        signer: &TokenSigner,
        code: &str,
        redirect_url: &str,
        secret: &str,
    ) -> Result<IssuedTokens, AuthenticationError> {
        if !bool::from(self.secret.as_bytes().ct_eq(secret.as_bytes())) {
            return Err(AuthenticationError::invalid_client());
        }
        if redirect_url != self.redirect_url {
            return Err(AuthenticationError::invalid_client());
        }
        let Some(stored_code) = &self.code else {
            return Err(AuthenticationError::invalid_client_code());
        };
        if !stored_code.is_valid_and_equals(code) {
            return Err(AuthenticationError::invalid_client_code());
        }

        let tokens = TokensSet::generate_for(signer, &self.id)?;
        let values = tokens.values();

        self.code = None;
        self.tokens = Some(tokens);

        Ok(values)
    }

    pub fn is_access_token_still_valid(&self, signer: &TokenSigner) -> bool {
        self.tokens
            .as_ref()
            .is_some_and(|tokens| tokens.is_access_token_still_valid(signer))
    }

    pub fn have_access_token(&self, token: &str) -> bool {
        self.tokens
            .as_ref()
            .is_some_and(|tokens| tokens.access_token_equals(token))
    }

    pub fn have_refresh_token(&self, token: &str) -> bool {
        self.tokens
            .as_ref()
            .is_some_and(|tokens| tokens.refresh_token_equals(token))
    }

    pub fn revoke_tokens(&mut self) {
        self.tokens = None;
    }
}

fn generate_secret() -> String {
    let mut bytes = [0u8; CLIENT_SECRET_BYTES];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;
    use secrecy::Secret;

    use super::*;

    const REDIRECT_URL: &str = "https://app.example.com/callback";

    fn signer() -> TokenSigner {
        TokenSigner::new(&Secret::new("test-secret".to_owned()))
    }

    fn client() -> Client {
        Client::generate(ClientInfo {
            label: "dashboard".to_owned(),
            redirect_url: REDIRECT_URL.to_owned(),
        })
    }

    fn issue_code(client: &mut Client) -> String {
        client
            .generate_redirect_url(REDIRECT_URL, "xyz", vec!["read".to_owned()])
            .unwrap();
        client.code().expect("code issued").value().to_owned()
    }

    #[test]
    fn test_generate_client() {
        let client = client();

        assert!(Uuid::parse_str(client.id()).is_ok());
        assert_eq!(client.basic_info().secret.len(), CLIENT_SECRET_BYTES * 2);
        assert!(client.scope().is_empty());
        assert!(client.code().is_none());
        assert!(client.tokens().is_none());
    }

    #[test]
    fn test_generated_clients_are_distinct() {
        let first = client().basic_info();
        let second = client().basic_info();

        assert_ne!(first.id, second.id);
        assert_ne!(first.secret, second.secret);
    }

    #[test]
    fn test_redirect_url_carries_code_and_state() {
        let mut client = client();
        let url = client
            .generate_redirect_url(REDIRECT_URL, "some-state", vec!["scope2".to_owned()])
            .unwrap();

        let code = client.code().expect("code issued").value();
        assert_eq!(url, format!("{REDIRECT_URL}?code={code}&state=some-state"));
        assert_eq!(client.scope(), ["scope2".to_owned()]);
    }

    #[test]
    fn test_redirect_url_mismatch_is_rejected() {
        let mut client = client();
        let result = client.generate_redirect_url("not same as registered", "", vec![]);

        assert_eq!(result, Err(AuthenticationError::redirect_url_mismatch()));
        assert!(client.code().is_none());
    }

    #[test]
    fn test_new_authorization_request_replaces_previous_code() {
        let signer = signer();
        let mut client = client();
        let first = issue_code(&mut client);
        let second = issue_code(&mut client);
        assert_ne!(first, second);

        let secret = client.basic_info().secret;
        let result = client.generate_tokens(&signer, &first, REDIRECT_URL, &secret);
        assert_eq!(result, Err(AuthenticationError::invalid_client_code()));

        assert!(client.generate_tokens(&signer, &second, REDIRECT_URL, &secret).is_ok());
    }

    #[test]
    fn test_code_exchange_issues_tokens_for_client() {
        let signer = signer();
        let mut client = client();
        let code = issue_code(&mut client);
        let secret = client.basic_info().secret;

        let tokens = client
            .generate_tokens(&signer, &code, REDIRECT_URL, &secret)
            .unwrap();

        assert!(client.code().is_none());
        assert!(client.have_access_token(&tokens.access_token));
        assert!(client.have_refresh_token(&tokens.refresh_token));
        assert!(client.is_access_token_still_valid(&signer));
        assert_eq!(signer.verify(&tokens.access_token).unwrap().iss, client.id());
    }

    #[test]
    fn test_code_is_single_use() {
        let signer = signer();
        let mut client = client();
        let code = issue_code(&mut client);
        let secret = client.basic_info().secret;

        client
            .generate_tokens(&signer, &code, REDIRECT_URL, &secret)
            .unwrap();
        let second = client.generate_tokens(&signer, &code, REDIRECT_URL, &secret);

        assert_eq!(second, Err(AuthenticationError::invalid_client_code()));
    }

    #[test]
    fn test_secret_is_checked_before_everything_else() {
        let signer = signer();
        let mut client = client();

        // Wrong redirect URL and no code either: the secret failure wins.
        let result = client.generate_tokens(&signer, "some-code", "url", "secret");
        assert_eq!(result, Err(AuthenticationError::invalid_client()));
    }

    #[test]
    fn test_redirect_url_is_checked_before_code() {
        let signer = signer();
        let mut client = client();
        let code = issue_code(&mut client);
        let secret = client.basic_info().secret;

        let result = client.generate_tokens(&signer, &code, "url", &secret);
        assert_eq!(result, Err(AuthenticationError::invalid_client()));
    }

    #[test]
    fn test_failed_secret_check_keeps_code() {
        let signer = signer();
        let mut client = client();
        let code = issue_code(&mut client);

        assert!(client
            .generate_tokens(&signer, &code, REDIRECT_URL, "wrong")
            .is_err());
        assert!(client.code().is_some());
    }

    #[test]
    fn test_missing_code_is_rejected() {
        let signer = signer();
        let mut client = client();
        let secret = client.basic_info().secret;

        let result = client.generate_tokens(&signer, "some-code", REDIRECT_URL, &secret);
        assert_eq!(result, Err(AuthenticationError::invalid_client_code()));
    }

    #[test]
    fn test_expired_code_is_rejected() {
        let signer = signer();
        let mut client = client();
        client.code = Some(AuthorizationCode::new(
            "expired-code".to_owned(),
            Utc::now() - Duration::try_minutes(1).expect("valid duration"),
        ));
        let secret = client.basic_info().secret;

        let result = client.generate_tokens(&signer, "expired-code", REDIRECT_URL, &secret);
        assert_eq!(result, Err(AuthenticationError::invalid_client_code()));
    }

    #[test]
    fn test_revoke_tokens() {
        let signer = signer();
        let mut client = client();
        let code = issue_code(&mut client);
        let secret = client.basic_info().secret;
        let tokens = client
            .generate_tokens(&signer, &code, REDIRECT_URL, &secret)
            .unwrap();

        client.revoke_tokens();

        assert!(!client.have_access_token(&tokens.access_token));
        assert!(!client.have_refresh_token(&tokens.refresh_token));
        assert!(!client.is_access_token_still_valid(&signer));
    }

    #[test]
    fn test_token_checks_without_tokens() {
        let client = client();
        assert!(!client.have_access_token(""));
        assert!(!client.have_refresh_token(""));
        assert!(!client.is_access_token_still_valid(&signer()));
    }

    #[test]
    fn test_debug_hides_secret() {
        let client = client();
        let secret = client.basic_info().secret;
        assert!(!format!("{client:?}").contains(&secret));
    }

    #[quickcheck]
    fn prop_redirect_url_must_match_exactly(candidate: String) -> TestResult {
        if candidate == REDIRECT_URL {
            return TestResult::discard();
        }

        let mut client = client();
        TestResult::from_bool(client.generate_redirect_url(&candidate, "", vec![]).is_err())
    }
}
