use serde::{Deserialize, Serialize};

use crate::domain::{
    authentication_error::AuthenticationError,
    client::{
        Client, ClientBasicInfo, ClientGrant, ClientInfo, ClientTokensRequest, RedirectUrlRequest,
    },
    token_signer::{IdentityClaims, TokenSigner},
    tokens_set::{IssuedTokens, TokensSet},
};

/// Identity descriptor supplied by the caller. The id is never generated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub role: String,
}

/// Aggregate root owning the user's direct token sets and registered clients.
///
/// The serialized form of this type is the persisted state contract:
/// `{id, role, tokens: [...], clients: [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: String,
    role: String,
    #[serde(default)]
    tokens: Vec<TokensSet>,
    #[serde(default)]
    clients: Vec<Client>,
}

impl User {
    pub fn create(info: UserInfo) -> Self {
        Self {
            id: info.id,
            role: info.role,
            tokens: Vec::new(),
            clients: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            role: self.role.clone(),
        }
    }

    pub fn tokens(&self) -> &[TokensSet] {
        &self.tokens
    }

    pub fn clients(&self) -> Vec<ClientBasicInfo> {
        self.clients.iter().map(Client::basic_info).collect()
    }

    /// Whether any direct or client token set carries this access token.
    pub fn holds_access_token(&self, access_token: &str) -> bool {
        self.tokens
            .iter()
            .any(|tokens| tokens.access_token_equals(access_token))
            || self
                .clients
                .iter()
                .any(|client| client.have_access_token(access_token))
    }

    /// Whether any direct or client token set carries this refresh token.
    pub fn holds_refresh_token(&self, refresh_token: &str) -> bool {
        self.tokens
            .iter()
            .any(|tokens| tokens.refresh_token_equals(refresh_token))
            || self
                .clients
                .iter()
                .any(|client| client.have_refresh_token(refresh_token))
    }

    pub fn generate_new_tokens(
        &mut self,
        signer: &TokenSigner,
    ) -> Result<IssuedTokens, AuthenticationError> {
        let tokens = TokensSet::generate_for(signer, &self.id)?;
        let values = tokens.values();

        self.tokens.push(tokens);

        Ok(values)
    }

    pub fn generate_new_tokens_with_identity(
        &mut self,
        signer: &TokenSigner,
        identity: &IdentityClaims,
    ) -> Result<IssuedTokens, AuthenticationError> {
        let tokens = TokensSet::generate_with_identity(signer, &self.id, identity)?;
        let values = tokens.values();

        self.tokens.push(tokens);

        Ok(values)
    }

    pub fn generate_new_client(&mut self, info: ClientInfo) -> ClientBasicInfo {
        let client = Client::generate(info);
        let basic_info = client.basic_info();

        self.clients.push(client);

        basic_info
    }

    pub fn generate_redirect_url_for(
        &mut self,
        request: RedirectUrlRequest,
    ) -> Result<String, AuthenticationError> {
        let client = self
            .client_by_id_mut(&request.client_id)
            .ok_or_else(AuthenticationError::client_not_found)?;

        client.generate_redirect_url(&request.redirect_url, &request.state, request.scope)
    }

    pub fn generate_client_tokens(
        &mut self,
        signer: &TokenSigner,
        request: &ClientTokensRequest,
    ) -> Result<IssuedTokens, AuthenticationError> {
        let client = self
            .client_by_id_mut(&request.client_id)
            .ok_or_else(AuthenticationError::client_not_found)?;

        client.generate_tokens(
            signer,
            &request.code,
            &request.redirect_url,
            &request.client_secret,
        )
    }

    /// Validity of the first token set carrying `access_token`.
    ///
    /// Direct grants are searched before clients, and the first match decides: an expired
    /// direct set returns false without looking any further.
    pub fn have_valid_token(&self, signer: &TokenSigner, access_token: &str) -> bool {
        if let Some(tokens) = self
            .tokens
            .iter()
            .find(|tokens| tokens.access_token_equals(access_token))
        {
            return tokens.is_access_token_still_valid(signer);
        }

        self.clients
            .iter()
            .find(|client| client.have_access_token(access_token))
            .is_some_and(|client| client.is_access_token_still_valid(signer))
    }

    /// The client behind `access_token`. Direct grants have no client and are not searched.
    pub fn client_who_has_access_token(&self, access_token: &str) -> Option<ClientGrant> {
        self.clients
            .iter()
            .find(|client| client.have_access_token(access_token))
            .map(Client::grant)
    }

    pub fn refresh_token(
        &mut self,
        signer: &TokenSigner,
        refresh_token: &str,
    ) -> Result<IssuedTokens, AuthenticationError> {
        let tokens = self
            .tokens_set_with_refresh_token(refresh_token)
            .ok_or_else(AuthenticationError::invalid_refresh_token)?;

        tokens.refresh(signer, refresh_token)?;

        Ok(tokens.values())
    }

    /// Revoke the whole token set behind a currently valid access token, refresh token
    /// included.
    pub fn revoke_token(
        &mut self,
        signer: &TokenSigner,
        access_token: &str,
    ) -> Result<(), AuthenticationError> {
        if !self.have_valid_token(signer, access_token) {
            return Err(AuthenticationError::invalid_token());
        }

        if let Some(client) = self
            .clients
            .iter_mut()
            .find(|client| client.have_access_token(access_token))
        {
            client.revoke_tokens();
            return Ok(());
        }

        self.tokens
            .retain(|tokens| !tokens.access_token_equals(access_token));

        Ok(())
    }

    fn tokens_set_with_refresh_token(&mut self, refresh_token: &str) -> Option<&mut TokensSet> {
        if let Some(position) = self
            .tokens
            .iter()
            .position(|tokens| tokens.refresh_token_equals(refresh_token))
        {
            return self.tokens.get_mut(position);
        }

        self.clients
            .iter_mut()
            .filter_map(Client::tokens_mut)
            .find(|tokens| tokens.refresh_token_equals(refresh_token))
    }

    fn client_by_id_mut(&mut self, client_id: &str) -> Option<&mut Client> {
        self.clients
            .iter_mut()
            .find(|client| client.id_equals(client_id))
    }
}
