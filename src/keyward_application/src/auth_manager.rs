use keyward_core::{
    AuthenticationError, ClientBasicInfo, ClientGrant, ClientInfo, ClientTokensRequest,
    IdentityClaims, IssuedTokens, RedirectUrlRequest, TokenSigner, User, UserInfo,
    UserRepository, UserRepositoryError,
};
use serde::{Deserialize, Serialize};

use crate::user_locks::UserLocks;

/// Error types for the auth manager
#[derive(Debug, thiserror::Error)]
pub enum AuthManagerError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
    #[error("User repository error: {0}")]
    Repository(#[from] UserRepositoryError),
}

/// Owner of an access token, and the client it was issued to if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedToken {
    pub user: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientGrant>,
}

/// Entry point for every token lifecycle operation.
///
/// Each mutating call loads one user, mutates it in memory and saves it back while holding
/// that user's lock. Operations keyed by user identity create the user on first use; it is
/// persisted only once the operation succeeds. Operations keyed by a token reject unknown
/// tokens with an [`AuthenticationError`].
#[derive(Debug, Clone)]
pub struct AuthManager<R>
where
    R: UserRepository,
{
    user_repository: R,
    signer: TokenSigner,
    locks: UserLocks,
}

impl<R> AuthManager<R>
where
    R: UserRepository,
{
    pub fn new(user_repository: R, signer: TokenSigner) -> Self {
        Self {
            user_repository,
            signer,
            locks: UserLocks::new(),
        }
    }

    /// Issue a direct access/refresh token pair to the user.
    #[tracing::instrument(name = "AuthManager::generate_tokens_for", skip(self))]
    pub async fn generate_tokens_for(
        &self,
        user: UserInfo,
    ) -> Result<IssuedTokens, AuthManagerError> {
        let _lock = self.locks.acquire(&user.id).await;
        let mut user = self.load_or_create(user).await?;

        let tokens = user
            .generate_new_tokens(&self.signer)
            .inspect_err(record_rejection)?;
        self.save(&user).await?;

        Ok(tokens)
    }

    /// Same as [`Self::generate_tokens_for`], with an ID token carrying `identity`.
    #[tracing::instrument(
        name = "AuthManager::generate_tokens_with_identity",
        skip(self, identity)
    )]
    pub async fn generate_tokens_with_identity(
        &self,
        user: UserInfo,
        identity: IdentityClaims,
    ) -> Result<IssuedTokens, AuthManagerError> {
        let _lock = self.locks.acquire(&user.id).await;
        let mut user = self.load_or_create(user).await?;

        let tokens = user
            .generate_new_tokens_with_identity(&self.signer, &identity)
            .inspect_err(record_rejection)?;
        self.save(&user).await?;

        Ok(tokens)
    }

    /// Register a new client. The returned info is the only place its secret is revealed.
    #[tracing::instrument(name = "AuthManager::generate_client", skip(self))]
    pub async fn generate_client(
        &self,
        user: UserInfo,
        client_info: ClientInfo,
    ) -> Result<ClientBasicInfo, AuthManagerError> {
        let _lock = self.locks.acquire(&user.id).await;
        let mut user = self.load_or_create(user).await?;

        let client = user.generate_new_client(client_info);
        self.save(&user).await?;

        tracing::info!(client_id = %client.id, "Client registered");
        Ok(client)
    }

    /// Clients registered by the user; empty for an unknown user.
    #[tracing::instrument(name = "AuthManager::clients_of", skip(self))]
    pub async fn clients_of(
        &self,
        user_id: &str,
    ) -> Result<Vec<ClientBasicInfo>, AuthManagerError> {
        let user = self.find_by_id(user_id).await?;

        Ok(user.map(|user| user.clients()).unwrap_or_default())
    }

    /// Start an authorization-code grant and return the URL to send the end user to.
    #[tracing::instrument(
        name = "AuthManager::generate_client_redirect_url",
        skip(self, request),
        fields(client_id = %request.client_id)
    )]
    pub async fn generate_client_redirect_url(
        &self,
        user: UserInfo,
        request: RedirectUrlRequest,
    ) -> Result<String, AuthManagerError> {
        let _lock = self.locks.acquire(&user.id).await;
        let mut user = self.load_or_create(user).await?;

        let redirect_url = user
            .generate_redirect_url_for(request)
            .inspect_err(record_rejection)?;
        self.save(&user).await?;

        Ok(redirect_url)
    }

    /// Exchange an authorization code for a client token pair.
    #[tracing::instrument(
        name = "AuthManager::generate_client_tokens",
        skip(self, request),
        fields(client_id = %request.client_id)
    )]
    pub async fn generate_client_tokens(
        &self,
        user: UserInfo,
        request: ClientTokensRequest,
    ) -> Result<IssuedTokens, AuthManagerError> {
        let _lock = self.locks.acquire(&user.id).await;
        let mut user = self.load_or_create(user).await?;

        let tokens = user
            .generate_client_tokens(&self.signer, &request)
            .inspect_err(record_rejection)?;
        self.save(&user).await?;

        Ok(tokens)
    }

    /// Resolve a currently valid access token to its owner, and its client if any.
    #[tracing::instrument(name = "AuthManager::decode_token", skip_all)]
    pub async fn decode_token(
        &self,
        access_token: &str,
    ) -> Result<DecodedToken, AuthManagerError> {
        let user = self
            .user_repository
            .get_by_access_token(access_token)
            .await
            .inspect_err(record_repository_failure)?
            .filter(|user| user.have_valid_token(&self.signer, access_token))
            .ok_or_else(|| rejected(AuthenticationError::invalid_token()))?;

        Ok(DecodedToken {
            user: user.user_info(),
            client: user.client_who_has_access_token(access_token),
        })
    }

    /// Mint a new access token for the set owning `refresh_token`.
    #[tracing::instrument(name = "AuthManager::refresh_token", skip_all)]
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<IssuedTokens, AuthManagerError> {
        let owner = self
            .user_repository
            .get_by_refresh_token(refresh_token)
            .await
            .inspect_err(record_repository_failure)?
            .ok_or_else(|| rejected(AuthenticationError::invalid_refresh_token()))?;

        let _lock = self.locks.acquire(owner.id()).await;
        let mut user = self
            .find_by_id(owner.id())
            .await?
            .ok_or_else(|| rejected(AuthenticationError::invalid_refresh_token()))?;

        let tokens = user
            .refresh_token(&self.signer, refresh_token)
            .inspect_err(record_rejection)?;
        self.save(&user).await?;

        Ok(tokens)
    }

    /// Revoke the token set behind `access_token`, its refresh token included.
    #[tracing::instrument(name = "AuthManager::revoke_token", skip_all)]
    pub async fn revoke_token(&self, access_token: &str) -> Result<(), AuthManagerError> {
        let owner = self
            .user_repository
            .get_by_access_token(access_token)
            .await
            .inspect_err(record_repository_failure)?
            .ok_or_else(|| rejected(AuthenticationError::invalid_token()))?;

        let _lock = self.locks.acquire(owner.id()).await;
        let mut user = self
            .find_by_id(owner.id())
            .await?
            .ok_or_else(|| rejected(AuthenticationError::invalid_token()))?;

        user.revoke_token(&self.signer, access_token)
            .inspect_err(record_rejection)?;
        self.save(&user).await?;

        tracing::info!(user_id = %user.id(), "Token revoked");
        Ok(())
    }

    async fn load_or_create(&self, info: UserInfo) -> Result<User, AuthManagerError> {
        match self.find_by_id(&info.id).await? {
            Some(user) => Ok(user),
            None => {
                tracing::debug!(user_id = %info.id, "Creating user on first use");
                Ok(User::create(info))
            }
        }
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, AuthManagerError> {
        let user = self
            .user_repository
            .get_by_id(user_id)
            .await
            .inspect_err(record_repository_failure)?;

        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<(), AuthManagerError> {
        self.user_repository
            .save(user)
            .await
            .inspect_err(record_repository_failure)?;

        Ok(())
    }
}

fn rejected(error: AuthenticationError) -> AuthenticationError {
    record_rejection(&error);
    error
}

fn record_rejection(error: &AuthenticationError) {
    tracing::warn!(reason = error.reason(), "Authentication rejected");
}

fn record_repository_failure(error: &UserRepositoryError) {
    tracing::error!(error = %error, "User repository failure");
}
