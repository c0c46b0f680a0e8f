pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    authentication_error::AuthenticationError,
    authorization_code::AuthorizationCode,
    client::{
        Client, ClientBasicInfo, ClientGrant, ClientInfo, ClientTokensRequest, RedirectUrlRequest,
    },
    token_signer::{IdentityClaims, IdentityTokenClaims, TokenClaims, TokenError, TokenSigner},
    tokens_set::{IssuedTokens, TokensSet},
    user::{User, UserInfo},
};

pub use ports::repositories::{UserRepository, UserRepositoryError};
