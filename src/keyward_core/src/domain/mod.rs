pub mod authentication_error;
pub mod authorization_code;
pub mod client;
pub mod token_signer;
pub mod tokens_set;
pub mod user;
