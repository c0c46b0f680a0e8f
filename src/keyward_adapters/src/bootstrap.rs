use color_eyre::eyre::Result;
use keyward_application::AuthManager;
use keyward_core::TokenSigner;

use crate::{
    config::{AuthSettings, init_signing_key},
    persistence::HashMapUserRepository,
};

pub type InMemoryAuthManager = AuthManager<HashMapUserRepository>;

pub fn in_memory_auth_manager(signer: TokenSigner) -> InMemoryAuthManager {
    AuthManager::new(HashMapUserRepository::new(), signer)
}

/// Load settings, install the process-wide signing key and build an in-memory manager.
pub fn bootstrap() -> Result<InMemoryAuthManager> {
    let settings = AuthSettings::load()?;
    let signer = init_signing_key(&settings);

    Ok(in_memory_auth_manager(signer))
}
