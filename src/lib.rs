//! # Keyward - OAuth2-style token lifecycle library
//!
//! This is a facade crate that re-exports all public APIs from the keyward components.
//! Use this crate to get access to the whole token lifecycle in one place.
//!
//! ## Usage
//!
//! ```no_run
//! # async fn run() -> color_eyre::eyre::Result<()> {
//! let manager = keyward::bootstrap()?;
//! let tokens = manager
//!     .generate_tokens_for(keyward::UserInfo {
//!         id: "user-1".to_owned(),
//!         role: "admin".to_owned(),
//!     })
//!     .await?;
//! let _decoded = manager.decode_token(&tokens.access_token).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `User`, `Client`, `TokensSet`, `AuthorizationCode`, `TokenSigner`
//! - **Repository traits**: `UserRepository`
//! - **Application**: `AuthManager`
//! - **Adapters**: `HashMapUserRepository`, configuration and tracing setup

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use keyward_core::*;
}

// Re-export most commonly used core types at the root level
pub use keyward_core::{
    AuthenticationError, AuthorizationCode, Client, ClientBasicInfo, ClientGrant, ClientInfo,
    ClientTokensRequest, IdentityClaims, IssuedTokens, RedirectUrlRequest, TokenSigner,
    TokensSet, User, UserInfo,
};

// ============================================================================
// Repository Traits (Ports)
// ============================================================================

/// Repository trait definitions
pub mod repositories {
    pub use keyward_core::{UserRepository, UserRepositoryError};
}

// Re-export repository traits at root level
pub use repositories::{UserRepository, UserRepositoryError};

// ============================================================================
// Application Layer
// ============================================================================

/// Token lifecycle orchestration
pub mod application {
    pub use keyward_application::*;
}

pub use keyward_application::{AuthManager, AuthManagerError, DecodedToken};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Persistence implementations
    pub mod persistence {
        pub use keyward_adapters::persistence::*;
    }

    /// Configuration and signing key setup
    pub mod config {
        pub use keyward_adapters::config::*;
    }

    /// Tracing and error reporting setup
    pub mod telemetry {
        pub use keyward_adapters::telemetry::*;
    }
}

// Re-export commonly used adapters at root level
pub use keyward_adapters::{
    AuthSettings, HashMapUserRepository, InMemoryAuthManager, bootstrap, in_memory_auth_manager,
    init_signing_key, init_tracing, install_error_reporting, signing_key,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing repository traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};
