pub mod bootstrap;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use bootstrap::{InMemoryAuthManager, bootstrap, in_memory_auth_manager};
pub use self::config::{AuthSettings, JwtSettings, SettingsError, init_signing_key, signing_key};
pub use persistence::HashMapUserRepository;
pub use telemetry::{init_tracing, install_error_reporting};
