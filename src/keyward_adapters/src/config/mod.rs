pub mod constants;
pub mod settings;
pub mod signing;

pub use constants::*;
pub use settings::{AuthSettings, JwtSettings, SettingsError};
pub use signing::{init_signing_key, signing_key};
