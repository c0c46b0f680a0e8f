pub mod env {
    pub const ENV_PREFIX: &str = "KEYWARD";
    pub const ENV_SEPARATOR: &str = "__";
    pub const JWT_SECRET_ENV_VAR: &str = "KEYWARD__JWT__SECRET";
}

/// Optional settings file, any format the `config` crate recognises by extension.
pub const CONFIG_FILE: &str = "config/keyward";

pub const DEFAULT_LOG_FILTER: &str = "info";
