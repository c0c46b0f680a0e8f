use std::sync::OnceLock;

use keyward_core::TokenSigner;

use super::settings::AuthSettings;

static SIGNING_KEY: OnceLock<TokenSigner> = OnceLock::new();

/// Install the process-wide signer from `settings`.
///
/// Only the first call installs a key; later calls return the installed signer unchanged.
pub fn init_signing_key(settings: &AuthSettings) -> TokenSigner {
    SIGNING_KEY
        .get_or_init(|| {
            tracing::info!("Signing key installed");
            TokenSigner::new(&settings.jwt.secret)
        })
        .clone()
}

/// The signer installed by [`init_signing_key`], if any.
pub fn signing_key() -> Option<&'static TokenSigner> {
    SIGNING_KEY.get()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use config::Config;
    use secrecy::Secret;

    use super::*;

    fn settings(secret: &str) -> AuthSettings {
        let config = Config::builder()
            .set_override("jwt.secret", secret)
            .unwrap()
            .build()
            .unwrap();
        AuthSettings::from_config(config).unwrap()
    }

    #[test]
    fn test_first_key_wins() {
        let installed = init_signing_key(&settings("first-secret"));
        let again = init_signing_key(&settings("second-secret"));

        let token = installed
            .sign_expiring("user-1", Duration::hours(1))
            .unwrap();
        assert!(again.verify(&token).is_ok());
        assert!(signing_key().unwrap().verify(&token).is_ok());

        let expected = TokenSigner::new(&Secret::new("first-secret".to_owned()));
        assert!(expected.verify(&token).is_ok());
    }
}
