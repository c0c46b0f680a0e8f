#![allow(dead_code)]

use fake::{
    Fake,
    faker::{internet::en::DomainSuffix, lorem::en::Word},
};
use keyward::{
    ClientBasicInfo, ClientInfo, InMemoryAuthManager, IssuedTokens, RedirectUrlRequest, Secret,
    TokenSigner, UserInfo, in_memory_auth_manager,
};
use url::Url;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn signer() -> TokenSigner {
    TokenSigner::new(&Secret::new(TEST_SECRET.to_owned()))
}

pub fn manager() -> InMemoryAuthManager {
    in_memory_auth_manager(signer())
}

pub fn a_user() -> UserInfo {
    UserInfo {
        id: Uuid::new_v4().to_string(),
        role: Word().fake(),
    }
}

pub fn a_client() -> ClientInfo {
    let host: String = Word().fake();
    let suffix: String = DomainSuffix().fake();

    ClientInfo {
        label: Word().fake(),
        redirect_url: format!("https://{host}.{suffix}/oauth/callback"),
    }
}

/// Query parameter `name` of a redirect URL returned by the manager.
pub fn query_param(redirect_url: &str, name: &str) -> Option<String> {
    Url::parse(redirect_url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Register a client for `user` and start a grant with `scope`, returning the client and the
/// issued authorization code.
pub async fn authorize_client(
    manager: &InMemoryAuthManager,
    user: &UserInfo,
    scope: Vec<String>,
) -> (ClientBasicInfo, String) {
    let client = manager
        .generate_client(user.clone(), a_client())
        .await
        .unwrap();

    let redirect_url = manager
        .generate_client_redirect_url(
            user.clone(),
            RedirectUrlRequest {
                client_id: client.id.clone(),
                redirect_url: client.redirect_url.clone(),
                state: Word().fake(),
                scope,
            },
        )
        .await
        .unwrap();

    let code = query_param(&redirect_url, "code").unwrap();
    (client, code)
}

pub fn assert_distinct(first: &IssuedTokens, second: &IssuedTokens) {
    assert_ne!(first.access_token, second.access_token);
    assert_ne!(first.refresh_token, second.refresh_token);
}
