#![allow(dead_code)]

use pictura_lib::domain::value_objects::Principal;
use pictura_lib::infrastructure::backend::InMemoryBackend;
use pictura_lib::infrastructure::identity::StaticIdentityProvider;
use pictura_lib::shared::config::ClientConfig;
use pictura_lib::AppState;
use std::sync::Arc;

pub fn principal(text: &str) -> Principal {
    Principal::from_text(text).expect("valid principal")
}

pub struct TestSession {
    pub state: AppState,
    pub identity: Arc<StaticIdentityProvider>,
}

/// 署名済みのセッションを共有バックエンド上に作る
pub fn signed_in_session(backend: &InMemoryBackend, id: &str) -> TestSession {
    session(backend, StaticIdentityProvider::signed_in(principal(id)))
}

pub fn signed_out_session(backend: &InMemoryBackend, id: &str) -> TestSession {
    session(backend, StaticIdentityProvider::signed_out(principal(id)))
}

fn session(backend: &InMemoryBackend, provider: StaticIdentityProvider) -> TestSession {
    let identity = Arc::new(provider);
    let state = AppState::in_memory(ClientConfig::default(), backend, identity.clone())
        .expect("default config is valid");
    TestSession { state, identity }
}
