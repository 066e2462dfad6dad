#![allow(dead_code)]

use std::sync::Arc;

use relay_server::http::{AppState, OriginPolicy, build_router};
use shared::conversation::ConversationService;
use shared::llm::{Preamble, agency_preamble};
use shared::sessions::{SessionPolicy, SessionStore};

use super::ALLOWED_ORIGIN;
use super::completion::ScriptedCompletionClient;

pub struct TestRelayApp {
    pub router: axum::Router,
    pub client: Arc<ScriptedCompletionClient>,
    pub sessions: SessionStore,
    pub preamble: Preamble,
}

pub fn build_test_app(client: Arc<ScriptedCompletionClient>) -> TestRelayApp {
    build_test_app_with_policy(client, SessionPolicy::unbounded())
}

pub fn build_test_app_with_policy(
    client: Arc<ScriptedCompletionClient>,
    policy: SessionPolicy,
) -> TestRelayApp {
    let sessions = SessionStore::new(policy);
    let preamble = agency_preamble();
    let state = AppState {
        conversations: ConversationService::new(
            sessions.clone(),
            preamble.clone(),
            client.clone(),
        ),
        origins: OriginPolicy::new(&[ALLOWED_ORIGIN.to_string()]),
    };

    TestRelayApp {
        router: build_router(state),
        client,
        sessions,
        preamble,
    }
}
