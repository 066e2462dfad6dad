use std::net::SocketAddr;
use std::sync::Arc;

use relay_server::http::{self, AppState, OriginPolicy};
use shared::config::{RelayConfig, load_dotenv};
use shared::conversation::ConversationService;
use shared::llm::{GroqCompletionClient, agency_preamble};
use shared::sessions::SessionStore;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "relay_server=debug,shared=info,tower_http=info".to_string()),
        )
        .init();

    let config = match RelayConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "failed to read config");
            std::process::exit(1);
        }
    };

    let completion_client = match GroqCompletionClient::new(config.completion.clone()) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "failed to initialize completion client");
            std::process::exit(1);
        }
    };

    let sessions = SessionStore::new(config.session_policy());
    let _pruner = sessions.spawn_pruner(config.session_prune_interval());
    if config.session_max_history_messages == 0 {
        warn!("session history cap disabled; memory grows with every conversation turn");
    }

    info!(
        model = completion_client.model(),
        allowed_origins = ?config.allowed_origins,
        "completion client ready"
    );

    let app = http::build_router(AppState {
        conversations: ConversationService::new(
            sessions,
            agency_preamble(),
            Arc::new(completion_client),
        ),
        origins: OriginPolicy::new(&config.allowed_origins),
    });

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!(error = %err, bind_addr = %config.bind_addr, "invalid bind addr");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, bind_addr = %addr, "failed to bind relay listener");
            std::process::exit(1);
        }
    };

    info!(
        bind_addr = %listener.local_addr().unwrap_or(addr),
        "relay server listening"
    );

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %err, "relay server failed");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
