//! Escrow Admin Service Binary
//!
//! Wires the in-memory reference store, the console SMS transport and the
//! static token resolver into the admin API and serves it over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use safetrade_escrow::{
    config::EscrowConfig, router, AdminApi, AuthorizationGate, ConsoleTransport, EscrowStore,
    EscrowWorkflow, InMemoryStore, NotificationDispatcher, QueryService, StaticTokenResolver,
    ESCROW_VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Safetrade escrow admin service v{}", ESCROW_VERSION);

    // Load configuration
    let config = EscrowConfig::load()?;
    info!(
        host = %config.host,
        port = config.port,
        enforce_step_order = config.enforce_step_order,
        "Loaded configuration"
    );
    if config.admin_tokens.is_empty() {
        warn!("No admin tokens configured; every request will be rejected");
    }

    // Wire components
    let store: Arc<dyn EscrowStore> = Arc::new(InMemoryStore::new());
    let transport = Arc::new(ConsoleTransport);
    let dispatcher = Arc::new(NotificationDispatcher::new(store.clone(), transport));

    let workflow = EscrowWorkflow::new(store.clone(), dispatcher)
        .with_step_order(config.enforce_step_order);
    let queries = QueryService::new(store.clone());
    let gate = AuthorizationGate::new(Arc::new(StaticTokenResolver::from_admin_tokens(
        &config.admin_tokens,
    )));

    let api = Arc::new(AdminApi::new(
        gate,
        workflow,
        queries,
        config.default_list_limit,
    ));
    let app = router(api);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Escrow admin API listening on {}", addr);

    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Shutting down escrow admin service");
    Ok(())
}
