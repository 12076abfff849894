//! Webhook server entry point.

use std::sync::Arc;

use agent_tools::{sales_registry, SerpApi, SupabaseKnowledgeBase};
use azure_brain::AzureBrain;
use database::Database;
use instagram_client::{Delivery, GraphClient, SignatureVerifier};
use orchestrator::{Agent, LeadProfileStore};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use webhook_server::{app, AppState, Config};

/// Initialize logging.
///
/// `RUST_LOG` wins over `LOG_LEVEL`; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Starting webhook server (env: {}, addr: {})",
        config.environment, config.addr
    );

    // Lead profiles
    let db = Database::connect(&config.database_url).await?;
    if config.migrate {
        db.migrate().await?;
    }
    let profiles = LeadProfileStore::with_database(db.clone());

    // Tools and brain
    let knowledge = Arc::new(SupabaseKnowledgeBase::new(
        config.embeddings.clone(),
        config.supabase.clone(),
    )?);
    let search = Arc::new(SerpApi::new(config.serpapi.clone())?);
    let tools = sales_registry(knowledge, search, config.retrieval_top_k);
    let brain = AzureBrain::new(config.azure.clone())?;

    let agent = Arc::new(Agent::new(
        Arc::new(brain),
        Arc::new(tools),
        profiles,
        config.agent.clone(),
    ));

    // Platform
    let graph = Arc::new(GraphClient::new(config.graph.clone())?);
    let delivery = Delivery::new(graph.clone(), config.retry.clone());
    if config.unsigned_allowed() {
        warn!("Unsigned webhooks are accepted");
    }
    let verifier = SignatureVerifier::new(&config.app_secret).allow_unsigned(config.unsigned_allowed());

    let state = AppState::new(
        agent,
        delivery,
        graph,
        verifier,
        &config.verify_token,
        &config.environment,
    );

    info!("Webhook server listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
