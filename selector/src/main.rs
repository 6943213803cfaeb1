use clap::Parser;
use selector::{
    AppState,
    bridge::CommandQueue,
    codec,
    config::{Args, SelectorConfig},
    create_router,
    session::Session,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "selector=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SelectorConfig::resolve(Args::parse())?;

    let mut session = Session::with_options(CommandQueue::new(), config.session);
    session.announce_default_route();
    if let Some(path) = &config.load {
        let parsed = codec::read_document_file(path)?;
        let ids = session.import_parsed(&parsed);
        tracing::info!("loaded {} route(s) from {}", ids.len(), path.display());
    }

    let state = AppState::new(session, config.export_path.clone())
        .with_allowed_origins(config.allowed_origins.clone());
    let app = create_router(state);

    tracing::info!("starting route selector on http://{}", config.bind);
    tracing::info!("  POST /api/events - map surface notifications");
    tracing::info!("  GET /api/commands - pending map commands");
    tracing::info!("  GET /api/export - canonical YAML ({} on save)", config.export_path.display());
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
