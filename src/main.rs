use std::sync::Arc;

use anyhow::Result;

use image_gen_rmcp::{
    AppState,
    config::AppConfig,
    mcp_server::ImageGenServer,
    telemetry,
    web_pages,
};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    telemetry::init_tracing(config.debug);

    let state = Arc::new(AppState::from_config(&config).await?);
    let state_for_service = state.clone();
    let service = StreamableHttpService::new(
        move || Ok(ImageGenServer::new(state_for_service.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let mcp_path = config.mcp_path();
    let router = axum::Router::new()
        .merge(web_pages::router(state, &config.route_prefix()))
        .nest_service(&mcp_path, service)
        .layer(TraceLayer::new_for_http());

    let bind_address = config.bind_address();
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(
        "Image generation MCP server started at http://{}{}",
        bind_address,
        mcp_path
    );

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
