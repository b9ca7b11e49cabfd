//! Liveness endpoint for uptime monitors.

use axum::{routing::get, Router};

pub async fn serve(port: u16) {
    let app = Router::new()
        .route("/", get(|| async { "Bot is running!" }))
        .route("/health", get(|| async { "OK" }));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!(%addr, "health endpoint listening");
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!(error = %err, "health endpoint failed");
            }
        }
        Err(err) => tracing::error!(error = %err, "health endpoint bind failed"),
    }
}
