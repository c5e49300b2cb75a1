// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

mod routes;
mod templates;

pub use templates::Templates;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::QuandlClient;

/// Read-only state shared by all handlers.
pub struct AppState {
    pub client: QuandlClient,
    pub lookback_days: u64,
    pub templates: Templates,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/index", get(routes::index).post(routes::index))
        .route(
            "/resultpage",
            get(routes::root).post(routes::result_page),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        "ticker-chart v{} listening on http://{}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;
    Ok(())
}
