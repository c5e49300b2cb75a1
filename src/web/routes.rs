// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use std::sync::Arc;

use super::AppState;
use crate::api::{normalize_ticker, FetchError};
use crate::viz::{render_chart, RenderError};

pub const INVALID_TICKER_MSG: &str = "Sorry, that ticker isn't valid. Please try again.";

#[derive(Debug, Deserialize)]
pub struct ChartRequest {
    /// Ticker symbol.
    pub stock: String,
    /// Column to plot.
    pub feature: String,
}

fn html(status: StatusCode, page: tera::Result<String>) -> Response {
    match page {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn root() -> Redirect {
    Redirect::to("/index")
}

pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    html(StatusCode::OK, state.templates.index_page(None))
}

pub async fn result_page(
    State(state): State<Arc<AppState>>,
    Form(req): Form<ChartRequest>,
) -> Response {
    tracing::info!(ticker = %req.stock, feature = %req.feature, "Chart requested");
    let templates = &state.templates;

    let table = match state.client.fetch(&req.stock, state.lookback_days).await {
        Ok(table) => table,
        Err(FetchError::NotFound { .. }) => {
            return html(StatusCode::OK, templates.index_page(Some(INVALID_TICKER_MSG)));
        }
        Err(e) => {
            let msg = format!(
                "Could not load data for {}. Please try again later.",
                e.ticker()
            );
            return html(StatusCode::BAD_GATEWAY, templates.index_page(Some(&msg)));
        }
    };

    let ticker = normalize_ticker(&req.stock);
    match render_chart(&table, &req.feature, &ticker) {
        Ok(fragment) => html(
            StatusCode::OK,
            templates.plot_page(&ticker, table.name(), &fragment),
        ),
        Err(RenderError::UnknownColumn { column, available }) => {
            let msg = format!(
                "Sorry, {} is not available for {}. Choose one of: {}.",
                column,
                ticker,
                available.join(", ")
            );
            html(
                StatusCode::UNPROCESSABLE_ENTITY,
                templates.index_page(Some(&msg)),
            )
        }
        Err(RenderError::NoData { column }) => {
            let msg = format!(
                "No {} data for {} in the last {} days.",
                column, ticker, state.lookback_days
            );
            html(StatusCode::OK, templates.index_page(Some(&msg)))
        }
        Err(e @ RenderError::Draw(_)) => {
            tracing::error!(ticker = %ticker, "Rendering failed: {}", e);
            html(
                StatusCode::INTERNAL_SERVER_ERROR,
                templates.index_page(Some("Sorry, the chart could not be drawn.")),
            )
        }
    }
}
