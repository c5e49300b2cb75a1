// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

mod api;
mod config;
mod credential;
mod models;
mod viz;
mod web;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::QuandlClient;
use crate::config::Config;
use crate::web::{AppState, Templates};

#[derive(Parser, Debug)]
#[command(name = "ticker-chart", version, about = "Chart recent daily prices for a stock ticker")]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticker_chart=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // No key, no server.
    let api_key = credential::read_api_key(&config.quandl.api_key_file)?;
    let client = QuandlClient::new(&config.quandl.base_url, api_key)?;
    let templates = Templates::new()?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    web::serve(
        addr,
        AppState {
            client,
            lookback_days: config.quandl.lookback_days,
            templates,
        },
    )
    .await
}
