// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Local stand-in for the upstream dataset API.

use axum::http::{StatusCode, Uri};
use axum::Router;
use std::sync::{Arc, Mutex};

pub const DATASET_BODY: &str = r#"{
    "dataset": {
        "dataset_code": "AAPL",
        "database_code": "WIKI",
        "name": "Apple Inc (AAPL) Prices, Dividends, Splits and Trading Volume",
        "column_names": ["Date", "Open", "High", "Low", "Close", "Volume", "Adj. Close"],
        "data": [
            ["2018-03-27", 173.68, 175.15, 166.92, 168.34, 38962839.0, 168.34],
            ["2018-03-26", 168.07, 173.10, 166.44, 172.77, 36272617.0, 172.77],
            ["2018-03-23", 168.39, 169.92, 164.94, 164.94, 40248954.0, 164.94]
        ]
    }
}"#;

pub struct FakeUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeUpstream {
    /// Path and query of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serves `body` with `status` for any path on an ephemeral port.
pub async fn spawn_upstream(status: StatusCode, body: &'static str) -> FakeUpstream {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    let app = Router::new().fallback(move |uri: Uri| {
        let seen = seen.clone();
        async move {
            seen.lock().unwrap().push(uri.to_string());
            (status, body)
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeUpstream {
        base_url: format!("http://{}/api/v3/datasets/WIKI", addr),
        requests,
    }
}
