// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Context;
use chrono::{Days, Local, NaiveDate};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

use crate::credential::ApiKey;
use crate::models::{parse_dataset, ParseError, TimeSeriesTable};

#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-OK status. Unknown tickers land here.
    #[error("no data for ticker {ticker} (upstream status {status})")]
    NotFound { ticker: String, status: u16 },

    #[error("request for ticker {ticker} failed: {source}")]
    Transport {
        ticker: String,
        source: reqwest::Error,
    },

    #[error("unusable response for ticker {ticker}: {source}")]
    Malformed { ticker: String, source: ParseError },
}

impl FetchError {
    pub fn ticker(&self) -> &str {
        match self {
            FetchError::NotFound { ticker, .. }
            | FetchError::Transport { ticker, .. }
            | FetchError::Malformed { ticker, .. } => ticker,
        }
    }
}

/// Inclusive calendar window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `lookback_days` is bounded by the config loader; past the calendar's
    /// range the start saturates to its first day.
    pub fn ending_on(end: NaiveDate, lookback_days: u64) -> Self {
        let start = end
            .checked_sub_days(Days::new(lookback_days))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn ending_today(lookback_days: u64) -> Self {
        Self::ending_on(Local::now().date_naive(), lookback_days)
    }

    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// Upstream tickers are uppercase only.
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

#[derive(Clone)]
pub struct QuandlClient {
    client: Client,
    base_url: Url,
    api_key: ApiKey,
}

impl QuandlClient {
    pub fn new(base_url: &str, api_key: ApiKey) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid dataset base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Dataset base URL cannot take a path: {}", base_url);
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
        })
    }

    /// `{base}/{TICKER}.json?start_date=..&end_date=..&api_key=..`
    pub fn dataset_url(&self, ticker: &str, range: &DateRange) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&format!("{}.json", normalize_ticker(ticker)));
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("start_date", &range.start_param())
            .append_pair("end_date", &range.end_param())
            .append_pair("api_key", self.api_key.as_str());
        url
    }

    /// Fetches the last `lookback_days` days for `ticker`.
    pub async fn fetch(
        &self,
        ticker: &str,
        lookback_days: u64,
    ) -> Result<TimeSeriesTable, FetchError> {
        self.fetch_range(ticker, &DateRange::ending_today(lookback_days))
            .await
    }

    /// One GET, no retry.
    pub async fn fetch_range(
        &self,
        ticker: &str,
        range: &DateRange,
    ) -> Result<TimeSeriesTable, FetchError> {
        let ticker = normalize_ticker(ticker);
        let url = self.dataset_url(&ticker, range);

        tracing::info!(
            ticker = %ticker,
            start = %range.start,
            end = %range.end,
            "Fetching daily prices"
        );

        let result = self.request(&ticker, url).await;
        if let Err(e) = &result {
            tracing::warn!(ticker = %ticker, "Fetching failed: {}", e);
        }
        result
    }

    async fn request(&self, ticker: &str, url: Url) -> Result<TimeSeriesTable, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            ticker: ticker.to_string(),
            // The URL carries the API key.
            source: e.without_url(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::NotFound {
                ticker: ticker.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(transport)?;

        let table = parse_dataset(&text).map_err(|source| FetchError::Malformed {
            ticker: ticker.to_string(),
            source,
        })?;

        if table.is_empty() {
            tracing::info!(ticker = %ticker, "Upstream returned no rows for the window");
        } else {
            tracing::debug!(
                ticker = %ticker,
                rows = table.len(),
                latest = ?table.dates().first(),
                "Parsed dataset"
            );
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_upstream, DATASET_BODY};
    use axum::http::StatusCode as UpstreamStatus;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn client(base_url: &str) -> QuandlClient {
        QuandlClient::new(base_url, ApiKey::new("test-key")).unwrap()
    }

    #[test]
    fn test_date_range_spans_lookback() {
        let range = DateRange::ending_on(date("2018-03-27"), 30);
        assert_eq!(range.end - range.start, chrono::Duration::days(30));
        assert_eq!(range.start_param(), "2018-02-25");
        assert_eq!(range.end_param(), "2018-03-27");

        // Crosses a leap day.
        let range = DateRange::ending_on(date("2024-03-10"), 30);
        assert_eq!(range.start_param(), "2024-02-09");

        let range = DateRange::ending_today(30);
        assert_eq!((range.end - range.start).num_days(), 30);
        assert!(NaiveDate::parse_from_str(&range.start_param(), "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_dataset_url() {
        let client = client("https://www.quandl.com/api/v3/datasets/WIKI");
        let range = DateRange::ending_on(date("2018-03-27"), 30);

        let url = client.dataset_url("aapl", &range);
        assert_eq!(
            url.as_str(),
            "https://www.quandl.com/api/v3/datasets/WIKI/AAPL.json?start_date=2018-02-25&end_date=2018-03-27&api_key=test-key"
        );
    }

    #[test]
    fn test_dataset_url_ignores_ticker_case() {
        let client = client("https://www.quandl.com/api/v3/datasets/WIKI/");
        let range = DateRange::ending_on(date("2018-03-27"), 30);

        for ticker in ["aapl", "AaPl", "brk.b", "msft ", "googl"] {
            assert_eq!(
                client.dataset_url(ticker, &range),
                client.dataset_url(&ticker.to_uppercase(), &range)
            );
        }
    }

    #[test]
    fn test_dataset_url_keeps_ticker_in_one_segment() {
        let client = client("https://www.quandl.com/api/v3/datasets/WIKI");
        let range = DateRange::ending_on(date("2018-03-27"), 30);

        let url = client.dataset_url("a/b?c", &range);
        assert!(url.path().ends_with("/WIKI/A%2FB%3FC.json"));
        assert_eq!(url.query_pairs().count(), 3);
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(QuandlClient::new("not a url", ApiKey::new("k")).is_err());
        assert!(QuandlClient::new("mailto:someone@example.com", ApiKey::new("k")).is_err());
    }

    #[tokio::test]
    async fn test_fetch_ok_builds_table() {
        let upstream = spawn_upstream(UpstreamStatus::OK, DATASET_BODY).await;
        let client = client(&upstream.base_url);
        let range = DateRange::ending_on(date("2018-03-27"), 30);

        let table = client.fetch_range("aapl", &range).await.unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.dates(),
            &[date("2018-03-27"), date("2018-03-26"), date("2018-03-23")]
        );

        let requests = upstream.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0],
            "/api/v3/datasets/WIKI/AAPL.json?start_date=2018-02-25&end_date=2018-03-27&api_key=test-key"
        );
    }

    #[tokio::test]
    async fn test_fetch_non_ok_is_not_found() {
        let upstream = spawn_upstream(UpstreamStatus::NOT_FOUND, "{}").await;
        let client = client(&upstream.base_url);

        let err = client.fetch("zzzinvalid", 30).await.unwrap_err();
        match err {
            FetchError::NotFound { ticker, status } => {
                assert_eq!(ticker, "ZZZINVALID");
                assert_eq!(status, 404);
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert_eq!(upstream.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_rate_limited_is_not_found() {
        let upstream = spawn_upstream(UpstreamStatus::TOO_MANY_REQUESTS, "{}").await;
        let client = client(&upstream.base_url);

        let err = client.fetch("aapl", 30).await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound { status: 429, .. }));
        assert_eq!(err.ticker(), "AAPL");
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let upstream = spawn_upstream(UpstreamStatus::OK, "<html>maintenance</html>").await;
        let client = client(&upstream.base_url);

        let err = client.fetch("aapl", 30).await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_fetch_transport_error_hides_key() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(&format!("http://{}/api/v3/datasets/WIKI", addr));
        let err = client.fetch("aapl", 30).await.unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(!err.to_string().contains("test-key"));
    }
}
