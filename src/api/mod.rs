// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

pub mod quandl_client;

pub use quandl_client::{normalize_ticker, FetchError, QuandlClient};
