// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use serde::Deserialize;
use serde_json::Value;

/// Body of `GET /api/v3/datasets/{db}/{ticker}.json`.
#[derive(Debug, Deserialize)]
pub struct DatasetResponse {
    pub dataset: Dataset,
}

/// Only the fields the table is built from; the rest of the body is ignored.
#[derive(Debug, Deserialize)]
pub struct Dataset {
    pub column_names: Vec<String>,
    pub data: Vec<Vec<Value>>,
    #[serde(default)]
    pub name: Option<String>,
}
