// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context as _, Result};
use tera::{Context, Tera};

use crate::viz::ChartFragment;

/// Columns offered on the form. Any other column of the dataset is accepted too.
pub const FEATURES: [&str; 7] = [
    "Close",
    "Adj. Close",
    "Open",
    "Adj. Open",
    "High",
    "Low",
    "Volume",
];

const BASE: &str = "base.html.tera";
const INDEX: &str = "index.html.tera";
const PLOT: &str = "plot.html.tera";

/// Page templates, compiled into the binary and parsed once at startup.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html.tera"]);
        tera.add_raw_templates(vec![
            (BASE, include_str!("../../templates/base.html.tera")),
            (INDEX, include_str!("../../templates/index.html.tera")),
            (PLOT, include_str!("../../templates/plot.html.tera")),
        ])
        .context("Failed to load page templates")?;
        Ok(Self { tera })
    }

    /// The ticker form, with an optional message above it.
    pub fn index_page(&self, msg: Option<&str>) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("msg", &msg);
        context.insert("features", &FEATURES);
        self.tera.render(INDEX, &context)
    }

    /// Results page embedding one chart.
    pub fn plot_page(
        &self,
        ticker: &str,
        dataset_name: Option<&str>,
        fragment: &ChartFragment,
    ) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("ticker", ticker);
        context.insert("dataset_name", &dataset_name);
        context.insert("div", &fragment.div);
        context.insert("script", &fragment.script);
        self.tera.render(PLOT, &context)
    }
}
