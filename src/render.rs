#![cfg(feature = "web")]
//! HTML page rendering
//!
//! The page is one handlebars template. The renderer only substitutes values;
//! every figure it shows was computed by the pipeline beforehand.

use crate::config::PipelineConfig;
use crate::error::{DashboardError, Result};
use crate::metrics::Metrics;
use crate::pipeline::Analysis;
use crate::transform::Aggregation;
use handlebars::{Handlebars, html_escape};
use serde::Serialize;
use std::path::Path;

const TEMPLATE_NAME: &str = "dashboard";
const TEMPLATE_SOURCE: &str = include_str!("../templates/dashboard.hbs");

/// Values for one page, before formatting
#[derive(Clone, Debug, Default)]
pub struct PageContent {
    pub error: Option<String>,
    pub summary_table: Option<String>,
    pub chart_uri: Option<String>,
    pub metrics: Option<Metrics>,
}

impl PageContent {
    /// The upload form with empty metrics, as served on GET
    pub fn initial(config: &PipelineConfig) -> Self {
        PageContent {
            metrics: config.metrics.as_ref().map(Metrics::empty),
            ..PageContent::default()
        }
    }

    /// Only the error message; no partial results are shown
    pub fn failed(error: &DashboardError) -> Self {
        PageContent {
            error: Some(error.to_string()),
            ..PageContent::default()
        }
    }

    pub fn analyzed(analysis: &Analysis) -> Self {
        PageContent {
            error: None,
            summary_table: Some(summary_table_html(&analysis.summary.aggregation)),
            chart_uri: Some(analysis.chart.data_uri()),
            metrics: analysis.summary.metrics.clone(),
        }
    }
}

#[derive(Serialize)]
struct CountView {
    name: String,
    count: usize,
}

#[derive(Serialize)]
struct MetricsView {
    average_label: String,
    average: String,
    total_label: String,
    total: String,
    count_label: String,
    counts: Vec<CountView>,
    pay_period: Option<String>,
}

impl From<&Metrics> for MetricsView {
    fn from(metrics: &Metrics) -> Self {
        MetricsView {
            average_label: metrics.average_label.clone(),
            average: format!("{:.2}", metrics.average),
            total_label: metrics.total_label.clone(),
            total: format!("{:.2}", metrics.total),
            count_label: metrics.count_label.clone(),
            counts: metrics
                .counts
                .iter()
                .map(|(name, count)| CountView {
                    name: name.clone(),
                    count: *count,
                })
                .collect(),
            pay_period: metrics.pay_period.clone(),
        }
    }
}

#[derive(Serialize)]
struct PageView<'a> {
    title: &'a str,
    field_name: &'a str,
    error: Option<&'a str>,
    summary_table: Option<&'a str>,
    chart_uri: Option<&'a str>,
    metrics: Option<MetricsView>,
}

/// Render an aggregation as an HTML table, one row per group
pub fn summary_table_html(aggregation: &Aggregation) -> String {
    let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr>\n");
    html.push_str(&format!("      <th>{}</th>\n", html_escape(&aggregation.key_column)));
    for column in &aggregation.value_columns {
        html.push_str(&format!("      <th>{}</th>\n", html_escape(column)));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for (key, sums) in &aggregation.rows {
        html.push_str("    <tr>\n");
        html.push_str(&format!("      <td>{}</td>\n", html_escape(key)));
        for sum in sums {
            html.push_str(&format!("      <td class=\"number\">{:.2}</td>\n", sum));
        }
        html.push_str("    </tr>\n");
    }

    html.push_str("  </tbody>\n</table>");
    html
}

/// Compiled page template plus the profile it renders for
pub struct PageRenderer {
    registry: Handlebars<'static>,
    title: String,
    field_name: String,
}

impl PageRenderer {
    /// Use the template compiled into the binary
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string(TEMPLATE_NAME, TEMPLATE_SOURCE)
            .map_err(|e| DashboardError::Template(e.to_string()))?;
        Ok(Self::with_registry(registry, config))
    }

    /// Read the template from `path` and re-read it on every render
    ///
    /// Falls back to the embedded template when `path` does not exist, e.g. when
    /// the binary runs outside the source tree.
    pub fn with_reload(config: &PipelineConfig, path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!(
                "template {} not found, reload disabled",
                path.display()
            );
            return Self::new(config);
        }

        let mut registry = Handlebars::new();
        registry.set_dev_mode(true);
        registry
            .register_template_file(TEMPLATE_NAME, path)
            .map_err(|e| DashboardError::Template(e.to_string()))?;
        log::info!("reloading template from {}", path.display());
        Ok(Self::with_registry(registry, config))
    }

    fn with_registry(registry: Handlebars<'static>, config: &PipelineConfig) -> Self {
        PageRenderer {
            registry,
            title: config.name.clone(),
            field_name: config.field_name.clone(),
        }
    }

    pub fn render(&self, content: &PageContent) -> Result<String> {
        let view = PageView {
            title: &self.title,
            field_name: &self.field_name,
            error: content.error.as_deref(),
            summary_table: content.summary_table.as_deref(),
            chart_uri: content.chart_uri.as_deref(),
            metrics: content.metrics.as_ref().map(MetricsView::from),
        };
        self.registry
            .render(TEMPLATE_NAME, &view)
            .map_err(|e| DashboardError::Template(e.to_string()))
    }

    /// Render, or fall back to a bare page carrying the escaped error text
    pub fn render_or_fallback(&self, content: &PageContent) -> String {
        match self.render(content) {
            Ok(html) => html,
            Err(e) => {
                log::error!("{}", e);
                format!(
                    "<!DOCTYPE html>\n<html><body><p class=\"error\">{}</p></body></html>",
                    html_escape(&e.to_string())
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregation() -> Aggregation {
        Aggregation {
            key_column: "Department".to_string(),
            value_columns: vec!["Net Pay".to_string()],
            rows: vec![
                ("R&D".to_string(), vec![1200.0]),
                ("Sales".to_string(), vec![850.5]),
            ],
        }
    }

    #[test]
    fn summary_table_escapes_keys_and_formats_sums() {
        let html = summary_table_html(&aggregation());
        assert!(html.contains("<th>Department</th>"));
        assert!(html.contains("<td>R&amp;D</td>"));
        assert!(html.contains("<td class=\"number\">850.50</td>"));
        assert_eq!(html.matches("<tr>").count(), 3);
    }

    #[test]
    fn initial_page_shows_zeroed_metrics() {
        let config = PipelineConfig::worker();
        let renderer = PageRenderer::new(&config).unwrap();
        let html = renderer.render(&PageContent::initial(&config)).unwrap();

        assert!(html.contains("name=\"payroll\""));
        assert!(html.contains("Average Gross Pay: 0.00"));
        assert!(html.contains("Total Taxes: 0.00"));
        assert!(!html.contains("Pay Period"));
        assert!(!html.contains("<table"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn error_page_has_no_results() {
        let config = PipelineConfig::department();
        let renderer = PageRenderer::new(&config).unwrap();
        let error = DashboardError::MissingColumns(vec!["Net Pay".into()]);
        let html = renderer.render(&PageContent::failed(&error)).unwrap();

        assert!(html.contains("Missing column(s): Net Pay"));
        assert!(!html.contains("Key Metrics"));
        assert!(!html.contains("<img"));
    }
}
