//! The analysis pipeline: load, validate, transform, aggregate, measure, chart.
//!
//! Each stage feeds the next and the first failure ends the run. Nothing here
//! keeps state between calls.

#[cfg(feature = "web")]
use crate::chart::{ChartImage, chart_aggregation};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::loader::load_workbook;
use crate::metrics::{self, Metrics};
use crate::table::PayrollTable;
use crate::transform::{Aggregation, apply_net_pay, group_sum, parse_dates};
use crate::validate::validate;

/// Everything computed from a table, short of the chart
#[derive(Clone, Debug)]
pub struct Summary {
    /// The uploaded table with derived columns applied
    pub table: PayrollTable,
    pub aggregation: Aggregation,
    pub metrics: Option<Metrics>,
}

/// Validate and summarize an already-loaded table
pub fn summarize(mut table: PayrollTable, config: &PipelineConfig) -> Result<Summary> {
    validate(&table, config)?;
    apply_net_pay(&mut table, &config.net_pay)?;

    let dates = match &config.date_column {
        Some(column) => Some(parse_dates(&table, column)?),
        None => None,
    };

    let aggregation = group_sum(&table, &config.group_by, &config.sum_columns)?;

    let metrics = match &config.metrics {
        Some(metrics_config) => Some(metrics::compute(&table, metrics_config, dates.as_deref())?),
        None => None,
    };

    Ok(Summary {
        table,
        aggregation,
        metrics,
    })
}

/// Load a workbook from bytes and summarize it
pub fn load_and_summarize(bytes: &[u8], config: &PipelineConfig) -> Result<Summary> {
    let table = load_workbook(bytes)?;
    summarize(table, config)
}

/// A finished analysis, ready to be put on the page
#[cfg(feature = "web")]
#[derive(Clone, Debug)]
pub struct Analysis {
    pub summary: Summary,
    pub chart: ChartImage,
}

/// Run the full pipeline over an uploaded workbook
#[cfg(feature = "web")]
pub fn analyze(bytes: &[u8], config: &PipelineConfig) -> Result<Analysis> {
    let summary = load_and_summarize(bytes, config)?;
    let chart = chart_aggregation(&summary.aggregation, &config.chart_column, &config.chart)?;

    log::info!(
        "analyzed {} rows into {} groups by '{}'",
        summary.table.len(),
        summary.aggregation.len(),
        config.group_by
    );
    Ok(Analysis { summary, chart })
}
