use crate::config::MetricsConfig;
use crate::error::Result;
use crate::table::PayrollTable;
use crate::transform::{GroupKey, group_key, numeric_column};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Display format for the pay-period bounds, e.g. "Jan 01, 2024"
pub const PERIOD_DATE_FORMAT: &str = "%b %d, %Y";

/// Summary figures computed over the full, ungrouped table
#[derive(Clone, Debug, PartialEq)]
pub struct Metrics {
    pub average_label: String,
    pub average: f64,
    pub total_label: String,
    pub total: f64,
    pub count_label: String,
    /// `(category, records)` sorted by category
    pub counts: Vec<(String, usize)>,
    pub pay_period: Option<String>,
}

impl Metrics {
    /// What the form shows before anything is uploaded
    pub fn empty(config: &MetricsConfig) -> Self {
        Metrics {
            average_label: format!("Average {}", config.average_of),
            average: 0.0,
            total_label: format!("Total {}", config.total_of),
            total: 0.0,
            count_label: format!("{} Counts", config.count_by),
            counts: Vec::new(),
            pay_period: None,
        }
    }

    pub fn count_total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Round half away from zero to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn pay_period_label(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "Pay Period: {} \u{2013} {}",
        start.format(PERIOD_DATE_FORMAT),
        end.format(PERIOD_DATE_FORMAT)
    )
}

/// Compute every configured metric
///
/// `dates` is the already-parsed date column, if the pipeline has one. An empty
/// table yields the same values as [`Metrics::empty`].
pub fn compute(
    table: &PayrollTable,
    config: &MetricsConfig,
    dates: Option<&[NaiveDate]>,
) -> Result<Metrics> {
    let mut metrics = Metrics::empty(config);

    let averaged = numeric_column(table, &config.average_of)?;
    if !averaged.is_empty() {
        metrics.average = round2(averaged.iter().sum::<f64>() / averaged.len() as f64);
    }

    let totalled = numeric_column(table, &config.total_of)?;
    metrics.total = round2(totalled.iter().sum());

    let mut counts: BTreeMap<GroupKey, usize> = BTreeMap::new();
    if let Some(cells) = table.column(&config.count_by) {
        for cell in cells {
            *counts.entry(group_key(cell)).or_default() += 1;
        }
    }
    metrics.counts = counts
        .into_iter()
        .map(|(key, n)| (key.to_string(), n))
        .collect();

    if config.pay_period {
        if let Some(dates) = dates {
            let start = dates.iter().min();
            let end = dates.iter().max();
            if let (Some(start), Some(end)) = (start, end) {
                metrics.pay_period = Some(pay_period_label(*start, *end));
            }
        }
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round2(1500.0), 1500.0);
        assert_eq!(round2(1234.5678), 1234.57);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-1.006), -1.01);
    }

    #[test]
    fn counts_follow_numeric_key_order() {
        use crate::table::CellValue;

        let mut table = PayrollTable::new(vec!["Grade".into(), "Gross Pay".into(), "Taxes".into()]);
        for grade in [12.0, 3.0, 12.0, 7.0] {
            table.push_row(vec![
                CellValue::Number(grade),
                CellValue::Number(100.0),
                CellValue::Number(10.0),
            ]);
        }
        let config = MetricsConfig {
            average_of: "Gross Pay".into(),
            total_of: "Taxes".into(),
            count_by: "Grade".into(),
            pay_period: false,
        };

        let metrics = compute(&table, &config, None).unwrap();
        assert_eq!(
            metrics.counts,
            vec![("3".to_string(), 1), ("7".to_string(), 1), ("12".to_string(), 2)]
        );
        assert_eq!(metrics.count_total(), 4);
    }

    #[test]
    fn period_label_uses_en_dash() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            pay_period_label(start, end),
            "Pay Period: Jan 01, 2024 \u{2013} Jan 15, 2024"
        );
    }
}
