//! Pipeline profiles
//!
//! The dashboard has shipped with two column layouts. Both run through the same
//! pipeline; a [`PipelineConfig`] says which columns are required, how net pay
//! is obtained, what gets grouped and what the chart is labelled.

use std::fmt;
use std::str::FromStr;

pub const NET_PAY: &str = "Net Pay";

/// Largest accepted upload, in bytes
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// How the `Net Pay` column comes into existence
#[derive(Clone, Debug, PartialEq)]
pub enum NetPayRule {
    /// The sheet already carries a `Net Pay` column
    Provided,
    /// `Net Pay = gross - taxes`, computed per row
    Derived { gross: String, taxes: String },
}

/// Which scalar figures to compute over the ungrouped table
#[derive(Clone, Debug, PartialEq)]
pub struct MetricsConfig {
    pub average_of: String,
    pub total_of: String,
    pub count_by: String,
    /// Build the "Pay Period" label from the pipeline's date column
    pub pay_period: bool,
}

/// Size and labels for the bar chart
#[derive(Clone, Debug, PartialEq)]
pub struct ChartConfig {
    pub title: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Shown in the page heading
    pub name: String,
    /// Multipart field carrying the workbook
    pub field_name: String,
    pub required_columns: Vec<String>,
    pub net_pay: NetPayRule,
    pub date_column: Option<String>,
    pub group_by: String,
    /// Columns summed per group, in display order
    pub sum_columns: Vec<String>,
    /// The summed column drawn as bars; must be one of `sum_columns`
    pub chart_column: String,
    pub chart: ChartConfig,
    pub metrics: Option<MetricsConfig>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl PipelineConfig {
    /// Net pay per department, read straight from the sheet
    pub fn department() -> Self {
        PipelineConfig {
            name: "Payroll Dashboard".to_string(),
            field_name: "payroll_file".to_string(),
            required_columns: strings(&["Department", NET_PAY]),
            net_pay: NetPayRule::Provided,
            date_column: None,
            group_by: "Department".to_string(),
            sum_columns: strings(&[NET_PAY]),
            chart_column: NET_PAY.to_string(),
            chart: ChartConfig {
                title: "Net Pay by Department".to_string(),
                y_label: "Total Net Pay".to_string(),
                ..ChartConfig::default()
            },
            metrics: None,
        }
    }

    /// Worker-type payroll with derived net pay and summary metrics
    pub fn worker() -> Self {
        PipelineConfig {
            name: "Payroll Analytics Dashboard".to_string(),
            field_name: "payroll".to_string(),
            required_columns: strings(&["Worker Type", "Gross Pay", "Taxes", "Pay Date"]),
            net_pay: NetPayRule::Derived {
                gross: "Gross Pay".to_string(),
                taxes: "Taxes".to_string(),
            },
            date_column: Some("Pay Date".to_string()),
            group_by: "Worker Type".to_string(),
            sum_columns: strings(&["Gross Pay", "Taxes", NET_PAY]),
            chart_column: NET_PAY.to_string(),
            chart: ChartConfig {
                title: "Net Pay by Worker Type".to_string(),
                y_label: "Total Net Pay".to_string(),
                ..ChartConfig::default()
            },
            metrics: Some(MetricsConfig {
                average_of: "Gross Pay".to_string(),
                total_of: "Taxes".to_string(),
                count_by: "Worker Type".to_string(),
                pay_period: true,
            }),
        }
    }

    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Department => PipelineConfig::department(),
            Profile::Worker => PipelineConfig::worker(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Chart".to_string(),
            y_label: "Total".to_string(),
            width: 800,
            height: 500,
        }
    }
}

/// Built-in profile names accepted on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Profile {
    Department,
    #[default]
    Worker,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "department" => Ok(Profile::Department),
            "worker" => Ok(Profile::Worker),
            other => Err(format!(
                "unknown profile '{}', expected 'worker' or 'department'",
                other
            )),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Department => write!(f, "department"),
            Profile::Worker => write!(f, "worker"),
        }
    }
}
