//! Error types for the payroll dashboard
//!
//! Every failure in the analysis pipeline ends up as one of these variants. The
//! request handler renders the `Display` text inline on the page, so the
//! messages are written for the person who uploaded the file.

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// No file in the form, or a filename without the `.xlsx` extension
    #[error("Please upload a valid spreadsheet file.")]
    MissingFile,

    /// The bytes are not a readable workbook
    #[error("Could not read the uploaded workbook: {0}")]
    Parse(String),

    /// Required columns absent from the header row
    #[error("Missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Header row present but nothing under it
    #[error("The uploaded sheet contains no payroll rows.")]
    EmptyTable,

    /// A numeric column holds something that is not a number
    #[error("Invalid number in column '{column}' at record {row}: '{value}'")]
    InvalidNumber {
        column: String,
        /// 1-based position among the data records
        row: usize,
        value: String,
    },

    /// A date column holds something that is not a date
    #[error("Invalid date in column '{column}' at record {row}: '{value}'")]
    InvalidDate {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Page rendering failed: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    /// True for errors caused by the uploaded content rather than the server
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            DashboardError::Chart(_) | DashboardError::Template(_) | DashboardError::Internal(_)
        )
    }
}

impl From<calamine::XlsxError> for DashboardError {
    fn from(err: calamine::XlsxError) -> Self {
        DashboardError::Parse(err.to_string())
    }
}
