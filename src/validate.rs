use crate::config::PipelineConfig;
use crate::error::{DashboardError, Result};
use crate::table::PayrollTable;

/// Required columns the table lacks, in the order they were required
pub fn missing_columns(table: &PayrollTable, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !table.has_column(name))
        .cloned()
        .collect()
}

/// Check the table's shape before anything is computed from it
pub fn validate(table: &PayrollTable, config: &PipelineConfig) -> Result<()> {
    let missing = missing_columns(table, &config.required_columns);
    if !missing.is_empty() {
        log::debug!("upload rejected, missing columns: {:?}", missing);
        return Err(DashboardError::MissingColumns(missing));
    }
    if table.is_empty() {
        return Err(DashboardError::EmptyTable);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    fn table_with(columns: &[&str]) -> PayrollTable {
        let mut table = PayrollTable::new(columns.iter().map(|c| c.to_string()).collect());
        table.push_row(vec![CellValue::Number(1.0); columns.len()]);
        table
    }

    #[test]
    fn lists_every_missing_column_in_required_order() {
        let table = table_with(&["Gross Pay", "Worker Type"]);
        let err = validate(&table, &PipelineConfig::worker()).unwrap_err();
        assert_eq!(
            err,
            DashboardError::MissingColumns(vec!["Taxes".into(), "Pay Date".into()])
        );
        assert_eq!(err.to_string(), "Missing column(s): Taxes, Pay Date");
    }

    #[test]
    fn extra_columns_are_ignored() {
        let table = table_with(&["Employee Name", "Department", "Net Pay", "Notes"]);
        assert!(validate(&table, &PipelineConfig::department()).is_ok());
    }

    #[test]
    fn header_only_sheet_is_rejected() {
        let table = PayrollTable::new(vec!["Department".into(), "Net Pay".into()]);
        assert_eq!(
            validate(&table, &PipelineConfig::department()),
            Err(DashboardError::EmptyTable)
        );
    }
}
