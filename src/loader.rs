use crate::error::{DashboardError, Result};
use crate::table::{CellValue, PayrollTable};
use calamine::{Data, Reader, Xlsx};
use std::collections::HashSet;
use std::io::Cursor;

/// Load the first worksheet of an `.xlsx` workbook held in memory
///
/// The first row supplies the column names; every following non-blank row
/// becomes a record, in sheet order.
///
/// # Arguments
/// * `bytes` - Raw workbook bytes as received from the upload form
///
/// # Returns
/// * `Result<PayrollTable>` - The loaded table, or `DashboardError::Parse` when
///   the bytes are not a workbook or the first sheet has no header row
///
/// # Examples
/// ```no_run
/// use payroll_dashboard::loader::load_workbook;
///
/// let bytes = std::fs::read("payroll.xlsx").unwrap();
/// match load_workbook(&bytes) {
///     Ok(table) => println!("Loaded {} rows", table.len()),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
pub fn load_workbook(bytes: &[u8]) -> Result<PayrollTable> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::Parse("No sheets found in workbook".to_string()))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| DashboardError::Parse("The first sheet is empty".to_string()))?;

    let columns = header
        .iter()
        .enumerate()
        .map(|(i, cell)| header_name(i, cell))
        .collect();
    let mut table = PayrollTable::new(dedupe_headers(columns));

    for row in rows {
        let values: Vec<CellValue> = row.iter().map(cell_value).collect();
        if values.iter().all(CellValue::is_empty) {
            continue;
        }
        table.push_row(values);
    }

    log::debug!(
        "loaded workbook: {} columns, {} rows",
        table.columns.len(),
        table.len()
    );
    Ok(table)
}

fn header_name(index: usize, cell: &Data) -> String {
    let name = cell_value(cell).to_string();
    let name = name.trim();
    if name.is_empty() {
        format!("Unnamed: {}", index)
    } else {
        name.to_string()
    }
}

/// Suffix repeated header names with `.1`, `.2`, ... so every column stays
/// addressable. The first occurrence keeps its name.
fn dedupe_headers(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut columns = Vec::with_capacity(names.len());

    for name in names {
        let mut unique = name.clone();
        let mut suffix = 1;
        while seen.contains(&unique) {
            unique = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        if unique != name {
            log::debug!("duplicate header '{}' renamed to '{}'", name, unique);
        }
        seen.insert(unique.clone());
        columns.push(unique);
    }
    columns
}

/// Convert a calamine cell into the crate's own value type
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(parsed) => CellValue::DateTime(parsed),
            // Out-of-range serials keep their raw value for the date parser to reject
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        // Durations and cell errors such as #N/A are kept as their text form
        other => CellValue::Text(other.to_string()),
    }
}
