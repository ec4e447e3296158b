//! Row-level derivations and the grouped sum
//!
//! Everything here rejects the whole table on the first bad value rather than
//! skipping rows, so the totals shown never silently exclude records.

use crate::config::{NET_PAY, NetPayRule};
use crate::error::{DashboardError, Result};
use crate::table::{CellValue, PayrollTable};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Label used for rows whose grouping cell is blank
pub const BLANK_GROUP: &str = "(blank)";

/// Text layouts accepted for date cells stored as strings
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%b %d, %Y", "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Every value of a numeric column, failing on the first non-number
pub fn numeric_column(table: &PayrollTable, column: &str) -> Result<Vec<f64>> {
    let cells = table
        .column(column)
        .ok_or_else(|| DashboardError::MissingColumns(vec![column.to_string()]))?;

    cells
        .enumerate()
        .map(|(i, cell)| {
            cell.as_number().ok_or_else(|| DashboardError::InvalidNumber {
                column: column.to_string(),
                row: i + 1,
                value: cell.to_string(),
            })
        })
        .collect()
}

/// Make sure the table has a usable `Net Pay` column
///
/// Under [`NetPayRule::Derived`] the column is computed as gross minus taxes and
/// written once, replacing any `Net Pay` column the sheet already had.
pub fn apply_net_pay(table: &mut PayrollTable, rule: &NetPayRule) -> Result<()> {
    match rule {
        NetPayRule::Provided => {
            // Validate now so a bad cell is reported against the right column
            numeric_column(table, NET_PAY)?;
        }
        NetPayRule::Derived { gross, taxes } => {
            let gross = numeric_column(table, gross)?;
            let taxes = numeric_column(table, taxes)?;
            let net = gross
                .iter()
                .zip(&taxes)
                .map(|(g, t)| CellValue::Number(g - t))
                .collect();
            table.set_column(NET_PAY, net);
        }
    }
    Ok(())
}

/// Interpret one cell as a calendar date
///
/// Accepts native workbook dates, Excel serial day numbers, the text layouts
/// in `DATE_FORMATS`/`DATETIME_FORMATS` and RFC 3339 timestamps with an offset.
/// An offset timestamp keeps the calendar date written in it.
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Number(serial) => from_excel_serial(*serial),
        CellValue::Text(s) => {
            let s = s.trim();
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    DATETIME_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                        .map(|dt| dt.date())
                })
                .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        }
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    // Day 0 of the 1900 date system once the phantom 1900-02-29 is accounted for
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Parse a whole date column, rejecting the table on the first bad value
pub fn parse_dates(table: &PayrollTable, column: &str) -> Result<Vec<NaiveDate>> {
    let cells = table
        .column(column)
        .ok_or_else(|| DashboardError::MissingColumns(vec![column.to_string()]))?;

    cells
        .enumerate()
        .map(|(i, cell)| {
            parse_date(cell).ok_or_else(|| DashboardError::InvalidDate {
                column: column.to_string(),
                row: i + 1,
                value: cell.to_string(),
            })
        })
        .collect()
}

/// Grouping key for a categorical cell
///
/// Keys order the way the groups are listed: numbers numerically, then dates,
/// then text, with the `(blank)` group last.
#[derive(Clone, Debug)]
pub enum GroupKey {
    Number(f64),
    Date(NaiveDateTime),
    Text(String),
    Blank,
}

impl GroupKey {
    fn rank(&self) -> u8 {
        match self {
            GroupKey::Number(_) => 0,
            GroupKey::Date(_) => 1,
            GroupKey::Text(_) => 2,
            GroupKey::Blank => 3,
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Number(a), GroupKey::Number(b)) => a.total_cmp(b),
            (GroupKey::Date(a), GroupKey::Date(b)) => a.cmp(b),
            (GroupKey::Text(a), GroupKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Number(n) => write!(f, "{}", CellValue::Number(*n)),
            GroupKey::Date(dt) => write!(f, "{}", dt),
            GroupKey::Text(s) => write!(f, "{}", s),
            GroupKey::Blank => write!(f, "{}", BLANK_GROUP),
        }
    }
}

pub fn group_key(cell: &CellValue) -> GroupKey {
    match cell {
        // Adding zero folds -0.0 into 0.0
        CellValue::Number(n) => GroupKey::Number(*n + 0.0),
        CellValue::DateTime(dt) => GroupKey::Date(*dt),
        CellValue::Empty => GroupKey::Blank,
        CellValue::Text(_) | CellValue::Bool(_) => {
            let text = cell.to_string();
            let text = text.trim();
            if text.is_empty() {
                GroupKey::Blank
            } else {
                GroupKey::Text(text.to_string())
            }
        }
    }
}

/// Per-group sums, ordered ascending by key
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregation {
    pub key_column: String,
    pub value_columns: Vec<String>,
    /// `(key, sums)` with one sum per entry of `value_columns`
    pub rows: Vec<(String, Vec<f64>)>,
}

impl Aggregation {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(k, _)| k.as_str())
    }

    /// The summed values of one column, in group order
    pub fn series(&self, column: &str) -> Option<Vec<f64>> {
        let idx = self.value_columns.iter().position(|c| c == column)?;
        Some(self.rows.iter().map(|(_, sums)| sums[idx]).collect())
    }

    pub fn get(&self, key: &str, column: &str) -> Option<f64> {
        let idx = self.value_columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, sums)| sums[idx])
    }
}

/// Group the table by `key_column` and sum each of `value_columns`
pub fn group_sum(
    table: &PayrollTable,
    key_column: &str,
    value_columns: &[String],
) -> Result<Aggregation> {
    let keys: Vec<GroupKey> = table
        .column(key_column)
        .ok_or_else(|| DashboardError::MissingColumns(vec![key_column.to_string()]))?
        .map(group_key)
        .collect();

    let columns = value_columns
        .iter()
        .map(|c| numeric_column(table, c))
        .collect::<Result<Vec<_>>>()?;

    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for (row, key) in keys.into_iter().enumerate() {
        let sums = groups
            .entry(key)
            .or_insert_with(|| vec![0.0; value_columns.len()]);
        for (sum, column) in sums.iter_mut().zip(&columns) {
            *sum += column[row];
        }
    }

    Ok(Aggregation {
        key_column: key_column.to_string(),
        value_columns: value_columns.to_vec(),
        rows: groups
            .into_iter()
            .map(|(key, sums)| (key.to_string(), sums))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_supported_text_layouts() {
        let expected = ymd(2024, 1, 15);
        for text in [
            "2024-01-15",
            "2024/01/15",
            "01/15/2024",
            "15-Jan-2024",
            "Jan 15, 2024",
            "January 15, 2024",
            "2024-01-15 08:30:00",
            "2024-01-15T08:30:00",
            "2024-01-15T08:30:00Z",
            "2024-01-15T08:30:00+00:00",
            "2024-01-15T23:30:00-05:00",
        ] {
            assert_eq!(parse_date(&CellValue::Text(text.into())), Some(expected), "{}", text);
        }
    }

    #[test]
    fn excel_serials_map_to_dates() {
        assert_eq!(parse_date(&CellValue::Number(45292.0)), Some(ymd(2024, 1, 1)));
        assert_eq!(parse_date(&CellValue::Number(45306.75)), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date(&CellValue::Number(0.0)), None);
        assert_eq!(parse_date(&CellValue::Number(-3.0)), None);
    }

    #[test]
    fn rejects_nonsense_dates() {
        assert_eq!(parse_date(&CellValue::Text("next tuesday".into())), None);
        assert_eq!(parse_date(&CellValue::Text("2024-02-30".into())), None);
        assert_eq!(parse_date(&CellValue::Empty), None);
    }

    #[test]
    fn blank_group_keys_are_kept() {
        assert_eq!(group_key(&CellValue::Empty).to_string(), BLANK_GROUP);
        assert_eq!(group_key(&CellValue::Text("   ".into())), GroupKey::Blank);
        assert_eq!(group_key(&CellValue::Text(" Sales ".into())).to_string(), "Sales");
    }

    #[test]
    fn numeric_keys_sort_as_numbers() {
        let mut table = PayrollTable::new(vec!["Department".into(), "Net Pay".into()]);
        for (dept, pay) in [
            (CellValue::Number(10.0), 100.0),
            (CellValue::Number(2.0), 20.0),
            (CellValue::Text("Ops".into()), 5.0),
            (CellValue::Empty, 1.0),
            (CellValue::Number(9.0), 90.0),
            (CellValue::Number(2.0), 2.0),
        ] {
            table.push_row(vec![dept, CellValue::Number(pay)]);
        }

        let aggregation = group_sum(&table, "Department", &[NET_PAY.to_string()]).unwrap();
        assert_eq!(
            aggregation.keys().collect::<Vec<_>>(),
            vec!["2", "9", "10", "Ops", BLANK_GROUP]
        );
        assert_eq!(aggregation.get("2", NET_PAY), Some(22.0));
    }
}
