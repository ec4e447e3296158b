use chrono::NaiveDateTime;
use std::fmt;

/// One cell loaded from the uploaded sheet
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell.
    ///
    /// Text is accepted when it reads as a number once a leading currency sign
    /// and thousands separators are removed, e.g. `"$1,250.50"`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => {
                let cleaned: String = s
                    .trim()
                    .trim_start_matches('$')
                    .chars()
                    .filter(|c| *c != ',')
                    .collect();
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            // Whole numbers print without a trailing ".0" so "2024" stays "2024"
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

/// Rows of the first sheet, keyed by the header row
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PayrollTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl PayrollTable {
    pub fn new(columns: Vec<String>) -> Self {
        PayrollTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a record, padding or truncating it to the header width
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate over one column's cells in row order
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Store `values` under `name`.
    ///
    /// An existing column of that name is overwritten in place, so a derived
    /// column never appears twice.
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_text_with_currency_and_separators() {
        assert_eq!(CellValue::Text("$1,250.50".into()).as_number(), Some(1250.5));
        assert_eq!(CellValue::Text(" 42 ".into()).as_number(), Some(42.0));
        assert_eq!(CellValue::Text("n/a".into()).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
    }

    #[test]
    fn set_column_overwrites_existing() {
        let mut table = PayrollTable::new(vec!["A".into(), "Net Pay".into()]);
        table.push_row(vec![CellValue::Text("x".into()), CellValue::Number(1.0)]);
        table.set_column("Net Pay", vec![CellValue::Number(5.0)]);
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.rows[0][1], CellValue::Number(5.0));

        table.set_column("Extra", vec![CellValue::Bool(true)]);
        assert_eq!(table.columns, vec!["A", "Net Pay", "Extra"]);
        assert_eq!(table.rows[0].len(), 3);
    }

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(CellValue::Number(2024.0).to_string(), "2024");
        assert_eq!(CellValue::Number(12.5).to_string(), "12.5");
    }
}
