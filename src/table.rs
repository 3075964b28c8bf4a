//! Neutral tabular form: named columns over rows of optional values.
//!
//! Every pipeline hands its results around as a [`Table`] so that writing,
//! printing, and testing never need to know which transformation produced
//! the data. Blank cells stay blank through every step; a blank is not a
//! zero and not an empty string.

use crate::spreadsheet::{Cell, Grid};

/// A single tabular value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value recorded. Distinct from `Number(0.0)` and `Text("")`.
    Blank,
    /// Free-form text.
    Text(String),
    /// Numeric value; integers are carried as their exact float form.
    Number(f64),
}

impl Value {
    /// Convenience constructor for text values.
    pub fn text<S: Into<String>>(value: S) -> Value {
        Value::Text(value.into())
    }

    /// Lenient numeric reading for summation: numbers pass through, text is
    /// parsed when possible, everything else counts as zero. Malformed cells
    /// must never abort an aggregation pass.
    pub fn coerce_number(&self) -> f64 {
        match self {
            Value::Number(value) => *value,
            Value::Text(value) => value.trim().parse().unwrap_or(0.0),
            Value::Blank => 0.0,
        }
    }
}

/// An ordered set of named columns plus data rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a data row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Blank);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indexes of all columns whose name ends with the given suffix,
    /// in column order. Used for the row-wise total over `*_amount` columns.
    pub fn columns_ending_with(&self, suffix: &str) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.ends_with(suffix))
            .map(|(index, _)| index)
            .collect()
    }

    /// Builds a table from a grid whose first populated row is the header.
    ///
    /// Header cells name the columns; blank header cells fall back to
    /// generated names (`column1`, `column2`, ...). All subsequent rows
    /// become data rows. Columns are counted absolutely from column 0 so
    /// that positional contracts hold even when the sheet's left edge is
    /// unpopulated.
    pub fn from_grid(grid: &Grid) -> Table {
        let width = grid.width();
        let header_row = grid.first_row;
        let columns = (0..width)
            .map(|column| {
                grid.get(header_row, column)
                    .filter(|cell| !cell.is_blank())
                    .and_then(Cell::display_text)
                    .map(|name| name.trim().to_string())
                    .unwrap_or_else(|| format!("column{}", column + 1))
            })
            .collect();

        let mut table = Table::new(columns);
        for row in (header_row + 1)..=grid.last_row {
            let values = (0..width)
                .map(|column| cell_value(grid.get(row, column)))
                .collect();
            table.push_row(values);
        }
        table
    }
}

/// Converts one grid cell to a tabular value, keeping the numeric/text/blank
/// distinction intact.
fn cell_value(cell: Option<&Cell>) -> Value {
    match cell {
        None => Value::Blank,
        Some(cell) if cell.is_blank() => Value::Blank,
        Some(cell) => match cell.as_number() {
            Some(number) => Value::Number(number),
            None => cell.display_text().map(Value::Text).unwrap_or(Value::Blank),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    #[test]
    fn from_grid_takes_first_populated_row_as_header() {
        let grid = Grid::from_rows(vec![
            vec![Data::Empty, Data::Empty],
            vec![Data::String("person".to_string()), Data::String("amount".to_string())],
            vec![Data::String("Alice".to_string()), Data::Float(12.0)],
        ]);
        let table = Table::from_grid(&grid);
        assert_eq!(table.columns(), ["person", "amount"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows()[0][0], Value::text("Alice"));
        assert_eq!(table.rows()[0][1], Value::Number(12.0));
    }

    #[test]
    fn from_grid_names_blank_headers_positionally() {
        let grid = Grid::from_rows(vec![
            vec![Data::Empty, Data::String("amount".to_string())],
            vec![Data::String("Alice".to_string()), Data::Float(1.0)],
        ]);
        let table = Table::from_grid(&grid);
        assert_eq!(table.columns(), ["column1", "amount"]);
    }

    #[test]
    fn blank_stays_distinct_from_zero() {
        let grid = Grid::from_rows(vec![
            vec![Data::String("a".to_string()), Data::String("b".to_string())],
            vec![Data::Float(0.0), Data::Empty],
        ]);
        let table = Table::from_grid(&grid);
        assert_eq!(table.rows()[0][0], Value::Number(0.0));
        assert_eq!(table.rows()[0][1], Value::Blank);
    }

    #[test]
    fn coerce_number_is_lenient() {
        assert_eq!(Value::Number(2.5).coerce_number(), 2.5);
        assert_eq!(Value::text(" 42 ").coerce_number(), 42.0);
        assert_eq!(Value::text("n/a").coerce_number(), 0.0);
        assert_eq!(Value::Blank.coerce_number(), 0.0);
    }

    #[test]
    fn columns_ending_with_matches_suffix_in_order() {
        let table = Table::new(vec![
            "person".to_string(),
            "S1_amount".to_string(),
            "S1_weight".to_string(),
            "S2_amount".to_string(),
        ]);
        assert_eq!(table.columns_ending_with("_amount"), vec![1, 3]);
        assert!(table.columns_ending_with("_share").is_empty());
    }

    #[test]
    fn push_row_pads_short_rows() {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        table.push_row(vec![Value::Number(1.0)]);
        assert_eq!(table.rows()[0], vec![Value::Number(1.0), Value::Blank]);
    }
}
