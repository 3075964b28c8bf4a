//! Workbook transformation pipelines.
//!
//! Three pipelines cover the supported reshapes: [`itemize`] condenses a
//! summary sheet into per-person purchase rows, [`weigh`] computes
//! per-person total weights for every selected sheet, and [`combine`]
//! outer-joins per-sheet person tables into one wide summary. All three
//! read through [`crate::spreadsheet`] and produce [`Table`] values ready
//! for [`crate::writer`].

pub mod aggregate;
pub mod extract;
pub mod layout;
pub mod weight;

use crate::error::ResheetError;
use crate::spreadsheet::{Cell, Spreadsheet, SpreadsheetError};
use crate::table::{Table, Value};
use crate::transform::aggregate::{merge_summaries, summarize_sheet};
use crate::transform::extract::{extract_records, PurchaseRecord};
use crate::transform::layout::SheetLayout;
use crate::transform::weight::{covers_weight_block, weigh_grid, PersonWeight};
use glob::Pattern;
use std::path::Path;
use thiserror::Error;

/// A pipeline that ran but found nothing to transform. Callers usually
/// treat this as a clean "nothing to write" outcome rather than a failure.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Scanned sheet had no qualifying data rows
    #[error("No qualifying rows in sheet '{sheet}'")]
    NoRecords { sheet: String },

    /// No selected sheet was large enough to carry a weight block
    #[error("No sheets with a measurable weight layout")]
    NothingToWeigh,

    /// No selected sheet contributed any per-person rows
    #[error("No per-person data in any sheet")]
    NothingToCombine,
}

/// Restricts which sheets a multi-sheet pipeline reads, by glob patterns
/// on sheet names. An empty selection accepts every sheet.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    patterns: Option<Vec<Pattern>>,
}

impl Selection {
    /// A selection that accepts every sheet.
    pub fn all() -> Selection {
        Selection::default()
    }

    /// Compiles glob patterns into a selection; no patterns means all.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Selection, ResheetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for pattern in patterns {
            compiled.push(Pattern::new(pattern.as_ref())?);
        }
        Ok(Selection {
            patterns: (!compiled.is_empty()).then_some(compiled),
        })
    }

    /// Whether a sheet with this name should be processed.
    pub fn accepts(&self, sheet_name: &str) -> bool {
        match &self.patterns {
            Some(patterns) => patterns.iter().any(|pattern| pattern.matches(sheet_name)),
            None => true,
        }
    }
}

/// Condenses the first sheet of a summary workbook into one purchase
/// record per qualifying data row.
///
/// # Errors
///
/// Returns [`TransformError::NoRecords`] (wrapped in the crate error)
/// when the sheet is empty or every row was filtered out, and a
/// spreadsheet error when the file cannot be read.
pub fn itemize<P>(path: P) -> Result<Table, ResheetError>
where
    P: AsRef<Path>,
{
    let mut workbook = Spreadsheet::open(path)?;
    let sheet = workbook
        .first_sheet_name()
        .ok_or(SpreadsheetError::SheetNotFound)?;
    let grid = match workbook.read_grid(&sheet) {
        Ok(grid) => grid,
        Err(SpreadsheetError::EmptySheet) => {
            return Err(TransformError::NoRecords { sheet }.into());
        }
        Err(error) => return Err(error.into()),
    };

    let layout = SheetLayout::scan(&grid);
    log::debug!(
        "sheet '{}': {} product columns",
        sheet,
        layout.products().len()
    );
    let records = extract_records(&grid, &layout);
    if records.is_empty() {
        return Err(TransformError::NoRecords { sheet }.into());
    }
    Ok(records_table(&records))
}

/// Computes per-person total weights for every selected sheet, keeping
/// workbook sheet order. Sheets too small to hold the weight layout are
/// skipped with a warning; a sheet with no named rows still yields an
/// output table with headers only.
pub fn weigh<P>(path: P, selection: &Selection) -> Result<Vec<(String, Table)>, ResheetError>
where
    P: AsRef<Path>,
{
    let mut workbook = Spreadsheet::open(path)?;
    let mut outputs = Vec::new();
    for sheet in workbook.sheet_names() {
        if !selection.accepts(&sheet) {
            continue;
        }
        let grid = match workbook.read_grid(&sheet) {
            Ok(grid) => grid,
            Err(SpreadsheetError::EmptySheet) => {
                log::debug!("skipping sheet '{}': empty", sheet);
                continue;
            }
            Err(error) => return Err(error.into()),
        };
        if !covers_weight_block(&grid) {
            log::warn!("skipping sheet '{}': too small for the weight layout", sheet);
            continue;
        }
        let rows = weigh_grid(&grid);
        outputs.push((sheet, weights_table(&rows)));
    }
    if outputs.is_empty() {
        return Err(TransformError::NothingToWeigh.into());
    }
    Ok(outputs)
}

/// Outer-joins the per-person tables of every selected sheet into one
/// wide summary, optionally splitting `total_amount` between persons in
/// proportion to their per-sheet weights.
pub fn combine<P>(
    path: P,
    selection: &Selection,
    total_amount: Option<f64>,
) -> Result<Table, ResheetError>
where
    P: AsRef<Path>,
{
    let mut workbook = Spreadsheet::open(path)?;
    let mut summaries = Vec::new();
    for sheet in workbook.sheet_names() {
        if !selection.accepts(&sheet) {
            continue;
        }
        let grid = match workbook.read_grid(&sheet) {
            Ok(grid) => grid,
            Err(SpreadsheetError::EmptySheet) => {
                log::debug!("skipping sheet '{}': empty", sheet);
                continue;
            }
            Err(error) => return Err(error.into()),
        };
        let table = Table::from_grid(&grid);
        if let Some(summary) = summarize_sheet(&sheet, &table) {
            summaries.push(summary);
        }
    }
    let merged = merge_summaries(&summaries, total_amount)?;
    Ok(merged)
}

/// Trimmed display text of a populated, non-blank cell.
pub(crate) fn cell_text(cell: Option<&Cell>) -> Option<String> {
    cell.filter(|cell| !cell.is_blank())
        .and_then(Cell::display_text)
        .map(|text| text.trim().to_string())
}

fn records_table(records: &[PurchaseRecord]) -> Table {
    let mut table = Table::new(vec![
        aggregate::PERSON_FIELD.to_string(),
        aggregate::DETAIL_FIELD.to_string(),
        aggregate::POINTS_FIELD.to_string(),
        aggregate::AMOUNT_FIELD.to_string(),
    ]);
    for record in records {
        table.push_row(vec![
            Value::text(record.person.as_str()),
            Value::text(record.detail.as_str()),
            Value::Number(record.points as f64),
            Value::text(record.amount.as_str()),
        ]);
    }
    table
}

fn weights_table(rows: &[PersonWeight]) -> Table {
    let mut table = Table::new(vec![
        aggregate::PERSON_FIELD.to_string(),
        aggregate::WEIGHT_FIELD.to_string(),
    ]);
    for row in rows {
        table.push_row(vec![
            Value::text(row.person.as_str()),
            Value::Number(row.weight),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_accepts_everything() {
        let selection = Selection::all();
        assert!(selection.accepts("June"));
        assert!(selection.accepts("任意"));
    }

    #[test]
    fn selection_matches_any_of_its_patterns() {
        let selection = Selection::from_patterns(["2024-*", "summary"]).unwrap();
        assert!(selection.accepts("2024-06"));
        assert!(selection.accepts("summary"));
        assert!(!selection.accepts("2023-12"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        assert!(Selection::from_patterns(["[broken"]).is_err());
    }

    #[test]
    fn records_become_a_four_column_table() {
        let records = vec![PurchaseRecord {
            person: "Alice".to_string(),
            detail: "tea×2".to_string(),
            points: 2,
            amount: "12.5".to_string(),
        }];
        let table = records_table(&records);
        assert_eq!(table.columns(), &["person", "detail", "points", "amount"]);
        assert_eq!(table.rows()[0][2], Value::Number(2.0));
        assert_eq!(table.rows()[0][3], Value::text("12.5"));
    }

    #[test]
    fn weights_become_a_two_column_table() {
        let rows = vec![PersonWeight {
            person: "Bob".to_string(),
            weight: 6.5,
        }];
        let table = weights_table(&rows);
        assert_eq!(table.columns(), &["person", "weight"]);
        assert_eq!(table.rows()[0][1], Value::Number(6.5));
    }
}
