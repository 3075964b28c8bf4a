//! Workbook output: encodes [`Table`] values as xlsx files, including the
//! two-row grouped header used by the combined summary.

use crate::table::{Table, Value};
use crate::transform::aggregate::{
    AMOUNT_FIELD, DETAIL_FIELD, POINTS_FIELD, SHARE_FIELD, TOTAL_AMOUNT_FIELD, TOTAL_SHARE_FIELD,
    WEIGHT_FIELD,
};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriterError {
    /// Underlying xlsx encoding failure
    #[error("Invalid xlsx output: {0}")]
    InvalidXlsxOutput(#[from] XlsxError),

    /// Table wider than the xlsx column space
    #[error("Too many columns for an xlsx sheet")]
    TooManyColumns,

    /// Table taller than the xlsx row space
    #[error("Too many rows for an xlsx sheet")]
    TooManyRows,
}

/// Output naming convention: `改_{stem}.xlsx` next to the input file.
pub fn derive_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("output");
    input.with_file_name(format!("改_{}.xlsx", stem))
}

/// Writes one table as a single-sheet workbook with a bold header row.
pub fn write_table<P>(path: P, sheet_name: &str, table: &Table) -> Result<(), WriterError>
where
    P: AsRef<Path>,
{
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;
    write_sheet(worksheet, table, &header)?;
    workbook.save(path)?;
    Ok(())
}

/// Writes one table per sheet, preserving the given order.
pub fn write_sheets<P>(path: P, sheets: &[(String, Table)]) -> Result<(), WriterError>
where
    P: AsRef<Path>,
{
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    for (name, table) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name.as_str())?;
        write_sheet(worksheet, table, &header)?;
    }
    workbook.save(path)?;
    Ok(())
}

/// Writes the combined wide table with its two-row header: sheet group
/// labels merged over their column blocks on the first row, field names
/// on the second, ungrouped columns merged vertically across both rows.
/// The grand total columns are bold throughout.
pub fn write_merged<P>(path: P, sheet_name: &str, table: &Table) -> Result<(), WriterError>
where
    P: AsRef<Path>,
{
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let bold = Format::new().set_bold();

    for span in header_spans(table.columns()) {
        match span {
            HeaderSpan::Single { column, title } => {
                let column = column_number(column)?;
                worksheet.merge_range(0, column, 1, column, &title, &header)?;
            }
            HeaderSpan::Group {
                first,
                last,
                label,
                fields,
            } => {
                let first_column = column_number(first)?;
                if first == last {
                    // merge_range rejects single-cell ranges
                    worksheet.write_string_with_format(0, first_column, &label, &header)?;
                } else {
                    worksheet.merge_range(0, first_column, 0, column_number(last)?, &label, &header)?;
                }
                for (offset, field) in fields.iter().enumerate() {
                    worksheet.write_string_with_format(
                        1,
                        column_number(first + offset)?,
                        field,
                        &header,
                    )?;
                }
            }
        }
    }

    let emphasized: Vec<bool> = table
        .columns()
        .iter()
        .map(|name| name == TOTAL_AMOUNT_FIELD || name == TOTAL_SHARE_FIELD)
        .collect();
    for (index, row) in table.rows().iter().enumerate() {
        let row_number = row_number(index + 2)?;
        for (position, value) in row.iter().enumerate() {
            let format = emphasized[position].then_some(&bold);
            write_value(worksheet, row_number, column_number(position)?, value, format)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, table: &Table, header: &Format) -> Result<(), WriterError> {
    for (position, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, column_number(position)?, name, header)?;
    }
    for (index, row) in table.rows().iter().enumerate() {
        let row_number = row_number(index + 1)?;
        for (position, value) in row.iter().enumerate() {
            write_value(worksheet, row_number, column_number(position)?, value, None)?;
        }
    }
    Ok(())
}

fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    column: u16,
    value: &Value,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match (value, format) {
        (Value::Blank, _) => {}
        (Value::Text(text), Some(format)) => {
            worksheet.write_string_with_format(row, column, text, format)?;
        }
        (Value::Text(text), None) => {
            worksheet.write_string(row, column, text)?;
        }
        (Value::Number(number), Some(format)) => {
            worksheet.write_number_with_format(row, column, *number, format)?;
        }
        (Value::Number(number), None) => {
            worksheet.write_number(row, column, *number)?;
        }
    }
    Ok(())
}

/// One region of the two-row header.
#[derive(Debug, PartialEq)]
enum HeaderSpan {
    /// Ungrouped column: one title covering both header rows.
    Single { column: usize, title: String },
    /// A contiguous run of columns sharing a label prefix.
    Group {
        first: usize,
        last: usize,
        label: String,
        fields: Vec<String>,
    },
}

/// Folds column names into header spans. Adjacent columns whose names
/// share a `{label}_{field}` prefix collapse into one group; this also
/// gathers `total_amount` and `total_share` under a "total" label.
fn header_spans(columns: &[String]) -> Vec<HeaderSpan> {
    let mut spans: Vec<HeaderSpan> = Vec::new();
    for (column, name) in columns.iter().enumerate() {
        if let Some((label, field)) = split_field(name) {
            if let Some(HeaderSpan::Group {
                last,
                label: current,
                fields,
                ..
            }) = spans.last_mut()
            {
                if *last + 1 == column && current.as_str() == label {
                    *last = column;
                    fields.push(field.to_string());
                    continue;
                }
            }
            spans.push(HeaderSpan::Group {
                first: column,
                last: column,
                label: label.to_string(),
                fields: vec![field.to_string()],
            });
        } else {
            spans.push(HeaderSpan::Single {
                column,
                title: name.clone(),
            });
        }
    }
    spans
}

/// Splits a `{label}_{field}` column name on its last underscore, when
/// the suffix is one of the merge field names.
fn split_field(name: &str) -> Option<(&str, &str)> {
    let (label, field) = name.rsplit_once('_')?;
    if label.is_empty() {
        return None;
    }
    const FIELDS: [&str; 5] = [
        DETAIL_FIELD,
        POINTS_FIELD,
        AMOUNT_FIELD,
        WEIGHT_FIELD,
        SHARE_FIELD,
    ];
    FIELDS.contains(&field).then_some((label, field))
}

fn row_number(index: usize) -> Result<u32, WriterError> {
    u32::try_from(index).map_err(|_| WriterError::TooManyRows)
}

fn column_number(index: usize) -> Result<u16, WriterError> {
    u16::try_from(index).map_err(|_| WriterError::TooManyColumns)
}
