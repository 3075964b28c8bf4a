//! # Workbook Decoding
//!
//! Reads binary spreadsheet files into raw [`Grid`]s. Supports Excel
//! (.xlsx, .xlsm, .xlam, .xlsb, .xls, .xla) and OpenDocument (.ods) files
//! through the calamine library, behind a unified interface that preserves
//! the distinction between numeric, text, and blank cells.
//!
//! A [`Grid`] addresses cells by absolute zero-based row/column indices,
//! counted from the top-left of the sheet regardless of where the first
//! populated cell sits. The layout conventions handled by the transform
//! modules (header rows 1 and 2, data rows from 5) rely on that absolute
//! addressing.
use calamine::{
    open_workbook, Data, ExcelDateTime, Ods, OdsError, Reader, Xls, XlsError, Xlsb, XlsbError,
    Xlsx, XlsxError,
};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// Errors raised while opening a workbook or materializing one of its sheets.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Error in Excel 2007+ format (.xlsx, .xlsm, .xlam)
    #[error("Invalid xlsx file format: {0}")]
    InvalidXlsxFileFormat(#[from] XlsxError),

    /// Error in Excel Binary format (.xlsb)
    #[error("Invalid xlsb file format: {0}")]
    InvalidXlsbFileFormat(#[from] XlsbError),

    /// Error in legacy Excel format (.xls, .xla)
    #[error("Invalid xls file format: {0}")]
    InvalidXlsFileFormat(#[from] XlsError),

    /// Error in OpenDocument format (.ods)
    #[error("Invalid ods file format: {0}")]
    InvalidOdsFileFormat(#[from] OdsError),

    /// Unsupported or unrecognized file extension
    #[error("Cannot detect file format for '{name}'")]
    InvalidFileFormat { name: String },

    /// Requested sheet not found or workbook has no sheets
    #[error("Sheet not found or workbook is empty")]
    SheetNotFound,

    /// Sheet exists but contains no cells
    #[error("Empty sheet or missing data")]
    EmptySheet,
}

/// Type alias for buffered file reader
pub type FileReader = BufReader<File>;

/// Wrapper enum over the calamine readers for the supported formats.
pub enum Spreadsheet {
    /// Excel 2007+ format reader (.xlsx, .xlsm, .xlam)
    Xlsx(Xlsx<FileReader>),
    /// Excel Binary format reader (.xlsb)
    Xlsb(Xlsb<FileReader>),
    /// Legacy Excel format reader (.xls, .xla)
    Xls(Xls<FileReader>),
    /// OpenDocument format reader (.ods)
    Ods(Ods<FileReader>),
}

impl Spreadsheet {
    /// Opens a spreadsheet file, selecting the reader from the file extension.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the spreadsheet file
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not one of the supported formats
    /// or if the file cannot be opened and parsed by the matching reader.
    pub fn open<P>(path: P) -> Result<Spreadsheet, SpreadsheetError>
    where
        P: AsRef<Path>,
    {
        match path.as_ref().extension().and_then(OsStr::to_str) {
            Some("xlsx") | Some("xlsm") | Some("xlam") => Ok(Self::Xlsx(open_workbook(path)?)),
            Some("xlsb") => Ok(Self::Xlsb(open_workbook(path)?)),
            Some("xls") | Some("xla") => Ok(Self::Xls(open_workbook(path)?)),
            Some("ods") => Ok(Self::Ods(open_workbook(path)?)),
            _ => Err(SpreadsheetError::InvalidFileFormat {
                name: path.as_ref().to_string_lossy().to_string(),
            }),
        }
    }

    /// Returns the names of all sheets, in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        match self {
            Self::Xlsx(xlsx) => xlsx.sheet_names(),
            Self::Xlsb(xlsb) => xlsb.sheet_names(),
            Self::Xls(xls) => xls.sheet_names(),
            Self::Ods(ods) => ods.sheet_names(),
        }
    }

    /// Returns the name of the first sheet, if the workbook has any.
    pub fn first_sheet_name(&self) -> Option<String> {
        self.sheet_names().first().map(|name| name.to_owned())
    }

    /// Materializes one sheet as a [`Grid`].
    ///
    /// # Arguments
    ///
    /// * `sheet_name` - Name of the sheet to read
    ///
    /// # Errors
    ///
    /// Returns [`SpreadsheetError::EmptySheet`] when the sheet holds no
    /// cells, or a format error when the sheet cannot be read.
    pub fn read_grid(&mut self, sheet_name: &str) -> Result<Grid, SpreadsheetError> {
        match self {
            Self::Xlsx(xlsx) => range_to_grid(xlsx.worksheet_range(sheet_name)?),
            Self::Xlsb(xlsb) => range_to_grid(xlsb.worksheet_range(sheet_name)?),
            Self::Xls(xls) => range_to_grid(xls.worksheet_range(sheet_name)?),
            Self::Ods(ods) => range_to_grid(ods.worksheet_range(sheet_name)?),
        }
    }
}

/// Converts a calamine range into a [`Grid`], re-anchoring the range's
/// relative cell positions to absolute sheet coordinates.
fn range_to_grid(range: calamine::Range<Data>) -> Result<Grid, SpreadsheetError> {
    if range.is_empty() {
        return Err(SpreadsheetError::EmptySheet);
    }
    // start/end are Some for non-empty ranges
    let (first_row, first_column) = range
        .start()
        .map(|(row, column)| (row as usize, column as usize))
        .ok_or(SpreadsheetError::EmptySheet)?;
    let (last_row, last_column) = range
        .end()
        .map(|(row, column)| (row as usize, column as usize))
        .ok_or(SpreadsheetError::EmptySheet)?;

    let mut cells: Vec<Cell> = Vec::new();
    let mut indexes: HashMap<(usize, usize), usize> = HashMap::new();
    for (row, column, value) in range.used_cells() {
        let row = first_row + row;
        let column = first_column + column;
        indexes.insert((row, column), cells.len());
        cells.push(Cell {
            row,
            column,
            value: value.to_owned(),
        });
    }
    if cells.is_empty() {
        return Err(SpreadsheetError::EmptySheet);
    }

    Ok(Grid {
        first_row,
        last_row,
        first_column,
        last_column,
        cells,
        indexes,
    })
}

/// A single cell with its absolute position and raw value.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Row index (0-based, absolute)
    pub row: usize,
    /// Column index (0-based, absolute)
    pub column: usize,
    /// Raw cell value as decoded by calamine
    pub value: Data,
}

impl Cell {
    /// Returns the Excel-style position of this cell, e.g. "B2".
    pub fn position(&self) -> String {
        cell_position(self.row, self.column)
    }

    /// A cell is blank when it is empty, holds only whitespace text, or
    /// carries a spreadsheet error value. Blank cells never qualify as
    /// amounts, names, or counts.
    pub fn is_blank(&self) -> bool {
        match &self.value {
            Data::Empty | Data::Error(_) => true,
            Data::String(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    /// Returns the numeric value for cells that are numbers by type.
    /// Text that merely looks numeric does not count here; lenient text
    /// coercion is a separate concern of the weight calculator.
    pub fn as_number(&self) -> Option<f64> {
        match self.value {
            Data::Int(value) => Some(value as f64),
            Data::Float(value) => Some(value),
            _ => None,
        }
    }

    /// Renders the cell as display text, preserving the source formatting
    /// as far as the binary format allows. Returns `None` for blank and
    /// error cells.
    pub fn display_text(&self) -> Option<String> {
        match &self.value {
            Data::Bool(value) => Some(value.to_string()),
            Data::Int(value) => Some(value.to_string()),
            Data::Float(value) => Some(value.to_string()),
            Data::DateTime(value) => datetime_text(value),
            Data::String(value) => Some(value.to_owned()),
            Data::DateTimeIso(value) => Some(value.to_owned()),
            Data::DurationIso(value) => Some(value.to_owned()),
            Data::Empty | Data::Error(_) => None,
        }
    }
}

/// Formats an Excel serial date/time as text: time-only values (serial at
/// most 1.0) render as a time, whole-day serials as a date, everything else
/// as a full timestamp.
fn datetime_text(value: &ExcelDateTime) -> Option<String> {
    let datetime: NaiveDateTime = value.as_datetime()?;
    let serial = value.as_f64();
    if serial <= 1.0 {
        Some(datetime.time().to_string())
    } else if serial.fract() == 0.0 {
        Some(datetime.date().to_string())
    } else {
        Some(datetime.to_string())
    }
}

/// One fully materialized sheet, addressed by absolute 0-based coordinates.
///
/// Storage is sparse: only populated cells are kept, with an index from
/// position to cell for constant-time lookup. Bounds describe the used
/// range; [`Grid::height`] and [`Grid::width`] nevertheless count from
/// row/column 0, because the layout conventions address rows absolutely
/// even when the sheet's first populated row sits lower.
pub struct Grid {
    /// First populated row index (0-based)
    pub first_row: usize,
    /// Last populated row index (0-based, inclusive)
    pub last_row: usize,
    /// First populated column index (0-based)
    pub first_column: usize,
    /// Last populated column index (0-based, inclusive)
    pub last_column: usize,
    /// All populated cells in the sheet
    pub cells: Vec<Cell>,
    /// Index mapping from (row, column) to cell vector position
    pub indexes: HashMap<(usize, usize), usize>,
}

impl Grid {
    /// Gets the cell at the given absolute position, if populated.
    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        if self.first_row <= row
            && row <= self.last_row
            && self.first_column <= column
            && column <= self.last_column
        {
            self.indexes
                .get(&(row, column))
                .and_then(|index| self.cells.get(*index))
        } else {
            None
        }
    }

    /// Number of rows counted from row 0 through the last populated row.
    pub fn height(&self) -> usize {
        self.last_row + 1
    }

    /// Number of columns counted from column 0 through the last populated column.
    pub fn width(&self) -> usize {
        self.last_column + 1
    }
}

#[cfg(test)]
impl Grid {
    /// Builds a grid from literal rows for tests; empty cells are skipped
    /// so sparse sheets can be modeled with `Data::Empty` placeholders.
    pub(crate) fn from_rows(rows: Vec<Vec<Data>>) -> Grid {
        let mut grid = Grid {
            first_row: usize::MAX,
            last_row: 0,
            first_column: usize::MAX,
            last_column: 0,
            cells: Vec::new(),
            indexes: HashMap::new(),
        };
        for (row, values) in rows.into_iter().enumerate() {
            for (column, value) in values.into_iter().enumerate() {
                if matches!(value, Data::Empty) {
                    continue;
                }
                grid.first_row = grid.first_row.min(row);
                grid.last_row = grid.last_row.max(row);
                grid.first_column = grid.first_column.min(column);
                grid.last_column = grid.last_column.max(column);
                grid.indexes.insert((row, column), grid.cells.len());
                grid.cells.push(Cell { row, column, value });
            }
        }
        grid
    }
}

/// Converts a 0-based position to an Excel-style reference, e.g. (1, 2) -> "C2".
pub fn cell_position(row: usize, column: usize) -> String {
    let mut letters = String::new();
    let mut remainder = column;
    loop {
        letters.insert(0, (b'A' + (remainder % 26) as u8) as char);
        if remainder < 26 {
            break;
        }
        remainder = remainder / 26 - 1;
    }
    format!("{}{}", letters, row + 1)
}
