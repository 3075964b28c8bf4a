use thiserror::Error;

/// Crate-level error type.
/// Aggregates errors from the decoding, transformation, and encoding layers
/// together with the standard library and dependency errors they lean on.
#[derive(Error, Debug)]
pub enum ResheetError {
    #[error("{0}")]
    WithContextError(String),

    // Third-party library errors
    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    // Module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    TransformError(#[from] crate::transform::TransformError),

    #[error("{0}")]
    WriterError(#[from] crate::writer::WriterError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, ResheetError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| ResheetError::WithContextError(format!("{}: {}", message, e)))
    }
}
