use thiserror::Error;

/// Raised when an uploaded workbook cannot be turned into the two record sets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataFormatError {
    #[error("Unreadable workbook: {0}")]
    Workbook(String),

    #[error("Sheet '{sheet}' not found in workbook")]
    MissingSheet { sheet: String },

    #[error("Sheet '{sheet}' has no header row")]
    EmptySheet { sheet: String },

    #[error("Sheet '{sheet}' is missing required column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("Sheet '{sheet}', row {row}: customer cell holds spreadsheet error '{value}'")]
    InvalidCustomer {
        sheet: String,
        row: usize,
        value: String,
    },

    #[error("Sheet '{sheet}', row {row}: column '{column}' holds non-numeric value '{value}'")]
    InvalidNumber {
        sheet: String,
        row: usize,
        column: String,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Invalid annual budget {0}: must be a finite, non-negative amount")]
    InvalidBudget(f64),

    #[error("Invalid top-N size: at least one customer row must be retained")]
    InvalidTopN,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
