use thiserror::Error;

/// Everything that can go wrong between a source file and a validated [`Table`].
///
/// Row-level coercion failures (bad dates, non-numeric amounts) are not
/// represented here: those rows are dropped and counted on the table.
///
/// [`Table`]: super::model::Table
#[derive(Error, Debug)]
pub enum DataFormatError {
    #[error("Unsupported file format: {0}. Please open a CSV or Excel file.")]
    UnsupportedFormat(String),

    #[error("Could not find an 'Order Date' column in the file")]
    MissingDateColumn,

    #[error("Required column '{0}' is missing")]
    MissingColumn(String),

    #[error("The source contains no usable rows")]
    NoData,

    #[error("Failed to read the source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("The workbook has no worksheets")]
    NoWorksheet,
}

impl DataFormatError {
    /// True for errors caused by the shape of the data rather than by I/O.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            DataFormatError::MissingDateColumn | DataFormatError::MissingColumn(_)
        )
    }
}
