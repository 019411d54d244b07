use dframe_columnar::SeriesError;

pub type FrameResult<T> = Result<T, FrameError>;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error("column '{column}' has height {actual}, expected {expected}")]
    HeightMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("expected {expected} columns, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("no such column: {0}")]
    NoSuchColumn(String),

    #[error("column index {index} is out of bounds for a frame of width {width}")]
    ColumnIndexOutOfBounds { index: usize, width: usize },

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("evaluation error: {0}")]
    Eval(String),
}
