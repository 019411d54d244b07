use crate::types::ValueType;
use std::ops::Range;

pub type SeriesResult<T> = Result<T, SeriesError>;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("size mismatch: expected {expected} elements, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("index {index} is out of bounds for a series of size {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("invalid cast to {expected}: value at index {index} is {actual}")]
    InvalidCast {
        expected: ValueType,
        actual: String,
        index: usize,
    },

    #[error("division by zero at index {index}")]
    DivisionByZero { index: usize },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SeriesError {
    pub(crate) fn check_size(expected: usize, actual: usize) -> SeriesResult<()> {
        if expected != actual {
            return Err(SeriesError::SizeMismatch { expected, actual });
        }
        Ok(())
    }

    pub(crate) fn check_index(index: usize, len: usize) -> SeriesResult<()> {
        if index >= len {
            return Err(SeriesError::IndexOutOfBounds {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len,
            });
        }
        Ok(())
    }

    /// `offset..offset + count` when it fits in `len` elements. The reported index saturates.
    pub(crate) fn check_range(
        offset: usize,
        count: usize,
        len: usize,
    ) -> SeriesResult<Range<usize>> {
        match offset.checked_add(count) {
            Some(end) if end <= len => Ok(offset..end),
            end => Err(SeriesError::IndexOutOfBounds {
                index: end
                    .and_then(|end| i64::try_from(end).ok())
                    .unwrap_or(i64::MAX),
                len,
            }),
        }
    }
}
