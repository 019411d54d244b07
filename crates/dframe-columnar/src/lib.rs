//! Typed in-memory columns for dframe.
//!
//! This crate focuses on:
//! - [`Series`]: immutable, fixed-length columns with primitive encodings (int/long/double/bool
//!   arrays plus a validity bitmap) and a generic [`Value`] encoding.
//! - Fast paths: binary operators between two columns of the same primitive kind work on raw
//!   slices; every other combination goes through an equivalent generic path.
//! - Lazy views: selecting rows by position yields an [`IndexedSeries`] that resolves once, on
//!   first read, even under concurrent access.
//! - Permutation sorting ([`Sorter`]) and value-equality set operations.
//! - Builders and extractors that turn row streams into columns.

#![forbid(unsafe_code)]

mod bitmap;
mod builder;
mod error;
mod extract;
mod indexed;
mod object;
mod primitive;
mod series;
mod setops;
mod sort;
mod types;

pub use crate::bitmap::BitVec;
pub use crate::builder::{BuilderOptions, ObjectBuilder, PrimitiveBuilder, SeriesBuilder};
pub use crate::error::{SeriesError, SeriesResult};
pub use crate::extract::{ColumnAppender, Extractor};
pub use crate::indexed::{IndexedSeries, NO_ROW};
pub use crate::object::ObjectSeries;
pub use crate::primitive::{
    BoolSeries, DoubleSeries, IntSeries, LongSeries, Numeric, Primitive, PrimitiveSeries,
};
pub use crate::series::{ArithOp, CmpOp, Series};
pub use crate::sort::{RowComparator, Sorter};
pub use crate::types::{Value, ValueType};
