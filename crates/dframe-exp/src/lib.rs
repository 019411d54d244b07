mod appender;
mod error;
mod exp;
mod frame;
mod group;
mod index;
mod predicate;
mod sort;

pub use crate::appender::{ByRowBuilder, ByRowExtractors, DataFrameAppender};
pub use crate::error::{FrameError, FrameResult};
pub use crate::exp::{
    bool_col, col, concat, double_col, int_col, long_col, str_col, val, AggFn, BinaryOp,
    ColumnRef, EvalSource, Exp, UnaryOp,
};
pub use crate::frame::{DataFrame, RowProxy};
pub use crate::group::GroupBy;
pub use crate::index::Index;
pub use crate::predicate::RowPredicate;
pub use crate::sort::SortKey;

pub use dframe_columnar as columnar;
