use crate::error::FrameResult;
use crate::exp::{ColumnRef, EvalSource};
use crate::frame::DataFrame;
use dframe_columnar::{BoolSeries, Value};
use std::fmt;
use std::sync::Arc;

type ValueTest = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Row filter built from per-column value tests.
///
/// Each column test runs once over its whole column; combinators then work on the resulting
/// masks.
#[derive(Clone)]
pub struct RowPredicate {
    node: Node,
}

#[derive(Clone)]
enum Node {
    Column { column: ColumnRef, test: ValueTest },
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
}

impl RowPredicate {
    /// Matches rows whose value in `column` passes `test`.
    pub fn for_column(
        column: impl Into<ColumnRef>,
        test: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            node: Node::Column {
                column: column.into(),
                test: Arc::new(test),
            },
        }
    }

    pub fn and(self, other: RowPredicate) -> Self {
        Self {
            node: Node::And(Box::new(self.node), Box::new(other.node)),
        }
    }

    pub fn or(self, other: RowPredicate) -> Self {
        Self {
            node: Node::Or(Box::new(self.node), Box::new(other.node)),
        }
    }

    pub fn negate(self) -> Self {
        Self {
            node: Node::Not(Box::new(self.node)),
        }
    }

    pub(crate) fn mask(&self, frame: &DataFrame) -> FrameResult<BoolSeries> {
        self.node.mask(frame)
    }
}

impl Node {
    fn mask(&self, frame: &DataFrame) -> FrameResult<BoolSeries> {
        Ok(match self {
            Node::Column { column, test } => frame.resolve(column)?.locate(|v| test(v)),
            Node::And(l, r) => l.mask(frame)?.and(&r.mask(frame)?)?,
            Node::Or(l, r) => l.mask(frame)?.or(&r.mask(frame)?)?,
            Node::Not(inner) => inner.mask(frame)?.not(),
        })
    }
}

impl fmt::Debug for RowPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.node, f)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Column { column, .. } => f.debug_tuple("Column").field(column).finish(),
            Node::And(l, r) => f.debug_tuple("And").field(l).field(r).finish(),
            Node::Or(l, r) => f.debug_tuple("Or").field(l).field(r).finish(),
            Node::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
        }
    }
}
