#![forbid(unsafe_code)]

use crate::error::{SeriesError, SeriesResult};
use crate::primitive::IntSeries;
use crate::series::Series;
use crate::types::Value;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

/// Position that has no source row; resolves to null.
pub const NO_ROW: i32 = -1;

/// A lazy view of `source` reordered/filtered by `positions`.
///
/// The view resolves every position on first read, caches the result and drops its references
/// to `source` and `positions`. Concurrent first readers block on the same lock, and exactly one
/// of them performs the resolution.
pub struct IndexedSeries {
    len: usize,
    resolved: OnceLock<Arc<[Value]>>,
    pending: Mutex<Option<Pending>>,
}

struct Pending {
    source: Series,
    positions: IntSeries,
}

impl IndexedSeries {
    /// Creates the view. Every non-negative position must address a row of `source`; negative
    /// (and null) positions are "no row" markers.
    pub fn new(source: Series, positions: IntSeries) -> SeriesResult<Self> {
        let source_len = source.len();
        for p in positions.iter().flatten() {
            if p >= 0 && p as usize >= source_len {
                return Err(SeriesError::IndexOutOfBounds {
                    index: p as i64,
                    len: source_len,
                });
            }
        }

        Ok(Self {
            len: positions.len(),
            resolved: OnceLock::new(),
            pending: Mutex::new(Some(Pending { source, positions })),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_materialized(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Resolved values, computing them on first call.
    pub fn materialized(&self) -> &Arc<[Value]> {
        if let Some(data) = self.resolved.get() {
            return data;
        }

        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let data = self.resolved.get_or_init(|| match pending.as_ref() {
            Some(p) => p.resolve(),
            None => vec![Value::Null; self.len].into(),
        });
        *pending = None;
        data
    }
}

impl Pending {
    fn resolve(&self) -> Arc<[Value]> {
        log::trace!(
            "materializing indexed series: {} positions over {} source rows",
            self.positions.len(),
            self.source.len()
        );
        self.positions
            .iter()
            .map(|p| match p {
                Some(p) if p >= 0 => self.source.value_at(p as usize),
                _ => Value::Null,
            })
            .collect()
    }
}

impl fmt::Debug for IndexedSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedSeries")
            .field("len", &self.len)
            .field("materialized", &self.is_materialized())
            .finish()
    }
}
