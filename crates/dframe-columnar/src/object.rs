//! Generic (boxed) series: one [`Value`] per element.

use crate::error::{SeriesError, SeriesResult};
use crate::indexed::IndexedSeries;
use crate::primitive::{BoolSeries, IntSeries};
use crate::series::Series;
use crate::types::{Value, ValueType};
use std::fmt;
use std::sync::{Arc, OnceLock};

#[derive(Clone)]
pub struct ObjectSeries {
    storage: Storage,
    nominal: ValueType,
    inferred: OnceLock<ValueType>,
}

#[derive(Clone)]
enum Storage {
    Array(Arc<[Value]>),
    Const { value: Value, len: usize },
    Indexed(Arc<IndexedSeries>),
}

impl ObjectSeries {
    pub fn new(values: Vec<Value>) -> Self {
        Self::with_nominal(values, ValueType::Object)
    }

    pub fn with_nominal(values: Vec<Value>, nominal: ValueType) -> Self {
        Self::from_storage(Storage::Array(values.into()), nominal)
    }

    /// A series of `len` copies of `value`.
    pub fn constant(value: Value, len: usize) -> Self {
        let nominal = value.value_type().unwrap_or_default();
        Self::from_storage(Storage::Const { value, len }, nominal)
    }

    /// A lazy view of `source` at `positions` (see [`IndexedSeries`]).
    pub fn indexed(source: Series, positions: IntSeries) -> SeriesResult<Self> {
        let nominal = source.nominal_type();
        let view = IndexedSeries::new(source, positions)?;
        Ok(Self::from_storage(Storage::Indexed(Arc::new(view)), nominal))
    }

    fn from_storage(storage: Storage, nominal: ValueType) -> Self {
        Self {
            storage,
            nominal,
            inferred: OnceLock::new(),
        }
    }

    /// Same values, different declared type. Does not check the values.
    pub(crate) fn relabel(&self, nominal: ValueType) -> Self {
        Self::from_storage(self.storage.clone(), nominal)
    }

    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Array(values) => values.len(),
            Storage::Const { len, .. } => *len,
            Storage::Indexed(view) => view.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nominal_type(&self) -> ValueType {
        self.nominal
    }

    /// Most specific kind shared by all non-null values. Scans the data on first call only.
    pub fn inferred_type(&self) -> ValueType {
        *self.inferred.get_or_init(|| {
            let mut kinds = self.iter().filter_map(Value::value_type);
            match kinds.next() {
                None => ValueType::Object,
                Some(first) => kinds.fold(first, ValueType::common),
            }
        })
    }

    /// Whether reads are served from a concrete array (a pending indexed view is not).
    pub fn is_materialized(&self) -> bool {
        match &self.storage {
            Storage::Indexed(view) => view.is_materialized(),
            Storage::Array(_) | Storage::Const { .. } => true,
        }
    }

    #[inline]
    pub(crate) fn value_ref(&self, index: usize) -> &Value {
        match &self.storage {
            Storage::Array(values) => &values[index],
            Storage::Const { value, .. } => value,
            Storage::Indexed(view) => &view.materialized()[index],
        }
    }

    pub fn get(&self, index: usize) -> SeriesResult<&Value> {
        SeriesError::check_index(index, self.len())?;
        Ok(self.value_ref(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> + '_ {
        (0..self.len()).map(move |i| self.value_ref(i))
    }

    pub fn to_values(&self) -> Vec<Value> {
        self.iter().cloned().collect()
    }

    /// Concrete array-backed copy. An already resolved indexed view hands over its array.
    pub fn materialize(&self) -> Self {
        let storage = match &self.storage {
            Storage::Array(_) => return self.clone(),
            Storage::Const { value, len } => Storage::Array(vec![value.clone(); *len].into()),
            Storage::Indexed(view) => Storage::Array(Arc::clone(view.materialized())),
        };
        Self::from_storage(storage, self.nominal)
    }

    pub(crate) fn gather(&self, positions: impl Iterator<Item = usize>) -> Self {
        if let Storage::Const { value, .. } = &self.storage {
            return Self::from_storage(
                Storage::Const {
                    value: value.clone(),
                    len: positions.count(),
                },
                self.nominal,
            );
        }
        let values: Vec<Value> = positions.map(|p| self.value_ref(p).clone()).collect();
        Self::with_nominal(values, self.nominal)
    }

    pub fn range(&self, from: usize, to: usize) -> SeriesResult<Self> {
        if from > to || to > self.len() {
            return Err(SeriesError::IndexOutOfBounds {
                index: to.max(from) as i64,
                len: self.len(),
            });
        }
        Ok(self.gather(from..to))
    }

    pub fn select_mask(&self, mask: &BoolSeries) -> SeriesResult<Self> {
        SeriesError::check_size(self.len(), mask.len())?;
        Ok(self.gather((0..self.len()).filter(|&i| mask.is_true(i))))
    }

    pub fn is_null(&self) -> BoolSeries {
        self.iter().map(Value::is_null).collect()
    }

    pub fn is_not_null(&self) -> BoolSeries {
        self.iter().map(|v| !v.is_null()).collect()
    }

    pub fn copy_to(
        &self,
        to: &mut [Value],
        from_offset: usize,
        to_offset: usize,
        len: usize,
    ) -> SeriesResult<()> {
        let src = SeriesError::check_range(from_offset, len, self.len())?;
        let dst = SeriesError::check_range(to_offset, len, to.len())?;
        for (slot, i) in to[dst].iter_mut().zip(src) {
            *slot = self.value_ref(i).clone();
        }
        Ok(())
    }
}

impl PartialEq for ObjectSeries {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for ObjectSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSeries")
            .field("nominal", &self.nominal)
            .field("values", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}
