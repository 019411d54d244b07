//! Primitive-backed series.
//!
//! Values live in a contiguous `Arc<[T]>` next to an optional validity bitmap, so element-wise
//! operators between two series of the same kind work on raw slices without building [`Value`]s.
//! The generic operators in [`crate::series`] must produce the same results; keep the two in sync.

use crate::bitmap::BitVec;
use crate::error::{SeriesError, SeriesResult};
use crate::series::Series;
use crate::types::{Value, ValueType};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Element types that have a dedicated primitive encoding.
pub trait Primitive: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const KIND: ValueType;

    /// Hashable stand-in used for equality, `unique` and the set operations.
    type Key: Copy + Eq + Hash;

    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
    fn key(self) -> Self::Key;
    /// Ordering used by `lt`/`le`/`gt`/`ge`; `None` for unordered doubles.
    fn partial_order(self, other: Self) -> Option<Ordering>;
    /// Ordering used for sorting.
    fn total_order(self, other: Self) -> Ordering;
    fn into_series(series: PrimitiveSeries<Self>) -> Series;
    fn from_series(series: &Series) -> Option<&PrimitiveSeries<Self>>;
}

/// Numeric primitives. Integer arithmetic wraps; integer division by zero is an error.
pub trait Numeric: Primitive {
    type Sum: Primitive;

    fn add(self, other: Self) -> Self;
    fn sub(self, other: Self) -> Self;
    fn mul(self, other: Self) -> Self;
    fn div(self, other: Self) -> Option<Self>;
    fn rem(self, other: Self) -> Option<Self>;
    fn to_f64(self) -> f64;
    fn accumulate(acc: Self::Sum, value: Self) -> Self::Sum;
}

macro_rules! integral_primitive {
    ($ty:ty, $kind:ident, $variant:ident, $sum:ty) => {
        impl Primitive for $ty {
            const KIND: ValueType = ValueType::$kind;
            type Key = $ty;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Int(v) => <$ty>::try_from(*v).ok(),
                    Value::Long(v) => <$ty>::try_from(*v).ok(),
                    _ => None,
                }
            }

            fn key(self) -> Self::Key {
                self
            }

            fn partial_order(self, other: Self) -> Option<Ordering> {
                Some(self.cmp(&other))
            }

            fn total_order(self, other: Self) -> Ordering {
                self.cmp(&other)
            }

            fn into_series(series: PrimitiveSeries<Self>) -> Series {
                Series::$kind(series)
            }

            fn from_series(series: &Series) -> Option<&PrimitiveSeries<Self>> {
                match series {
                    Series::$kind(s) => Some(s),
                    _ => None,
                }
            }
        }

        impl Numeric for $ty {
            type Sum = $sum;

            fn add(self, other: Self) -> Self {
                self.wrapping_add(other)
            }

            fn sub(self, other: Self) -> Self {
                self.wrapping_sub(other)
            }

            fn mul(self, other: Self) -> Self {
                self.wrapping_mul(other)
            }

            fn div(self, other: Self) -> Option<Self> {
                (other != 0).then(|| self.wrapping_div(other))
            }

            fn rem(self, other: Self) -> Option<Self> {
                (other != 0).then(|| self.wrapping_rem(other))
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn accumulate(acc: Self::Sum, value: Self) -> Self::Sum {
                acc.wrapping_add(value as $sum)
            }
        }
    };
}

integral_primitive!(i32, Int, Int, i64);
integral_primitive!(i64, Long, Long, i64);

impl Primitive for f64 {
    const KIND: ValueType = ValueType::Double;
    type Key = OrderedFloat<f64>;

    fn into_value(self) -> Value {
        Value::double(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn key(self) -> Self::Key {
        OrderedFloat(self)
    }

    fn partial_order(self, other: Self) -> Option<Ordering> {
        self.partial_cmp(&other)
    }

    fn total_order(self, other: Self) -> Ordering {
        OrderedFloat(self).cmp(&OrderedFloat(other))
    }

    fn into_series(series: PrimitiveSeries<Self>) -> Series {
        Series::Double(series)
    }

    fn from_series(series: &Series) -> Option<&PrimitiveSeries<Self>> {
        match series {
            Series::Double(s) => Some(s),
            _ => None,
        }
    }
}

impl Numeric for f64 {
    type Sum = f64;

    fn add(self, other: Self) -> Self {
        self + other
    }

    fn sub(self, other: Self) -> Self {
        self - other
    }

    fn mul(self, other: Self) -> Self {
        self * other
    }

    fn div(self, other: Self) -> Option<Self> {
        Some(self / other)
    }

    fn rem(self, other: Self) -> Option<Self> {
        Some(self % other)
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn accumulate(acc: Self::Sum, value: Self) -> Self::Sum {
        acc + value
    }
}

impl Primitive for bool {
    const KIND: ValueType = ValueType::Bool;
    type Key = bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn key(self) -> Self::Key {
        self
    }

    fn partial_order(self, other: Self) -> Option<Ordering> {
        Some(self.cmp(&other))
    }

    fn total_order(self, other: Self) -> Ordering {
        self.cmp(&other)
    }

    fn into_series(series: PrimitiveSeries<Self>) -> Series {
        Series::Bool(series)
    }

    fn from_series(series: &Series) -> Option<&PrimitiveSeries<Self>> {
        match series {
            Series::Bool(s) => Some(s),
            _ => None,
        }
    }
}

/// A column of primitive values with optional nulls.
#[derive(Clone)]
pub struct PrimitiveSeries<T: Primitive> {
    values: Arc<[T]>,
    /// `None` when every element is valid.
    validity: Option<Arc<BitVec>>,
}

pub type IntSeries = PrimitiveSeries<i32>;
pub type LongSeries = PrimitiveSeries<i64>;
pub type DoubleSeries = PrimitiveSeries<f64>;
pub type BoolSeries = PrimitiveSeries<bool>;

impl<T: Primitive> PrimitiveSeries<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values: values.into(),
            validity: None,
        }
    }

    pub fn with_validity(values: Vec<T>, validity: BitVec) -> SeriesResult<Self> {
        SeriesError::check_size(values.len(), validity.len())?;
        Ok(Self::from_parts(values, Some(validity)))
    }

    pub fn from_options(values: impl IntoIterator<Item = Option<T>>) -> Self {
        let iter = values.into_iter();
        let (lower, _) = iter.size_hint();
        let mut data = Vec::with_capacity(lower);
        let mut validity = BitVec::with_capacity_bits(lower);
        for v in iter {
            data.push(v.unwrap_or_default());
            validity.push(v.is_some());
        }
        Self::from_parts(data, Some(validity))
    }

    pub fn filled(value: T, len: usize) -> Self {
        Self::new(vec![value; len])
    }

    pub(crate) fn from_parts(values: Vec<T>, validity: Option<BitVec>) -> Self {
        let validity = validity.filter(|v| !v.all_true()).map(Arc::new);
        Self {
            values: values.into(),
            validity,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values; slots of null elements hold `T::default()`.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn validity(&self) -> Option<&BitVec> {
        self.validity.as_deref()
    }

    pub fn null_count(&self) -> usize {
        self.validity.as_ref().map_or(0, |v| v.count_zeros())
    }

    #[inline]
    pub(crate) fn is_valid(&self, index: usize) -> bool {
        self.validity.as_ref().map_or(true, |v| v.get(index))
    }

    #[inline]
    pub(crate) fn opt(&self, index: usize) -> Option<T> {
        self.is_valid(index).then(|| self.values[index])
    }

    pub fn get(&self, index: usize) -> SeriesResult<Option<T>> {
        SeriesError::check_index(index, self.len())?;
        Ok(self.opt(index))
    }

    pub fn get_value(&self, index: usize) -> SeriesResult<Value> {
        Ok(self.get(index)?.map_or(Value::Null, T::into_value))
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Option<T>> + ExactSizeIterator + '_ {
        (0..self.len()).map(move |i| self.opt(i))
    }

    pub fn to_values(&self) -> Vec<Value> {
        self.iter()
            .map(|v| v.map_or(Value::Null, T::into_value))
            .collect()
    }

    /// Copies `len` raw values starting at `from_offset` into `to[to_offset..]`.
    pub fn copy_to(
        &self,
        to: &mut [T],
        from_offset: usize,
        to_offset: usize,
        len: usize,
    ) -> SeriesResult<()> {
        let src = SeriesError::check_range(from_offset, len, self.len())?;
        let dst = SeriesError::check_range(to_offset, len, to.len())?;
        to[dst].copy_from_slice(&self.values[src]);
        Ok(())
    }

    pub(crate) fn gather(&self, positions: impl Iterator<Item = usize>) -> Self {
        let (lower, _) = positions.size_hint();
        let mut data = Vec::with_capacity(lower);
        let mut validity = self.validity.as_ref().map(|_| BitVec::with_capacity_bits(lower));
        for p in positions {
            data.push(self.values[p]);
            if let Some(validity) = validity.as_mut() {
                validity.push(self.is_valid(p));
            }
        }
        Self::from_parts(data, validity)
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

    pub fn select_by(&self, predicate: impl Fn(Option<T>) -> bool) -> Self {
        self.gather((0..self.len()).filter(|&i| predicate(self.opt(i))))
    }

    pub fn concat(&self, others: &[&PrimitiveSeries<T>]) -> Self {
        let total = self.len() + others.iter().map(|s| s.len()).sum::<usize>();
        let has_nulls = self.validity.is_some() || others.iter().any(|s| s.validity.is_some());
        let mut data = Vec::with_capacity(total);
        let mut validity = has_nulls.then(|| BitVec::with_capacity_bits(total));
        for s in std::iter::once(self).chain(others.iter().copied()) {
            data.extend_from_slice(&s.values);
            if let Some(validity) = validity.as_mut() {
                for i in 0..s.len() {
                    validity.push(s.is_valid(i));
                }
            }
        }
        Self::from_parts(data, validity)
    }

    /// A copy with one more element at the end.
    pub fn push(&self, value: Option<T>) -> Self {
        self.concat(&[&Self::from_options([value])])
    }

    /// Element-wise transform into another primitive kind; nulls stay null.
    pub fn map<U: Primitive>(&self, f: impl Fn(T) -> U) -> PrimitiveSeries<U> {
        let data = self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| if self.is_valid(i) { f(*v) } else { U::default() })
            .collect::<Vec<_>>();
        PrimitiveSeries {
            values: data.into(),
            validity: self.validity.clone(),
        }
    }

    pub fn is_null(&self) -> BoolSeries {
        BoolSeries::new((0..self.len()).map(|i| !self.is_valid(i)).collect())
    }

    pub fn is_not_null(&self) -> BoolSeries {
        BoolSeries::new((0..self.len()).map(|i| self.is_valid(i)).collect())
    }

    pub fn first(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.opt(0)
    }

    pub fn last(&self) -> Option<T> {
        self.len().checked_sub(1).and_then(|i| self.opt(i))
    }

    pub fn fill_nulls(&self, value: T) -> Self {
        if self.validity.is_none() {
            return self.clone();
        }
        Self::new(self.iter().map(|v| v.unwrap_or(value)).collect())
    }

    pub fn fill_nulls_from(&self, values: &PrimitiveSeries<T>) -> SeriesResult<Self> {
        SeriesError::check_size(self.len(), values.len())?;
        if self.validity.is_none() {
            return Ok(self.clone());
        }
        Ok(Self::from_options(
            (0..self.len()).map(|i| self.opt(i).or_else(|| values.opt(i))),
        ))
    }

    /// Replaces each null with the nearest preceding non-null value. Leading nulls stay null.
    pub fn fill_nulls_forward(&self) -> Self {
        let mut last = None;
        Self::from_options(self.iter().map(|v| {
            if v.is_some() {
                last = v;
            }
            last
        }))
    }

    /// Replaces each null with the nearest following non-null value. Trailing nulls stay null.
    pub fn fill_nulls_backward(&self) -> Self {
        let mut next = None;
        let mut out: Vec<Option<T>> = self
            .iter()
            .rev()
            .map(|v| {
                if v.is_some() {
                    next = v;
                }
                next
            })
            .collect();
        out.reverse();
        Self::from_options(out)
    }

    pub fn replace(&self, mask: &BoolSeries, with: Option<T>) -> SeriesResult<Self> {
        SeriesError::check_size(self.len(), mask.len())?;
        Ok(Self::from_options(
            (0..self.len()).map(|i| if mask.is_true(i) { with } else { self.opt(i) }),
        ))
    }

    pub fn replace_no_match(&self, mask: &BoolSeries, with: Option<T>) -> SeriesResult<Self> {
        SeriesError::check_size(self.len(), mask.len())?;
        Ok(Self::from_options(
            (0..self.len()).map(|i| if mask.is_true(i) { self.opt(i) } else { with }),
        ))
    }

    fn compare_with(
        &self,
        other: &PrimitiveSeries<T>,
        f: impl Fn(Option<T>, Option<T>) -> bool,
    ) -> SeriesResult<BoolSeries> {
        SeriesError::check_size(self.len(), other.len())?;
        if self.validity.is_none() && other.validity.is_none() {
            let data = self
                .values
                .iter()
                .zip(other.values.iter())
                .map(|(l, r)| f(Some(*l), Some(*r)))
                .collect();
            return Ok(BoolSeries::new(data));
        }
        Ok(BoolSeries::new(
            (0..self.len()).map(|i| f(self.opt(i), other.opt(i))).collect(),
        ))
    }

    pub fn eq(&self, other: &PrimitiveSeries<T>) -> SeriesResult<BoolSeries> {
        self.compare_with(other, |l, r| l.map(T::key) == r.map(T::key))
    }

    pub fn ne(&self, other: &PrimitiveSeries<T>) -> SeriesResult<BoolSeries> {
        self.compare_with(other, |l, r| l.map(T::key) != r.map(T::key))
    }

    pub fn lt(&self, other: &PrimitiveSeries<T>) -> SeriesResult<BoolSeries> {
        self.compare_with(other, |l, r| ordered(l, r, Ordering::is_lt))
    }

    pub fn le(&self, other: &PrimitiveSeries<T>) -> SeriesResult<BoolSeries> {
        self.compare_with(other, |l, r| ordered(l, r, Ordering::is_le))
    }

    pub fn gt(&self, other: &PrimitiveSeries<T>) -> SeriesResult<BoolSeries> {
        self.compare_with(other, |l, r| ordered(l, r, Ordering::is_gt))
    }

    pub fn ge(&self, other: &PrimitiveSeries<T>) -> SeriesResult<BoolSeries> {
        self.compare_with(other, |l, r| ordered(l, r, Ordering::is_ge))
    }

    pub fn between(
        &self,
        from: &PrimitiveSeries<T>,
        to: &PrimitiveSeries<T>,
    ) -> SeriesResult<BoolSeries> {
        let lower = self.ge(from)?;
        let upper = self.le(to)?;
        lower.and(&upper)
    }
}

fn ordered<T: Primitive>(l: Option<T>, r: Option<T>, test: fn(Ordering) -> bool) -> bool {
    match (l, r) {
        (Some(l), Some(r)) => l.partial_order(r).is_some_and(test),
        _ => false,
    }
}

impl<T: Numeric> PrimitiveSeries<T> {
    fn arithmetic(
        &self,
        other: &PrimitiveSeries<T>,
        op: impl Fn(T, T) -> Option<T>,
    ) -> SeriesResult<Self> {
        SeriesError::check_size(self.len(), other.len())?;
        let validity = match (&self.validity, &other.validity) {
            (None, None) => None,
            (Some(v), None) | (None, Some(v)) => Some(BitVec::clone(v)),
            (Some(l), Some(r)) => {
                let mut v = BitVec::clone(l);
                v.and_inplace(r);
                Some(v)
            }
        };

        let mut data = Vec::with_capacity(self.len());
        for (i, (l, r)) in self.values.iter().zip(other.values.iter()).enumerate() {
            if validity.as_ref().is_some_and(|v| !v.get(i)) {
                data.push(T::default());
                continue;
            }
            data.push(op(*l, *r).ok_or(SeriesError::DivisionByZero { index: i })?);
        }
        Ok(Self::from_parts(data, validity))
    }

    pub fn add(&self, other: &PrimitiveSeries<T>) -> SeriesResult<Self> {
        self.arithmetic(other, |l, r| Some(l.add(r)))
    }

    pub fn sub(&self, other: &PrimitiveSeries<T>) -> SeriesResult<Self> {
        self.arithmetic(other, |l, r| Some(l.sub(r)))
    }

    pub fn mul(&self, other: &PrimitiveSeries<T>) -> SeriesResult<Self> {
        self.arithmetic(other, |l, r| Some(l.mul(r)))
    }

    pub fn div(&self, other: &PrimitiveSeries<T>) -> SeriesResult<Self> {
        self.arithmetic(other, T::div)
    }

    pub fn modulo(&self, other: &PrimitiveSeries<T>) -> SeriesResult<Self> {
        self.arithmetic(other, T::rem)
    }

    /// Sum of non-null values; zero for an empty or all-null series.
    pub fn sum(&self) -> T::Sum {
        self.iter()
            .flatten()
            .fold(T::Sum::default(), |acc, v| T::accumulate(acc, v))
    }

    pub fn min(&self) -> Option<T> {
        self.iter().flatten().min_by(|a, b| a.total_order(*b))
    }

    pub fn max(&self) -> Option<T> {
        self.iter().flatten().max_by(|a, b| a.total_order(*b))
    }

    pub fn avg(&self) -> Option<f64> {
        let (count, total) = self
            .iter()
            .flatten()
            .fold((0usize, 0f64), |(c, t), v| (c + 1, t + v.to_f64()));
        (count > 0).then(|| total / count as f64)
    }

    pub fn median(&self) -> Option<f64> {
        let mut values: Vec<T> = self.iter().flatten().collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_order(*b));
        let mid = values.len() / 2;
        if values.len() % 2 == 1 {
            Some(values[mid].to_f64())
        } else {
            Some((values[mid - 1].to_f64() + values[mid].to_f64()) / 2.0)
        }
    }

    /// Running total. Null elements produce null but do not reset the total.
    pub fn cum_sum(&self) -> PrimitiveSeries<T::Sum> {
        let mut acc = T::Sum::default();
        PrimitiveSeries::from_options(self.iter().map(|v| {
            v.map(|v| {
                acc = T::accumulate(acc, v);
                acc
            })
        }))
    }
}

impl BoolSeries {
    /// `true` only for valid `true` elements; nulls never select.
    #[inline]
    pub fn is_true(&self, index: usize) -> bool {
        self.is_valid(index) && self.values[index]
    }

    pub fn count_true(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_true(i)).count()
    }

    pub fn count_false(&self) -> usize {
        (0..self.len())
            .filter(|&i| self.is_valid(i) && !self.values[i])
            .count()
    }

    pub fn first_true(&self) -> Option<usize> {
        (0..self.len()).find(|&i| self.is_true(i))
    }

    /// Positions of `true` elements.
    pub fn true_positions(&self) -> IntSeries {
        IntSeries::new(
            (0..self.len())
                .filter(|&i| self.is_true(i))
                .map(|i| i as i32)
                .collect(),
        )
    }

    /// Logical AND; nulls count as `false` and the result has no nulls.
    pub fn and(&self, other: &BoolSeries) -> SeriesResult<BoolSeries> {
        SeriesError::check_size(self.len(), other.len())?;
        Ok(BoolSeries::new(
            (0..self.len())
                .map(|i| self.is_true(i) && other.is_true(i))
                .collect(),
        ))
    }

    /// Logical OR; nulls count as `false` and the result has no nulls.
    pub fn or(&self, other: &BoolSeries) -> SeriesResult<BoolSeries> {
        SeriesError::check_size(self.len(), other.len())?;
        Ok(BoolSeries::new(
            (0..self.len())
                .map(|i| self.is_true(i) || other.is_true(i))
                .collect(),
        ))
    }

    /// Logical NOT; nulls stay null.
    pub fn not(&self) -> BoolSeries {
        self.map(|v| !v)
    }
}

impl<T: Primitive> From<Vec<T>> for PrimitiveSeries<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}

impl<T: Primitive> From<Vec<Option<T>>> for PrimitiveSeries<T> {
    fn from(values: Vec<Option<T>>) -> Self {
        Self::from_options(values)
    }
}

impl<T: Primitive> FromIterator<T> for PrimitiveSeries<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: Primitive> PartialEq for PrimitiveSeries<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .map(|v| v.map(T::key))
                .eq(other.iter().map(|v| v.map(T::key)))
    }
}

impl<T: Primitive> fmt::Debug for PrimitiveSeries<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveSeries")
            .field("kind", &T::KIND)
            .field("values", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}
