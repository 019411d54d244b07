//! The [`Series`] column type.
//!
//! A `Series` is a tagged union over the concrete encodings. Binary operators match on the pair
//! of variants: two operands of the same primitive kind go straight to the slice-based
//! implementation in [`crate::primitive`], every other combination falls back to an element-wise
//! walk over [`Value`]s. Both paths produce identical results.

use crate::error::{SeriesError, SeriesResult};
use crate::object::ObjectSeries;
use crate::primitive::{
    BoolSeries, DoubleSeries, IntSeries, LongSeries, Numeric, Primitive, PrimitiveSeries,
};
use crate::types::{Value, ValueType};
use rand::Rng;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write as _;

#[derive(Clone, Debug, PartialEq)]
pub enum Series {
    Int(IntSeries),
    Long(LongSeries),
    Double(DoubleSeries),
    Bool(BoolSeries),
    Object(ObjectSeries),
}

/// Element-wise comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    fn test(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord.is_eq(),
            CmpOp::Ne => ord.is_ne(),
            CmpOp::Lt => ord.is_lt(),
            CmpOp::Le => ord.is_le(),
            CmpOp::Gt => ord.is_gt(),
            CmpOp::Ge => ord.is_ge(),
        }
    }
}

/// Element-wise arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        }
    }
}

impl<T: Primitive> PrimitiveSeries<T> {
    pub fn compare_op(&self, op: CmpOp, other: &PrimitiveSeries<T>) -> SeriesResult<BoolSeries> {
        match op {
            CmpOp::Eq => self.eq(other),
            CmpOp::Ne => self.ne(other),
            CmpOp::Lt => self.lt(other),
            CmpOp::Le => self.le(other),
            CmpOp::Gt => self.gt(other),
            CmpOp::Ge => self.ge(other),
        }
    }
}

impl<T: Numeric> PrimitiveSeries<T> {
    pub fn arith_op(&self, op: ArithOp, other: &PrimitiveSeries<T>) -> SeriesResult<Self> {
        match op {
            ArithOp::Add => self.add(other),
            ArithOp::Sub => self.sub(other),
            ArithOp::Mul => self.mul(other),
            ArithOp::Div => self.div(other),
            ArithOp::Mod => self.modulo(other),
        }
    }
}

/// Applies `$body` to the inner series and wraps the result back into the same variant.
macro_rules! same_kind {
    ($series:expr, $s:ident => $body:expr) => {
        match $series {
            Series::Int($s) => Series::Int($body),
            Series::Long($s) => Series::Long($body),
            Series::Double($s) => Series::Double($body),
            Series::Bool($s) => Series::Bool($body),
            Series::Object($s) => Series::Object($body),
        }
    };
}

/// Applies `$body` to the inner series of any variant.
macro_rules! each_kind {
    ($series:expr, $s:ident => $body:expr) => {
        match $series {
            Series::Int($s) => $body,
            Series::Long($s) => $body,
            Series::Double($s) => $body,
            Series::Bool($s) => $body,
            Series::Object($s) => $body,
        }
    };
}

/// `Some` only when `value` is exactly of kind `T` (no widening), so that primitive paths accept
/// the same values the `Value` equality does.
pub(crate) fn exact<T: Primitive>(value: &Value) -> Option<T> {
    if value.value_type() == Some(T::KIND) {
        T::from_value(value)
    } else {
        None
    }
}

impl Series {
    pub fn of_int(values: Vec<i32>) -> Self {
        Series::Int(IntSeries::new(values))
    }

    pub fn of_long(values: Vec<i64>) -> Self {
        Series::Long(LongSeries::new(values))
    }

    pub fn of_double(values: Vec<f64>) -> Self {
        Series::Double(DoubleSeries::new(values))
    }

    pub fn of_bool(values: Vec<bool>) -> Self {
        Series::Bool(BoolSeries::new(values))
    }

    pub fn of_strs(values: &[&str]) -> Self {
        let values = values.iter().map(|s| Value::from(*s)).collect();
        Series::Object(ObjectSeries::with_nominal(values, ValueType::Str))
    }

    /// Generic series with nominal type `Object`.
    pub fn of_values(values: Vec<Value>) -> Self {
        Series::Object(ObjectSeries::new(values))
    }

    /// A series of `len` copies of `value`. Primitive values get a primitive encoding.
    pub fn of_val(value: Value, len: usize) -> Self {
        match value {
            Value::Int(v) => Series::Int(IntSeries::filled(v, len)),
            Value::Long(v) => Series::Long(LongSeries::filled(v, len)),
            Value::Double(v) => Series::Double(DoubleSeries::filled(v.0, len)),
            Value::Bool(v) => Series::Bool(BoolSeries::filled(v, len)),
            Value::Null | Value::Str(_) => Series::Object(ObjectSeries::constant(value, len)),
        }
    }

    pub fn len(&self) -> usize {
        each_kind!(self, s => s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The declared element kind.
    pub fn nominal_type(&self) -> ValueType {
        match self {
            Series::Int(_) => ValueType::Int,
            Series::Long(_) => ValueType::Long,
            Series::Double(_) => ValueType::Double,
            Series::Bool(_) => ValueType::Bool,
            Series::Object(s) => s.nominal_type(),
        }
    }

    /// The most specific kind shared by the actual values. Computed once for generic series.
    pub fn inferred_type(&self) -> ValueType {
        match self {
            Series::Object(s) => s.inferred_type(),
            _ => self.nominal_type(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, Series::Object(_))
    }

    pub fn get(&self, index: usize) -> SeriesResult<Value> {
        SeriesError::check_index(index, self.len())?;
        Ok(self.value_at(index))
    }

    /// Unchecked read; `index` must be in bounds.
    #[inline]
    pub(crate) fn value_at(&self, index: usize) -> Value {
        match self {
            Series::Int(s) => s.opt(index).map_or(Value::Null, i32::into_value),
            Series::Long(s) => s.opt(index).map_or(Value::Null, i64::into_value),
            Series::Double(s) => s.opt(index).map_or(Value::Null, f64::into_value),
            Series::Bool(s) => s.opt(index).map_or(Value::Null, bool::into_value),
            Series::Object(s) => s.value_ref(index).clone(),
        }
    }

    /// Typed read. Fails with `InvalidCast` when the value at `index` is not exactly a `T`.
    pub fn get_as<T: Primitive>(&self, index: usize) -> SeriesResult<Option<T>> {
        if let Some(s) = T::from_series(self) {
            return s.get(index);
        }
        let value = self.get(index)?;
        if value.is_null() {
            return Ok(None);
        }
        exact::<T>(&value).map(Some).ok_or_else(|| invalid_cast::<T>(&value, index))
    }

    pub fn get_int(&self, index: usize) -> SeriesResult<Option<i32>> {
        self.get_as(index)
    }

    pub fn get_long(&self, index: usize) -> SeriesResult<Option<i64>> {
        self.get_as(index)
    }

    pub fn get_double(&self, index: usize) -> SeriesResult<Option<f64>> {
        self.get_as(index)
    }

    pub fn get_bool(&self, index: usize) -> SeriesResult<Option<bool>> {
        self.get_as(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map(move |i| self.value_at(i))
    }

    pub fn to_values(&self) -> Vec<Value> {
        match self {
            Series::Object(s) => s.to_values(),
            _ => self.iter().collect(),
        }
    }

    /// Copies `len` values starting at `from_offset` into `to[to_offset..]`.
    pub fn copy_to(
        &self,
        to: &mut [Value],
        from_offset: usize,
        to_offset: usize,
        len: usize,
    ) -> SeriesResult<()> {
        if let Series::Object(s) = self {
            return s.copy_to(to, from_offset, to_offset, len);
        }
        let src = SeriesError::check_range(from_offset, len, self.len())?;
        let dst = SeriesError::check_range(to_offset, len, to.len())?;
        for (slot, i) in to[dst].iter_mut().zip(src) {
            *slot = self.value_at(i);
        }
        Ok(())
    }

    /// Resolves lazy storage into a concrete array.
    pub fn materialize(&self) -> Series {
        match self {
            Series::Object(s) => Series::Object(s.materialize()),
            _ => self.clone(),
        }
    }

    pub fn as_primitive<T: Primitive>(&self) -> Option<&PrimitiveSeries<T>> {
        T::from_series(self)
    }

    pub fn as_int(&self) -> Option<&IntSeries> {
        self.as_primitive()
    }

    pub fn as_long(&self) -> Option<&LongSeries> {
        self.as_primitive()
    }

    pub fn as_double(&self) -> Option<&DoubleSeries> {
        self.as_primitive()
    }

    pub fn as_bool(&self) -> Option<&BoolSeries> {
        self.as_primitive()
    }

    /// Checked conversion to a primitive encoding. Every non-null value must be exactly a `T`.
    pub fn cast_as_primitive<T: Primitive>(&self) -> SeriesResult<PrimitiveSeries<T>> {
        if let Some(s) = T::from_series(self) {
            return Ok(s.clone());
        }
        let mut out = Vec::with_capacity(self.len());
        for (index, value) in self.iter().enumerate() {
            if value.is_null() {
                out.push(None);
                continue;
            }
            let v = exact::<T>(&value).ok_or_else(|| invalid_cast::<T>(&value, index))?;
            out.push(Some(v));
        }
        Ok(PrimitiveSeries::from_options(out))
    }

    pub fn cast_as_int(&self) -> SeriesResult<IntSeries> {
        self.cast_as_primitive()
    }

    pub fn cast_as_long(&self) -> SeriesResult<LongSeries> {
        self.cast_as_primitive()
    }

    pub fn cast_as_double(&self) -> SeriesResult<DoubleSeries> {
        self.cast_as_primitive()
    }

    pub fn cast_as_bool(&self) -> SeriesResult<BoolSeries> {
        self.cast_as_primitive()
    }

    /// Checked cast: validates every value eagerly and re-encodes primitive kinds.
    pub fn cast_as(&self, kind: ValueType) -> SeriesResult<Series> {
        match kind {
            ValueType::Int => self.cast_as_int().map(Series::Int),
            ValueType::Long => self.cast_as_long().map(Series::Long),
            ValueType::Double => self.cast_as_double().map(Series::Double),
            ValueType::Bool => self.cast_as_bool().map(Series::Bool),
            ValueType::Str => {
                if let Some((index, value)) = self
                    .iter()
                    .enumerate()
                    .find(|(_, v)| !v.is_null() && v.as_str().is_none())
                {
                    return Err(SeriesError::InvalidCast {
                        expected: ValueType::Str,
                        actual: kind_of(&value),
                        index,
                    });
                }
                Ok(self.unsafe_cast_as(ValueType::Str))
            }
            ValueType::Object => Ok(self.unsafe_cast_as(ValueType::Object)),
        }
    }

    /// Unchecked cast: relabels the nominal type without looking at the values. A wrong guess
    /// surfaces as `InvalidCast` from the first typed read of an incompatible value.
    pub fn unsafe_cast_as(&self, kind: ValueType) -> Series {
        if self.nominal_type() == kind {
            return self.clone();
        }
        match self {
            Series::Object(s) => Series::Object(s.relabel(kind)),
            _ => Series::Object(ObjectSeries::with_nominal(self.to_values(), kind)),
        }
    }

    /// Generic series holding `values`, keeping this series' nominal type when every value
    /// still conforms to it.
    pub(crate) fn rebuild(&self, values: Vec<Value>) -> Series {
        let nominal = self.nominal_type();
        let conforms = values
            .iter()
            .all(|v| v.value_type().map_or(true, |k| k == nominal));
        if conforms && nominal.is_primitive() {
            return Series::infer_as(values, nominal);
        }
        let nominal = if conforms { nominal } else { ValueType::Object };
        Series::Object(ObjectSeries::with_nominal(values, nominal))
    }

    /// Encodes `values` as `kind`, which every non-null value must already be.
    pub(crate) fn infer_as(values: Vec<Value>, kind: ValueType) -> Series {
        fn build<T: Primitive>(values: &[Value]) -> Series {
            T::into_series(PrimitiveSeries::from_options(values.iter().map(exact::<T>)))
        }
        match kind {
            ValueType::Int => build::<i32>(&values),
            ValueType::Long => build::<i64>(&values),
            ValueType::Double => build::<f64>(&values),
            ValueType::Bool => build::<bool>(&values),
            ValueType::Str | ValueType::Object => {
                Series::Object(ObjectSeries::with_nominal(values, kind))
            }
        }
    }

    pub(crate) fn gather(&self, positions: &[usize]) -> Series {
        same_kind!(self, s => s.gather(positions.iter().copied()))
    }

    pub fn range(&self, from: usize, to: usize) -> SeriesResult<Series> {
        Ok(same_kind!(self, s => s.range(from, to)?))
    }

    /// The first `len` elements; a negative `len` skips that many and returns the rest.
    pub fn head(&self, len: i64) -> Series {
        let size = self.len();
        let n = (len.unsigned_abs() as usize).min(size);
        let (from, to) = if len >= 0 { (0, n) } else { (n, size) };
        same_kind!(self, s => s.gather(from..to))
    }

    /// The last `len` elements; a negative `len` skips that many from the end and returns the rest.
    pub fn tail(&self, len: i64) -> Series {
        let size = self.len();
        let n = (len.unsigned_abs() as usize).min(size);
        let (from, to) = if len >= 0 { (size - n, size) } else { (0, size - n) };
        same_kind!(self, s => s.gather(from..to))
    }

    pub fn select_mask(&self, mask: &BoolSeries) -> SeriesResult<Series> {
        Ok(same_kind!(self, s => s.select_mask(mask)?))
    }

    pub fn select_by(&self, predicate: impl Fn(&Value) -> bool) -> Series {
        let positions: Vec<usize> = (0..self.len())
            .filter(|&i| predicate(&self.value_at(i)))
            .collect();
        self.gather(&positions)
    }

    /// Lazy selection by row positions. Negative positions produce nulls.
    pub fn select_positions(&self, positions: &IntSeries) -> SeriesResult<Series> {
        ObjectSeries::indexed(self.clone(), positions.clone()).map(Series::Object)
    }

    /// Eager selection by row positions that keeps the encoding. Every position must be in bounds.
    pub fn take(&self, positions: &IntSeries) -> SeriesResult<Series> {
        let len = self.len();
        let mut out = Vec::with_capacity(positions.len());
        for p in positions.iter() {
            match p {
                Some(p) if p >= 0 && (p as usize) < len => out.push(p as usize),
                other => {
                    return Err(SeriesError::IndexOutOfBounds {
                        index: other.map_or(-1, i64::from),
                        len,
                    })
                }
            }
        }
        Ok(self.gather(&out))
    }

    /// Positions of the elements matching `predicate`.
    pub fn index(&self, predicate: impl Fn(&Value) -> bool) -> IntSeries {
        (0..self.len())
            .filter(|&i| predicate(&self.value_at(i)))
            .map(|i| i as i32)
            .collect()
    }

    /// Boolean mask of the elements matching `predicate`.
    pub fn locate(&self, predicate: impl Fn(&Value) -> bool) -> BoolSeries {
        self.iter().map(|v| predicate(&v)).collect()
    }

    /// Generic element-wise transform.
    pub fn map(&self, f: impl Fn(&Value) -> Value) -> Series {
        Series::of_values(self.iter().map(|v| f(&v)).collect())
    }

    /// Element-wise transform into a primitive encoding; `None` results become nulls.
    pub fn map_as<T: Primitive>(&self, f: impl Fn(&Value) -> Option<T>) -> PrimitiveSeries<T> {
        PrimitiveSeries::from_options(self.iter().map(|v| f(&v)))
    }

    pub fn map_as_int(&self, f: impl Fn(&Value) -> Option<i32>) -> IntSeries {
        self.map_as(f)
    }

    pub fn map_as_long(&self, f: impl Fn(&Value) -> Option<i64>) -> LongSeries {
        self.map_as(f)
    }

    pub fn map_as_double(&self, f: impl Fn(&Value) -> Option<f64>) -> DoubleSeries {
        self.map_as(f)
    }

    pub fn map_as_bool(&self, f: impl Fn(&Value) -> Option<bool>) -> BoolSeries {
        self.map_as(f)
    }

    /// Appends `others` after this series. Same-kind primitive inputs stay primitive.
    pub fn concat(&self, others: &[&Series]) -> Series {
        fn same<T: Primitive>(first: &PrimitiveSeries<T>, others: &[&Series]) -> Option<Series> {
            let rest: Option<Vec<&PrimitiveSeries<T>>> =
                others.iter().map(|s| T::from_series(*s)).collect();
            rest.map(|rest| T::into_series(first.concat(&rest)))
        }

        let fast = match self {
            Series::Int(s) => same(s, others),
            Series::Long(s) => same(s, others),
            Series::Double(s) => same(s, others),
            Series::Bool(s) => same(s, others),
            Series::Object(_) => None,
        };
        if let Some(series) = fast {
            return series;
        }

        let nominal = others
            .iter()
            .fold(self.nominal_type(), |k, s| k.common(s.nominal_type()));
        let mut values = self.to_values();
        for s in others {
            values.extend(s.iter());
        }
        Series::Object(ObjectSeries::with_nominal(values, nominal))
    }

    /// A copy with `value` added at the end. A primitive series keeps its encoding when `value`
    /// is null or of the same kind.
    pub fn append(&self, value: impl Into<Value>) -> Series {
        fn push<T: Primitive>(s: &PrimitiveSeries<T>, value: &Value) -> Option<Series> {
            let v = exact::<T>(value);
            (value.is_null() || v.is_some()).then(|| T::into_series(s.push(v)))
        }

        let value = value.into();
        let fast = match self {
            Series::Int(s) => push(s, &value),
            Series::Long(s) => push(s, &value),
            Series::Double(s) => push(s, &value),
            Series::Bool(s) => push(s, &value),
            Series::Object(_) => None,
        };
        if let Some(series) = fast {
            return series;
        }
        let mut values = Vec::with_capacity(self.len() + 1);
        values.extend(self.iter());
        values.push(value);
        self.rebuild(values)
    }

    /// All values rendered in order, nulls as `null`, separated by `delimiter` and wrapped in
    /// `prefix` and `suffix`.
    pub fn join(&self, delimiter: &str, prefix: &str, suffix: &str) -> String {
        let mut out = String::from(prefix);
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                out.push_str(delimiter);
            }
            let _ = write!(out, "{v}");
        }
        out.push_str(suffix);
        out
    }

    /// Element-wise comparison producing a boolean mask.
    ///
    /// `eq`/`ne` use [`Value::same_value`]: nulls equal each other and numbers of different kinds
    /// compare by value. Ordering operators yield `false` when either side is null or NaN and
    /// fail for kinds that cannot be ordered.
    pub fn compare(&self, op: CmpOp, other: &Series) -> SeriesResult<BoolSeries> {
        SeriesError::check_size(self.len(), other.len())?;
        match (self, other) {
            (Series::Int(l), Series::Int(r)) => l.compare_op(op, r),
            (Series::Long(l), Series::Long(r)) => l.compare_op(op, r),
            (Series::Double(l), Series::Double(r)) => l.compare_op(op, r),
            (Series::Bool(l), Series::Bool(r)) => l.compare_op(op, r),
            _ => self.compare_generic(op, other),
        }
    }

    fn compare_generic(&self, op: CmpOp, other: &Series) -> SeriesResult<BoolSeries> {
        log::trace!(
            "generic '{}' between {} and {} series of size {}",
            op.symbol(),
            self.nominal_type(),
            other.nominal_type(),
            self.len()
        );
        let mut out = Vec::with_capacity(self.len());
        for (l, r) in self.iter().zip(other.iter()) {
            let hit = match op {
                CmpOp::Eq => l.same_value(&r),
                CmpOp::Ne => !l.same_value(&r),
                _ => l
                    .compare(&r)
                    .map_err(SeriesError::TypeMismatch)?
                    .is_some_and(|ord| op.test(ord)),
            };
            out.push(hit);
        }
        Ok(BoolSeries::new(out))
    }

    pub fn eq(&self, other: &Series) -> SeriesResult<BoolSeries> {
        self.compare(CmpOp::Eq, other)
    }

    pub fn ne(&self, other: &Series) -> SeriesResult<BoolSeries> {
        self.compare(CmpOp::Ne, other)
    }

    pub fn lt(&self, other: &Series) -> SeriesResult<BoolSeries> {
        self.compare(CmpOp::Lt, other)
    }

    pub fn le(&self, other: &Series) -> SeriesResult<BoolSeries> {
        self.compare(CmpOp::Le, other)
    }

    pub fn gt(&self, other: &Series) -> SeriesResult<BoolSeries> {
        self.compare(CmpOp::Gt, other)
    }

    pub fn ge(&self, other: &Series) -> SeriesResult<BoolSeries> {
        self.compare(CmpOp::Ge, other)
    }

    /// `from <= self <= to`, element-wise.
    pub fn between(&self, from: &Series, to: &Series) -> SeriesResult<BoolSeries> {
        self.ge(from)?.and(&self.le(to)?)
    }

    /// Element-wise arithmetic. Nulls propagate; integer arithmetic wraps; integer division by
    /// zero fails. Mixed numeric kinds widen to `Long` (integral) or `Double`.
    pub fn arithmetic(&self, op: ArithOp, other: &Series) -> SeriesResult<Series> {
        SeriesError::check_size(self.len(), other.len())?;
        match (self, other) {
            (Series::Int(l), Series::Int(r)) => l.arith_op(op, r).map(Series::Int),
            (Series::Long(l), Series::Long(r)) => l.arith_op(op, r).map(Series::Long),
            (Series::Double(l), Series::Double(r)) => l.arith_op(op, r).map(Series::Double),
            _ => {
                log::trace!(
                    "generic '{}' between {} and {} series of size {}",
                    op.symbol(),
                    self.nominal_type(),
                    other.nominal_type(),
                    self.len()
                );
                let mut values = Vec::with_capacity(self.len());
                for (index, (l, r)) in self.iter().zip(other.iter()).enumerate() {
                    values.push(arith_values(op, &l, &r, index)?);
                }
                Ok(Series::infer(values))
            }
        }
    }

    pub fn add(&self, other: &Series) -> SeriesResult<Series> {
        self.arithmetic(ArithOp::Add, other)
    }

    pub fn sub(&self, other: &Series) -> SeriesResult<Series> {
        self.arithmetic(ArithOp::Sub, other)
    }

    pub fn mul(&self, other: &Series) -> SeriesResult<Series> {
        self.arithmetic(ArithOp::Mul, other)
    }

    pub fn div(&self, other: &Series) -> SeriesResult<Series> {
        self.arithmetic(ArithOp::Div, other)
    }

    pub fn modulo(&self, other: &Series) -> SeriesResult<Series> {
        self.arithmetic(ArithOp::Mod, other)
    }

    /// Boolean view of this series. Fails if a non-null value is not a bool.
    pub fn as_bool_mask(&self) -> SeriesResult<BoolSeries> {
        self.cast_as_bool()
    }

    pub fn and(&self, other: &Series) -> SeriesResult<BoolSeries> {
        self.as_bool_mask()?.and(&other.as_bool_mask()?)
    }

    pub fn or(&self, other: &Series) -> SeriesResult<BoolSeries> {
        self.as_bool_mask()?.or(&other.as_bool_mask()?)
    }

    pub fn not(&self) -> SeriesResult<BoolSeries> {
        Ok(self.as_bool_mask()?.not())
    }

    pub fn is_null(&self) -> BoolSeries {
        each_kind!(self, s => s.is_null())
    }

    pub fn is_not_null(&self) -> BoolSeries {
        each_kind!(self, s => s.is_not_null())
    }

    pub fn null_count(&self) -> usize {
        match self {
            Series::Int(s) => s.null_count(),
            Series::Long(s) => s.null_count(),
            Series::Double(s) => s.null_count(),
            Series::Bool(s) => s.null_count(),
            Series::Object(s) => s.iter().filter(|v| v.is_null()).count(),
        }
    }

    /// Replaces nulls with `value`.
    pub fn fill_nulls(&self, value: &Value) -> Series {
        if value.is_null() {
            return self.clone();
        }
        match self {
            Series::Int(s) => {
                if let Some(v) = exact(value) {
                    return Series::Int(s.fill_nulls(v));
                }
            }
            Series::Long(s) => {
                if let Some(v) = exact(value) {
                    return Series::Long(s.fill_nulls(v));
                }
            }
            Series::Double(s) => {
                if let Some(v) = exact(value) {
                    return Series::Double(s.fill_nulls(v));
                }
            }
            Series::Bool(s) => {
                if let Some(v) = exact(value) {
                    return Series::Bool(s.fill_nulls(v));
                }
            }
            Series::Object(_) => {}
        }
        self.rebuild(
            self.iter()
                .map(|v| if v.is_null() { value.clone() } else { v })
                .collect(),
        )
    }

    /// Replaces each null with the value at the same position of `values`.
    pub fn fill_nulls_from(&self, values: &Series) -> SeriesResult<Series> {
        SeriesError::check_size(self.len(), values.len())?;
        match (self, values) {
            (Series::Int(l), Series::Int(r)) => l.fill_nulls_from(r).map(Series::Int),
            (Series::Long(l), Series::Long(r)) => l.fill_nulls_from(r).map(Series::Long),
            (Series::Double(l), Series::Double(r)) => l.fill_nulls_from(r).map(Series::Double),
            (Series::Bool(l), Series::Bool(r)) => l.fill_nulls_from(r).map(Series::Bool),
            _ => Ok(self.rebuild(
                self.iter()
                    .zip(values.iter())
                    .map(|(v, with)| if v.is_null() { with } else { v })
                    .collect(),
            )),
        }
    }

    /// Replaces each null with the nearest preceding non-null value.
    pub fn fill_nulls_forward(&self) -> Series {
        match self {
            Series::Object(_) => {
                let mut last = Value::Null;
                self.rebuild(
                    self.iter()
                        .map(|v| {
                            if !v.is_null() {
                                last = v;
                            }
                            last.clone()
                        })
                        .collect(),
                )
            }
            Series::Int(s) => Series::Int(s.fill_nulls_forward()),
            Series::Long(s) => Series::Long(s.fill_nulls_forward()),
            Series::Double(s) => Series::Double(s.fill_nulls_forward()),
            Series::Bool(s) => Series::Bool(s.fill_nulls_forward()),
        }
    }

    /// Replaces each null with the nearest following non-null value.
    pub fn fill_nulls_backward(&self) -> Series {
        match self {
            Series::Object(_) => {
                let mut next = Value::Null;
                let mut values: Vec<Value> = self
                    .to_values()
                    .into_iter()
                    .rev()
                    .map(|v| {
                        if !v.is_null() {
                            next = v;
                        }
                        next.clone()
                    })
                    .collect();
                values.reverse();
                self.rebuild(values)
            }
            Series::Int(s) => Series::Int(s.fill_nulls_backward()),
            Series::Long(s) => Series::Long(s.fill_nulls_backward()),
            Series::Double(s) => Series::Double(s.fill_nulls_backward()),
            Series::Bool(s) => Series::Bool(s.fill_nulls_backward()),
        }
    }

    /// Replaces the elements selected by `mask` with `with`.
    pub fn replace(&self, mask: &BoolSeries, with: &Value) -> SeriesResult<Series> {
        self.replace_where(mask, with, true)
    }

    /// Replaces the elements not selected by `mask` with `with`.
    pub fn replace_no_match(&self, mask: &BoolSeries, with: &Value) -> SeriesResult<Series> {
        self.replace_where(mask, with, false)
    }

    fn replace_where(&self, mask: &BoolSeries, with: &Value, hit: bool) -> SeriesResult<Series> {
        SeriesError::check_size(self.len(), mask.len())?;

        macro_rules! primitive {
            ($s:expr, $variant:ident) => {{
                let v = exact(with);
                if with.is_null() || v.is_some() {
                    let out = if hit {
                        $s.replace(mask, v)?
                    } else {
                        $s.replace_no_match(mask, v)?
                    };
                    return Ok(Series::$variant(out));
                }
            }};
        }

        match self {
            Series::Int(s) => primitive!(s, Int),
            Series::Long(s) => primitive!(s, Long),
            Series::Double(s) => primitive!(s, Double),
            Series::Bool(s) => primitive!(s, Bool),
            Series::Object(_) => {}
        }
        Ok(self.rebuild(
            self.iter()
                .enumerate()
                .map(|(i, v)| if mask.is_true(i) == hit { with.clone() } else { v })
                .collect(),
        ))
    }

    /// Writes `with[i]` at `positions[i]`.
    pub fn replace_positions(&self, positions: &IntSeries, with: &Series) -> SeriesResult<Series> {
        SeriesError::check_size(positions.len(), with.len())?;
        let len = self.len();
        let mut values = self.to_values();
        for (i, p) in positions.iter().enumerate() {
            let p = match p {
                Some(p) if p >= 0 && (p as usize) < len => p as usize,
                other => {
                    return Err(SeriesError::IndexOutOfBounds {
                        index: other.map_or(-1, i64::from),
                        len,
                    })
                }
            };
            values[p] = with.value_at(i);
        }
        Ok(self.rebuild(values))
    }

    /// Moves values by `offset` positions (forward when positive) and fills the gap with `filler`.
    pub fn shift(&self, offset: i64, filler: &Value) -> Series {
        let len = self.len();
        let n = (offset.unsigned_abs() as usize).min(len);
        if n == 0 {
            return self.clone();
        }
        let mut values = Vec::with_capacity(len);
        if offset > 0 {
            values.extend(std::iter::repeat(filler.clone()).take(n));
            values.extend((0..len - n).map(|i| self.value_at(i)));
        } else {
            values.extend((n..len).map(|i| self.value_at(i)));
            values.extend(std::iter::repeat(filler.clone()).take(n));
        }
        self.rebuild(values)
    }

    pub fn first(&self) -> Option<Value> {
        (!self.is_empty()).then(|| self.value_at(0))
    }

    pub fn last(&self) -> Option<Value> {
        self.len().checked_sub(1).map(|i| self.value_at(i))
    }

    /// A random sample of `size` elements, in their original relative order.
    pub fn sample<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> SeriesResult<Series> {
        if size > self.len() {
            return Err(SeriesError::InvalidArgument(format!(
                "sample size {size} is larger than the series size {}",
                self.len()
            )));
        }
        let mut positions = rand::seq::index::sample(rng, self.len(), size).into_vec();
        positions.sort_unstable();
        Ok(self.gather(&positions))
    }
}

fn invalid_cast<T: Primitive>(value: &Value, index: usize) -> SeriesError {
    SeriesError::InvalidCast {
        expected: T::KIND,
        actual: kind_of(value),
        index,
    }
}

fn kind_of(value: &Value) -> String {
    value
        .value_type()
        .map_or_else(|| "null".to_string(), |k| k.name().to_string())
}

fn arith_values(op: ArithOp, l: &Value, r: &Value, index: usize) -> SeriesResult<Value> {
    fn apply<N: Numeric>(op: ArithOp, l: N, r: N, index: usize) -> SeriesResult<N> {
        let out = match op {
            ArithOp::Add => Some(l.add(r)),
            ArithOp::Sub => Some(l.sub(r)),
            ArithOp::Mul => Some(l.mul(r)),
            ArithOp::Div => l.div(r),
            ArithOp::Mod => l.rem(r),
        };
        out.ok_or(SeriesError::DivisionByZero { index })
    }

    match (l, r) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Int(a), Value::Int(b)) => apply(op, *a, *b, index).map(Value::Int),
        (Value::Int(_) | Value::Long(_), Value::Int(_) | Value::Long(_)) => {
            match (l.as_i64(), r.as_i64()) {
                (Some(a), Some(b)) => apply(op, a, b, index).map(Value::Long),
                _ => Ok(Value::Null),
            }
        }
        _ => match (l.as_f64(), r.as_f64()) {
            (Some(a), Some(b)) => apply(op, a, b, index).map(Value::double),
            _ => Err(SeriesError::TypeMismatch(format!(
                "cannot apply '{}' to {} and {}",
                op.symbol(),
                kind_of(l),
                kind_of(r)
            ))),
        },
    }
}

impl From<IntSeries> for Series {
    fn from(s: IntSeries) -> Self {
        Series::Int(s)
    }
}

impl From<LongSeries> for Series {
    fn from(s: LongSeries) -> Self {
        Series::Long(s)
    }
}

impl From<DoubleSeries> for Series {
    fn from(s: DoubleSeries) -> Self {
        Series::Double(s)
    }
}

impl From<BoolSeries> for Series {
    fn from(s: BoolSeries) -> Self {
        Series::Bool(s)
    }
}

impl From<ObjectSeries> for Series {
    fn from(s: ObjectSeries) -> Self {
        Series::Object(s)
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("]")
    }
}
