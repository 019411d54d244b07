//! Column expressions.
//!
//! An [`Exp`] is an immutable tree. Evaluating it against an [`EvalSource`] (a single
//! [`Series`] or a [`crate::DataFrame`]) produces a new `Series` of the source height, except for
//! aggregates, which produce a single row. Binary nodes hand their evaluated children to the
//! `Series` operators, which pick the primitive fast path when both sides share a primitive kind.

use crate::error::{FrameError, FrameResult};
use crate::sort::SortKey;
use dframe_columnar::{ArithOp, BoolSeries, CmpOp, Series, SeriesError, Value, ValueType};
use std::fmt::Write as _;
use std::sync::Arc;

/// A column reference, by name or by position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColumnRef {
    Name(Arc<str>),
    Position(usize),
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(Arc::from(name))
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef::Name(Arc::from(name))
    }
}

impl From<usize> for ColumnRef {
    fn from(pos: usize) -> Self {
        ColumnRef::Position(pos)
    }
}

/// Something expressions can be evaluated against.
pub trait EvalSource {
    /// Height of constant and column results.
    fn height(&self) -> usize;

    fn resolve(&self, column: &ColumnRef) -> FrameResult<Series>;

    /// Display name of a referenced column, if the source knows it.
    fn column_name(&self, _column: &ColumnRef) -> Option<String> {
        None
    }
}

/// A lone series stands in for every column reference.
impl EvalSource for Series {
    fn height(&self) -> usize {
        self.len()
    }

    fn resolve(&self, _column: &ColumnRef) -> FrameResult<Series> {
        Ok(self.clone())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UnaryOp {
    Not,
    IsNull,
    IsNotNull,
    CastAsStr,
    CumSum,
    In(Arc<[Value]>),
    NotIn(Arc<[Value]>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Cmp(CmpOp),
    Arith(ArithOp),
    And,
    Or,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Cmp(op) => op.symbol(),
            BinaryOp::Arith(op) => op.symbol(),
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

/// Aggregate functions.
///
/// Over an empty or all-null input, `Count` is 0 and `Sum` is zero of the summed kind (null if
/// the kind is unknown). `VConcat` renders nulls as `null`. Every other function yields null.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggFn {
    Count,
    Sum,
    Min,
    Max,
    Avg,
    Median,
    First,
    Last,
    /// All values joined into one string, as [`Series::join`].
    VConcat {
        delimiter: Arc<str>,
        prefix: Arc<str>,
        suffix: Arc<str>,
    },
}

impl AggFn {
    fn name(&self) -> &'static str {
        match self {
            AggFn::Count => "count",
            AggFn::Sum => "sum",
            AggFn::Min => "min",
            AggFn::Max => "max",
            AggFn::Avg => "avg",
            AggFn::Median => "median",
            AggFn::First => "first",
            AggFn::Last => "last",
            AggFn::VConcat { .. } => "vConcat",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Exp {
    /// Evaluates to the value repeated to the source height.
    Const(Value),
    /// A source column, optionally checked and re-encoded as `kind`.
    Column {
        column: ColumnRef,
        kind: Option<ValueType>,
    },
    Unary {
        op: UnaryOp,
        arg: Box<Exp>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Exp>,
        right: Box<Exp>,
    },
    /// String concatenation; a null in any part makes the row null.
    Concat(Vec<Exp>),
    Agg {
        func: AggFn,
        arg: Box<Exp>,
    },
    /// `exp` under another display name.
    Alias {
        exp: Box<Exp>,
        name: Arc<str>,
    },
}

fn column(column: impl Into<ColumnRef>, kind: Option<ValueType>) -> Exp {
    Exp::Column {
        column: column.into(),
        kind,
    }
}

/// Untyped column reference.
pub fn col(c: impl Into<ColumnRef>) -> Exp {
    column(c, None)
}

pub fn int_col(c: impl Into<ColumnRef>) -> Exp {
    column(c, Some(ValueType::Int))
}

pub fn long_col(c: impl Into<ColumnRef>) -> Exp {
    column(c, Some(ValueType::Long))
}

pub fn double_col(c: impl Into<ColumnRef>) -> Exp {
    column(c, Some(ValueType::Double))
}

pub fn bool_col(c: impl Into<ColumnRef>) -> Exp {
    column(c, Some(ValueType::Bool))
}

pub fn str_col(c: impl Into<ColumnRef>) -> Exp {
    column(c, Some(ValueType::Str))
}

pub fn val(value: impl Into<Value>) -> Exp {
    Exp::Const(value.into())
}

pub fn concat(parts: Vec<Exp>) -> Exp {
    Exp::Concat(parts)
}

impl From<Value> for Exp {
    fn from(value: Value) -> Self {
        Exp::Const(value)
    }
}

macro_rules! const_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Exp {
                fn from(value: $ty) -> Self {
                    Exp::Const(Value::from(value))
                }
            }
        )*
    };
}

const_from!(i32, i64, f64, bool, &str, String);

impl Exp {
    fn unary(self, op: UnaryOp) -> Exp {
        Exp::Unary {
            op,
            arg: Box::new(self),
        }
    }

    fn binary(self, op: BinaryOp, other: impl Into<Exp>) -> Exp {
        Exp::Binary {
            op,
            left: Box::new(self),
            right: Box::new(other.into()),
        }
    }

    fn agg(self, func: AggFn) -> Exp {
        Exp::Agg {
            func,
            arg: Box::new(self),
        }
    }

    /// Same expression under a different name. Evaluation is unchanged.
    pub fn alias(self, name: &str) -> Exp {
        let exp = match self {
            Exp::Alias { exp, .. } => exp,
            other => Box::new(other),
        };
        Exp::Alias {
            exp,
            name: Arc::from(name),
        }
    }

    pub fn is_null(self) -> Exp {
        self.unary(UnaryOp::IsNull)
    }

    pub fn is_not_null(self) -> Exp {
        self.unary(UnaryOp::IsNotNull)
    }

    pub fn not(self) -> Exp {
        self.unary(UnaryOp::Not)
    }

    /// String form of each value; nulls stay null.
    pub fn cast_as_str(self) -> Exp {
        self.unary(UnaryOp::CastAsStr)
    }

    pub fn cum_sum(self) -> Exp {
        self.unary(UnaryOp::CumSum)
    }

    pub fn in_values(self, values: Vec<Value>) -> Exp {
        self.unary(UnaryOp::In(values.into()))
    }

    pub fn not_in_values(self, values: Vec<Value>) -> Exp {
        self.unary(UnaryOp::NotIn(values.into()))
    }

    pub fn eq(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Cmp(CmpOp::Eq), other)
    }

    pub fn ne(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Cmp(CmpOp::Ne), other)
    }

    pub fn lt(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Cmp(CmpOp::Lt), other)
    }

    pub fn le(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Cmp(CmpOp::Le), other)
    }

    pub fn gt(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Cmp(CmpOp::Gt), other)
    }

    pub fn ge(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Cmp(CmpOp::Ge), other)
    }

    pub fn add(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Arith(ArithOp::Add), other)
    }

    pub fn sub(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Arith(ArithOp::Sub), other)
    }

    pub fn mul(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Arith(ArithOp::Mul), other)
    }

    pub fn div(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Arith(ArithOp::Div), other)
    }

    pub fn modulo(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Arith(ArithOp::Mod), other)
    }

    pub fn and(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::And, other)
    }

    pub fn or(self, other: impl Into<Exp>) -> Exp {
        self.binary(BinaryOp::Or, other)
    }

    pub fn count(self) -> Exp {
        self.agg(AggFn::Count)
    }

    pub fn sum(self) -> Exp {
        self.agg(AggFn::Sum)
    }

    pub fn min(self) -> Exp {
        self.agg(AggFn::Min)
    }

    pub fn max(self) -> Exp {
        self.agg(AggFn::Max)
    }

    pub fn avg(self) -> Exp {
        self.agg(AggFn::Avg)
    }

    pub fn median(self) -> Exp {
        self.agg(AggFn::Median)
    }

    pub fn first(self) -> Exp {
        self.agg(AggFn::First)
    }

    pub fn last(self) -> Exp {
        self.agg(AggFn::Last)
    }

    /// Joins every value into a single string separated by `delimiter`.
    pub fn vconcat(self, delimiter: &str) -> Exp {
        self.vconcat_wrapped(delimiter, "", "")
    }

    pub fn vconcat_wrapped(self, delimiter: &str, prefix: &str, suffix: &str) -> Exp {
        self.agg(AggFn::VConcat {
            delimiter: Arc::from(delimiter),
            prefix: Arc::from(prefix),
            suffix: Arc::from(suffix),
        })
    }

    pub fn asc(self) -> SortKey {
        SortKey::new(self, true)
    }

    pub fn desc(self) -> SortKey {
        SortKey::new(self, false)
    }

    /// Whether evaluation reduces the source to a single row.
    pub fn is_aggregate(&self) -> bool {
        match self {
            Exp::Agg { .. } => true,
            Exp::Alias { exp, .. } => exp.is_aggregate(),
            _ => false,
        }
    }

    /// Display name without a source: positional columns render as `$col(0)`, `$int(0)`, ...
    pub fn name(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, None::<&Series>);
        out
    }

    /// Display name with positional columns resolved against `source`.
    pub fn name_in<S: EvalSource + ?Sized>(&self, source: &S) -> String {
        let mut out = String::new();
        self.render(&mut out, Some(source));
        out
    }

    fn render<S: EvalSource + ?Sized>(&self, out: &mut String, source: Option<&S>) {
        match self {
            Exp::Const(v) => {
                let _ = write!(out, "{v}");
            }
            Exp::Column { column, kind } => match column {
                ColumnRef::Name(name) => out.push_str(name),
                ColumnRef::Position(pos) => {
                    match source.and_then(|s| s.column_name(column)) {
                        Some(name) => out.push_str(&name),
                        None => {
                            let _ = write!(out, "${}({pos})", positional_prefix(*kind));
                        }
                    }
                }
            },
            Exp::Unary { op, arg } => match op {
                UnaryOp::Not => {
                    out.push_str("not ");
                    arg.render(out, source);
                }
                UnaryOp::IsNull => {
                    arg.render(out, source);
                    out.push_str(" is null");
                }
                UnaryOp::IsNotNull => {
                    arg.render(out, source);
                    out.push_str(" is not null");
                }
                UnaryOp::CastAsStr => call(out, "castAsStr", [arg.as_ref()], source),
                UnaryOp::CumSum => call(out, "cumSum", [arg.as_ref()], source),
                UnaryOp::In(values) | UnaryOp::NotIn(values) => {
                    arg.render(out, source);
                    out.push_str(if matches!(op, UnaryOp::In(_)) {
                        " in ("
                    } else {
                        " not in ("
                    });
                    for (i, v) in values.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        let _ = write!(out, "{v}");
                    }
                    out.push(')');
                }
            },
            Exp::Binary { op, left, right } => {
                left.render(out, source);
                let _ = write!(out, " {} ", op.symbol());
                right.render(out, source);
            }
            Exp::Concat(parts) => call(out, "concat", parts.iter(), source),
            Exp::Agg { func, arg } => call(out, func.name(), [arg.as_ref()], source),
            Exp::Alias { name, .. } => out.push_str(name),
        }
    }

    /// Evaluates against a series or a data frame.
    pub fn eval<S: EvalSource + ?Sized>(&self, source: &S) -> FrameResult<Series> {
        match self {
            Exp::Const(v) => Ok(Series::of_val(v.clone(), source.height())),
            Exp::Column { column, kind } => {
                let series = source.resolve(column)?;
                match kind {
                    Some(kind) => Ok(series.cast_as(*kind)?),
                    None => Ok(series),
                }
            }
            Exp::Unary { op, arg } => eval_unary(op, arg.eval(source)?),
            Exp::Binary { op, left, right } => {
                let l = left.eval(source)?;
                let r = right.eval(source)?;
                Ok(match op {
                    BinaryOp::Cmp(op) => Series::Bool(l.compare(*op, &r)?),
                    BinaryOp::Arith(op) => l.arithmetic(*op, &r)?,
                    BinaryOp::And => Series::Bool(l.and(&r)?),
                    BinaryOp::Or => Series::Bool(l.or(&r)?),
                })
            }
            Exp::Concat(parts) => {
                let columns = parts
                    .iter()
                    .map(|p| p.eval(source))
                    .collect::<FrameResult<Vec<_>>>()?;
                concat_rows(source.height(), &columns)
            }
            Exp::Agg { func, arg } => {
                let series = arg.eval(source)?;
                Ok(Series::of_val(aggregate(func, &series)?, 1))
            }
            Exp::Alias { exp, .. } => exp.eval(source),
        }
    }

    /// Evaluates a condition into a boolean mask.
    pub fn eval_condition<S: EvalSource + ?Sized>(&self, source: &S) -> FrameResult<BoolSeries> {
        Ok(self.eval(source)?.as_bool_mask()?)
    }
}

fn positional_prefix(kind: Option<ValueType>) -> &'static str {
    match kind {
        None | Some(ValueType::Object) => "col",
        Some(ValueType::Int) => "int",
        Some(ValueType::Long) => "long",
        Some(ValueType::Double) => "double",
        Some(ValueType::Bool) => "bool",
        Some(ValueType::Str) => "str",
    }
}

fn call<'a, S: EvalSource + ?Sized>(
    out: &mut String,
    name: &str,
    args: impl IntoIterator<Item = &'a Exp>,
    source: Option<&S>,
) {
    out.push_str(name);
    out.push('(');
    for (i, arg) in args.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        arg.render(out, source);
    }
    out.push(')');
}

fn eval_unary(op: &UnaryOp, series: Series) -> FrameResult<Series> {
    Ok(match op {
        UnaryOp::Not => Series::Bool(series.not()?),
        UnaryOp::IsNull => Series::Bool(series.is_null()),
        UnaryOp::IsNotNull => Series::Bool(series.is_not_null()),
        UnaryOp::CastAsStr => series
            .map(|v| match v {
                Value::Null | Value::Str(_) => v.clone(),
                other => Value::from(other.to_string()),
            })
            .unsafe_cast_as(ValueType::Str),
        UnaryOp::CumSum => match numeric(series, "cumSum")? {
            Series::Int(s) => Series::Long(s.cum_sum()),
            Series::Long(s) => Series::Long(s.cum_sum()),
            Series::Double(s) => Series::Double(s.cum_sum()),
            other => other,
        },
        UnaryOp::In(values) => Series::Bool(series.in_values(values)),
        UnaryOp::NotIn(values) => Series::Bool(series.not_in_values(values)),
    })
}

/// Row-wise string concatenation. Every part must have `height` rows.
fn concat_rows(height: usize, columns: &[Series]) -> FrameResult<Series> {
    if let Some(column) = columns.iter().find(|c| c.len() != height) {
        return Err(SeriesError::SizeMismatch {
            expected: height,
            actual: column.len(),
        }
        .into());
    }
    let mut values = Vec::with_capacity(height);
    'rows: for row in 0..height {
        let mut s = String::new();
        for column in columns {
            match column.get(row)? {
                Value::Null => {
                    values.push(Value::Null);
                    continue 'rows;
                }
                v => {
                    let _ = write!(s, "{v}");
                }
            }
        }
        values.push(Value::from(s));
    }
    Ok(Series::of_values(values).unsafe_cast_as(ValueType::Str))
}

/// `series` re-encoded as a primitive numeric series. All-null series pass through unchanged.
fn numeric(series: Series, what: &str) -> FrameResult<Series> {
    if matches!(
        series,
        Series::Int(_) | Series::Long(_) | Series::Double(_)
    ) || series.null_count() == series.len()
    {
        return Ok(series);
    }
    let kind = series.inferred_type();
    if kind.is_numeric() {
        return Ok(series.cast_as(kind)?);
    }
    Err(FrameError::Eval(format!(
        "{what} requires a numeric column, got {kind}"
    )))
}

fn zero_of(kind: ValueType) -> Value {
    match kind {
        ValueType::Int | ValueType::Long => Value::Long(0),
        ValueType::Double => Value::double(0.0),
        ValueType::Bool | ValueType::Str | ValueType::Object => Value::Null,
    }
}

/// Reduces `series` to one value.
pub(crate) fn aggregate(func: &AggFn, series: &Series) -> FrameResult<Value> {
    let all_null = series.null_count() == series.len();
    Ok(match func {
        AggFn::Count => Value::Int((series.len() - series.null_count()) as i32),
        AggFn::First => series.first().unwrap_or_default(),
        AggFn::Last => series.last().unwrap_or_default(),
        AggFn::Min | AggFn::Max => {
            let values = series.iter().filter(|v| !v.is_null());
            let picked = if *func == AggFn::Min {
                values.min_by(|a, b| a.total_cmp(b))
            } else {
                values.max_by(|a, b| a.total_cmp(b))
            };
            picked.unwrap_or_default()
        }
        AggFn::VConcat {
            delimiter,
            prefix,
            suffix,
        } => Value::from(series.join(delimiter, prefix, suffix)),
        AggFn::Sum if all_null => zero_of(series.nominal_type()),
        AggFn::Avg | AggFn::Median if all_null => Value::Null,
        AggFn::Sum | AggFn::Avg | AggFn::Median => {
            let series = numeric(series.clone(), func.name())?;
            let (sum, avg, median) = match &series {
                Series::Int(s) => (Value::Long(s.sum()), s.avg(), s.median()),
                Series::Long(s) => (Value::Long(s.sum()), s.avg(), s.median()),
                Series::Double(s) => (Value::double(s.sum()), s.avg(), s.median()),
                _ => (Value::Null, None, None),
            };
            match *func {
                AggFn::Sum => sum,
                AggFn::Avg => avg.map_or(Value::Null, Value::double),
                _ => median.map_or(Value::Null, Value::double),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dframe_columnar::IntSeries;

    #[test]
    fn positional_names() {
        assert_eq!(col("a").name(), "a");
        assert_eq!(col(0).name(), "$col(0)");
        assert_eq!(int_col(0).name(), "$int(0)");
        assert_eq!(bool_col(2).name(), "$bool(2)");
    }

    #[test]
    fn derived_names() {
        assert_eq!(col("a").sum().name(), "sum(a)");
        assert_eq!(long_col("a").cum_sum().name(), "cumSum(a)");
        assert_eq!(col("a").add(col("b")).name(), "a + b");
        assert_eq!(col("a").gt(1).and(col("b").is_null()).name(), "a > 1 and b is null");
        assert_eq!(concat(vec![val("_"), col("b")]).name(), "concat(_,b)");
        assert_eq!(col("b").alias("c").name(), "c");
        assert_eq!(col("b").alias("c").alias("d").name(), "d");
    }

    #[test]
    fn eval_against_a_series() {
        let s = Series::of_bool(vec![false, true, true]);
        assert_eq!(
            bool_col("b").eval_condition(&s).unwrap(),
            BoolSeries::new(vec![false, true, true])
        );
        let n = Series::of_int(vec![1, 2, 3]);
        assert_eq!(
            col(0).mul(2).eval(&n).unwrap(),
            Series::of_int(vec![2, 4, 6])
        );
    }

    #[test]
    fn constants_take_the_source_height() {
        let s = Series::of_int(vec![7, 8, 9, 10]);
        let out = val("x").eval(&s).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out.get(3).unwrap(), Value::from("x"));
    }

    #[test]
    fn cast_as_str_keeps_nulls() {
        let s = Series::of_values(vec![Value::from("a"), Value::Null, Value::Int(5)]);
        let out = col(0).cast_as_str().eval(&s).unwrap();
        assert_eq!(out.nominal_type(), ValueType::Str);
        assert_eq!(
            out.to_values(),
            vec![Value::from("a"), Value::Null, Value::from("5")]
        );
    }

    #[test]
    fn concat_rejects_parts_of_another_height() {
        let s = Series::of_strs(&["x", "y", "z"]);
        assert_eq!(
            concat(vec![col(0), col(0).count()]).eval(&s).unwrap_err(),
            FrameError::Series(SeriesError::SizeMismatch {
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn vconcat_joins_into_one_row() {
        let s = Series::Int(IntSeries::from_options([Some(1), None, Some(3)]));
        assert_eq!(col("a").vconcat(";").name(), "vConcat(a)");
        assert_eq!(
            col(0).vconcat_wrapped(", ", "[", "]").eval(&s).unwrap(),
            Series::of_strs(&["[1, null, 3]"])
        );
        let wrapped = AggFn::VConcat {
            delimiter: Arc::from("|"),
            prefix: Arc::from("<"),
            suffix: Arc::from(">"),
        };
        assert_eq!(
            aggregate(&wrapped, &Series::of_int(vec![])).unwrap(),
            Value::from("<>")
        );
    }

    #[test]
    fn aggregates_over_nulls() {
        let nulls = Series::Int(IntSeries::from_options([None, None]));
        assert_eq!(aggregate(&AggFn::Count, &nulls).unwrap(), Value::Int(0));
        assert_eq!(aggregate(&AggFn::Sum, &nulls).unwrap(), Value::Long(0));
        assert_eq!(aggregate(&AggFn::Avg, &nulls).unwrap(), Value::Null);
        assert_eq!(aggregate(&AggFn::Max, &nulls).unwrap(), Value::Null);
        assert_eq!(aggregate(&AggFn::First, &nulls).unwrap(), Value::Null);

        let boxed = Series::of_values(vec![Value::Long(4), Value::Null, Value::Long(2)]);
        assert_eq!(aggregate(&AggFn::Sum, &boxed).unwrap(), Value::Long(6));
        assert_eq!(aggregate(&AggFn::Median, &boxed).unwrap(), Value::double(3.0));
        assert_eq!(aggregate(&AggFn::Min, &boxed).unwrap(), Value::Long(2));

        let strs = Series::of_strs(&["b", "a"]);
        assert_eq!(aggregate(&AggFn::Max, &strs).unwrap(), Value::from("b"));
        assert!(matches!(
            aggregate(&AggFn::Sum, &strs),
            Err(FrameError::Eval(_))
        ));
    }
}
