use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Element kind of a [`crate::Series`].
///
/// `Object` is the "any" marker: it is the nominal type of generic series and the inferred type
/// of a series whose values are all null or of mixed kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Long,
    Double,
    Bool,
    Str,
    #[default]
    Object,
}

impl ValueType {
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            ValueType::Int | ValueType::Long | ValueType::Double | ValueType::Bool
        )
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Int | ValueType::Long | ValueType::Double)
    }

    /// Most specific type shared by both kinds.
    pub fn common(self, other: ValueType) -> ValueType {
        if self == other {
            self
        } else {
            ValueType::Object
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Double => "double",
            ValueType::Bool => "bool",
            ValueType::Str => "str",
            ValueType::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell value.
///
/// Doubles are wrapped in [`OrderedFloat`] so that values can be hashed and compared for
/// equality: `0.0 == -0.0` and `NaN == NaN`. `Int(1)` and `Long(1)` are distinct values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Value {
    #[default]
    Null,
    Int(i32),
    Long(i64),
    Double(OrderedFloat<f64>),
    Bool(bool),
    Str(Arc<str>),
}

#[derive(Clone, Copy)]
enum Num {
    Integral(i64),
    Float(f64),
}

impl Value {
    pub fn double(v: f64) -> Self {
        Value::Double(OrderedFloat(v))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The kind of this value, or `None` for null.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(ValueType::Int),
            Value::Long(_) => Some(ValueType::Long),
            Value::Double(_) => Some(ValueType::Double),
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Str(_) => Some(ValueType::Str),
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Lossless widening from `Int` and `Long`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Long(v) => Some(*v as f64),
            Value::Double(v) => Some(v.0),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    fn as_num(&self) -> Option<Num> {
        match self {
            Value::Int(v) => Some(Num::Integral(*v as i64)),
            Value::Long(v) => Some(Num::Integral(*v)),
            Value::Double(v) => Some(Num::Float(v.0)),
            _ => None,
        }
    }

    /// Ordering used by comparison operators.
    ///
    /// Returns `Ok(None)` when either side is null or the numbers are unordered (NaN), and an
    /// error when the kinds cannot be compared at all.
    pub fn compare(&self, other: &Value) -> Result<Option<Ordering>, String> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => Ok(None),
            (Value::Str(l), Value::Str(r)) => Ok(Some(l.as_ref().cmp(r.as_ref()))),
            (Value::Bool(l), Value::Bool(r)) => Ok(Some(l.cmp(r))),
            _ => match (self.as_num(), other.as_num()) {
                (Some(Num::Integral(l)), Some(Num::Integral(r))) => Ok(Some(l.cmp(&r))),
                (Some(l), Some(r)) => Ok(num_to_f64(l).partial_cmp(&num_to_f64(r))),
                _ => Err(format!("cannot compare {self:?} with {other:?}")),
            },
        }
    }

    /// Equality used by the `eq`/`ne` operators. Same as `==`, except that numbers of different
    /// kinds are equal when [`Value::compare`] orders them as equal.
    pub fn same_value(&self, other: &Value) -> bool {
        if self.value_type() == other.value_type() {
            return self == other;
        }
        match (self.as_num(), other.as_num()) {
            (Some(_), Some(_)) => self.compare(other) == Ok(Some(Ordering::Equal)),
            _ => false,
        }
    }

    /// Total order used for sorting: values of comparable kinds in natural order, nulls last,
    /// NaN after all other doubles, mixed non-comparable kinds by kind.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::Str(l), Value::Str(r)) => l.as_ref().cmp(r.as_ref()),
            (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
            _ => match (self.as_num(), other.as_num()) {
                (Some(Num::Integral(l)), Some(Num::Integral(r))) => l.cmp(&r),
                (Some(l), Some(r)) => OrderedFloat(num_to_f64(l)).cmp(&OrderedFloat(num_to_f64(r))),
                _ => self.kind_rank().cmp(&other.kind_rank()),
            },
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::Long(_) | Value::Double(_) => 1,
            Value::Str(_) => 2,
            Value::Null => 3,
        }
    }
}

fn num_to_f64(n: Num) -> f64 {
    match n {
        Num::Integral(v) => v as f64,
        Num::Float(v) => v,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{}", v.0),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<Arc<str>> for Value {
    fn from(v: Arc<str>) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_equality_treats_signed_zeros_and_nan_as_equal() {
        assert_eq!(Value::double(0.0), Value::double(-0.0));
        assert_eq!(Value::double(f64::NAN), Value::double(f64::NAN));
        assert_ne!(Value::Int(1), Value::Long(1));
    }

    #[test]
    fn compare_mixes_numeric_kinds_and_skips_nulls() {
        assert_eq!(
            Value::Int(1).compare(&Value::double(1.5)),
            Ok(Some(Ordering::Less))
        );
        assert_eq!(Value::Null.compare(&Value::Int(1)), Ok(None));
        assert_eq!(Value::double(f64::NAN).compare(&Value::double(1.0)), Ok(None));
        assert!(Value::from("a").compare(&Value::Int(1)).is_err());
    }

    #[test]
    fn same_value_crosses_numeric_kinds() {
        assert!(Value::Int(1).same_value(&Value::Long(1)));
        assert!(Value::Long(2).same_value(&Value::double(2.0)));
        assert!(!Value::Int(1).same_value(&Value::Long(2)));
        assert!(!Value::Int(1).same_value(&Value::from("1")));
        assert!(!Value::Int(1).same_value(&Value::Null));
        assert!(Value::Null.same_value(&Value::Null));
        assert!(Value::double(f64::NAN).same_value(&Value::double(f64::NAN)));
        assert!(!Value::double(f64::NAN).same_value(&Value::Long(0)));
    }

    #[test]
    fn total_cmp_puts_nulls_last() {
        let mut values = vec![Value::Null, Value::Long(3), Value::Int(-1), Value::double(2.5)];
        values.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(
            values,
            vec![Value::Int(-1), Value::double(2.5), Value::Long(3), Value::Null]
        );
    }
}
