#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::error::{SeriesError, SeriesResult};
use crate::object::ObjectSeries;
use crate::primitive::{Primitive, PrimitiveSeries};
use crate::series::Series;
use crate::types::{Value, ValueType};

#[derive(Debug, Clone, Copy)]
pub struct BuilderOptions {
    /// Expected number of values; only used to pre-size buffers.
    pub capacity: usize,
    /// When the declared kind is `Object`, pick a primitive encoding at `finish` if every
    /// non-null value turned out to share one primitive kind.
    pub infer_primitives: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            capacity: 1024,
            infer_primitives: false,
        }
    }
}

/// Accumulates values into the encoding matching a declared [`ValueType`].
pub enum SeriesBuilder {
    Int(PrimitiveBuilder<i32>),
    Long(PrimitiveBuilder<i64>),
    Double(PrimitiveBuilder<f64>),
    Bool(PrimitiveBuilder<bool>),
    Object(ObjectBuilder),
}

impl SeriesBuilder {
    pub fn new(kind: ValueType, options: BuilderOptions) -> Self {
        let capacity = options.capacity;
        match kind {
            ValueType::Int => SeriesBuilder::Int(PrimitiveBuilder::with_capacity(capacity)),
            ValueType::Long => SeriesBuilder::Long(PrimitiveBuilder::with_capacity(capacity)),
            ValueType::Double => SeriesBuilder::Double(PrimitiveBuilder::with_capacity(capacity)),
            ValueType::Bool => SeriesBuilder::Bool(PrimitiveBuilder::with_capacity(capacity)),
            ValueType::Str | ValueType::Object => SeriesBuilder::Object(ObjectBuilder {
                values: Vec::with_capacity(capacity),
                kind,
                infer: options.infer_primitives && kind == ValueType::Object,
            }),
        }
    }

    pub fn kind(&self) -> ValueType {
        match self {
            SeriesBuilder::Int(_) => ValueType::Int,
            SeriesBuilder::Long(_) => ValueType::Long,
            SeriesBuilder::Double(_) => ValueType::Double,
            SeriesBuilder::Bool(_) => ValueType::Bool,
            SeriesBuilder::Object(b) => b.kind,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesBuilder::Int(b) => b.len(),
            SeriesBuilder::Long(b) => b.len(),
            SeriesBuilder::Double(b) => b.len(),
            SeriesBuilder::Bool(b) => b.len(),
            SeriesBuilder::Object(b) => b.values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends one value. Fails with `InvalidCast` if the value does not convert to the
    /// declared kind; the builder is left unchanged in that case.
    pub fn push(&mut self, value: Value) -> SeriesResult<()> {
        match self {
            SeriesBuilder::Int(b) => b.push_value(&value),
            SeriesBuilder::Long(b) => b.push_value(&value),
            SeriesBuilder::Double(b) => b.push_value(&value),
            SeriesBuilder::Bool(b) => b.push_value(&value),
            SeriesBuilder::Object(b) => b.push(value),
        }
    }

    pub fn finish(self) -> Series {
        match self {
            SeriesBuilder::Int(b) => Series::Int(b.finish()),
            SeriesBuilder::Long(b) => Series::Long(b.finish()),
            SeriesBuilder::Double(b) => Series::Double(b.finish()),
            SeriesBuilder::Bool(b) => Series::Bool(b.finish()),
            SeriesBuilder::Object(b) => b.finish(),
        }
    }
}

pub struct PrimitiveBuilder<T: Primitive> {
    values: Vec<T>,
    validity: BitVec,
}

impl<T: Primitive> PrimitiveBuilder<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            validity: BitVec::with_capacity_bits(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, value: Option<T>) {
        self.values.push(value.unwrap_or_default());
        self.validity.push(value.is_some());
    }

    pub fn push_value(&mut self, value: &Value) -> SeriesResult<()> {
        if value.is_null() {
            self.push(None);
            return Ok(());
        }
        let v = T::from_value(value).ok_or_else(|| SeriesError::InvalidCast {
            expected: T::KIND,
            actual: value
                .value_type()
                .map_or_else(String::new, |k| k.name().to_string()),
            index: self.len(),
        })?;
        self.push(Some(v));
        Ok(())
    }

    pub fn finish(self) -> PrimitiveSeries<T> {
        PrimitiveSeries::from_parts(self.values, Some(self.validity))
    }
}

pub struct ObjectBuilder {
    values: Vec<Value>,
    kind: ValueType,
    infer: bool,
}

impl ObjectBuilder {
    fn push(&mut self, value: Value) -> SeriesResult<()> {
        if self.kind == ValueType::Str && !value.is_null() && value.as_str().is_none() {
            return Err(SeriesError::InvalidCast {
                expected: ValueType::Str,
                actual: value
                    .value_type()
                    .map_or_else(String::new, |k| k.name().to_string()),
                index: self.values.len(),
            });
        }
        self.values.push(value);
        Ok(())
    }

    fn finish(self) -> Series {
        if self.infer {
            return Series::infer(self.values);
        }
        Series::Object(ObjectSeries::with_nominal(self.values, self.kind))
    }
}

impl Series {
    /// Builds a series from `values`, using a primitive encoding when every non-null value has
    /// the same primitive kind. All-null input stays generic.
    pub fn infer(values: Vec<Value>) -> Series {
        let mut kinds = values.iter().filter_map(Value::value_type);
        let kind = match kinds.next() {
            Some(first) => kinds.fold(first, ValueType::common),
            None => return Series::of_values(values),
        };
        Series::infer_as(values, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{DoubleSeries, LongSeries};

    #[test]
    fn declared_primitive_kind_converts_and_rejects() {
        let mut b = SeriesBuilder::new(ValueType::Long, BuilderOptions::default());
        b.push(Value::Long(7)).unwrap();
        b.push(Value::Int(3)).unwrap();
        b.push(Value::Null).unwrap();
        let err = b.push(Value::from("x")).unwrap_err();
        assert_eq!(
            err,
            SeriesError::InvalidCast {
                expected: ValueType::Long,
                actual: "str".into(),
                index: 3
            }
        );
        assert_eq!(b.len(), 3);
        assert_eq!(
            b.finish(),
            Series::Long(LongSeries::from_options([Some(7), Some(3), None]))
        );
    }

    #[test]
    fn object_builder_infers_when_asked() {
        let options = BuilderOptions {
            infer_primitives: true,
            ..BuilderOptions::default()
        };
        let mut b = SeriesBuilder::new(ValueType::Object, options);
        b.push(Value::double(1.5)).unwrap();
        b.push(Value::Null).unwrap();
        assert_eq!(
            b.finish(),
            Series::Double(DoubleSeries::from_options([Some(1.5), None]))
        );

        let mut plain = SeriesBuilder::new(ValueType::Object, BuilderOptions::default());
        plain.push(Value::double(1.5)).unwrap();
        assert!(!plain.finish().is_primitive());
    }

    #[test]
    fn str_builder_rejects_other_kinds() {
        let mut b = SeriesBuilder::new(ValueType::Str, BuilderOptions::default());
        b.push(Value::from("a")).unwrap();
        assert!(b.push(Value::Bool(true)).is_err());
        assert_eq!(b.finish().nominal_type(), ValueType::Str);
    }

    #[test]
    fn infer_picks_common_kind() {
        assert!(Series::infer(vec![Value::Int(1), Value::Null]).as_int().is_some());
        let mixed = Series::infer(vec![Value::Int(1), Value::Long(2)]);
        assert_eq!(mixed.nominal_type(), ValueType::Object);
        let strs = Series::infer(vec![Value::from("a")]);
        assert_eq!(strs.nominal_type(), ValueType::Str);
    }
}
