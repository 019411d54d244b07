//! Typed per-column readers over an arbitrary source row type.

use crate::builder::{BuilderOptions, SeriesBuilder};
use crate::error::SeriesResult;
use crate::series::Series;
use crate::types::{Value, ValueType};

type ReadFn<R, T> = Box<dyn Fn(&R) -> T>;

enum Read<R: ?Sized> {
    Int(ReadFn<R, Option<i32>>),
    Long(ReadFn<R, Option<i64>>),
    Double(ReadFn<R, Option<f64>>),
    Bool(ReadFn<R, Option<bool>>),
    Value(ValueType, ReadFn<R, Value>),
}

/// Reads one column value out of a source row `R`.
///
/// Primitive extractors hand their values straight to a primitive builder.
pub struct Extractor<R: ?Sized> {
    read: Read<R>,
}

impl<R: ?Sized + 'static> Extractor<R> {
    pub fn int(f: impl Fn(&R) -> Option<i32> + 'static) -> Self {
        Self {
            read: Read::Int(Box::new(f)),
        }
    }

    pub fn long(f: impl Fn(&R) -> Option<i64> + 'static) -> Self {
        Self {
            read: Read::Long(Box::new(f)),
        }
    }

    pub fn double(f: impl Fn(&R) -> Option<f64> + 'static) -> Self {
        Self {
            read: Read::Double(Box::new(f)),
        }
    }

    pub fn bool(f: impl Fn(&R) -> Option<bool> + 'static) -> Self {
        Self {
            read: Read::Bool(Box::new(f)),
        }
    }

    pub fn str(f: impl Fn(&R) -> Option<String> + 'static) -> Self {
        Self {
            read: Read::Value(
                ValueType::Str,
                Box::new(move |row| f(row).map_or(Value::Null, Value::from)),
            ),
        }
    }

    /// Untyped extractor producing a generic column.
    pub fn col(f: impl Fn(&R) -> Value + 'static) -> Self {
        Self {
            read: Read::Value(ValueType::Object, Box::new(f)),
        }
    }

    /// The same value for every row.
    pub fn val(value: Value) -> Self {
        let kind = value.value_type().unwrap_or_default();
        Self {
            read: Read::Value(kind, Box::new(move |_| value.clone())),
        }
    }
}

impl Extractor<[Value]> {
    /// Reads position `pos` of a `[Value]` row; missing positions read as null.
    pub fn at(pos: usize) -> Self {
        Self::col(move |row: &[Value]| row.get(pos).cloned().unwrap_or_default())
    }
}

impl<R: ?Sized> Read<R> {
    fn value(&self, row: &R) -> Value {
        match self {
            Read::Int(f) => f(row).into(),
            Read::Long(f) => f(row).into(),
            Read::Double(f) => f(row).into(),
            Read::Bool(f) => f(row).into(),
            Read::Value(_, f) => f(row),
        }
    }
}

impl<R: ?Sized> Extractor<R> {
    pub fn kind(&self) -> ValueType {
        match &self.read {
            Read::Int(_) => ValueType::Int,
            Read::Long(_) => ValueType::Long,
            Read::Double(_) => ValueType::Double,
            Read::Bool(_) => ValueType::Bool,
            Read::Value(kind, _) => *kind,
        }
    }

    pub fn appender(&self, options: BuilderOptions) -> ColumnAppender<'_, R> {
        ColumnAppender {
            extractor: self,
            builder: SeriesBuilder::new(self.kind(), options),
        }
    }
}

/// Builds one column by running an [`Extractor`] over a stream of rows.
pub struct ColumnAppender<'a, R: ?Sized> {
    extractor: &'a Extractor<R>,
    builder: SeriesBuilder,
}

impl<R: ?Sized> ColumnAppender<'_, R> {
    pub fn append(&mut self, row: &R) -> SeriesResult<()> {
        match (&self.extractor.read, &mut self.builder) {
            (Read::Int(f), SeriesBuilder::Int(b)) => b.push(f(row)),
            (Read::Long(f), SeriesBuilder::Long(b)) => b.push(f(row)),
            (Read::Double(f), SeriesBuilder::Double(b)) => b.push(f(row)),
            (Read::Bool(f), SeriesBuilder::Bool(b)) => b.push(f(row)),
            (read, builder) => return builder.push(read.value(row)),
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.builder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builder.is_empty()
    }

    pub fn finish(self) -> Series {
        self.builder.finish()
    }
}
