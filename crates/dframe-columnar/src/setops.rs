//! Value-equality set operations: `unique`, `diff`, `intersect` and membership tests.
//!
//! Results keep the order of `self`. `diff` and `intersect` keep every occurrence of a value in
//! `self` (duplicates included) that lacks/has a match in `other`. Nulls match nulls.

use crate::primitive::{BoolSeries, Primitive, PrimitiveSeries};
use crate::series::{exact, Series};
use crate::types::Value;
use ahash::AHashSet;

fn key_set<T: Primitive>(series: &PrimitiveSeries<T>) -> AHashSet<Option<T::Key>> {
    series.iter().map(|v| v.map(T::key)).collect()
}

fn positions_where(len: usize, mut keep: impl FnMut(usize) -> bool) -> Vec<usize> {
    (0..len).filter(|&i| keep(i)).collect()
}

fn primitive_membership<T: Primitive>(
    this: &PrimitiveSeries<T>,
    other: &PrimitiveSeries<T>,
    present: bool,
) -> Vec<usize> {
    let keys = key_set(other);
    positions_where(this.len(), |i| {
        keys.contains(&this.opt(i).map(T::key)) == present
    })
}

fn generic_membership(this: &Series, other: &Series, present: bool) -> Vec<usize> {
    let values: AHashSet<Value> = other.iter().collect();
    positions_where(this.len(), |i| {
        values.contains(&this.value_at(i)) == present
    })
}

fn membership(this: &Series, other: &Series, present: bool) -> Vec<usize> {
    match (this, other) {
        (Series::Int(l), Series::Int(r)) => primitive_membership(l, r, present),
        (Series::Long(l), Series::Long(r)) => primitive_membership(l, r, present),
        (Series::Double(l), Series::Double(r)) => primitive_membership(l, r, present),
        (Series::Bool(l), Series::Bool(r)) => primitive_membership(l, r, present),
        _ => generic_membership(this, other, present),
    }
}

fn primitive_in<T: Primitive>(series: &PrimitiveSeries<T>, values: &[Value]) -> BoolSeries {
    let with_null = values.iter().any(Value::is_null);
    let keys: AHashSet<T::Key> = values.iter().filter_map(exact::<T>).map(T::key).collect();
    series
        .iter()
        .map(|v| match v {
            Some(v) => keys.contains(&v.key()),
            None => with_null,
        })
        .collect()
}

impl Series {
    /// First occurrence of each distinct value, in order.
    pub fn unique(&self) -> Series {
        fn first_seen<T: Primitive>(s: &PrimitiveSeries<T>) -> Vec<usize> {
            let mut seen = AHashSet::with_capacity(s.len());
            positions_where(s.len(), |i| seen.insert(s.opt(i).map(T::key)))
        }

        let positions = match self {
            Series::Int(s) => first_seen(s),
            Series::Long(s) => first_seen(s),
            Series::Double(s) => first_seen(s),
            Series::Bool(s) => first_seen(s),
            Series::Object(_) => {
                let mut seen = AHashSet::with_capacity(self.len());
                positions_where(self.len(), |i| seen.insert(self.value_at(i)))
            }
        };
        if positions.len() == self.len() {
            return self.clone();
        }
        self.gather(&positions)
    }

    /// Elements of `self` that have no equal element in `other`.
    pub fn diff(&self, other: &Series) -> Series {
        if other.is_empty() {
            return self.clone();
        }
        self.gather(&membership(self, other, false))
    }

    /// Elements of `self` that have an equal element in `other`.
    pub fn intersect(&self, other: &Series) -> Series {
        if other.is_empty() {
            return self.head(0);
        }
        self.gather(&membership(self, other, true))
    }

    /// Mask of the elements equal to one of `values`.
    pub fn in_values(&self, values: &[Value]) -> BoolSeries {
        match self {
            Series::Int(s) => primitive_in(s, values),
            Series::Long(s) => primitive_in(s, values),
            Series::Double(s) => primitive_in(s, values),
            Series::Bool(s) => primitive_in(s, values),
            Series::Object(_) => {
                let set: AHashSet<&Value> = values.iter().collect();
                self.iter().map(|v| set.contains(&v)).collect()
            }
        }
    }

    pub fn not_in_values(&self, values: &[Value]) -> BoolSeries {
        self.in_values(values).not()
    }
}
