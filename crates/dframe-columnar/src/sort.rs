//! Permutation-based sorting.
//!
//! Sorting never moves data directly. A [`RowComparator`] orders row positions, [`Sorter`]
//! stable-sorts `0..height` with it, and the resulting position series is applied to each column.

use crate::primitive::{IntSeries, Primitive, PrimitiveSeries};
use crate::series::Series;
use crate::types::Value;
use std::cmp::Ordering;

/// Orders two row positions.
pub type RowComparator<'a> = Box<dyn Fn(usize, usize) -> Ordering + 'a>;

pub struct Sorter;

impl Sorter {
    /// Stable sort of `0..height` by `cmp`. Rows that compare equal keep their original order.
    pub fn sort_index(height: usize, cmp: impl Fn(usize, usize) -> Ordering) -> IntSeries {
        let mut positions: Vec<usize> = (0..height).collect();
        positions.sort_by(|a, b| cmp(*a, *b));
        positions.into_iter().map(|p| p as i32).collect()
    }

    /// Comparator over one column. Nulls go last unless `nulls_first`, in either direction.
    pub fn comparator(series: &Series, ascending: bool, nulls_first: bool) -> RowComparator<'_> {
        fn primitive<T: Primitive>(
            s: &PrimitiveSeries<T>,
            ascending: bool,
            nulls_first: bool,
        ) -> RowComparator<'_> {
            Box::new(move |a, b| {
                with_nulls(s.opt(a), s.opt(b), ascending, nulls_first, |x, y| {
                    x.total_order(*y)
                })
            })
        }

        match series {
            Series::Int(s) => primitive(s, ascending, nulls_first),
            Series::Long(s) => primitive(s, ascending, nulls_first),
            Series::Double(s) => primitive(s, ascending, nulls_first),
            Series::Bool(s) => primitive(s, ascending, nulls_first),
            Series::Object(s) => Box::new(move |a, b| {
                let (x, y) = (s.value_ref(a), s.value_ref(b));
                with_nulls(
                    (!x.is_null()).then_some(x),
                    (!y.is_null()).then_some(y),
                    ascending,
                    nulls_first,
                    |x, y| x.total_cmp(y),
                )
            }),
        }
    }

    /// Compares with each comparator in turn; the first one that distinguishes the rows wins.
    pub fn chain(comparators: Vec<RowComparator<'_>>) -> RowComparator<'_> {
        Box::new(move |a, b| {
            comparators
                .iter()
                .map(|cmp| cmp(a, b))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

fn with_nulls<T>(
    a: Option<T>,
    b: Option<T>,
    ascending: bool,
    nulls_first: bool,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    let null_order = if nulls_first {
        Ordering::Less
    } else {
        Ordering::Greater
    };
    match (a, b) {
        (Some(a), Some(b)) => {
            let o = cmp(&a, &b);
            if ascending {
                o
            } else {
                o.reverse()
            }
        }
        (None, None) => Ordering::Equal,
        (None, Some(_)) => null_order,
        (Some(_), None) => null_order.reverse(),
    }
}

impl Series {
    /// Permutation that sorts this series by `cmp`.
    pub fn sort_index_by(&self, cmp: impl Fn(&Value, &Value) -> Ordering) -> IntSeries {
        let values = self.to_values();
        Sorter::sort_index(values.len(), |a, b| cmp(&values[a], &values[b]))
    }

    pub fn sort_by(&self, cmp: impl Fn(&Value, &Value) -> Ordering) -> Series {
        self.apply_permutation(&self.sort_index_by(cmp))
    }

    /// Permutation for the natural order, ascending with nulls last.
    pub fn sort_index_natural(&self) -> IntSeries {
        self.sort_index_with(true, false)
    }

    pub fn sort_index_with(&self, ascending: bool, nulls_first: bool) -> IntSeries {
        let cmp = Sorter::comparator(self, ascending, nulls_first);
        Sorter::sort_index(self.len(), cmp)
    }

    /// Sorted copy in natural order; keeps the encoding.
    pub fn sort_natural(&self) -> Series {
        self.apply_permutation(&self.sort_index_natural())
    }

    fn apply_permutation(&self, permutation: &IntSeries) -> Series {
        let positions: Vec<usize> = permutation.as_slice().iter().map(|&p| p as usize).collect();
        self.gather(&positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::IntSeries;

    #[test]
    fn natural_sort_puts_nulls_last_in_both_directions() {
        let s = Series::Int(IntSeries::from_options([Some(2), None, Some(1), Some(3)]));
        assert_eq!(s.sort_index_natural(), IntSeries::new(vec![2, 0, 3, 1]));
        assert_eq!(s.sort_index_with(false, false), IntSeries::new(vec![3, 0, 2, 1]));
        assert_eq!(s.sort_index_with(true, true), IntSeries::new(vec![1, 2, 0, 3]));
    }

    #[test]
    fn chained_keys_break_ties_then_keep_row_order() {
        let a = Series::of_int(vec![1, 2, 1, 0, 1]);
        let b = Series::of_strs(&["x", "y", "z", "a", "x"]);
        let by_a = Sorter::sort_index(5, Sorter::comparator(&a, true, false));
        assert_eq!(by_a, IntSeries::new(vec![3, 0, 2, 4, 1]));

        let by_b = Sorter::sort_index(5, Sorter::comparator(&b, true, false));
        assert_eq!(by_b, IntSeries::new(vec![3, 0, 4, 1, 2]));

        let both = Sorter::chain(vec![
            Sorter::comparator(&a, true, false),
            Sorter::comparator(&b, false, false),
        ]);
        assert_eq!(Sorter::sort_index(5, both), IntSeries::new(vec![3, 2, 0, 4, 1]));
    }

    #[test]
    fn sort_by_custom_comparator() {
        let s = Series::of_strs(&["bb", "a", "ccc"]);
        let sorted = s.sort_by(|x, y| {
            let len = |v: &Value| v.as_str().map_or(0, str::len);
            len(y).cmp(&len(x))
        });
        assert_eq!(sorted, Series::of_strs(&["ccc", "bb", "a"]));
    }

    #[test]
    fn generic_and_primitive_orders_agree() {
        let s = Series::of_double(vec![2.0, f64::NAN, -0.5, 1.0]);
        let boxed = s.unsafe_cast_as(crate::types::ValueType::Object);
        assert_eq!(s.sort_index_natural(), boxed.sort_index_natural());
        assert_eq!(s.sort_index_natural(), IntSeries::new(vec![2, 3, 0, 1]));
    }
}
