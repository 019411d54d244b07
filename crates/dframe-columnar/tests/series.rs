use dframe_columnar::{
    BoolSeries, DoubleSeries, IntSeries, LongSeries, Series, SeriesError, Sorter, Value, ValueType,
};
use pretty_assertions::assert_eq;

fn nullable_ints(values: &[Option<i32>]) -> Series {
    Series::Int(IntSeries::from_options(values.iter().copied()))
}

#[test]
fn mask_selection_keeps_nulls_in_order() {
    let s = nullable_ints(&[Some(1), Some(3), Some(1), None]);
    let mask = BoolSeries::new(vec![true, false, true, true]);
    let selected = s.select_mask(&mask).unwrap();
    assert_eq!(selected, nullable_ints(&[Some(1), Some(1), None]));
    assert_eq!(
        selected.to_values(),
        vec![Value::Int(1), Value::Int(1), Value::Null]
    );
}

#[test]
fn mask_of_wrong_size_is_rejected() {
    let s = Series::of_int(vec![1, 2, 3]);
    let err = s.select_mask(&BoolSeries::new(vec![true])).unwrap_err();
    assert_eq!(
        err,
        SeriesError::SizeMismatch {
            expected: 3,
            actual: 1
        }
    );
}

#[test]
fn long_columns_compare_on_the_fast_path() {
    let l = Series::of_long(vec![4, 5, 5]);
    let r = Series::of_long(vec![4, 5, 6]);
    assert_eq!(l.eq(&r).unwrap(), BoolSeries::new(vec![true, true, false]));
}

#[test]
fn get_is_bounds_checked() {
    let s = Series::of_strs(&["a", "b"]);
    assert_eq!(s.get(1).unwrap(), Value::from("b"));
    assert_eq!(
        s.get(2).unwrap_err(),
        SeriesError::IndexOutOfBounds { index: 2, len: 2 }
    );
}

#[test]
fn typed_accessors() {
    let s = Series::of_double(vec![1.5, 2.5]);
    assert_eq!(s.get_double(1).unwrap(), Some(2.5));
    assert!(matches!(
        s.get_int(0),
        Err(SeriesError::InvalidCast {
            expected: ValueType::Int,
            ..
        })
    ));
    let mut out = [0.0; 2];
    s.as_double().unwrap().copy_to(&mut out, 0, 0, 2).unwrap();
    assert_eq!(out, [1.5, 2.5]);
}

#[test]
fn inferred_type_of_generic_series() {
    let s = Series::of_values(vec![Value::from("a"), Value::Null]);
    assert_eq!(s.nominal_type(), ValueType::Object);
    assert_eq!(s.inferred_type(), ValueType::Str);
    assert_eq!(Series::of_values(vec![]).inferred_type(), ValueType::Object);
}

#[test]
fn constant_series() {
    let s = Series::of_val(Value::from("k"), 3);
    assert_eq!(s.len(), 3);
    assert_eq!(s.get(2).unwrap(), Value::from("k"));
    assert_eq!(Series::of_val(Value::Int(4), 2), Series::of_int(vec![4, 4]));
}

#[test]
fn index_and_locate() {
    let s = Series::of_int(vec![5, 1, 7, 2]);
    let big = |v: &Value| v.as_i64().is_some_and(|v| v > 3);
    assert_eq!(s.index(big), IntSeries::new(vec![0, 2]));
    assert_eq!(s.locate(big), BoolSeries::new(vec![true, false, true, false]));
    assert_eq!(s.select_by(big), Series::of_int(vec![5, 7]));
}

#[test]
fn lazy_selection_materializes_once() {
    let source = Series::of_long(vec![10, 20, 30]);
    let view = source
        .select_positions(&IntSeries::new(vec![2, 2, -1, 0]))
        .unwrap();
    let materialized = view.materialize();
    assert_eq!(view, materialized);
    assert_eq!(
        materialized.to_values(),
        vec![Value::Long(30), Value::Long(30), Value::Null, Value::Long(10)]
    );
    assert_eq!(view.nominal_type(), ValueType::Long);
}

#[test]
fn lazy_selection_rejects_out_of_range_positions() {
    let source = Series::of_long(vec![10]);
    assert!(source.select_positions(&IntSeries::new(vec![1])).is_err());
}

#[test]
fn sort_round_trip_through_permutation() {
    let s = Series::of_strs(&["m", "c", "x", "c"]);
    let permutation = s.sort_index_natural();
    assert_eq!(permutation, IntSeries::new(vec![1, 3, 0, 2]));
    assert_eq!(
        s.select_positions(&permutation).unwrap().to_values(),
        s.sort_natural().to_values()
    );
}

#[test]
fn sorter_rows_by_first_and_second_column() {
    let a = Series::of_int(vec![1, 2, 1, 0, 1]);
    let b = Series::of_strs(&["x", "y", "z", "a", "x"]);
    assert_eq!(
        Sorter::sort_index(5, Sorter::comparator(&a, true, false)),
        IntSeries::new(vec![3, 0, 2, 4, 1])
    );
    assert_eq!(
        Sorter::sort_index(5, Sorter::comparator(&b, true, false)),
        IntSeries::new(vec![3, 0, 4, 1, 2])
    );
}

#[test]
fn numeric_aggregates() {
    let d = DoubleSeries::from_options([Some(1.0), None, Some(4.0)]);
    assert_eq!(d.sum(), 5.0);
    assert_eq!(d.avg(), Some(2.5));
    let l = LongSeries::new(vec![3, 1, 2]);
    assert_eq!(l.median(), Some(2.0));
    assert_eq!(l.cum_sum(), LongSeries::new(vec![3, 4, 6]));
}

#[test]
fn boolean_series_counts() {
    let b = BoolSeries::from_options([Some(false), Some(true), None, Some(true)]);
    assert_eq!(b.count_true(), 2);
    assert_eq!(b.count_false(), 1);
    assert_eq!(b.first_true(), Some(1));
    assert_eq!(b.true_positions(), IntSeries::new(vec![1, 3]));
}

#[test]
fn map_variants() {
    let s = Series::of_strs(&["a", "bbb"]);
    let lens = s.map_as_int(|v| v.as_str().map(|s| s.len() as i32));
    assert_eq!(lens, IntSeries::new(vec![1, 3]));
    let upper = s.map(|v| Value::from(v.as_str().unwrap_or_default().to_uppercase()));
    assert_eq!(upper.to_values(), vec![Value::from("A"), Value::from("BBB")]);
}

#[test]
fn append_keeps_the_encoding_when_it_can() {
    let longs = Series::of_long(vec![1, 2]);
    assert_eq!(longs.append(3i64), Series::of_long(vec![1, 2, 3]));
    assert_eq!(
        longs.append(Value::Null),
        Series::Long(LongSeries::from_options([Some(1), Some(2), None]))
    );

    let mixed = longs.append("x");
    assert_eq!(mixed.nominal_type(), ValueType::Object);
    assert_eq!(
        mixed.to_values(),
        vec![Value::Long(1), Value::Long(2), Value::from("x")]
    );

    let strs = Series::of_strs(&["a"]).append("b");
    assert_eq!(strs.nominal_type(), ValueType::Str);
    assert_eq!(strs, Series::of_strs(&["a", "b"]));
    assert_eq!(longs.len(), 2);
}

#[test]
fn join_renders_nulls() {
    let s = Series::Int(IntSeries::from_options([Some(1), None, Some(3)]));
    assert_eq!(s.join(",", "", ""), "1,null,3");
    assert_eq!(s.join(" | ", "<", ">"), "<1 | null | 3>");
    assert_eq!(Series::of_strs(&[]).join(",", "[", "]"), "[]");
}

#[test]
fn copy_to_rejects_overflowing_offsets() {
    let mut out = vec![Value::Null; 2];
    for s in [Series::of_strs(&["a", "b"]), Series::of_int(vec![1, 2])] {
        assert_eq!(
            s.copy_to(&mut out, 1, 0, usize::MAX).unwrap_err(),
            SeriesError::IndexOutOfBounds {
                index: i64::MAX,
                len: 2
            }
        );
        assert!(s.copy_to(&mut out, 0, usize::MAX, 1).is_err());
        s.copy_to(&mut out, 0, 0, 2).unwrap();
        assert_eq!(out, s.to_values());
    }
}

#[test]
fn mixed_numeric_kinds_are_equal_by_value() {
    let ints = Series::of_int(vec![1, 2, 3]);
    let longs = Series::of_long(vec![1, 5, 3]);
    assert_eq!(ints.eq(&longs).unwrap(), BoolSeries::new(vec![true, false, true]));
    assert_eq!(ints.ne(&longs).unwrap(), BoolSeries::new(vec![false, true, false]));
    let doubles = Series::of_double(vec![1.0, 2.5, f64::NAN]);
    assert_eq!(ints.eq(&doubles).unwrap(), BoolSeries::new(vec![true, false, false]));
    let words = Series::of_strs(&["1", "2", "3"]);
    assert_eq!(ints.eq(&words).unwrap(), BoolSeries::new(vec![false; 3]));
}
