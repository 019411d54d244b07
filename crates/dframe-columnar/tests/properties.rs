use dframe_columnar::{
    BoolSeries, CmpOp, DoubleSeries, IntSeries, LongSeries, Series, Sorter, Value, ValueType,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

const CASES: u32 = 128;

const OPS: [CmpOp; 6] = [
    CmpOp::Eq,
    CmpOp::Ne,
    CmpOp::Lt,
    CmpOp::Le,
    CmpOp::Gt,
    CmpOp::Ge,
];

fn edge_long() -> impl Strategy<Value = Option<i64>> {
    prop_oneof![
        Just(Some(i64::MIN)),
        Just(Some(i64::MAX)),
        Just(Some(0)),
        Just(None),
        (-5i64..5).prop_map(Some),
    ]
}

fn edge_double() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        Just(Some(0.0)),
        Just(Some(-0.0)),
        Just(Some(f64::NAN)),
        Just(Some(f64::INFINITY)),
        Just(None),
        (-3i32..3).prop_map(|v| Some(v as f64 / 2.0)),
    ]
}

fn long_pair() -> impl Strategy<Value = (Vec<Option<i64>>, Vec<Option<i64>>)> {
    (0usize..32).prop_flat_map(|n| {
        (
            prop::collection::vec(edge_long(), n),
            prop::collection::vec(edge_long(), n),
        )
    })
}

fn double_pair() -> impl Strategy<Value = (Vec<Option<f64>>, Vec<Option<f64>>)> {
    (0usize..32).prop_flat_map(|n| {
        (
            prop::collection::vec(edge_double(), n),
            prop::collection::vec(edge_double(), n),
        )
    })
}

fn masked_ints() -> impl Strategy<Value = (Vec<Option<i32>>, Vec<bool>)> {
    (0usize..48).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::option::of(-10i32..10), n),
            prop::collection::vec(any::<bool>(), n),
        )
    })
}

/// Element-wise reference built from `Value::same_value` and `Value::compare`.
fn naive(op: CmpOp, l: &Series, r: &Series) -> BoolSeries {
    l.to_values()
        .iter()
        .zip(r.to_values().iter())
        .map(|(a, b)| match op {
            CmpOp::Eq => a.same_value(b),
            CmpOp::Ne => !a.same_value(b),
            _ => match a.compare(b).unwrap() {
                None => false,
                Some(ord) => match op {
                    CmpOp::Lt => ord.is_lt(),
                    CmpOp::Le => ord.is_le(),
                    CmpOp::Gt => ord.is_gt(),
                    CmpOp::Ge => ord.is_ge(),
                    CmpOp::Eq | CmpOp::Ne => unreachable!(),
                },
            },
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: CASES,
        .. ProptestConfig::default()
    })]

    #[test]
    fn long_fast_path_matches_generic_path((l, r) in long_pair()) {
        let l = Series::Long(LongSeries::from_options(l));
        let r = Series::Long(LongSeries::from_options(r));
        let boxed = l.unsafe_cast_as(ValueType::Object);
        for op in OPS {
            let fast = l.compare(op, &r).unwrap();
            prop_assert_eq!(&fast, &boxed.compare(op, &r).unwrap());
            prop_assert_eq!(&fast, &naive(op, &l, &r));
        }
    }

    #[test]
    fn double_fast_path_matches_generic_path((l, r) in double_pair()) {
        let l = Series::Double(DoubleSeries::from_options(l));
        let r = Series::Double(DoubleSeries::from_options(r));
        let boxed = r.unsafe_cast_as(ValueType::Object);
        for op in OPS {
            let fast = l.compare(op, &r).unwrap();
            prop_assert_eq!(&fast, &l.compare(op, &boxed).unwrap());
            prop_assert_eq!(&fast, &naive(op, &l, &r));
        }
        prop_assert_eq!(l.intersect(&r).to_values(), l.intersect(&boxed).to_values());
        prop_assert_eq!(l.diff(&r).to_values(), l.diff(&boxed).to_values());
    }

    #[test]
    fn int_against_long_matches_widened_ints((l, r) in masked_ints().prop_flat_map(|(l, _)| {
        let n = l.len();
        (Just(l), prop::collection::vec(prop::option::of(-10i32..10), n))
    })) {
        let narrow = Series::Int(IntSeries::from_options(l.clone()));
        let widened = Series::Long(LongSeries::from_options(l.iter().map(|v| v.map(i64::from))));
        let r = Series::Long(LongSeries::from_options(r.into_iter().map(|v| v.map(i64::from))));
        for op in OPS {
            prop_assert_eq!(narrow.compare(op, &r).unwrap(), widened.compare(op, &r).unwrap());
        }
    }

    #[test]
    fn arithmetic_fast_path_matches_generic_path((l, r) in long_pair()) {
        let l = Series::Long(LongSeries::from_options(l));
        let r = Series::Long(LongSeries::from_options(r));
        let boxed = l.unsafe_cast_as(ValueType::Object);
        prop_assert_eq!(l.add(&r).unwrap().to_values(), boxed.add(&r).unwrap().to_values());
        prop_assert_eq!(l.mul(&r).unwrap().to_values(), boxed.mul(&r).unwrap().to_values());
        prop_assert_eq!(
            l.div(&r).map(|s| s.to_values()),
            boxed.div(&r).map(|s| s.to_values())
        );
    }

    #[test]
    fn selection_by_mask((values, mask) in masked_ints()) {
        let s = Series::Int(IntSeries::from_options(values.clone()));
        let m = BoolSeries::new(mask.clone());
        let selected = s.select_mask(&m).unwrap();
        prop_assert_eq!(selected.len(), m.count_true());
        let expected: Vec<Value> = values
            .iter()
            .zip(mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(v, _)| Value::from(*v))
            .collect();
        prop_assert_eq!(selected.to_values(), expected);
    }

    #[test]
    fn length_preserving_transforms((values, mask) in masked_ints()) {
        let s = Series::Int(IntSeries::from_options(values));
        let m = BoolSeries::new(mask);
        let n = s.len();
        prop_assert_eq!(s.map(|v| v.clone()).len(), n);
        prop_assert_eq!(s.replace(&m, &Value::Int(0)).unwrap().len(), n);
        prop_assert_eq!(s.fill_nulls(&Value::Int(0)).len(), n);
        prop_assert_eq!(s.fill_nulls_forward().len(), n);
        prop_assert_eq!(s.sort_natural().len(), n);
        prop_assert_eq!(s.shift(3, &Value::Null).len(), n);
    }

    #[test]
    fn sort_is_stable_and_round_trips(keys in prop::collection::vec(0i32..4, 0..40)) {
        let s = Series::of_int(keys.clone());
        let permutation = Sorter::sort_index(s.len(), Sorter::comparator(&s, true, false));
        let p = permutation.as_slice();
        for w in p.windows(2) {
            let (a, b) = (w[0] as usize, w[1] as usize);
            prop_assert!(keys[a] < keys[b] || (keys[a] == keys[b] && a < b));
        }
        prop_assert_eq!(
            s.select_positions(&permutation).unwrap().to_values(),
            s.sort_natural().to_values()
        );
    }

    #[test]
    fn lazy_view_matches_eager_take(
        values in prop::collection::vec(prop::option::of(any::<i64>()), 1..24),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..24),
    ) {
        let source = Series::Long(LongSeries::from_options(values.clone()));
        let positions = IntSeries::new(picks.iter().map(|i| i.index(values.len()) as i32).collect());
        let eager = source.take(&positions).unwrap();
        let lazy = Arc::new(source.select_positions(&positions).unwrap());

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let lazy = Arc::clone(&lazy);
                thread::spawn(move || lazy.to_values())
            })
            .collect();
        for r in readers {
            prop_assert_eq!(r.join().unwrap(), eager.to_values());
        }
        prop_assert_eq!(lazy.to_values(), eager.to_values());
    }
}
