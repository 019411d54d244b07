use crate::error::{FrameError, FrameResult};
use crate::exp::Exp;
use crate::frame::DataFrame;
use dframe_columnar::{IntSeries, Series, Sorter};

/// One key of a row-set sort. Nulls go last unless `nulls_first` is set, in either direction.
#[derive(Clone, Debug, PartialEq)]
pub struct SortKey {
    pub exp: Exp,
    pub ascending: bool,
    pub nulls_first: bool,
}

impl SortKey {
    pub fn new(exp: Exp, ascending: bool) -> Self {
        Self {
            exp,
            ascending,
            nulls_first: false,
        }
    }

    pub fn with_nulls_first(mut self) -> Self {
        self.nulls_first = true;
        self
    }
}

impl From<Exp> for SortKey {
    fn from(exp: Exp) -> Self {
        SortKey::new(exp, true)
    }
}

impl DataFrame {
    /// Stable permutation ordering the rows by `keys`, earlier keys first.
    pub fn sort_index(&self, keys: &[SortKey]) -> FrameResult<IntSeries> {
        let height = self.height();
        let columns = keys
            .iter()
            .map(|key| {
                let column = key.exp.eval(self)?;
                if column.len() != height {
                    return Err(FrameError::HeightMismatch {
                        column: key.exp.name_in(self),
                        expected: height,
                        actual: column.len(),
                    });
                }
                Ok(column)
            })
            .collect::<FrameResult<Vec<Series>>>()?;

        log::debug!("sorting {height} rows by {} key(s)", keys.len());
        let comparators = columns
            .iter()
            .zip(keys)
            .map(|(column, key)| Sorter::comparator(column, key.ascending, key.nulls_first))
            .collect();
        Ok(Sorter::sort_index(height, Sorter::chain(comparators)))
    }

    /// Rows reordered by `keys`. Columns become lazy views over the permutation.
    pub fn sort(&self, keys: &[SortKey]) -> FrameResult<DataFrame> {
        let permutation = self.sort_index(keys)?;
        self.select_rows(&permutation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exp::{col, int_col};
    use dframe_columnar::Value;

    fn frame() -> DataFrame {
        DataFrame::new(
            &["a", "b"],
            vec![
                Series::of_int(vec![1, 2, 1, 0, 1]),
                Series::of_strs(&["x", "y", "z", "a", "x"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn single_key_is_stable() {
        let df = frame();
        assert_eq!(
            df.sort_index(&[col("a").asc()]).unwrap().as_slice(),
            &[3, 0, 2, 4, 1]
        );
        assert_eq!(
            df.sort_index(&[int_col(0).desc()]).unwrap().as_slice(),
            &[1, 0, 2, 4, 3]
        );
    }

    #[test]
    fn later_keys_break_ties() {
        let df = frame();
        let sorted = df.sort(&[col("a").asc(), col("b").desc()]).unwrap();
        assert_eq!(
            sorted.column("b").unwrap().to_values(),
            ["a", "z", "x", "x", "y"].map(Value::from).to_vec()
        );
    }

    #[test]
    fn aggregate_keys_are_rejected() {
        let err = frame().sort_index(&[col("a").sum().asc()]).unwrap_err();
        assert!(matches!(err, FrameError::HeightMismatch { .. }));
    }
}
