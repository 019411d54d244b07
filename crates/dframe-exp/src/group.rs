use crate::error::{FrameError, FrameResult};
use crate::exp::{ColumnRef, EvalSource, Exp};
use crate::frame::DataFrame;
use ahash::AHashMap;
use dframe_columnar::{IntSeries, Series, SeriesResult, Value};

/// Rows of a [`DataFrame`] partitioned by key values.
///
/// Groups are numbered in order of first occurrence and keep their rows in frame order. Null
/// keys form their own group.
#[derive(Debug)]
pub struct GroupBy<'a> {
    frame: &'a DataFrame,
    groups: Vec<IntSeries>,
}

impl DataFrame {
    pub fn group_by(&self, keys: &[Exp]) -> FrameResult<GroupBy<'_>> {
        let height = self.height();
        let key_columns = keys
            .iter()
            .map(|key| {
                let column = key.eval(self)?;
                if column.len() != height {
                    return Err(FrameError::HeightMismatch {
                        column: key.name_in(self),
                        expected: height,
                        actual: column.len(),
                    });
                }
                Ok(column)
            })
            .collect::<FrameResult<Vec<Series>>>()?;

        let mut lookup: AHashMap<Vec<Value>, usize> = AHashMap::new();
        let mut rows: Vec<Vec<i32>> = Vec::new();
        for row in 0..height {
            let key = key_columns
                .iter()
                .map(|c| c.get(row))
                .collect::<SeriesResult<Vec<_>>>()?;
            let group = *lookup.entry(key).or_insert_with(|| {
                rows.push(Vec::new());
                rows.len() - 1
            });
            rows[group].push(row as i32);
        }
        log::debug!(
            "grouped {height} rows into {} groups by {} key(s)",
            rows.len(),
            keys.len()
        );
        Ok(GroupBy {
            frame: self,
            groups: rows.into_iter().map(IntSeries::new).collect(),
        })
    }

    /// Distinct non-null values of `series` with their counts, most frequent first. Ties keep
    /// first-occurrence order.
    pub fn value_counts(series: &Series) -> FrameResult<DataFrame> {
        let mut lookup: AHashMap<Value, usize> = AHashMap::new();
        let mut counts: Vec<(Value, i32)> = Vec::new();
        for value in series.iter().filter(|v| !v.is_null()) {
            match lookup.get(&value) {
                Some(&pos) => counts[pos].1 += 1,
                None => {
                    lookup.insert(value.clone(), counts.len());
                    counts.push((value, 1));
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        let (values, counts): (Vec<Value>, Vec<i32>) = counts.into_iter().unzip();
        DataFrame::new(
            &["value", "count"],
            vec![Series::infer(values), Series::of_int(counts)],
        )
    }
}

impl GroupBy<'_> {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Frame positions of the rows in group `group`.
    pub fn positions(&self, group: usize) -> Option<&IntSeries> {
        self.groups.get(group)
    }

    /// The rows of one group as a lazy frame.
    pub fn group(&self, group: usize) -> FrameResult<Option<DataFrame>> {
        self.groups
            .get(group)
            .map(|positions| self.frame.select_rows(positions))
            .transpose()
    }

    /// One row per group, one column per expression.
    ///
    /// Aggregates reduce each group to a value. Any other expression contributes its value for
    /// the first row of the group, which is how key columns are carried into the result.
    pub fn agg(&self, exps: &[Exp]) -> FrameResult<DataFrame> {
        let names: Vec<String> = exps.iter().map(|e| e.name_in(self.frame)).collect();
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(self.groups.len()); exps.len()];
        for positions in &self.groups {
            let source = GroupSource {
                frame: self.frame,
                positions,
            };
            for (exp, column) in exps.iter().zip(columns.iter_mut()) {
                let result = exp.eval(&source)?;
                column.push(result.first().unwrap_or_default());
            }
        }
        DataFrame::new(&names, columns.into_iter().map(Series::infer).collect())
    }
}

/// The rows of one group, resolving only the columns an expression references.
struct GroupSource<'a> {
    frame: &'a DataFrame,
    positions: &'a IntSeries,
}

impl EvalSource for GroupSource<'_> {
    fn height(&self) -> usize {
        self.positions.len()
    }

    fn resolve(&self, column: &ColumnRef) -> FrameResult<Series> {
        Ok(self.frame.resolve(column)?.select_positions(self.positions)?)
    }

    fn column_name(&self, column: &ColumnRef) -> Option<String> {
        self.frame.column_name(column)
    }
}
