use crate::error::{FrameError, FrameResult};
use crate::exp::{ColumnRef, EvalSource, Exp};
use crate::index::Index;
use crate::predicate::RowPredicate;
use dframe_columnar::{BoolSeries, IntSeries, Series, SeriesError, SeriesResult, Value};
use std::fmt;

/// Equal-height named columns.
///
/// Frames are immutable: every operation returns a new frame sharing the untouched columns.
#[derive(Clone, Debug, PartialEq)]
pub struct DataFrame {
    index: Index,
    columns: Vec<Series>,
    height: usize,
}

impl DataFrame {
    /// Assembles a frame. Fails on duplicate names, a name/column count mismatch or columns of
    /// different heights.
    pub fn new<S: AsRef<str>>(names: &[S], columns: Vec<Series>) -> FrameResult<Self> {
        Self::from_index(Index::of(names)?, columns)
    }

    pub fn from_index(index: Index, columns: Vec<Series>) -> FrameResult<Self> {
        let height = columns.first().map_or(0, Series::len);
        Self::assemble(index, columns, height)
    }

    /// A frame with the given columns and no rows.
    pub fn empty<S: AsRef<str>>(names: &[S]) -> FrameResult<Self> {
        let columns = names.iter().map(|_| Series::of_values(Vec::new())).collect();
        Self::new(names, columns)
    }

    /// Builds a frame from row-major `values`, inferring each column's encoding.
    pub fn fold_by_row<S: AsRef<str>>(names: &[S], values: Vec<Value>) -> FrameResult<Self> {
        let width = names.len();
        if width == 0 || values.len() % width != 0 {
            if width == 0 && values.is_empty() {
                return Self::new(names, Vec::new());
            }
            return Err(SeriesError::InvalidArgument(format!(
                "{} values do not fold into rows of width {width}",
                values.len()
            ))
            .into());
        }
        let height = values.len() / width;
        let mut columns: Vec<Vec<Value>> = (0..width).map(|_| Vec::with_capacity(height)).collect();
        for (i, value) in values.into_iter().enumerate() {
            columns[i % width].push(value);
        }
        Self::new(names, columns.into_iter().map(Series::infer).collect())
    }

    fn assemble(index: Index, columns: Vec<Series>, height: usize) -> FrameResult<Self> {
        if index.len() != columns.len() {
            return Err(FrameError::WidthMismatch {
                expected: index.len(),
                actual: columns.len(),
            });
        }
        for (name, column) in index.names().zip(&columns) {
            if column.len() != height {
                return Err(FrameError::HeightMismatch {
                    column: name.to_string(),
                    expected: height,
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            index,
            columns,
            height,
        })
    }

    /// Same index, every column transformed. `height` applies when there are no columns.
    fn map_columns(
        &self,
        height: usize,
        f: impl Fn(&Series) -> SeriesResult<Series>,
    ) -> FrameResult<Self> {
        let columns = self
            .columns
            .iter()
            .map(f)
            .collect::<SeriesResult<Vec<_>>>()?;
        let height = columns.first().map_or(height, Series::len);
        Self::assemble(self.index.clone(), columns, height)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.index.len()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.index.names().collect()
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> FrameResult<&Series> {
        let pos = self.index.position(name)?;
        self.column_at(pos)
    }

    pub fn column_at(&self, pos: usize) -> FrameResult<&Series> {
        self.columns
            .get(pos)
            .ok_or(FrameError::ColumnIndexOutOfBounds {
                index: pos,
                width: self.width(),
            })
    }

    /// The value at (`row`, `column`).
    pub fn get(&self, row: usize, column: usize) -> FrameResult<Value> {
        Ok(self.column_at(column)?.get(row)?)
    }

    pub fn row(&self, row: usize) -> FrameResult<RowProxy<'_>> {
        if row >= self.height {
            return Err(SeriesError::IndexOutOfBounds {
                index: row as i64,
                len: self.height,
            }
            .into());
        }
        Ok(RowProxy { frame: self, row })
    }

    pub fn rows(&self) -> impl Iterator<Item = RowProxy<'_>> + '_ {
        (0..self.height).map(move |row| RowProxy { frame: self, row })
    }

    /// Lazy row selection by position. [`dframe_columnar::NO_ROW`] positions produce null rows.
    pub fn select_rows(&self, positions: &IntSeries) -> FrameResult<DataFrame> {
        self.map_columns(positions.len(), |c| c.select_positions(positions))
    }

    pub fn select_mask(&self, mask: &BoolSeries) -> FrameResult<DataFrame> {
        if mask.len() != self.height {
            return Err(SeriesError::SizeMismatch {
                expected: self.height,
                actual: mask.len(),
            }
            .into());
        }
        self.map_columns(mask.count_true(), |c| c.select_mask(mask))
    }

    /// Rows for which `condition` evaluates to true.
    pub fn filter(&self, condition: &Exp) -> FrameResult<DataFrame> {
        let mask = condition.eval_condition(self)?;
        self.select_mask(&mask)
    }

    pub fn filter_rows(&self, predicate: &RowPredicate) -> FrameResult<DataFrame> {
        let mask = predicate.mask(self)?;
        self.select_mask(&mask)
    }

    /// First `len` rows; a negative `len` skips that many rows and keeps the rest.
    pub fn head(&self, len: i64) -> DataFrame {
        let height = bounded(self.height, len);
        Self {
            index: self.index.clone(),
            columns: self.columns.iter().map(|c| c.head(len)).collect(),
            height,
        }
    }

    /// Last `len` rows; a negative `len` drops that many rows from the end.
    pub fn tail(&self, len: i64) -> DataFrame {
        let height = bounded(self.height, len);
        Self {
            index: self.index.clone(),
            columns: self.columns.iter().map(|c| c.tail(len)).collect(),
            height,
        }
    }

    /// Appends the result of `exp` under its display name.
    pub fn add_column(&self, exp: &Exp) -> FrameResult<DataFrame> {
        let name = exp.name_in(self);
        let column = exp.eval(self)?;
        self.with_new_column(&name, column)
    }

    fn with_new_column(&self, name: &str, column: Series) -> FrameResult<DataFrame> {
        let mut index = self.index.clone();
        index.push(name)?;
        let mut columns = self.columns.clone();
        columns.push(column);
        let height = if self.columns.is_empty() {
            columns.first().map_or(0, Series::len)
        } else {
            self.height
        };
        Self::assemble(index, columns, height)
    }

    /// Replaces the column called `name`, or appends it if there is none.
    pub fn with_column(&self, name: &str, column: Series) -> FrameResult<DataFrame> {
        match self.index.position(name) {
            Ok(pos) => {
                let mut columns = self.columns.clone();
                columns[pos] = column;
                Self::assemble(self.index.clone(), columns, self.height)
            }
            Err(_) => self.with_new_column(name, column),
        }
    }

    /// New frame with one column per expression, named by the expression.
    pub fn select_exps(&self, exps: &[Exp]) -> FrameResult<DataFrame> {
        let names: Vec<String> = exps.iter().map(|e| e.name_in(self)).collect();
        let columns = exps
            .iter()
            .map(|e| e.eval(self))
            .collect::<FrameResult<Vec<_>>>()?;
        Self::new(&names, columns)
    }

    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> FrameResult<DataFrame> {
        let columns = names
            .iter()
            .map(|n| self.column(n.as_ref()).cloned())
            .collect::<FrameResult<Vec<_>>>()?;
        Self::assemble(Index::of(names)?, columns, self.height)
    }

    pub fn rename_all<S: AsRef<str>>(&self, names: &[S]) -> FrameResult<DataFrame> {
        Self::assemble(Index::of(names)?, self.columns.clone(), self.height)
    }

    pub fn rename(&self, old: &str, new: &str) -> FrameResult<DataFrame> {
        let pos = self.index.position(old)?;
        Self::assemble(self.index.renamed(pos, new)?, self.columns.clone(), self.height)
    }

    /// Renames each column in `old` to the name at the same position in `new`. A name in `old`
    /// that is not a column appends an all-null column called by its `new` name.
    pub fn rename_columns<S: AsRef<str>, T: AsRef<str>>(
        &self,
        old: &[S],
        new: &[T],
    ) -> FrameResult<DataFrame> {
        if old.len() != new.len() {
            return Err(FrameError::WidthMismatch {
                expected: old.len(),
                actual: new.len(),
            });
        }
        let mut names: Vec<&str> = self.index.names().collect();
        let mut columns = self.columns.clone();
        for (old, new) in old.iter().zip(new) {
            match self.index.position(old.as_ref()) {
                Ok(pos) => names[pos] = new.as_ref(),
                Err(_) => {
                    names.push(new.as_ref());
                    columns.push(Series::of_val(Value::Null, self.height));
                }
            }
        }
        Self::assemble(Index::of(&names)?, columns, self.height)
    }

    /// Resolves every lazy column.
    pub fn materialize(&self) -> DataFrame {
        Self {
            index: self.index.clone(),
            columns: self.columns.iter().map(Series::materialize).collect(),
            height: self.height,
        }
    }

    /// Rows of `self` followed by the rows of each of `others`. Every frame needs the same
    /// column names; columns are matched by name.
    pub fn vconcat(&self, others: &[&DataFrame]) -> FrameResult<DataFrame> {
        let mut parts: Vec<Vec<&Series>> = vec![Vec::with_capacity(others.len()); self.width()];
        for other in others {
            if other.width() != self.width() {
                return Err(FrameError::WidthMismatch {
                    expected: self.width(),
                    actual: other.width(),
                });
            }
            for (pos, name) in self.index.names().enumerate() {
                parts[pos].push(other.column(name)?);
            }
        }
        let height = self.height + others.iter().map(|o| o.height).sum::<usize>();
        let columns = self
            .columns
            .iter()
            .zip(&parts)
            .map(|(column, rest)| column.concat(rest))
            .collect();
        Self::assemble(self.index.clone(), columns, height)
    }
}

fn bounded(height: usize, len: i64) -> usize {
    let n = usize::try_from(len.unsigned_abs()).unwrap_or(usize::MAX).min(height);
    if len >= 0 {
        n
    } else {
        height - n
    }
}

impl EvalSource for DataFrame {
    fn height(&self) -> usize {
        self.height
    }

    fn resolve(&self, column: &ColumnRef) -> FrameResult<Series> {
        match column {
            ColumnRef::Name(name) => self.column(name).cloned(),
            ColumnRef::Position(pos) => self.column_at(*pos).cloned(),
        }
    }

    fn column_name(&self, column: &ColumnRef) -> Option<String> {
        match column {
            ColumnRef::Name(name) => Some(name.to_string()),
            ColumnRef::Position(pos) => self.index.name_at(*pos).ok().map(str::to_string),
        }
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.column_names().join("\t"))?;
        for row in self.rows() {
            let cells: Vec<String> = row.to_values().iter().map(Value::to_string).collect();
            writeln!(f, "{}", cells.join("\t"))?;
        }
        Ok(())
    }
}

/// A view of one row of a [`DataFrame`].
#[derive(Clone, Copy, Debug)]
pub struct RowProxy<'a> {
    frame: &'a DataFrame,
    row: usize,
}

impl RowProxy<'_> {
    pub fn position(&self) -> usize {
        self.row
    }

    pub fn get(&self, column: usize) -> FrameResult<Value> {
        self.frame.get(self.row, column)
    }

    pub fn get_by_name(&self, column: &str) -> FrameResult<Value> {
        Ok(self.frame.column(column)?.get(self.row)?)
    }

    pub fn to_values(&self) -> Vec<Value> {
        self.frame
            .columns
            .iter()
            .map(|c| c.get(self.row).unwrap_or_default())
            .collect()
    }
}
