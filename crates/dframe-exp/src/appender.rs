use crate::error::{FrameError, FrameResult};
use crate::frame::DataFrame;
use crate::index::Index;
use dframe_columnar::{BuilderOptions, ColumnAppender, Extractor};

/// First step of row-wise frame assembly: the column names.
#[derive(Debug)]
pub struct ByRowBuilder {
    index: Index,
    options: BuilderOptions,
}

impl DataFrame {
    /// Starts assembling a frame from a stream of rows.
    pub fn by_row<S: AsRef<str>>(names: &[S]) -> FrameResult<ByRowBuilder> {
        Ok(ByRowBuilder {
            index: Index::of(names)?,
            options: BuilderOptions::default(),
        })
    }
}

impl ByRowBuilder {
    pub fn options(mut self, options: BuilderOptions) -> Self {
        self.options = options;
        self
    }

    /// One extractor per column, in column order.
    pub fn extractors<R: ?Sized>(
        self,
        extractors: Vec<Extractor<R>>,
    ) -> FrameResult<ByRowExtractors<R>> {
        if extractors.len() != self.index.len() {
            return Err(FrameError::WidthMismatch {
                expected: self.index.len(),
                actual: extractors.len(),
            });
        }
        Ok(ByRowExtractors {
            index: self.index,
            options: self.options,
            extractors,
        })
    }
}

pub struct ByRowExtractors<R: ?Sized> {
    index: Index,
    options: BuilderOptions,
    extractors: Vec<Extractor<R>>,
}

impl<R: ?Sized> ByRowExtractors<R> {
    pub fn appender(&self) -> DataFrameAppender<'_, R> {
        DataFrameAppender {
            index: &self.index,
            columns: self
                .extractors
                .iter()
                .map(|e| e.appender(self.options))
                .collect(),
        }
    }
}

/// Appends rows of `R` column by column.
///
/// A failed `append` may leave the columns at different heights; `to_data_frame` then reports
/// the mismatch.
pub struct DataFrameAppender<'a, R: ?Sized> {
    index: &'a Index,
    columns: Vec<ColumnAppender<'a, R>>,
}

impl<R: ?Sized> DataFrameAppender<'_, R> {
    pub fn append(&mut self, row: &R) -> FrameResult<()> {
        for column in &mut self.columns {
            column.append(row)?;
        }
        Ok(())
    }

    pub fn append_rows<'r, I>(&mut self, rows: I) -> FrameResult<()>
    where
        I: IntoIterator<Item = &'r R>,
        R: 'r,
    {
        for row in rows {
            self.append(row)?;
        }
        Ok(())
    }

    /// Rows appended so far.
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, ColumnAppender::len)
    }

    pub fn to_data_frame(self) -> FrameResult<DataFrame> {
        let columns = self.columns.into_iter().map(ColumnAppender::finish).collect();
        DataFrame::from_index(self.index.clone(), columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dframe_columnar::{IntSeries, Series, Value, ValueType};
    use pretty_assertions::assert_eq;

    #[test]
    fn rows_of_values() {
        let rows = vec![
            vec![Value::Int(1), Value::from("a")],
            vec![Value::Null, Value::from("b")],
        ];
        let setup = DataFrame::by_row(&["n", "s"])
            .unwrap()
            .extractors(vec![
                Extractor::int(|r: &Vec<Value>| r[0].as_i32()),
                Extractor::col(|r: &Vec<Value>| r[1].clone()),
            ])
            .unwrap();
        let mut appender = setup.appender();
        appender.append_rows(&rows).unwrap();
        assert_eq!(appender.height(), 2);

        let df = appender.to_data_frame().unwrap();
        assert_eq!(
            df.column("n").unwrap(),
            &Series::Int(IntSeries::from_options([Some(1), None]))
        );
        assert_eq!(
            df.column("s").unwrap().to_values(),
            vec![Value::from("a"), Value::from("b")]
        );
    }

    #[test]
    fn extractor_count_must_match() {
        let err = DataFrame::by_row(&["a", "b"])
            .unwrap()
            .extractors(vec![Extractor::<[Value]>::at(0)])
            .err();
        assert_eq!(
            err,
            Some(FrameError::WidthMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn slices_by_position_and_by_type() {
        let generic = DataFrame::by_row(&["a"])
            .unwrap()
            .extractors(vec![Extractor::<[Value]>::at(0)])
            .unwrap();
        let mut appender = generic.appender();
        appender.append(&[Value::Int(1)][..]).unwrap();
        let df = appender.to_data_frame().unwrap();
        assert_eq!(df.column_at(0).unwrap().nominal_type(), ValueType::Object);

        let typed = DataFrame::by_row(&["a"])
            .unwrap()
            .extractors(vec![Extractor::long(|r: &[Value]| r.first()?.as_i64())])
            .unwrap();
        let mut appender = typed.appender();
        appender.append(&[Value::Long(2)][..]).unwrap();
        appender.append(&[][..]).unwrap();
        let df = appender.to_data_frame().unwrap();
        assert_eq!(df.column("a").unwrap().to_values(), vec![Value::Long(2), Value::Null]);
    }
}
