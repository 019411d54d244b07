use crate::error::{FrameError, FrameResult};
use ahash::AHashMap;
use std::sync::Arc;

/// Ordered, unique column names of a [`crate::DataFrame`] with name lookup.
#[derive(Clone, Debug, Default)]
pub struct Index {
    names: Vec<Arc<str>>,
    positions: AHashMap<Arc<str>, usize>,
}

impl Index {
    pub fn of<S: AsRef<str>>(names: &[S]) -> FrameResult<Self> {
        let mut index = Index::default();
        for name in names {
            index.push(name.as_ref())?;
        }
        Ok(index)
    }

    pub(crate) fn push(&mut self, name: &str) -> FrameResult<usize> {
        if self.positions.contains_key(name) {
            return Err(FrameError::DuplicateColumn(name.to_string()));
        }
        let name: Arc<str> = Arc::from(name);
        let pos = self.names.len();
        self.positions.insert(Arc::clone(&name), pos);
        self.names.push(name);
        Ok(pos)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(|n| n.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn position(&self, name: &str) -> FrameResult<usize> {
        self.positions
            .get(name)
            .copied()
            .ok_or_else(|| FrameError::NoSuchColumn(name.to_string()))
    }

    pub fn name_at(&self, pos: usize) -> FrameResult<&str> {
        self.names
            .get(pos)
            .map(|n| n.as_ref())
            .ok_or(FrameError::ColumnIndexOutOfBounds {
                index: pos,
                width: self.names.len(),
            })
    }

    /// Index with the name at `pos` replaced.
    pub(crate) fn renamed(&self, pos: usize, name: &str) -> FrameResult<Self> {
        let names: Vec<&str> = self
            .names()
            .enumerate()
            .map(|(i, n)| if i == pos { name } else { n })
            .collect();
        Index::of(&names)
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_duplicates() {
        let index = Index::of(&["a", "b"]).unwrap();
        assert_eq!(index.position("b").unwrap(), 1);
        assert_eq!(index.name_at(0).unwrap(), "a");
        assert_eq!(
            index.position("x").unwrap_err(),
            FrameError::NoSuchColumn("x".into())
        );
        assert_eq!(
            index.name_at(2).unwrap_err(),
            FrameError::ColumnIndexOutOfBounds { index: 2, width: 2 }
        );
        assert_eq!(
            Index::of(&["a", "a"]).unwrap_err(),
            FrameError::DuplicateColumn("a".into())
        );
    }

    #[test]
    fn rename_keeps_order() {
        let index = Index::of(&["a", "b", "c"]).unwrap();
        let renamed = index.renamed(1, "x").unwrap();
        assert_eq!(renamed.names().collect::<Vec<_>>(), vec!["a", "x", "c"]);
        assert!(index.renamed(1, "c").is_err());
    }
}
