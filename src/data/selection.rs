use std::collections::BTreeSet;

/// Set of selected row indices, bounded by the length of the rows it was
/// created for. Indices outside `0..len` are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<usize>,
    len: usize,
}

impl SelectionSet {
    pub fn new(len: usize) -> Self {
        Self {
            selected: BTreeSet::new(),
            len,
        }
    }

    /// Flip membership of one row. Returns the new membership, or `None`
    /// when the index is out of range.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        if self.selected.remove(&index) {
            Some(false)
        } else {
            self.selected.insert(index);
            Some(true)
        }
    }

    /// Select every row, or clear the set if every row is already selected
    pub fn toggle_all(&mut self) {
        if self.all_selected() {
            self.selected.clear();
        } else {
            self.selected = (0..self.len).collect();
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn all_selected(&self) -> bool {
        self.len > 0 && self.selected.len() == self.len
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    /// Selected indices in ascending (original row) order
    pub fn indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }
}
