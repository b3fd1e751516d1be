use super::table::TimeSeriesTable;

/// The selectable list of column names of the loaded table. A column is
/// "marked" while it is highlighted in the list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnRegistry {
    entries: Vec<Entry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    name: String,
    marked: bool,
}

impl ColumnRegistry {
    pub fn from_table(table: &TimeSeriesTable) -> Self {
        Self {
            entries: table
                .column_names()
                .map(|name| Entry {
                    name: name.to_owned(),
                    marked: false,
                })
                .collect(),
        }
    }

    /// Column names with their markers, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|e| (e.name.as_str(), e.marked))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn marked(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.marked)
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Mark exactly the given names, unmark everything else.
    pub fn mark_exactly<S: AsRef<str>>(&mut self, names: &[S]) {
        for entry in self.entries.iter_mut() {
            entry.marked = names.iter().any(|n| n.as_ref() == entry.name);
        }
    }

    pub fn clear_marks(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.marked = false;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
