/// The columns drawn together on one subplot, in legend order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AxisSlot {
    columns: Vec<String>,
}

impl AxisSlot {
    pub fn with_column(name: &str) -> Self {
        Self {
            columns: vec![name.to_owned()],
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Add the column if it is absent, remove it if present.
    ///
    /// Returns whether the column is part of the slot afterwards.
    pub fn toggle(&mut self, name: &str) -> bool {
        if let Some(pos) = self.columns.iter().position(|c| c == name) {
            self.columns.remove(pos);
            false
        } else {
            self.columns.push(name.to_owned());
            true
        }
    }
}

/// Stacked subplots from top to bottom. The first slot is the x-axis
/// reference for all others. There is always at least one slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotAssignment {
    slots: Vec<AxisSlot>,
}

impl Default for PlotAssignment {
    fn default() -> Self {
        Self {
            slots: vec![AxisSlot::default()],
        }
    }
}

impl PlotAssignment {
    /// A single slot showing `name`.
    pub fn with_column(name: &str) -> Self {
        Self {
            slots: vec![AxisSlot::with_column(name)],
        }
    }

    pub fn slots(&self) -> &[AxisSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&AxisSlot> {
        self.slots.get(index)
    }

    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Insert an empty slot right after `after`, or at the end if `after` is
    /// `None` or out of range. Returns the index of the new slot.
    pub fn add_axis(&mut self, after: Option<usize>) -> usize {
        let index = match after {
            Some(i) if i < self.slots.len() => i + 1,
            _ => self.slots.len(),
        };
        self.slots.insert(index, AxisSlot::default());
        index
    }

    /// Remove the slot at `index`. Does nothing (and returns `false`) if the
    /// index is invalid or if it is the last remaining slot.
    pub fn remove_axis(&mut self, index: usize) -> bool {
        if index >= self.slots.len() || self.slots.len() == 1 {
            return false;
        }
        self.slots.remove(index);
        true
    }

    /// Toggle `name` on the slot at `index`. Returns `None` for an invalid
    /// index, otherwise whether the column is assigned to the slot now.
    pub fn toggle_column(&mut self, index: usize, name: &str) -> Option<bool> {
        self.slots.get_mut(index).map(|slot| slot.toggle(name))
    }

    /// In how many slots `name` is drawn.
    pub fn slots_containing(&self, name: &str) -> usize {
        self.slots.iter().filter(|s| s.contains(name)).count()
    }
}
