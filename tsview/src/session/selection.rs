/// Cursor on at most one subplot, by position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectedAxis {
    #[default]
    Unselected,
    Selected(usize),
}

impl SelectedAxis {
    pub fn index(self) -> Option<usize> {
        match self {
            SelectedAxis::Unselected => None,
            SelectedAxis::Selected(i) => Some(i),
        }
    }

    pub fn is_selected(self, index: usize) -> bool {
        self == SelectedAxis::Selected(index)
    }

    /// State after the subplot at `clicked` was clicked: clicking the
    /// selected axis deselects it, any other axis becomes selected.
    pub fn click(self, clicked: usize) -> Self {
        match self {
            SelectedAxis::Selected(i) if i == clicked => SelectedAxis::Unselected,
            _ => SelectedAxis::Selected(clicked),
        }
    }

    /// State after the slot at `removed` was deleted: follows the selected
    /// slot to its new position, or deselects if it was the one removed.
    ///
    /// [`Session::remove_axis`](super::Session::remove_axis) only removes the
    /// selected or the bottom slot, so the shift applies to direct callers.
    pub fn after_removal(self, removed: usize) -> Self {
        match self {
            SelectedAxis::Selected(i) if i == removed => SelectedAxis::Unselected,
            SelectedAxis::Selected(i) if i > removed => SelectedAxis::Selected(i - 1),
            other => other,
        }
    }
}
