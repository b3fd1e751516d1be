//! The model behind the viewer: the loaded table, which columns are drawn on
//! which subplot, and which subplot is selected. Knows nothing about the UI.

mod assignment;
mod error;
mod registry;
pub mod render;
mod selection;
mod table;

use std::path::{Path, PathBuf};

use log::{debug, info};

pub use assignment::{AxisSlot, PlotAssignment};
pub use error::LoadError;
pub use registry::ColumnRegistry;
pub use render::{FigureLayout, SeriesLayout, SubplotLayout};
pub use selection::SelectedAxis;
pub use table::{Column, TimeSeriesTable};

/// A user intent, applied with [`Session::dispatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    AddAxis,
    RemoveAxis,
    ToggleColumn(String),
    /// A click into the plot area; `None` if no subplot was hit.
    ClickAxis(Option<usize>),
}

#[derive(Debug, Default)]
pub struct Session {
    source: Option<PathBuf>,
    table: Option<TimeSeriesTable>,
    assignment: PlotAssignment,
    selection: SelectedAxis,
    registry: ColumnRegistry,
    /// Bumped on every change, so views can cache what they derive from the
    /// session.
    revision: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `command`. Returns whether the session changed.
    ///
    /// Only `Open` can fail; the session is left untouched in that case.
    pub fn dispatch(&mut self, command: &Command) -> Result<bool, LoadError> {
        let changed = match command {
            Command::Open(path) => {
                self.open(path)?;
                true
            }
            Command::AddAxis => {
                self.add_axis();
                true
            }
            Command::RemoveAxis => self.remove_axis(),
            Command::ToggleColumn(name) => self.toggle_column(name),
            Command::ClickAxis(Some(index)) => self.click_axis(*index),
            Command::ClickAxis(None) => false,
        };
        Ok(changed)
    }

    /// Load the CSV file at `path` and start over with one subplot showing
    /// its first column.
    pub fn open(&mut self, path: &Path) -> Result<(), LoadError> {
        let table = TimeSeriesTable::from_path(path)?;
        info!(
            "loaded {} rows with {} columns from {}",
            table.len(),
            table.columns().len(),
            path.display()
        );
        self.install_table(table, Some(path.to_owned()));
        Ok(())
    }

    pub fn install_table(&mut self, table: TimeSeriesTable, source: Option<PathBuf>) {
        self.assignment = table
            .column_names()
            .next()
            .map(PlotAssignment::with_column)
            .unwrap_or_default();
        self.registry = ColumnRegistry::from_table(&table);
        self.selection = SelectedAxis::Unselected;
        self.table = Some(table);
        self.source = source;
        self.bump();
    }

    /// Insert an empty subplot below the selected one, or at the bottom if
    /// nothing is selected. Returns the index of the new subplot.
    pub fn add_axis(&mut self) -> usize {
        let selected = self.selection.index();
        let index = self.assignment.add_axis(selected);
        // The selected slot never moves, the new one is inserted after it.
        debug!("added axis {index}, {} axes", self.assignment.num_slots());
        self.bump();
        index
    }

    /// Remove the selected subplot, or the bottom one if nothing is
    /// selected. The last remaining subplot is never removed.
    pub fn remove_axis(&mut self) -> bool {
        let index = self
            .selection
            .index()
            .unwrap_or(self.assignment.num_slots() - 1);
        if !self.assignment.remove_axis(index) {
            debug!("not removing axis {index}");
            return false;
        }
        self.selection = self.selection.after_removal(index);
        self.sync_markers();
        self.bump();
        true
    }

    /// Show or hide column `name` on the selected subplot.
    pub fn toggle_column(&mut self, name: &str) -> bool {
        let Some(index) = self.selection.index() else {
            debug!("no axis selected, ignoring column '{name}'");
            return false;
        };
        if !self.registry.contains(name) {
            debug!("unknown column '{name}'");
            return false;
        }
        let Some(assigned) = self.assignment.toggle_column(index, name) else {
            return false;
        };
        if assigned && self.assignment.slots_containing(name) > 1 {
            debug!("column '{name}' is now drawn on several axes");
        }
        self.sync_markers();
        self.bump();
        true
    }

    pub fn click_axis(&mut self, index: usize) -> bool {
        if index >= self.assignment.num_slots() {
            return false;
        }
        self.selection = self.selection.click(index);
        self.sync_markers();
        self.bump();
        true
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn table(&self) -> Option<&TimeSeriesTable> {
        self.table.as_ref()
    }

    pub fn assignment(&self) -> &PlotAssignment {
        &self.assignment
    }

    pub fn selection(&self) -> SelectedAxis {
        self.selection
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn layout(&self) -> FigureLayout {
        render::layout(self.table.as_ref(), &self.assignment, self.selection)
    }

    fn sync_markers(&mut self) {
        match self
            .selection
            .index()
            .and_then(|i| self.assignment.slot(i))
        {
            Some(slot) => self.registry.mark_exactly(slot.columns()),
            None => self.registry.clear_marks(),
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use tempfile::TempDir;

    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn loaded_session(dir: &TempDir) -> Session {
        let path = write_csv(
            dir,
            "weather.csv",
            "time,A,B\n\
             2016-03-01 10:00:00,1,2\n\
             2016-03-01 10:01:00,3,4\n",
        );
        let mut session = Session::new();
        assert!(session.dispatch(&Command::Open(path)).unwrap());
        session
    }

    fn slot_columns(session: &Session, index: usize) -> Vec<String> {
        session.assignment().slots()[index].columns().to_vec()
    }

    #[test]
    fn test_fresh_session_has_one_empty_axis() {
        let session = Session::new();
        assert_eq!(session.assignment().num_slots(), 1);
        assert!(session.assignment().slots()[0].is_empty());
        assert!(session.table().is_none());
        assert_eq!(session.selection(), SelectedAxis::Unselected);
    }

    #[test]
    fn test_open_shows_first_column() {
        init();
        let dir = TempDir::new().unwrap();
        let session = loaded_session(&dir);

        let table = session.table().unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(session.assignment().num_slots(), 1);
        assert_eq!(slot_columns(&session, 0), vec!["A"]);
        assert_eq!(session.registry().len(), 2);
        assert!(session.registry().marked().is_empty());
        assert_eq!(session.source().unwrap().file_name().unwrap(), "weather.csv");
    }

    #[test]
    fn test_open_resets_previous_state() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        session.dispatch(&Command::AddAxis).unwrap();
        session.dispatch(&Command::ClickAxis(Some(1))).unwrap();

        let other = write_csv(&dir, "other.csv", "t,C\n2020-01-01,5\n");
        session.dispatch(&Command::Open(other)).unwrap();
        assert_eq!(session.assignment().num_slots(), 1);
        assert_eq!(slot_columns(&session, 0), vec!["C"]);
        assert_eq!(session.selection(), SelectedAxis::Unselected);
    }

    #[test]
    fn test_failed_load_leaves_state_untouched() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        session.dispatch(&Command::AddAxis).unwrap();
        session.dispatch(&Command::ClickAxis(Some(0))).unwrap();
        let revision = session.revision();

        let missing = dir.path().join("missing.csv");
        let err = session.dispatch(&Command::Open(missing)).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound(_)));

        let empty = write_csv(&dir, "empty.csv", "time,A\n");
        let err = session.dispatch(&Command::Open(empty)).unwrap_err();
        assert!(matches!(err, LoadError::EmptyDataset(_)));

        assert_eq!(session.revision(), revision);
        assert_eq!(session.assignment().num_slots(), 2);
        assert_eq!(session.selection(), SelectedAxis::Selected(0));
        assert_eq!(session.registry().marked(), vec!["A"]);
        assert_eq!(session.source().unwrap().file_name().unwrap(), "weather.csv");
    }

    #[test]
    fn test_add_axis_appends_empty_slot() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        assert!(session.dispatch(&Command::AddAxis).unwrap());
        assert_eq!(session.assignment().num_slots(), 2);
        assert!(session.assignment().slots()[1].is_empty());
    }

    #[test]
    fn test_add_axis_inserts_below_selection() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        session.add_axis();
        session.click_axis(0);
        session.toggle_column("B");

        assert_eq!(session.add_axis(), 1);
        assert_eq!(session.assignment().num_slots(), 3);
        assert_eq!(slot_columns(&session, 0), vec!["A", "B"]);
        assert!(session.assignment().slots()[1].is_empty());
        assert_eq!(session.selection(), SelectedAxis::Selected(0));
    }

    #[test]
    fn test_toggle_column_twice_is_identity() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        session.click_axis(0);
        let before = session.assignment().clone();

        assert!(session.dispatch(&Command::ToggleColumn("A".into())).unwrap());
        assert!(slot_columns(&session, 0).is_empty());
        assert!(session.dispatch(&Command::ToggleColumn("A".into())).unwrap());
        assert_eq!(session.assignment(), &before);
    }

    #[test]
    fn test_toggle_column_without_selection_is_noop() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        let revision = session.revision();
        assert!(!session.dispatch(&Command::ToggleColumn("B".into())).unwrap());
        assert_eq!(slot_columns(&session, 0), vec!["A"]);
        assert_eq!(session.revision(), revision);
    }

    #[test]
    fn test_toggle_unknown_column_is_noop() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        session.click_axis(0);
        assert!(!session.toggle_column("nope"));
        assert_eq!(slot_columns(&session, 0), vec!["A"]);
    }

    #[test]
    fn test_column_on_several_axes() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        session.add_axis();
        session.click_axis(1);
        assert!(session.toggle_column("A"));
        assert_eq!(session.assignment().slots_containing("A"), 2);
        let layout = session.layout();
        assert_eq!(layout.subplots[0].series[0].name, "A");
        assert_eq!(layout.subplots[1].series[0].name, "A");
    }

    #[test]
    fn test_remove_last_axis_is_noop() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        assert!(!session.dispatch(&Command::RemoveAxis).unwrap());
        session.click_axis(0);
        assert!(!session.dispatch(&Command::RemoveAxis).unwrap());
        assert_eq!(session.assignment().num_slots(), 1);
        assert_eq!(slot_columns(&session, 0), vec!["A"]);
    }

    #[test]
    fn test_remove_axis_without_selection_removes_bottom() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        session.add_axis();
        session.click_axis(1);
        session.toggle_column("B");
        session.click_axis(1);
        session.add_axis();

        assert!(session.remove_axis());
        assert_eq!(session.assignment().num_slots(), 2);
        assert_eq!(slot_columns(&session, 1), vec!["B"]);
    }

    #[test]
    fn test_remove_selected_axis_deselects() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        session.add_axis();
        session.click_axis(0);
        assert!(session.remove_axis());
        assert_eq!(session.selection(), SelectedAxis::Unselected);
        assert!(session.registry().marked().is_empty());
        assert!(session.assignment().slots()[0].is_empty());
    }

    #[test]
    fn test_selection_marks_columns() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        session.click_axis(0);
        assert_eq!(session.registry().marked(), vec!["A"]);

        session.toggle_column("B");
        assert_eq!(session.registry().marked(), vec!["A", "B"]);

        assert!(session.dispatch(&Command::ClickAxis(Some(0))).unwrap());
        assert_eq!(session.selection(), SelectedAxis::Unselected);
        assert!(session.registry().marked().is_empty());
    }

    #[test]
    fn test_clicks_outside_axes_are_ignored() {
        init();
        let dir = TempDir::new().unwrap();
        let mut session = loaded_session(&dir);
        let revision = session.revision();
        assert!(!session.dispatch(&Command::ClickAxis(None)).unwrap());
        assert!(!session.dispatch(&Command::ClickAxis(Some(5))).unwrap());
        assert_eq!(session.selection(), SelectedAxis::Unselected);
        assert_eq!(session.revision(), revision);
    }

    #[test]
    fn test_layout_draws_rows_in_order() {
        init();
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "temp.csv",
            "time,temperature\n\
             2016-03-01 10:00:00,10\n\
             2016-03-01 11:00:00,20\n\
             2016-03-01 12:00:00,30\n",
        );
        let mut session = Session::new();
        session.open(&path).unwrap();

        let layout = session.layout();
        let points = &layout.subplots[0].series[0].points;
        let ys: Vec<f64> = points.iter().map(|[_, y]| *y).collect();
        assert_eq!(ys, vec![10.0, 20.0, 30.0]);
        assert!(points.windows(2).all(|w| w[0][0] < w[1][0]));
        assert_eq!(points[2][0] - points[0][0], 7200.0);
    }
}
