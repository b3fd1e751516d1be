mod logic;
mod ui;

pub use logic::save_svg;

use crate::session::{FigureLayout, Session};

/// Minimum height of one subplot in points.
const MIN_SUBPLOT_HEIGHT: f32 = 80.0;

#[derive(Default)]
pub struct Plotter {
    /// Layout of the last drawn session revision.
    cache: Option<(u64, FigureLayout)>,
}

impl Plotter {
    pub fn new() -> Self {
        Self { cache: None }
    }

    /// The figure for the current session state, rebuilt only when the
    /// session changed since the last call.
    fn layout(&mut self, session: &Session) -> &FigureLayout {
        let revision = session.revision();
        if !matches!(&self.cache, Some((cached, _)) if *cached == revision) {
            self.cache = None;
        }
        let (_, layout) = self.cache.get_or_insert_with(|| {
            log::debug!("rebuilding plot layout for revision {revision}");
            (revision, session.layout())
        });
        layout
    }
}

pub fn auto_color(color_idx: usize) -> egui::Color32 {
    // analog to egui_plot
    let golden_ratio = (5.0_f32.sqrt() - 1.0) / 2.0; // 0.61803398875
    let h = color_idx as f32 * golden_ratio;
    egui::epaint::Hsva::new(h, 0.85, 0.5, 1.0).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Command;

    #[test]
    fn test_layout_is_cached_per_revision() {
        let mut session = Session::new();
        let mut plotter = Plotter::new();
        assert_eq!(plotter.layout(&session).subplots.len(), 1);
        let revision = plotter.cache.as_ref().unwrap().0;

        // Same revision, same cache entry.
        plotter.layout(&session);
        assert_eq!(plotter.cache.as_ref().unwrap().0, revision);

        session.dispatch(&Command::AddAxis).unwrap();
        assert_eq!(plotter.layout(&session).subplots.len(), 2);
        assert_ne!(plotter.cache.as_ref().unwrap().0, revision);
    }

    #[test]
    fn test_default_plotter_starts_without_cache() {
        let session = Session::new();
        let mut plotter = Plotter::default();
        assert!(plotter.cache.is_none());
        assert_eq!(plotter.layout(&session).subplots.len(), 1);
        assert!(plotter.cache.is_some());
    }

    #[test]
    fn test_auto_color_differs_between_neighbours() {
        assert_ne!(auto_color(0), auto_color(1));
        assert_eq!(auto_color(3), auto_color(3));
    }
}
