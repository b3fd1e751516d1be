use std::{path::PathBuf, thread::JoinHandle};

use app_core::{AppEvent, EventState};
use derive_new::new;

use super::{components::save_svg, EguiApp};
use crate::session::Command;

// ---------------------------------------------------------------------------
//
//
// Events
//
//
// ---------------------------------------------------------------------------

/// Waits for the file dialog, then opens the chosen file.
#[derive(new)]
pub struct OpenFileRequested {
    thread_handle: Option<JoinHandle<Option<PathBuf>>>,
}

/// Waits for the save dialog, then writes the current figure as SVG.
#[derive(new)]
pub struct ExportSvgRequested {
    thread_handle: Option<JoinHandle<Option<PathBuf>>>,
}

// ---------------------------------------------------------------------------
//
//
// apply()
//
//
// ---------------------------------------------------------------------------

impl AppEvent for Command {
    type App = EguiApp;

    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String> {
        match app.session.dispatch(self) {
            Ok(changed) => {
                match self {
                    Command::Open(path) => app.status.info(format!("opened {}", path.display())),
                    Command::ToggleColumn(_) if app.session.selection().index().is_none() => {
                        app.status.info("click a plot to select an axis first")
                    }
                    _ => (),
                }
                if changed {
                    app.request_redraw();
                }
                Ok(EventState::Finished)
            }
            Err(err) => {
                let msg = err.to_string();
                app.status.error(msg.clone());
                Err(msg)
            }
        }
    }

    fn describe(&self) -> &str {
        match self {
            Command::Open(_) => "open file",
            Command::AddAxis => "add axis",
            Command::RemoveAxis => "remove axis",
            Command::ToggleColumn(_) => "toggle column",
            Command::ClickAxis(_) => "click axis",
        }
    }
}

impl AppEvent for OpenFileRequested {
    type App = EguiApp;

    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String> {
        let Some(handle) = self.thread_handle.take_if(|handle| handle.is_finished()) else {
            return Ok(EventState::Busy);
        };
        match handle.join() {
            Ok(Some(path)) => Command::Open(path).apply(app),
            Ok(None) => Ok(EventState::Finished),
            Err(err) => Err(format!("file dialog failed: {:?}", err)),
        }
    }

    fn describe(&self) -> &str {
        "open file dialog"
    }
}

impl AppEvent for ExportSvgRequested {
    type App = EguiApp;

    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String> {
        let Some(handle) = self.thread_handle.take_if(|handle| handle.is_finished()) else {
            return Ok(EventState::Busy);
        };
        match handle.join() {
            Ok(Some(path)) => match save_svg(app, &path) {
                Ok(()) => {
                    app.status.info(format!("saved plot to {}", path.display()));
                    Ok(EventState::Finished)
                }
                Err(err) => {
                    app.status.error(err.clone());
                    Err(err)
                }
            },
            Ok(None) => Ok(EventState::Finished),
            Err(err) => Err(format!("save dialog failed: {:?}", err)),
        }
    }

    fn describe(&self) -> &str {
        "export svg dialog"
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use app_core::run_events;
    use tempfile::TempDir;

    use super::*;
    use crate::app::{status::StatusLevel, Config};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn write_csv(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("data.csv");
        fs::write(
            &path,
            "time,temperature,pressure\n\
             2016-03-01 10:00:00,10,1000\n\
             2016-03-01 10:01:00,11,1001\n",
        )
        .unwrap();
        path
    }

    fn dialog_returning(path: Option<PathBuf>) -> Option<JoinHandle<Option<PathBuf>>> {
        let handle = std::thread::spawn(move || path);
        while !handle.is_finished() {
            std::thread::yield_now();
        }
        Some(handle)
    }

    #[test]
    fn test_commands_run_in_order() {
        init();
        let dir = TempDir::new().unwrap();
        let mut app = EguiApp::with_config(Config::default());
        app.queue_command(Command::Open(write_csv(&dir)));
        app.queue_command(Command::AddAxis);
        app.queue_command(Command::ClickAxis(Some(1)));
        app.queue_command(Command::ToggleColumn("pressure".into()));

        assert!(run_events(&mut app));
        let slots = app.session.assignment().slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].columns(), ["temperature"]);
        assert_eq!(slots[1].columns(), ["pressure"]);
        assert_eq!(app.session.registry().marked(), vec!["pressure"]);
    }

    #[test]
    fn test_failed_open_is_reported_on_status_bar() {
        init();
        let dir = TempDir::new().unwrap();
        let mut app = EguiApp::with_config(Config::default());
        app.queue_command(Command::Open(dir.path().join("missing.csv")));

        run_events(&mut app);
        let (level, text) = app.status.current().unwrap();
        assert_eq!(level, StatusLevel::Error);
        assert!(text.contains("missing.csv"));
        assert!(app.session.table().is_none());
    }

    #[test]
    fn test_toggle_without_selection_shows_hint() {
        init();
        let dir = TempDir::new().unwrap();
        let mut app = EguiApp::with_config(Config::default());
        app.queue_command(Command::Open(write_csv(&dir)));
        app.queue_command(Command::ToggleColumn("pressure".into()));

        run_events(&mut app);
        let (level, text) = app.status.current().unwrap();
        assert_eq!(level, StatusLevel::Info);
        assert!(text.contains("select an axis"));
        assert_eq!(app.session.assignment().slots()[0].columns(), ["temperature"]);
    }

    #[test]
    fn test_open_dialog_result_is_loaded() {
        init();
        let dir = TempDir::new().unwrap();
        let mut app = EguiApp::with_config(Config::default());
        let event = OpenFileRequested::new(dialog_returning(Some(write_csv(&dir))));
        app.event_queue.queue_event(Box::new(event));

        assert!(run_events(&mut app));
        assert!(app.event_queue.is_empty());
        assert!(app.session.table().is_some());
    }

    #[test]
    fn test_cancelled_dialog_changes_nothing() {
        init();
        let mut app = EguiApp::with_config(Config::default());
        let revision = app.session.revision();
        let event = OpenFileRequested::new(dialog_returning(None));
        app.event_queue.queue_event(Box::new(event));

        run_events(&mut app);
        assert!(app.event_queue.is_empty());
        assert_eq!(app.session.revision(), revision);
    }

    #[test]
    fn test_export_dialog_writes_svg() {
        init();
        let dir = TempDir::new().unwrap();
        let mut app = EguiApp::with_config(Config::default());
        app.queue_command(Command::Open(write_csv(&dir)));
        run_events(&mut app);

        let target = dir.path().join("plot.svg");
        let event = ExportSvgRequested::new(dialog_returning(Some(target.clone())));
        app.event_queue.queue_event(Box::new(event));
        run_events(&mut app);

        let svg = fs::read_to_string(&target).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(">temperature</text>"));
        assert_eq!(app.status.current().unwrap().0, StatusLevel::Info);
    }
}
