#![warn(clippy::all, rust_2018_idioms)]

use tsview::{Config, EguiApp};

const WINDOW_NAME: &str = "Simple Time Series Viewer";
const MIN_WINDOW_WIDTH: f32 = 400.0;
const MIN_WINDOW_HEIGHT: f32 = 300.0;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match Config::from_config_file() {
        Ok(config) => config,
        Err(err) => {
            log::warn!("unable to load config file \".tsview\" from home directory: {err}");
            Config::default()
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(EguiApp::new(cc, config)))),
    )
}
