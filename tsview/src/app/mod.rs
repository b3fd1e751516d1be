mod components;
pub mod config;
mod events;
mod status;

use std::{path::PathBuf, time::Duration};

use app_core::{run_events, EventQueue, HasEventQueue};

use self::components::{ColumnList, Plotter};
use crate::session::{Command, Session};
use config::Config;
use events::{ExportSvgRequested, OpenFileRequested};
use status::{StatusBar, StatusLevel};

/// How often to look at pending dialogs and expiring status messages.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct EguiApp {
    config: Config,
    session: Session,
    column_list: ColumnList,
    plotter: Plotter,
    status: StatusBar,
    shortcuts_modal_open: bool,
    event_queue: EventQueue<Self>,
    request_redraw: Option<()>,
}

impl HasEventQueue for EguiApp {
    fn event_queue(&mut self) -> &mut EventQueue<Self> {
        &mut self.event_queue
    }
}

impl EguiApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        Self::with_config(config)
    }

    fn with_config(config: Config) -> Self {
        let status = StatusBar::new(Duration::from_secs(config.status_timeout_secs));
        Self {
            config,
            session: Session::new(),
            column_list: ColumnList::default(),
            plotter: Plotter::new(),
            status,
            shortcuts_modal_open: false,
            event_queue: EventQueue::new(),
            request_redraw: None,
        }
    }

    fn update_state(&mut self) {
        if run_events(self) {
            self.request_redraw();
        }
    }

    pub fn request_redraw(&mut self) {
        self.request_redraw = Some(());
    }

    fn queue_command(&mut self, command: Command) {
        self.event_queue.queue_event(Box::new(command));
    }

    fn request_open_dialog(&mut self) {
        log::debug!("open dialog to select csv file");
        let handle = std::thread::spawn(|| {
            rfd::FileDialog::new()
                .add_filter("CSV", &["csv", "txt"])
                .pick_file()
        });
        let event = OpenFileRequested::new(Some(handle));
        self.event_queue.queue_event(Box::new(event));
    }

    fn request_export_dialog(&mut self) {
        log::debug!("open dialog to select svg plot path");
        let handle = std::thread::spawn(|| {
            rfd::FileDialog::new()
                .add_filter("SVG", &["svg"])
                .set_file_name("plot.svg")
                .save_file()
        });
        let event = ExportSvgRequested::new(Some(handle));
        self.event_queue.queue_event(Box::new(event));
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        if let Some((first, rest)) = dropped.split_first() {
            if !rest.is_empty() {
                log::warn!("{} files dropped, only opening {:?}", dropped.len(), first);
            }
            self.queue_command(Command::Open(first.clone()));
        }
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.request_redraw.take().is_some() {
            ctx.request_repaint();
        }

        self.handle_dropped_files(ctx);
        self.update_state();

        // Dialogs are polled by busy events, messages expire on their own.
        if !self.event_queue.is_empty() || self.status.current().is_some() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }

        let mut should_quit = false;

        // Handle keyboard input.
        ctx.input(|i| {
            // Help window.
            if i.key_pressed(egui::Key::F1) {
                self.shortcuts_modal_open = !self.shortcuts_modal_open;
            }
            // Close app.
            if i.key_pressed(egui::Key::F10) {
                should_quit = true;
            }
            if i.key_pressed(egui::Key::O) && i.modifiers.ctrl {
                self.request_open_dialog();
            }
            if i.key_pressed(egui::Key::E) && i.modifiers.ctrl {
                self.request_export_dialog();
            }
        });

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.render_shortcut_modal(ctx);
            self.menu(ui, ctx);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status_bar(ui);
        });

        egui::SidePanel::left("column_panel")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| {
                self.column_list
                    .render(&self.session, &mut self.event_queue, ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.plotter
                .render(&self.session, &self.config, &mut self.event_queue, ui);
        });

        preview_dropped_files(ctx);

        if should_quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl EguiApp {
    fn menu(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open… (Ctrl+O)").clicked() {
                    self.request_open_dialog();
                    ui.close_menu();
                }
                let has_data = self.session.table().is_some();
                if ui
                    .add_enabled(has_data, egui::Button::new("Export SVG… (Ctrl+E)"))
                    .clicked()
                {
                    self.request_export_dialog();
                    ui.close_menu();
                }
                if ui.button("Exit (F10)").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.toggle_value(&mut self.shortcuts_modal_open, "Help (F1)");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                egui::widgets::global_theme_preference_buttons(ui);
            });
        });
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match (self.session.source(), self.session.table()) {
                (Some(path), Some(table)) => {
                    let name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    ui.label(format!("{name} ({} rows)", table.len()))
                        .on_hover_text(path.display().to_string());
                }
                _ => {
                    ui.weak("no file loaded");
                }
            }
            if let Some((level, text)) = self.status.current() {
                ui.separator();
                match level {
                    StatusLevel::Info => ui.label(text),
                    StatusLevel::Error => {
                        ui.colored_label(ui.visuals().error_fg_color, text)
                    }
                };
            }
        });
    }

    fn render_shortcut_modal(&mut self, ctx: &egui::Context) {
        if self.shortcuts_modal_open
            && egui::Modal::new("shortcut_modal".into())
                .show(ctx, |ui| {
                    ui.heading("Keyboard Shortcuts");
                    ui.separator();
                    ui.label("CTRL + O = Open CSV File");
                    ui.separator();
                    ui.label("CTRL + E = Export Plot as SVG");
                    ui.separator();
                    ui.label("F1 = Show Keyboard Shortcuts");
                    ui.separator();
                    ui.label("F10 = Quit App");
                    ui.separator();
                    ui.heading("Mouse");
                    ui.separator();
                    ui.label("Click a plot = Select/Deselect Axis");
                    ui.separator();
                    ui.label("Click a column = Show/Hide on Selected Axis");
                    ui.separator();
                    ui.label("Drop a file on the window = Open it");
                    ui.separator();
                })
                .should_close()
        {
            self.shortcuts_modal_open = false;
        };
    }
}

/// Dim the window while files are dragged over it.
fn preview_dropped_files(ctx: &egui::Context) {
    use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

    if ctx.input(|i| i.raw.hovered_files.is_empty()) {
        return;
    }
    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
    let screen_rect = ctx.screen_rect();
    painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
    painter.text(
        screen_rect.center(),
        Align2::CENTER_CENTER,
        "Drop a CSV file to open it",
        TextStyle::Heading.resolve(&ctx.style()),
        Color32::WHITE,
    );
}
