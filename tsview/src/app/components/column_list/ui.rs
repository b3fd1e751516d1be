use app_core::EventQueue;

use crate::{
    app::EguiApp,
    session::{Command, SelectedAxis, Session},
};

impl super::ColumnList {
    pub fn render(
        &mut self,
        session: &Session,
        event_queue: &mut EventQueue<EguiApp>,
        ui: &mut egui::Ui,
    ) {
        let num_axes = session.assignment().num_slots();

        ui.heading("Axes");
        ui.horizontal(|ui| {
            if ui
                .button("➕ add axis")
                .on_hover_text("insert an empty axis below the selected one")
                .clicked()
            {
                event_queue.queue_event(Box::new(Command::AddAxis));
            }
            if ui
                .add_enabled(num_axes > 1, egui::Button::new("🗑 delete axis"))
                .on_hover_text("remove the selected axis, or the bottom one")
                .clicked()
            {
                event_queue.queue_event(Box::new(Command::RemoveAxis));
            }
        });
        match session.selection() {
            SelectedAxis::Selected(i) => {
                ui.label(format!("axis {} of {num_axes} selected", i + 1));
            }
            SelectedAxis::Unselected => {
                ui.weak("click a plot to select an axis");
            }
        }

        ui.separator();
        ui.heading("Columns");

        if session.registry().is_empty() {
            ui.weak("open a CSV file (Ctrl+O) or drop one here");
            return;
        }

        ui.add(
            egui::TextEdit::singleline(&mut self.filter)
                .hint_text("filter")
                .desired_width(f32::INFINITY),
        );

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (name, marked) in session
                    .registry()
                    .iter()
                    .filter(|(name, _)| super::matches_filter(name, &self.filter))
                {
                    if ui
                        .add(egui::SelectableLabel::new(marked, name))
                        .clicked()
                    {
                        event_queue.queue_event(Box::new(Command::ToggleColumn(name.to_owned())));
                    }
                }
            });
    }
}
