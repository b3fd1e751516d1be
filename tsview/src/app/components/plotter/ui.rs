use app_core::EventQueue;
use egui::{Stroke, Vec2b};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use super::{auto_color, MIN_SUBPLOT_HEIGHT};
use crate::{
    app::{config::Config, EguiApp},
    session::{render::format_time_tick, Command, Session, SubplotLayout},
};

impl super::Plotter {
    pub fn render(
        &mut self,
        session: &Session,
        config: &Config,
        event_queue: &mut EventQueue<EguiApp>,
        ui: &mut egui::Ui,
    ) {
        // Clicks that do not hit a subplot land here; plots added later
        // take precedence.
        let background = ui.interact(
            ui.max_rect(),
            ui.id().with("plot_background"),
            egui::Sense::click(),
        );

        let layout = self.layout(session);
        let num_subplots = layout.subplots.len();
        let spacing = ui.spacing().item_spacing.y;
        let height = ((ui.available_height() - spacing * (num_subplots - 1) as f32)
            / num_subplots as f32)
            .max(MIN_SUBPLOT_HEIGHT);
        let link_group = ui.id().with("time_axis");

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for subplot in layout.subplots.iter() {
                    let is_bottom = subplot.index + 1 == num_subplots;
                    if plot_subplot(subplot, is_bottom, height, link_group, config, ui) {
                        clicked = Some(subplot.index);
                    }
                }
            });

        if clicked.is_some() {
            event_queue.queue_event(Box::new(Command::ClickAxis(clicked)));
        } else if background.clicked() {
            event_queue.queue_event(Box::new(Command::ClickAxis(None)));
        }
    }
}

/// Draw one subplot; returns whether it was clicked.
fn plot_subplot(
    subplot: &SubplotLayout,
    is_bottom: bool,
    height: f32,
    link_group: egui::Id,
    config: &Config,
    ui: &mut egui::Ui,
) -> bool {
    let date_format = config.date_format.clone();
    let label_format = config.date_format.clone();

    let mut plot = Plot::new(("subplot", subplot.index))
        .height(height)
        .link_axis(link_group, Vec2b::new(true, false))
        .link_cursor(link_group, Vec2b::new(true, false))
        .show_axes(Vec2b::new(is_bottom, true))
        .x_axis_formatter(move |mark, range| {
            format_time_tick(mark.value, range.end() - range.start(), date_format.as_deref())
        })
        .label_formatter(move |name, point| {
            let time = format_time_tick(
                point.x,
                0.0,
                Some(label_format.as_deref().unwrap_or("%Y-%m-%d %H:%M:%S")),
            );
            if name.is_empty() {
                format!("{time}\n{:.4}", point.y)
            } else {
                format!("{name}\n{time}\n{:.4}", point.y)
            }
        });
    if subplot.show_legend {
        plot = plot.legend(Legend::default());
    }

    let response = plot.show(ui, |plot_ui| {
        for series in subplot.series.iter() {
            plot_ui.line(
                Line::new(PlotPoints::from(series.points.clone()))
                    .name(&series.name)
                    .color(auto_color(series.color_index))
                    .width(config.line_width as f32),
            );
        }
    });

    if subplot.highlighted {
        let color = ui.visuals().selection.stroke.color;
        ui.painter()
            .rect_stroke(response.response.rect, 2.0, Stroke::new(2.0, color));
    }
    response.response.clicked()
}
