use std::path::Path;

use app_core::string_error::ErrorStringExt;
use svg_export::{Figure, LinePlot};

use crate::{
    app::{config::Config, EguiApp},
    session::{render::format_time_tick, FigureLayout},
};

pub fn save_svg(app: &EguiApp, path: &Path) -> Result<(), String> {
    log::debug!("requested to save svg at '{:?}'", path);
    let raw_svg = figure_svg(&app.session.layout(), &app.config);
    std::fs::write(path, raw_svg).err_to_string("could not write svg file")
}

/// Render the stacked subplots the same way they appear on screen: shared
/// time limits, date labels on the bottom axis only.
pub(super) fn figure_svg(layout: &FigureLayout, config: &Config) -> String {
    let num_subplots = layout.subplots.len();
    let mut fig = Figure::stacked(config.svg_width, config.svg_height, num_subplots);
    let [xmin, xmax] = layout.x_range.unwrap_or([0.0, 1.0]);

    for (ax, subplot) in fig.axes_mut().iter_mut().zip(layout.subplots.iter()) {
        ax.set_xlim(xmin, xmax, layout.x_range.is_some());
        // The axis widens a single timestamp, label for the widened span.
        let [left, right, _, _] = ax.limits();
        let span = right - left;
        let [ymin, ymax] = subplot.y_range().unwrap_or([0.0, 1.0]);
        ax.set_ylim(ymin, ymax);
        ax.set_legend(subplot.show_legend);
        ax.set_xtick_labels(subplot.index + 1 == num_subplots);
        if layout.x_range.is_some() {
            let date_format = config.date_format.clone();
            ax.set_x_formatter(Box::new(move |x| {
                format_time_tick(x, span, date_format.as_deref())
            }));
        }

        for series in subplot.series.iter() {
            // Colors are the same as in the GUI.
            let color: String = super::auto_color(series.color_index)
                .to_hex()
                .chars()
                .take(7)
                .collect();
            log::debug!("plotting line with label {}", series.name);
            ax.add_line(
                LinePlot::new(&series.points)
                    .with_color(&color)
                    .with_linewidth(config.line_width)
                    .with_name(&series.name),
            );
        }
    }
    fig.render()
}
