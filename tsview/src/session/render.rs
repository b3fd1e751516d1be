use chrono::DateTime;

use super::{assignment::PlotAssignment, selection::SelectedAxis, table::TimeSeriesTable};

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;

/// Everything needed to draw the stacked subplots, independent of the
/// drawing backend. Built fresh from the session state, so drawing the same
/// state twice gives the same figure.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FigureLayout {
    pub subplots: Vec<SubplotLayout>,
    /// Shared time range of all subplots, seconds since epoch.
    pub x_range: Option<[f64; 2]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubplotLayout {
    pub index: usize,
    pub highlighted: bool,
    pub show_legend: bool,
    pub series: Vec<SeriesLayout>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesLayout {
    pub name: String,
    /// Position of the column in the table; stable color key.
    pub color_index: usize,
    /// `(seconds since epoch, value)` in row order.
    pub points: Vec<[f64; 2]>,
}

impl SubplotLayout {
    /// Smallest and largest finite value over all series.
    pub fn y_range(&self) -> Option<[f64; 2]> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|[_, y]| *y))
            .filter(|y| y.is_finite())
            .fold(None, |range, y| match range {
                None => Some([y, y]),
                Some([lo, hi]) => Some([lo.min(y), hi.max(y)]),
            })
    }
}

pub fn layout(
    table: Option<&TimeSeriesTable>,
    assignment: &PlotAssignment,
    selection: SelectedAxis,
) -> FigureLayout {
    let subplots = assignment
        .slots()
        .iter()
        .enumerate()
        .map(|(index, slot)| SubplotLayout {
            index,
            highlighted: selection.is_selected(index),
            show_legend: !slot.is_empty(),
            series: slot
                .columns()
                .iter()
                .filter_map(|name| {
                    let table = table?;
                    let (Some(color_index), Some(points)) =
                        (table.column_position(name), table.series(name))
                    else {
                        log::warn!("column '{name}' of axis {index} is not in the table");
                        return None;
                    };
                    Some(SeriesLayout {
                        name: name.to_owned(),
                        color_index,
                        points,
                    })
                })
                .collect(),
        })
        .collect();

    FigureLayout {
        subplots,
        x_range: table.and_then(|t| t.time_range()),
    }
}

/// Tick label for `seconds` since epoch. The resolution follows the visible
/// span, unless a fixed chrono format is given.
pub fn format_time_tick(seconds: f64, visible_span: f64, fixed_format: Option<&str>) -> String {
    let fmt = fixed_format.unwrap_or(if visible_span > 2.0 * DAY {
        "%Y-%m-%d"
    } else if visible_span > HOUR {
        "%m-%d %H:%M"
    } else {
        "%H:%M:%S"
    });
    format_time(seconds, fmt)
}

pub fn format_time(seconds: f64, fmt: &str) -> String {
    if !seconds.is_finite() {
        return String::new();
    }
    let secs = seconds.floor();
    let nanos = ((seconds - secs) * 1e9) as u32;
    match DateTime::from_timestamp(secs as i64, nanos) {
        Some(dt) => dt.format(fmt).to_string(),
        None => format!("{seconds:.0}"),
    }
}
