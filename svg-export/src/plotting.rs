use crate::svg::{self, opts, Params, RenderTag, Tag};

/// Formats the value at a tick position into its label.
pub type TickFormatter = Box<dyn Fn(f64) -> String>;

const MARGIN_LEFT: f64 = 0.09;
const MARGIN_RIGHT: f64 = 0.03;
const MARGIN_TOP: f64 = 0.03;
const MARGIN_BOTTOM: f64 = 0.08;
const AXIS_GAP: f64 = 0.025;

// ----------------------------------------------------------------------------
//
//
// Figure
//
//
// ----------------------------------------------------------------------------

/// The Figure defines the overall size of a plot and holds the axes.
pub struct Figure {
    width: u64,
    height: u64,
    axes: Vec<Axis>,
}

impl Figure {
    pub fn empty(width: u64, height: u64) -> Self {
        Self {
            width,
            height,
            axes: Vec::new(),
        }
    }

    /// A figure with `n` axes stacked on top of each other, filling the
    /// figure from top to bottom.
    pub fn stacked(width: u64, height: u64, n: usize) -> Self {
        let mut fig = Self::empty(width, height);
        let n = n.max(1);
        let usable = 1.0 - MARGIN_TOP - MARGIN_BOTTOM - AXIS_GAP * (n - 1) as f64;
        let axis_height = usable / n as f64;
        for i in 0..n {
            let v = MARGIN_TOP + i as f64 * (axis_height + AXIS_GAP);
            fig.add_axis(Axis::new(
                MARGIN_LEFT,
                v,
                1.0 - MARGIN_LEFT - MARGIN_RIGHT,
                axis_height,
            ));
        }
        fig
    }

    pub fn add_axis(&mut self, ax: Axis) {
        self.axes.push(ax);
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut [Axis] {
        &mut self.axes
    }

    /// Render this `Figure` to raw SVG markup.
    pub fn render(&self) -> String {
        let mut root = Tag::svg(self.width, self.height);
        root.add_child(Tag::rect(
            0.0,
            0.0,
            self.width as f64,
            self.height as f64,
            opts(&[("fill", "white")]),
        ));
        for ax in self.axes.iter() {
            root.add_children(ax.to_tags(self));
        }
        svg::render(&root)
    }
}

impl Default for Figure {
    fn default() -> Self {
        Self::stacked(800, 600, 1)
    }
}

// ----------------------------------------------------------------------------
//
//
// Axis
//
//
// ----------------------------------------------------------------------------

/// The container for line plots, placed in the figure in normalized
/// coordinates.
pub struct Axis {
    /// u coordinate of the upper left corner, normalized to [0, 1]
    u: f64,
    /// v coordinate of the upper left corner, normalized to [0, 1]
    v: f64,
    width: f64,
    height: f64,
    limits: [f64; 4],
    plots: Vec<LinePlot>,
    draw_legend: bool,
    draw_xtick_labels: bool,
    x_formatter: Option<TickFormatter>,
    ticks: Ticks,
}

impl Axis {
    pub fn new(u: f64, v: f64, width: f64, height: f64) -> Self {
        Axis {
            u,
            v,
            width,
            height,
            limits: [0.0, 1.0, 0.0, 1.0],
            plots: Vec::new(),
            draw_legend: false,
            draw_xtick_labels: true,
            x_formatter: None,
            ticks: Ticks::default(),
        }
    }

    /// Set the x limits; ticks are placed at round values, or at round time
    /// steps if `time_axis` is set.
    pub fn set_xlim(&mut self, xmin: f64, xmax: f64, time_axis: bool) {
        let (xmin, xmax) = widen_if_degenerate(xmin, xmax);
        self.limits[0] = xmin;
        self.limits[1] = xmax;
        self.ticks.xpos = if time_axis {
            time_tick_positions(xmin, xmax)
        } else {
            tick_positions(xmin, xmax)
        };
    }

    pub fn set_ylim(&mut self, ymin: f64, ymax: f64) {
        let (ymin, ymax) = widen_if_degenerate(ymin, ymax);
        self.limits[2] = ymin;
        self.limits[3] = ymax;
        self.ticks.ypos = tick_positions(ymin, ymax);
    }

    pub fn limits(&self) -> [f64; 4] {
        self.limits
    }

    pub fn add_line(&mut self, line: LinePlot) {
        self.plots.push(line);
    }

    pub fn set_legend(&mut self, flag: bool) {
        self.draw_legend = flag;
    }

    pub fn set_xtick_labels(&mut self, flag: bool) {
        self.draw_xtick_labels = flag;
    }

    pub fn set_x_formatter(&mut self, formatter: TickFormatter) {
        self.x_formatter = Some(formatter);
    }

    fn transform(&self, fig: &Figure) -> Transform {
        Transform {
            fig_width: fig.width as f64,
            fig_height: fig.height as f64,
            u: self.u,
            v: self.v,
            width: self.width,
            height: self.height,
            limits: self.limits,
        }
    }

    /// Convert `Axis` into a Vec of `svg::Tag`.
    fn to_tags(&self, fig: &Figure) -> Vec<Box<dyn RenderTag>> {
        let t = self.transform(fig);
        let mut group = Tag::group(None);

        let (x0, y0) = t.to_screen_normalized(0.0, 0.0);
        let (x1, y1) = t.to_screen_normalized(1.0, 1.0);
        group.add_child(Tag::rect(
            x0,
            y0,
            x1 - x0,
            y1 - y0,
            opts(&[("fill", "none"), ("stroke", "black"), ("stroke-width", "1")]),
        ));

        let mut plot_group = Tag::group(None);
        for line in self.plots.iter() {
            plot_group.add_children(line.to_tags(&t));
        }
        group.add_child(plot_group);

        group.add_children(self.ticks.to_tags(self, &t));

        if self.draw_legend {
            for (i, line) in self.plots.iter().filter(|p| !p.name.is_empty()).enumerate() {
                let (x, y) = t.to_screen_normalized(0.98, 0.08 + 0.08 * i as f64);
                let color = line.style.get("stroke").map(String::as_str).unwrap_or("black");
                group.add_child(Tag::text(
                    x,
                    y,
                    0.0,
                    &line.name,
                    opts(&[("fill", color), ("text-anchor", "end"), ("font-size", "10pt")]),
                ));
            }
        }

        vec![Box::new(group)]
    }
}

/// Maps data coordinates of one axis to figure pixels.
struct Transform {
    fig_width: f64,
    fig_height: f64,
    u: f64,
    v: f64,
    width: f64,
    height: f64,
    limits: [f64; 4],
}

impl Transform {
    /// Normalized axis coordinates (0, 0 is the upper left corner) to pixels.
    fn to_screen_normalized(&self, s: f64, t: f64) -> (f64, f64) {
        (
            self.fig_width * (self.u + s * self.width),
            self.fig_height * (self.v + t * self.height),
        )
    }

    fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let [xmin, xmax, ymin, ymax] = self.limits;
        let s = (x - xmin) / (xmax - xmin);
        let t = 1.0 - (y - ymin) / (ymax - ymin);
        self.to_screen_normalized(s, t)
    }
}

// ----------------------------------------------------------------------------
//
//
// Ticks
//
//
// ----------------------------------------------------------------------------

/// The ticks of the axes. Includes ticks and tick labels.
struct Ticks {
    xpos: Vec<f64>,
    ypos: Vec<f64>,
    color: String,
}

impl Default for Ticks {
    fn default() -> Self {
        Self {
            xpos: Vec::new(),
            ypos: Vec::new(),
            color: "black".to_string(),
        }
    }
}

impl Ticks {
    fn to_tags(&self, ax: &Axis, t: &Transform) -> Vec<Box<dyn RenderTag>> {
        let [xmin, _, ymin, _] = ax.limits;
        let style = opts(&[("stroke", &self.color[..]), ("stroke-width", "1")]);
        let grid_style = opts(&[("stroke", "lightgray"), ("stroke-width", "0.5")]);
        let mut tags: Vec<Box<dyn RenderTag>> = Vec::new();

        let x_labels: Vec<String> = match &ax.x_formatter {
            Some(formatter) => self.xpos.iter().map(|x| formatter(*x)).collect(),
            None => format_ticks(&self.xpos),
        };
        for (x, label) in self.xpos.iter().zip(x_labels) {
            let (px, py) = t.to_screen(*x, ymin);
            let (_, top) = t.to_screen_normalized(0.0, 0.0);
            tags.push(Box::new(Tag::line(px, top, px, py, grid_style.clone())));
            tags.push(Box::new(Tag::line(px, py, px, py + 5.0, style.clone())));
            if ax.draw_xtick_labels {
                tags.push(Box::new(Tag::text(
                    px,
                    py + 18.0,
                    0.0,
                    &label,
                    opts(&[("text-anchor", "middle"), ("font-size", "9pt")]),
                )));
            }
        }

        for (y, label) in self.ypos.iter().zip(format_ticks(&self.ypos)) {
            let (px, py) = t.to_screen(xmin, *y);
            let (right, _) = t.to_screen_normalized(1.0, 0.0);
            tags.push(Box::new(Tag::line(px, py, right, py, grid_style.clone())));
            tags.push(Box::new(Tag::line(px - 5.0, py, px, py, style.clone())));
            tags.push(Box::new(Tag::text(
                px - 8.0,
                py + 4.0,
                0.0,
                &label,
                opts(&[("text-anchor", "end"), ("font-size", "9pt")]),
            )));
        }
        tags
    }
}

// ----------------------------------------------------------------------------
//
//
// LinePlot
//
//
// ----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct LinePlot {
    points: Vec<[f64; 2]>,
    style: Params,
    name: String,
}

impl LinePlot {
    pub fn new(points: &[[f64; 2]]) -> Self {
        Self {
            points: points.to_vec(),
            style: Params::new(),
            name: String::new(),
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.style.insert("stroke".to_string(), color.to_string());
        self
    }

    pub fn with_linewidth(mut self, linewidth: f64) -> Self {
        self.style
            .insert("stroke-width".to_string(), format!("{linewidth}"));
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        name.clone_into(&mut self.name);
        self
    }

    /// Split the data into runs of finite points. Gaps (NaN or infinite
    /// values) end a run; runs with a single point cannot be drawn as a
    /// polyline and are dropped.
    fn segments(&self) -> Vec<&[[f64; 2]]> {
        self.points
            .split(|[x, y]| !x.is_finite() || !y.is_finite())
            .filter(|segment| segment.len() > 1)
            .collect()
    }

    fn to_tags(&self, t: &Transform) -> Vec<Box<dyn RenderTag>> {
        self.segments()
            .into_iter()
            .map(|segment| {
                let tag = Tag::polyline(
                    segment.iter().map(|[x, y]| t.to_screen(*x, *y)),
                    Some(self.style.clone()),
                );
                Box::new(tag) as Box<dyn RenderTag>
            })
            .collect()
    }
}

// ----------------------------------------------------------------------------
//
//
// Helpers
//
//
// ----------------------------------------------------------------------------

fn widen_if_degenerate(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let (min, max) = (min.min(max), min.max(max));
    if max - min > f64::EPSILON * max.abs().max(1.0) {
        (min, max)
    } else {
        let pad = (min.abs() * 0.05).max(0.5);
        (min - pad, max + pad)
    }
}

/// Tick positions at round numbers (1, 2 or 5 times a power of ten),
/// with at most five intervals between them.
fn tick_positions(min: f64, max: f64) -> Vec<f64> {
    let span = max - min;
    if span.is_nan() || span <= 0.0 {
        return Vec::new();
    }
    let magnitude = 10.0f64.powf((span / 5.0).log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|step| span / step <= 5.0)
        .unwrap_or(10.0 * magnitude);
    positions_with_step(min, max, step)
}

/// Tick positions for x values holding seconds since the unix epoch,
/// placed at round time steps.
fn time_tick_positions(min: f64, max: f64) -> Vec<f64> {
    const MINUTE: f64 = 60.0;
    const HOUR: f64 = 3600.0;
    const DAY: f64 = 86400.0;
    const STEPS: [f64; 21] = [
        1.0,
        2.0,
        5.0,
        10.0,
        15.0,
        30.0,
        MINUTE,
        2.0 * MINUTE,
        5.0 * MINUTE,
        10.0 * MINUTE,
        15.0 * MINUTE,
        30.0 * MINUTE,
        HOUR,
        2.0 * HOUR,
        3.0 * HOUR,
        6.0 * HOUR,
        12.0 * HOUR,
        DAY,
        2.0 * DAY,
        7.0 * DAY,
        30.0 * DAY,
    ];
    let span = max - min;
    if span.is_nan() || span <= 0.0 {
        return Vec::new();
    }
    match STEPS.iter().find(|step| span / **step <= 8.0) {
        Some(step) => positions_with_step(min, max, *step),
        // Spans of years: fall back to round numbers of days.
        None => {
            let days = tick_positions(min / DAY, max / DAY);
            days.into_iter().map(|d| d * DAY).collect()
        }
    }
}

fn positions_with_step(min: f64, max: f64, step: f64) -> Vec<f64> {
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

fn format_ticks(tick_positions: &[f64]) -> Vec<String> {
    let step = match tick_positions {
        [a, b, ..] => (b - a).abs(),
        _ => 1.0,
    };
    let magnitude = step.log10().floor() as i32;
    tick_positions
        .iter()
        .map(|z| match magnitude {
            i32::MIN..=-4 | 6..=i32::MAX => format!("{z:.1e}"),
            m if m < 0 => format!("{:.prec$}", z, prec = (-m) as usize),
            _ => format!("{z:.0}"),
        })
        .collect()
}
