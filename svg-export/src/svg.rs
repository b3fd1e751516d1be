// A thin Rust representation of the SVG tags needed to draw line plots,
// rendered into a `String`.

use std::{collections::BTreeMap, fmt::Write};

/// Attributes and style properties of a tag. Ordered, so that rendering is
/// deterministic.
pub type Params = BTreeMap<String, String>;

const FAILED_STRING_WRITE: &str = "Failed to write into string.";

pub trait RenderTag: std::fmt::Debug {
    fn render(&self, buf: &mut String);
}

#[derive(Debug)]
pub struct Tag {
    name: &'static str,
    attributes: Params,
    style: Params,
    children: Vec<Box<dyn RenderTag>>,
}

/// Character data inside a tag; escaped on rendering.
#[derive(Debug)]
pub struct TextNode(pub String);

impl RenderTag for Tag {
    fn render(&self, buf: &mut String) {
        write!(buf, "<{}", self.name).expect(FAILED_STRING_WRITE);
        for (k, v) in self.attributes.iter() {
            write!(buf, " {k}=\"{}\"", escape(v)).expect(FAILED_STRING_WRITE);
        }
        if !self.style.is_empty() {
            let style: Vec<String> = self
                .style
                .iter()
                .map(|(k, v)| format!("{k}:{}", escape(v)))
                .collect();
            write!(buf, " style=\"{}\"", style.join(";")).expect(FAILED_STRING_WRITE);
        }
        if self.children.is_empty() {
            buf.push_str("/>");
            return;
        }
        buf.push('>');
        for child in self.children.iter() {
            child.render(buf);
        }
        write!(buf, "</{}>", self.name).expect(FAILED_STRING_WRITE);
    }
}

impl RenderTag for TextNode {
    fn render(&self, buf: &mut String) {
        buf.push_str(&escape(&self.0));
    }
}

impl Tag {
    fn new(name: &'static str, attributes: &[(&str, String)], style: Option<Params>) -> Self {
        Self {
            name,
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_owned()))
                .collect(),
            style: style.unwrap_or_default(),
            children: Vec::new(),
        }
    }

    pub fn svg(width: u64, height: u64) -> Self {
        Self::new(
            "svg",
            &[
                ("width", format!("{width}")),
                ("height", format!("{height}")),
                ("viewBox", format!("0 0 {width} {height}")),
                ("xmlns", "http://www.w3.org/2000/svg".to_string()),
            ],
            None,
        )
    }

    pub fn group(style: Option<Params>) -> Self {
        Self::new("g", &[], style)
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64, style: Option<Params>) -> Self {
        Self::new(
            "rect",
            &[
                ("x", format!("{x}")),
                ("y", format!("{y}")),
                ("width", format!("{width}")),
                ("height", format!("{height}")),
            ],
            style,
        )
    }

    pub fn text(x: f64, y: f64, angle: f64, text: &str, style: Option<Params>) -> Self {
        let mut tag = Self::new(
            "text",
            &[("transform", format!("translate({x},{y}) rotate({angle})"))],
            style,
        );
        tag.add_child(TextNode(text.to_owned()));
        tag
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64, style: Option<Params>) -> Self {
        Self::new(
            "line",
            &[
                ("x1", format!("{x1}")),
                ("y1", format!("{y1}")),
                ("x2", format!("{x2}")),
                ("y2", format!("{y2}")),
            ],
            style,
        )
    }

    pub fn polyline(points: impl IntoIterator<Item = (f64, f64)>, style: Option<Params>) -> Self {
        let raw_points: Vec<String> = points
            .into_iter()
            .map(|(x, y)| format!("{x:.2},{y:.2}"))
            .collect();
        Self::new(
            "polyline",
            &[
                ("points", raw_points.join(" ")),
                ("fill", "none".to_string()),
            ],
            style,
        )
    }

    pub fn add_child(&mut self, child: impl RenderTag + 'static) {
        self.children.push(Box::new(child));
    }

    pub fn add_children(&mut self, children: Vec<Box<dyn RenderTag>>) {
        self.children.extend(children);
    }
}

/// Render a tag and all of its children to raw SVG markup.
pub fn render(root: &Tag) -> String {
    let mut raw_svg = String::new();
    root.render(&mut raw_svg);
    raw_svg
}

/// Generate style `Params` from a slice of pairs.
pub fn opts(items: &[(&str, &str)]) -> Option<Params> {
    Some(
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for chr in raw.chars() {
        match chr {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(chr),
        }
    }
    escaped
}
