#![warn(clippy::all, rust_2018_idioms)]

mod plotting;
pub mod svg;

pub use plotting::{Axis, Figure, LinePlot};
