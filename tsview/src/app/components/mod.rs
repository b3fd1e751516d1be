mod column_list;
mod plotter;

pub use column_list::ColumnList;
pub use plotter::{save_svg, Plotter};
