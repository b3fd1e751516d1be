mod ui;

/// Left panel: the columns of the loaded table and the axis controls.
#[derive(Debug, Default)]
pub struct ColumnList {
    filter: String,
}

/// Case-insensitive substring match; an empty filter matches everything.
fn matches_filter(name: &str, filter: &str) -> bool {
    let filter = filter.trim();
    filter.is_empty() || name.to_lowercase().contains(&filter.to_lowercase())
}
