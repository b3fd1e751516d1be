use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::error::LoadError;

/// Formats tried in order for the index column, after RFC 3339.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Numeric columns indexed by timestamp, as loaded from a CSV file.
#[derive(Clone, Debug, Default)]
pub struct TimeSeriesTable {
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

// Collects the cells of one data column while reading, until we know
// whether the column is numeric.
struct ColumnBuilder {
    name: String,
    values: Vec<f64>,
    first_invalid: Option<(u64, String)>,
}

impl TimeSeriesTable {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => LoadError::FileNotFound(path.to_owned()),
            _ => LoadError::Unreadable {
                path: path.to_owned(),
                source: err,
            },
        })?;
        Self::from_reader(file, path)
    }

    /// Parse CSV data from `reader`. `origin` is only used in error messages.
    ///
    /// The first row names the columns, the first column holds the
    /// timestamps. Columns with cells that are neither numbers nor missing
    /// values are skipped.
    pub fn from_reader(reader: impl Read, origin: &Path) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|err| csv_error(origin, err))?
            .clone();
        let mut header_iter = headers.iter();
        if header_iter.next().is_none() {
            return Err(LoadError::EmptyDataset(origin.to_owned()));
        }
        let mut builders: Vec<ColumnBuilder> = Vec::new();
        for (i, raw_name) in header_iter.enumerate() {
            let name = unique_name(raw_name, i + 1, &builders);
            builders.push(ColumnBuilder {
                name,
                values: Vec::new(),
                first_invalid: None,
            });
        }

        let mut timestamps = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| csv_error(origin, err))?;
            let line = record.position().map(|pos| pos.line()).unwrap_or_default();
            let raw_time = record.get(0).unwrap_or_default();
            let Some(timestamp) = parse_timestamp(raw_time) else {
                return Err(LoadError::UnparseableData {
                    path: origin.to_owned(),
                    line,
                    reason: format!("cannot read '{raw_time}' as date/time"),
                });
            };
            timestamps.push(timestamp);
            for (builder, cell) in builders.iter_mut().zip(record.iter().skip(1)) {
                match parse_value(cell) {
                    Some(value) => builder.values.push(value),
                    None => {
                        builder.values.push(f64::NAN);
                        if builder.first_invalid.is_none() {
                            builder.first_invalid = Some((line, cell.to_owned()));
                        }
                    }
                }
            }
        }

        if timestamps.is_empty() {
            log::warn!("{:?} contains no data rows", origin);
            return Err(LoadError::EmptyDataset(origin.to_owned()));
        }
        if timestamps.windows(2).any(|pair| pair[0] >= pair[1]) {
            log::warn!("timestamps in {:?} are not strictly increasing", origin);
        }

        let columns: Vec<Column> = builders
            .into_iter()
            .filter_map(|builder| match builder.first_invalid {
                Some((line, cell)) => {
                    log::warn!(
                        "skipping non-numeric column '{}' (line {line}: '{cell}')",
                        builder.name
                    );
                    None
                }
                None => Some(Column {
                    name: builder.name,
                    values: builder.values,
                }),
            })
            .collect();
        if columns.is_empty() {
            log::warn!("{:?} contains no numeric columns", origin);
            return Err(LoadError::EmptyDataset(origin.to_owned()));
        }

        log::debug!(
            "parsed {} rows with columns {:?}",
            timestamps.len(),
            columns.iter().map(|c| &c.name).collect::<Vec<_>>()
        );
        Ok(Self {
            timestamps,
            columns,
        })
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// `(seconds since epoch, value)` pairs of a column, in row order.
    pub fn series(&self, name: &str) -> Option<Vec<[f64; 2]>> {
        let column = self.column(name)?;
        Some(
            self.timestamps
                .iter()
                .zip(column.values.iter())
                .map(|(t, y)| [epoch_seconds(t), *y])
                .collect(),
        )
    }

    /// First and last timestamp in seconds since epoch.
    pub fn time_range(&self) -> Option<[f64; 2]> {
        let first = self.timestamps.first()?;
        let last = self.timestamps.last()?;
        Some([epoch_seconds(first), epoch_seconds(last)])
    }
}

/// Timestamps without a zone are treated as UTC for plotting.
pub fn epoch_seconds(timestamp: &NaiveDateTime) -> f64 {
    let utc = timestamp.and_utc();
    utc.timestamp() as f64 + utc.timestamp_subsec_nanos() as f64 * 1e-9
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Empty cells are gaps; "NaN" and "nan" parse as NaN on their own.
fn parse_value(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return Some(f64::NAN);
    }
    raw.parse::<f64>().ok()
}

fn unique_name(raw_name: &str, position: usize, taken: &[ColumnBuilder]) -> String {
    let base = if raw_name.is_empty() {
        format!("column {position}")
    } else {
        raw_name.to_owned()
    };
    let is_taken = |name: &str| taken.iter().any(|b| b.name == name);
    if !is_taken(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}.{n}");
        if !is_taken(&candidate) {
            log::warn!("duplicate column name '{base}' renamed to '{candidate}'");
            return candidate;
        }
        n += 1;
    }
}

fn csv_error(origin: &Path, err: csv::Error) -> LoadError {
    let line = err.position().map(|pos| pos.line()).unwrap_or_default();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::Unreadable {
            path: origin.to_owned(),
            source,
        },
        kind => LoadError::UnparseableData {
            path: origin.to_owned(),
            line,
            reason: csv_reason(kind),
        },
    }
}

fn csv_reason(kind: csv::ErrorKind) -> String {
    match kind {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8: {err}"),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn parse(raw: &str) -> Result<TimeSeriesTable, LoadError> {
        TimeSeriesTable::from_reader(raw.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn test_parse_sensor_log() {
        init();
        let table = parse(
            "time,brightness,temperature\n\
             2016-03-01 10:00:00,120,20.5\n\
             2016-03-01 10:00:10,125,20.7\n\
             2016-03-01 10:00:20,118,\n",
        )
        .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["brightness", "temperature"]
        );
        let temperature = &table.column("temperature").unwrap().values;
        assert_eq!(temperature[..2], [20.5, 20.7]);
        assert!(temperature[2].is_nan());
        let [start, end] = table.time_range().unwrap();
        assert_eq!(end - start, 20.0);
    }

    #[test]
    fn test_series_follows_row_order() {
        init();
        let table = parse("t,temperature\n2020-01-01,10\n2020-01-02,20\n2020-01-03,30\n").unwrap();
        let series = table.series("temperature").unwrap();
        let day = 86400.0;
        let t1 = series[0][0];
        assert_eq!(
            series,
            vec![[t1, 10.0], [t1 + day, 20.0], [t1 + 2.0 * day, 30.0]]
        );
        assert!(table.series("missing").is_none());
    }

    #[test]
    fn test_non_numeric_column_is_skipped() {
        init();
        let table = parse("t,state,value\n2020-01-01 00:00,ok,1\n2020-01-01 00:01,bad,2\n").unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["value"]);
    }

    #[test]
    fn test_only_empty_cells_and_nan_are_gaps() {
        init();
        let table = parse(
            "t,dash,gaps\n\
             2020-01-01 00:00,1,\n\
             2020-01-01 00:01,-,NaN\n\
             2020-01-01 00:02,3,nan\n\
             2020-01-01 00:03,4,7\n",
        )
        .unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["gaps"]);
        let gaps = &table.column("gaps").unwrap().values;
        assert!(gaps[..3].iter().all(|v| v.is_nan()));
        assert_eq!(gaps[3], 7.0);
    }

    #[test]
    fn test_duplicate_and_empty_column_names() {
        init();
        let table = parse("t,a,a,\n2020-01-01,1,2,3\n").unwrap();
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["a", "a.1", "column 3"]
        );
    }

    #[test]
    fn test_bad_timestamp_is_unparseable() {
        init();
        let err = parse("t,a\n2020-01-01,1\nyesterday,2\n").unwrap_err();
        match err {
            LoadError::UnparseableData { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("yesterday"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_ragged_rows_are_unparseable() {
        init();
        let err = parse("t,a,b\n2020-01-01,1,2\n2020-01-02,1\n").unwrap_err();
        assert!(matches!(err, LoadError::UnparseableData { .. }));
    }

    #[test]
    fn test_empty_datasets() {
        init();
        assert!(matches!(parse(""), Err(LoadError::EmptyDataset(_))));
        assert!(matches!(parse("t,a\n"), Err(LoadError::EmptyDataset(_))));
        assert!(matches!(
            parse("t\n2020-01-01\n"),
            Err(LoadError::EmptyDataset(_))
        ));
        assert!(matches!(
            parse("t,name\n2020-01-01,foo\n"),
            Err(LoadError::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        init();
        let err = TimeSeriesTable::from_path(Path::new("/does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound(_)));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2016, 3, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        for raw in [
            "2016-03-01 10:30:00",
            "2016-03-01T10:30:00",
            "2016-03-01T10:30:00Z",
            "2016-03-01T11:30:00+01:00",
            "2016/03/01 10:30:00",
            "01.03.2016 10:30:00",
            "2016-03-01 10:30",
            "2016-03-01T10:30",
            " 2016-03-01 10:30:00.000 ",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "format {raw:?}");
        }
        let midnight = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap().and_hms_opt(0, 0, 0);
        for raw in ["2016-03-01", "2016/03/01", "01.03.2016"] {
            assert_eq!(parse_timestamp(raw), midnight, "format {raw:?}");
        }
        assert_eq!(parse_timestamp("not a date"), None);
    }
}
