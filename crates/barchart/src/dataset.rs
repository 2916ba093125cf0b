//! CSV records for the chart.
//!
//! Input layout: one header row, then rows of `year,value1,value2,...`.
//! `\n` and `\r\n` line endings both load; cells are trimmed and blank rows skipped.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs;
use std::path::{Path, PathBuf};

/// One parsed CSV row: a year and the magnitude of every demographic group.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub year: i32,
    /// `values[g]` is the magnitude for group `g`.
    pub values: Vec<f64>,
}

impl Record {
    pub fn new(year: i32, values: Vec<f64>) -> Self {
        Self { year, values }
    }
}

/// Header columns plus the ordered records of one load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            header: Vec::new(),
            records,
        }
    }

    /// Number of groups, taken from the first record.
    pub fn groups_count(&self) -> usize {
        self.records.first().map_or(0, |r| r.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// How non-numeric cells are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellPolicy {
    /// Non-numeric value cells become `NaN` and the load continues.
    #[default]
    Lenient,
    /// The first non-numeric cell fails the whole load.
    Strict,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV has no header row")]
    MissingHeader,

    #[error("row {row}: year cell {cell:?} is not an integer")]
    InvalidYear { row: usize, cell: String },

    #[error("row {row}, column {column}: cell {cell:?} is not a number")]
    InvalidCell {
        row: usize,
        column: usize,
        cell: String,
    },
}

/// Read and parse a CSV file. A missing or unreadable file is fatal; there is no retry.
pub fn load_csv<P: AsRef<Path>>(path: P, policy: CellPolicy) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = parse_csv(&text, policy)?;
    log::info!(
        "Loaded {} records ({} groups) from {}",
        dataset.records.len(),
        dataset.groups_count(),
        path.display()
    );
    Ok(dataset)
}

/// Parse CSV text into a [`Dataset`].
///
/// Row numbers in errors are 1-based and count data rows only (the header is row 0).
pub fn parse_csv(text: &str, policy: CellPolicy) -> Result<Dataset, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut header = None;
    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        if header.is_none() {
            header = Some(row.iter().map(str::to_string).collect());
            continue;
        }
        let row_no = records.len() + 1;
        records.push(parse_row(&row, row_no, policy)?);
    }

    let header = header.ok_or(LoadError::MissingHeader)?;
    Ok(Dataset { header, records })
}

fn parse_row(row: &StringRecord, row_no: usize, policy: CellPolicy) -> Result<Record, LoadError> {
    let year_cell = row.get(0).unwrap_or_default();
    let year = match parse_int_prefix(year_cell) {
        Some(year) => year,
        None if policy == CellPolicy::Strict => {
            return Err(LoadError::InvalidYear {
                row: row_no,
                cell: year_cell.to_string(),
            })
        }
        None => {
            log::warn!("row {}: year {:?} is not an integer, using 0", row_no, year_cell);
            0
        }
    };

    let mut values = Vec::with_capacity(row.len().saturating_sub(1));
    for (col, cell) in row.iter().enumerate().skip(1) {
        let value = parse_number(cell);
        if value.is_nan() {
            if policy == CellPolicy::Strict {
                return Err(LoadError::InvalidCell {
                    row: row_no,
                    column: col,
                    cell: cell.to_string(),
                });
            }
            log::warn!("row {}, column {}: {:?} is not a number", row_no, col, cell);
        }
        values.push(value);
    }

    Ok(Record { year, values })
}

/// Leading-integer parse: optional sign then digits, trailing text ignored.
/// Years outside the `i32` range saturate.
fn parse_int_prefix(cell: &str) -> Option<i32> {
    let (negative, rest) = match cell.as_bytes().first() {
        Some(b'-') => (true, &cell[1..]),
        Some(b'+') => (false, &cell[1..]),
        _ => (false, cell),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = rest.as_bytes()[..digits].iter().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    });
    let year = if negative { -magnitude } else { magnitude };
    Some(year.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

/// Whole-cell numeric parse. Empty cells read as 0; anything unparsable or
/// non-finite (`inf`, `1e999`) as `NaN`.
fn parse_number(cell: &str) -> f64 {
    if cell.is_empty() {
        return 0.0;
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => f64::NAN,
    }
}
