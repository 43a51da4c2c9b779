//! Collision Dataset Loader Module
//! Reads the collision CSV with Polars and normalizes it into an immutable table.

use crate::data::schema::{CollisionRecord, SourceSchema, DATE_TIME_COLUMN};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];
const DATE_TIME_FORMATS: [&str; 1] = ["%Y-%m-%dT%H:%M:%S%.f"];
const TIME_FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Dataset not found: {0}")]
    NotFound(PathBuf),
    #[error("Maximum row count must be positive")]
    InvalidRowCap,
    #[error("Required column '{0}' is missing from the dataset")]
    MissingColumn(String),
    #[error("Column '{0}' appears more than once after lowercasing")]
    DuplicateColumn(String),
    #[error("Row {row}: cannot combine date '{date}' and time '{time}' into a timestamp")]
    InvalidTimestamp {
        row: usize,
        date: String,
        time: String,
    },
    #[error("Row {row}: column '{column}' holds '{value}', expected a whole non-negative count")]
    InvalidCount {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Row {row}: column '{column}' holds '{value}', expected a coordinate")]
    InvalidCoordinate {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Source column names as they actually appear in the CSV header.
struct ResolvedColumns {
    crash_date: String,
    crash_time: String,
    latitude: String,
    longitude: String,
    injured_persons: String,
    injured_pedestrians: String,
    injured_cyclists: String,
    injured_motorists: String,
    on_street_name: String,
}

impl ResolvedColumns {
    fn resolve(df: &DataFrame, schema: &SourceSchema) -> Result<Self, LoadError> {
        let names = df.get_column_names();
        let find = |wanted: &str| {
            names
                .iter()
                .find(|name| name.as_str().eq_ignore_ascii_case(wanted))
                .map(|name| name.to_string())
                .ok_or_else(|| LoadError::MissingColumn(wanted.to_string()))
        };

        Ok(Self {
            crash_date: find(&schema.crash_date)?,
            crash_time: find(&schema.crash_time)?,
            latitude: find(&schema.latitude)?,
            longitude: find(&schema.longitude)?,
            injured_persons: find(&schema.injured_persons)?,
            injured_pedestrians: find(&schema.injured_pedestrians)?,
            injured_cyclists: find(&schema.injured_cyclists)?,
            injured_motorists: find(&schema.injured_motorists)?,
            on_street_name: find(&schema.on_street_name)?,
        })
    }
}

/// The normalized collision dataset.
///
/// `frame` keeps every source column (lowercase labels, `date/time` first);
/// `records` holds the typed fields, where record `i` describes frame row `i`.
#[derive(Debug, Clone)]
pub struct CollisionTable {
    frame: DataFrame,
    records: Vec<CollisionRecord>,
    source: PathBuf,
    max_rows: usize,
}

impl CollisionTable {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn records(&self) -> &[CollisionRecord] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get list of column names of the normalized frame.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }
}

/// Loads collision CSV files against a fixed source schema.
pub struct DatasetLoader {
    schema: SourceSchema,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new(SourceSchema::default())
    }
}

impl DatasetLoader {
    pub fn new(schema: SourceSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &SourceSchema {
        &self.schema
    }

    /// Load at most `max_rows` rows from `path` and normalize them.
    ///
    /// The row cap applies to the raw source, before rows without
    /// coordinates are dropped.
    pub fn load(&self, path: &Path, max_rows: usize) -> Result<CollisionTable, LoadError> {
        if max_rows == 0 {
            return Err(LoadError::InvalidRowCap);
        }
        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        // every cell is read as text; the typed columns are parsed below
        let mut raw = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_n_rows(Some(max_rows))
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;
        info!("read {} rows from {}", raw.height(), path.display());

        let columns = ResolvedColumns::resolve(&raw, &self.schema)?;

        let timestamps = combine_timestamps(&raw, &columns.crash_date, &columns.crash_time)?;
        let latitude = coordinate_values(&raw, &columns.latitude)?;
        let longitude = coordinate_values(&raw, &columns.longitude)?;
        let persons = count_values(&raw, &columns.injured_persons)?;
        let pedestrians = count_values(&raw, &columns.injured_pedestrians)?;
        let cyclists = count_values(&raw, &columns.injured_cyclists)?;
        let motorists = count_values(&raw, &columns.injured_motorists)?;
        let streets = text_values(&raw, &columns.on_street_name)?;

        raw.with_column(Series::new(columns.latitude.as_str().into(), latitude.as_slice()))?;
        raw.with_column(Series::new(columns.longitude.as_str().into(), longitude.as_slice()))?;
        for (name, counts) in [
            (&columns.injured_persons, &persons),
            (&columns.injured_pedestrians, &pedestrians),
            (&columns.injured_cyclists, &cyclists),
            (&columns.injured_motorists, &motorists),
        ] {
            raw.with_column(Series::new(name.as_str().into(), counts.as_slice()))?;
        }

        // 1. combine date and time into one timestamp column
        let combined = self.schema.combined_label();
        let stamp_column = DatetimeChunked::from_naive_datetime(
            combined.as_str().into(),
            timestamps.iter().copied(),
            TimeUnit::Milliseconds,
        )
        .into_series();

        let mut frame = raw.drop(&columns.crash_date)?.drop(&columns.crash_time)?;
        frame.insert_column(0, stamp_column)?;

        // 2. drop rows without coordinates
        let keep: Vec<bool> = latitude
            .iter()
            .zip(&longitude)
            .map(|(lat, lon)| lat.is_some() && lon.is_some())
            .collect();
        let mask = BooleanChunked::from_slice("has_coordinates".into(), &keep);
        let mut frame = frame.filter(&mask)?;
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped > 0 {
            debug!("dropped {} rows without coordinates", dropped);
        }

        // 3. lowercase every label
        let lowered: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_lowercase())
            .collect();
        let mut seen = HashSet::new();
        if let Some(duplicate) = lowered.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(LoadError::DuplicateColumn(duplicate.clone()));
        }
        frame.set_column_names(lowered.iter().map(String::as_str))?;

        // 4. canonical timestamp label
        frame.rename(&combined.to_lowercase(), DATE_TIME_COLUMN.into())?;

        let records: Vec<CollisionRecord> = (0..raw.height())
            .filter_map(|i| {
                Some(CollisionRecord {
                    timestamp: timestamps[i],
                    latitude: latitude[i]?,
                    longitude: longitude[i]?,
                    injured_persons: persons[i],
                    injured_pedestrians: pedestrians[i],
                    injured_cyclists: cyclists[i],
                    injured_motorists: motorists[i],
                    on_street_name: streets[i].clone(),
                })
            })
            .collect();

        info!(
            "normalized {} collisions with {} columns",
            records.len(),
            frame.width()
        );

        Ok(CollisionTable {
            frame,
            records,
            source: path.to_path_buf(),
            max_rows,
        })
    }
}

/// Parse a date cell and a time cell into one timestamp.
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    let time = time.trim();

    let day = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
                .map(|dt| dt.date())
        })?;
    let clock = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())?;

    Some(day.and_time(clock))
}

fn combine_timestamps(
    df: &DataFrame,
    date_col: &str,
    time_col: &str,
) -> Result<Vec<NaiveDateTime>, LoadError> {
    let dates = text_values(df, date_col)?;
    let times = text_values(df, time_col)?;

    dates
        .iter()
        .zip(&times)
        .enumerate()
        .map(|(i, (date, time))| {
            let date = date.as_deref().unwrap_or_default();
            let time = time.as_deref().unwrap_or_default();
            parse_timestamp(date, time).ok_or_else(|| LoadError::InvalidTimestamp {
                row: i + 1,
                date: date.to_string(),
                time: time.to_string(),
            })
        })
        .collect()
}

fn text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoadError> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

/// Parse a coordinate column. Blank and non-finite cells count as missing,
/// anything else that is not a number fails the load.
fn coordinate_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, LoadError> {
    text_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(i, cell)| {
            let Some(cell) = cell else {
                return Ok(None);
            };
            match cell.parse::<f64>() {
                Ok(x) => Ok(Some(x).filter(|x| x.is_finite())),
                Err(_) => Err(LoadError::InvalidCoordinate {
                    column: name.to_lowercase(),
                    row: i + 1,
                    value: cell,
                }),
            }
        })
        .collect()
}

/// Parse an injury count column. Blank cells are missing; a count written
/// as a float is accepted only when it is whole.
fn count_values(df: &DataFrame, name: &str) -> Result<Vec<Option<u32>>, LoadError> {
    text_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(i, cell)| {
            let Some(cell) = cell else {
                return Ok(None);
            };
            parse_count(&cell)
                .map(Some)
                .ok_or_else(|| LoadError::InvalidCount {
                    column: name.to_lowercase(),
                    row: i + 1,
                    value: cell,
                })
        })
        .collect()
}

fn parse_count(cell: &str) -> Option<u32> {
    if let Ok(n) = cell.parse::<u32>() {
        return Some(n);
    }
    let x = cell.parse::<f64>().ok()?;
    if x.is_finite() && x >= 0.0 && x.fract() == 0.0 && x <= f64::from(u32::MAX) {
        Some(x as u32)
    } else {
        None
    }
}
