//! Collision Query Module
//! Threshold, hour-of-day and category queries against the normalized table.

use crate::data::loader::CollisionTable;
use crate::data::schema::{Category, CollisionRecord};
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

pub const MAX_INJURY_THRESHOLD: u32 = 19;
pub const MAX_HOUR: u32 = 23;
pub const MINUTE_BUCKETS: usize = 60;
pub const TOP_STREETS: usize = 10;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("{name} must be between 0 and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u32,
        max: u32,
    },
}

/// User-selected filters, validated to their domains on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    injury_threshold: u32,
    hour: u32,
    category: Category,
    show_raw: bool,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            injury_threshold: 0,
            hour: 0,
            category: Category::default(),
            show_raw: false,
        }
    }
}

impl QueryParams {
    pub fn new(
        injury_threshold: u32,
        hour: u32,
        category: Category,
        show_raw: bool,
    ) -> Result<Self, QueryError> {
        check_range("injury threshold", injury_threshold, MAX_INJURY_THRESHOLD)?;
        check_range("hour", hour, MAX_HOUR)?;
        Ok(Self {
            injury_threshold,
            hour,
            category,
            show_raw,
        })
    }

    pub fn injury_threshold(&self) -> u32 {
        self.injury_threshold
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn show_raw(&self) -> bool {
        self.show_raw
    }

    /// "H:00 and H+1:00", wrapping at midnight.
    pub fn hour_window(&self) -> String {
        format!("{}:00 and {}:00", self.hour, (self.hour + 1) % 24)
    }
}

fn check_range(name: &'static str, value: u32, max: u32) -> Result<(), QueryError> {
    if value > max {
        return Err(QueryError::OutOfRange { name, value, max });
    }
    Ok(())
}

/// Crash counts per minute within one hour. Always 60 buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinuteHistogram {
    buckets: Vec<u32>,
}

impl Default for MinuteHistogram {
    fn default() -> Self {
        Self {
            buckets: vec![0; MINUTE_BUCKETS],
        }
    }
}

impl MinuteHistogram {
    pub fn from_minutes<I: IntoIterator<Item = u32>>(minutes: I) -> Self {
        let mut histogram = Self::default();
        for minute in minutes {
            if let Some(bucket) = histogram.buckets.get_mut(minute as usize) {
                *bucket += 1;
            }
        }
        histogram
    }

    pub fn buckets(&self) -> &[u32] {
        &self.buckets
    }

    pub fn total(&self) -> u32 {
        self.buckets.iter().sum()
    }

    pub fn max(&self) -> u32 {
        self.buckets.iter().copied().max().unwrap_or(0)
    }
}

/// One row of the dangerous-streets ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreetRank {
    pub street: String,
    pub count: u32,
}

/// Everything the dashboard shows for one set of filters.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub params: QueryParams,
    /// (latitude, longitude) of collisions meeting the injury threshold.
    pub coordinates: Vec<(f64, f64)>,
    pub histogram: MinuteHistogram,
    /// Collisions inside the selected hour.
    pub hour_count: usize,
    pub top_streets: Vec<StreetRank>,
    pub raw: Option<DataFrame>,
}

/// Query operations over a normalized collision table.
pub struct QueryProcessor;

impl QueryProcessor {
    /// Coordinates of collisions with at least `threshold` injured persons.
    ///
    /// Unknown counts compare as zero, so a threshold of 0 keeps every row.
    pub fn injured_coordinates(table: &CollisionTable, threshold: u32) -> Vec<(f64, f64)> {
        table
            .records()
            .iter()
            .filter(|r| r.injured_persons.unwrap_or(0) >= threshold)
            .map(|r| (r.latitude, r.longitude))
            .collect()
    }

    /// Records whose timestamp falls in `hour`.
    pub fn filter_by_hour(table: &CollisionTable, hour: u32) -> Vec<&CollisionRecord> {
        table
            .records()
            .iter()
            .filter(|r| r.hour() == hour)
            .collect()
    }

    /// The hour subset as a frame with every normalized column.
    pub fn hour_frame(table: &CollisionTable, hour: u32) -> Result<DataFrame, PolarsError> {
        let mask: Vec<bool> = table.records().iter().map(|r| r.hour() == hour).collect();
        let mask = BooleanChunked::from_slice("in_hour".into(), &mask);
        table.frame().filter(&mask)
    }

    pub fn minute_histogram<'a, I>(records: I) -> MinuteHistogram
    where
        I: IntoIterator<Item = &'a CollisionRecord>,
    {
        MinuteHistogram::from_minutes(records.into_iter().map(CollisionRecord::minute))
    }

    /// Streets with the most injured people of `category`, highest first.
    ///
    /// Rows with no injuries in the category or no street name are skipped.
    /// Equal counts keep their source order.
    pub fn top_streets(table: &CollisionTable, category: Category, limit: usize) -> Vec<StreetRank> {
        let mut ranked: Vec<StreetRank> = table
            .records()
            .iter()
            .filter_map(|r| {
                let count = r.injured(category).filter(|c| *c >= 1)?;
                let street = r.on_street_name.clone()?;
                Some(StreetRank { street, count })
            })
            .collect();

        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(limit);
        ranked
    }

    /// Compute every dashboard output for one set of filters.
    pub fn run(table: &CollisionTable, params: QueryParams) -> Result<DashboardView, PolarsError> {
        let in_hour = Self::filter_by_hour(table, params.hour());
        let histogram = Self::minute_histogram(in_hour.iter().copied());
        let raw = if params.show_raw() {
            Some(Self::hour_frame(table, params.hour())?)
        } else {
            None
        };

        Ok(DashboardView {
            params,
            coordinates: Self::injured_coordinates(table, params.injury_threshold()),
            histogram,
            hour_count: in_hour.len(),
            top_streets: Self::top_streets(table, params.category(), TOP_STREETS),
            raw,
        })
    }
}
