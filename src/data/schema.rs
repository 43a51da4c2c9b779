//! Source Schema Module
//! Fixed column layout of the collision CSV and the typed record built from it.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical name of the combined timestamp column in the normalized table.
pub const DATE_TIME_COLUMN: &str = "date/time";

/// Names of the source columns the loader requires.
///
/// Lookup against the CSV header is case-insensitive, so the defaults match
/// both the upper-case source file and an already-normalized export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSchema {
    pub crash_date: String,
    pub crash_time: String,
    pub latitude: String,
    pub longitude: String,
    pub injured_persons: String,
    pub injured_pedestrians: String,
    pub injured_cyclists: String,
    pub injured_motorists: String,
    pub on_street_name: String,
}

impl Default for SourceSchema {
    fn default() -> Self {
        Self {
            crash_date: "CRASH_DATE".to_string(),
            crash_time: "CRASH_TIME".to_string(),
            latitude: "LATITUDE".to_string(),
            longitude: "LONGITUDE".to_string(),
            injured_persons: "INJURED_PERSONS".to_string(),
            injured_pedestrians: "INJURED_PEDESTRIANS".to_string(),
            injured_cyclists: "INJURED_CYCLISTS".to_string(),
            injured_motorists: "INJURED_MOTORISTS".to_string(),
            on_street_name: "ON_STREET_NAME".to_string(),
        }
    }
}

impl SourceSchema {
    /// All required column names, in declaration order.
    pub fn required(&self) -> [&str; 9] {
        [
            self.crash_date.as_str(),
            self.crash_time.as_str(),
            self.latitude.as_str(),
            self.longitude.as_str(),
            self.injured_persons.as_str(),
            self.injured_pedestrians.as_str(),
            self.injured_cyclists.as_str(),
            self.injured_motorists.as_str(),
            self.on_street_name.as_str(),
        ]
    }

    /// Label of the combined timestamp column before the final rename.
    pub fn combined_label(&self) -> String {
        format!("{}_{}", self.crash_date, self.crash_time)
    }
}

/// Affected class used by the street ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Pedestrians,
    Cyclists,
    Motorists,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Pedestrians, Self::Cyclists, Self::Motorists];

    /// Column holding this category's injury count in the normalized table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Pedestrians => "injured_pedestrians",
            Self::Cyclists => "injured_cyclists",
            Self::Motorists => "injured_motorists",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pedestrians => "Pedestrians",
            Self::Cyclists => "Cyclists",
            Self::Motorists => "Motorists",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pedestrians" => Ok(Self::Pedestrians),
            "cyclists" => Ok(Self::Cyclists),
            "motorists" => Ok(Self::Motorists),
            other => Err(format!(
                "unknown category '{}', expected pedestrians, cyclists or motorists",
                other
            )),
        }
    }
}

/// One row of the normalized table.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionRecord {
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub injured_persons: Option<u32>,
    pub injured_pedestrians: Option<u32>,
    pub injured_cyclists: Option<u32>,
    pub injured_motorists: Option<u32>,
    pub on_street_name: Option<String>,
}

impl CollisionRecord {
    pub fn injured(&self, category: Category) -> Option<u32> {
        match category {
            Category::Pedestrians => self.injured_pedestrians,
            Category::Cyclists => self.injured_cyclists,
            Category::Motorists => self.injured_motorists,
        }
    }

    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn minute(&self) -> u32 {
        self.timestamp.minute()
    }
}
