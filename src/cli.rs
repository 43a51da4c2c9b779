//! Command line arguments.

use crate::config::AppConfig;
use crate::data::{Category, MAX_HOUR, MAX_INJURY_THRESHOLD};
use clap::Parser;
use std::path::PathBuf;

/// Explore NYC motor vehicle collisions on a map, by minute and by street
#[derive(Parser, Debug, Default)]
#[command(version, about)]
pub struct Args {
    /// Collision CSV to open
    pub path: Option<PathBuf>,

    /// Maximum number of source rows to read
    #[arg(long = "max-rows", value_name = "N")]
    pub max_rows: Option<usize>,

    /// Configuration file (defaults to the per-user config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the default configuration file and exit
    #[arg(long = "generate-config")]
    pub generate_config: bool,

    /// Overwrite an existing config file with --generate-config
    #[arg(long)]
    pub force: bool,

    /// Skip the window and write report.json plus chart images to DIR
    #[arg(long, value_name = "DIR")]
    pub report: Option<PathBuf>,

    /// Minimum number of persons injured (0-19)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_INJURY_THRESHOLD as i64))]
    pub threshold: Option<u32>,

    /// Hour of day to break down by minute (0-23)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_HOUR as i64))]
    pub hour: Option<u32>,

    /// Affected class for the street ranking
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,

    /// Include the raw hour subset in the output
    #[arg(long = "show-raw")]
    pub show_raw: bool,
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse()
}

impl Args {
    /// Apply command line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.path {
            config.dataset.path = Some(path.clone());
        }
        if let Some(max_rows) = self.max_rows {
            config.dataset.max_rows = max_rows;
        }
        if let Some(threshold) = self.threshold {
            config.defaults.injury_threshold = threshold;
        }
        if let Some(hour) = self.hour {
            config.defaults.hour = hour;
        }
        if let Some(category) = self.category {
            config.defaults.category = category;
        }
        if self.show_raw {
            config.defaults.show_raw = true;
        }
    }
}
