//! Headless report: one parameter set in, report.json and chart images out.

use crate::charts::{RenderError, StaticChartRenderer, DEFAULT_SIZE};
use crate::data::{
    CollisionTable, DashboardView, MinuteHistogram, QueryParams, QueryProcessor, StreetRank,
};
use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, SerWriter};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Serializable summary of one dashboard view.
#[derive(Debug, Serialize)]
pub struct DashboardReport<'a> {
    pub source: &'a Path,
    pub params: QueryParams,
    pub total_collisions: usize,
    pub injured_locations: usize,
    pub hour_window: String,
    pub hour_collisions: usize,
    pub minute_histogram: &'a MinuteHistogram,
    pub top_streets: &'a [StreetRank],
}

impl<'a> DashboardReport<'a> {
    pub fn new(table: &'a CollisionTable, view: &'a DashboardView) -> Self {
        Self {
            source: table.source(),
            params: view.params,
            total_collisions: table.row_count(),
            injured_locations: view.coordinates.len(),
            hour_window: view.params.hour_window(),
            hour_collisions: view.hour_count,
            minute_histogram: &view.histogram,
            top_streets: &view.top_streets,
        }
    }
}

/// Write the map and minute chart for `view` into `dir`.
///
/// Empty charts are skipped. Returns the images written.
pub fn export_charts(dir: &Path, view: &DashboardView) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = Vec::new();

    let histogram_path = dir.join("histogram.png");
    let title = format!("Breakdown by minute between {}", view.params.hour_window());
    match StaticChartRenderer::render_histogram_png(
        &histogram_path,
        &view.histogram,
        &title,
        DEFAULT_SIZE,
    ) {
        Ok(()) => written.push(histogram_path),
        Err(RenderError::NoData) => {
            warn!("no collisions in hour {}, histogram skipped", view.params.hour())
        }
        Err(e) => return Err(e).context("rendering histogram"),
    }

    let map_path = dir.join("map.png");
    let title = format!(
        "Collisions with at least {} persons injured",
        view.params.injury_threshold()
    );
    match StaticChartRenderer::render_map_png(&map_path, &view.coordinates, &title, DEFAULT_SIZE) {
        Ok(()) => written.push(map_path),
        Err(RenderError::NoData) => warn!("no collision locations, map skipped"),
        Err(e) => return Err(e).context("rendering map"),
    }

    Ok(written)
}

/// Run every query for `params` and write the report files into `dir`.
pub fn write_report(dir: &Path, table: &CollisionTable, params: QueryParams) -> Result<PathBuf> {
    let view = QueryProcessor::run(table, params).context("running dashboard queries")?;
    let report = DashboardReport::new(table, &view);

    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let json_path = dir.join("report.json");
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&json_path, json).with_context(|| format!("writing {}", json_path.display()))?;
    info!("wrote {}", json_path.display());

    for image in export_charts(dir, &view)? {
        info!("wrote {}", image.display());
    }

    if let Some(raw) = &view.raw {
        let raw_path = dir.join(format!("raw_hour_{}.csv", params.hour()));
        let mut file = fs::File::create(&raw_path)
            .with_context(|| format!("creating {}", raw_path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut raw.clone())
            .context("writing raw hour subset")?;
        info!("wrote {} ({} rows)", raw_path.display(), raw.height());
    }

    Ok(json_path)
}
