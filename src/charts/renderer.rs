//! Static Chart Renderer
//! Writes the minute histogram and the collision map to PNG with plotters.

use crate::data::{MinuteHistogram, MINUTE_BUCKETS};
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_SIZE: (u32, u32) = (1000, 600);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("No data to render")]
    NoData,
    #[error("Drawing failed: {0}")]
    Draw(String),
}

fn draw_error<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Longitude and latitude ranges covering every point, padded by 5%.
///
/// Returned as `((lon_min, lon_max), (lat_min, lat_max))`.
pub fn map_bounds(coordinates: &[(f64, f64)]) -> Option<((f64, f64), (f64, f64))> {
    let (first_lat, first_lon) = *coordinates.first()?;
    let mut lat = (first_lat, first_lat);
    let mut lon = (first_lon, first_lon);
    for &(la, lo) in coordinates {
        lat = (lat.0.min(la), lat.1.max(la));
        lon = (lon.0.min(lo), lon.1.max(lo));
    }

    let pad = |(min, max): (f64, f64)| {
        let margin = if max > min { (max - min) * 0.05 } else { 0.01 };
        (min - margin, max + margin)
    };
    Some((pad(lon), pad(lat)))
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Bar per minute, titled with the hour window.
    pub fn render_histogram_png(
        path: &Path,
        histogram: &MinuteHistogram,
        title: &str,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        if histogram.total() == 0 {
            return Err(RenderError::NoData);
        }

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let y_max = histogram.max() + 1;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d((0u32..MINUTE_BUCKETS as u32).into_segmented(), 0u32..y_max)
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("minute")
            .y_desc("crashes")
            .draw()
            .map_err(draw_error)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(RGBColor(52, 152, 219).filled())
                    .margin(1)
                    .data(
                        histogram
                            .buckets()
                            .iter()
                            .enumerate()
                            .map(|(minute, &count)| (minute as u32, count)),
                    ),
            )
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
        Ok(())
    }

    /// Longitude/latitude scatter of collision locations.
    pub fn render_map_png(
        path: &Path,
        coordinates: &[(f64, f64)],
        title: &str,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let ((lon_min, lon_max), (lat_min, lat_max)) =
            map_bounds(coordinates).ok_or(RenderError::NoData)?;

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(lon_min..lon_max, lat_min..lat_max)
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .x_desc("longitude")
            .y_desc("latitude")
            .draw()
            .map_err(draw_error)?;

        let color = RGBColor(231, 76, 60).mix(0.6);
        chart
            .draw_series(PointSeries::of_element(
                coordinates.iter().map(|&(lat, lon)| (lon, lat)),
                2,
                color,
                &|c, s, st| EmptyElement::at(c) + Circle::new((0, 0), s, st.filled()),
            ))
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
        Ok(())
    }
}
