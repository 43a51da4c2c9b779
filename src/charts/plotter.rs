//! Chart Plotter Module
//! Interactive map, minute bar chart and tables using egui_plot.

use crate::data::{Category, MinuteHistogram, StreetRank};
use egui::{Color32, RichText, ScrollArea};
use egui_plot::{Bar, BarChart, Plot, PlotPoints, Points};
use polars::prelude::*;

pub const MAP_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red
pub const BAR_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue

const RAW_ROW_HEIGHT: f32 = 18.0;
const RAW_CELL_WIDTH: f32 = 140.0;

/// Draws the dashboard charts and tables.
pub struct ChartPlotter;

impl ChartPlotter {
    fn no_data(ui: &mut egui::Ui, height: f32) {
        ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui| {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No data").size(16.0).color(Color32::GRAY));
            });
        });
    }

    /// Horizontal scale for a longitude/latitude plot around `mean_latitude`.
    ///
    /// One degree of longitude spans cos(latitude) degrees of latitude.
    pub fn map_aspect(mean_latitude: f64) -> f32 {
        let aspect = mean_latitude.to_radians().cos();
        if aspect.is_finite() && aspect > 0.05 {
            aspect as f32
        } else {
            1.0
        }
    }

    /// Scatter of collision locations; x is longitude, y is latitude.
    pub fn draw_map(ui: &mut egui::Ui, coordinates: &[(f64, f64)], height: f32) {
        if coordinates.is_empty() {
            Self::no_data(ui, height);
            return;
        }

        let mean_latitude =
            coordinates.iter().map(|(lat, _)| lat).sum::<f64>() / coordinates.len() as f64;
        let points: Vec<[f64; 2]> = coordinates.iter().map(|&(lat, lon)| [lon, lat]).collect();

        Plot::new("collision_map")
            .height(height)
            .data_aspect(Self::map_aspect(mean_latitude))
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(PlotPoints::new(points))
                        .radius(1.5)
                        .color(MAP_COLOR.gamma_multiply(0.6))
                        .name("collisions"),
                );
            });
    }

    /// Bar per minute of the selected hour.
    pub fn draw_minute_chart(ui: &mut egui::Ui, histogram: &MinuteHistogram, height: f32) {
        let bars: Vec<Bar> = histogram
            .buckets()
            .iter()
            .enumerate()
            .map(|(minute, &count)| {
                Bar::new(minute as f64, f64::from(count))
                    .width(0.8)
                    .name(format!("minute {}", minute))
            })
            .collect();

        Plot::new("minute_breakdown")
            .height(height)
            .x_axis_label("minute")
            .y_axis_label("crashes")
            .include_x(-0.5)
            .include_x(59.5)
            .include_y(0.0)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("crashes"));
            });
    }

    /// Ranked streets for one affected class.
    pub fn draw_top_streets(ui: &mut egui::Ui, ranks: &[StreetRank], category: Category) {
        if ranks.is_empty() {
            ui.label(
                RichText::new(format!(
                    "No streets with injured {}",
                    category.label().to_lowercase()
                ))
                .color(Color32::GRAY)
                .size(12.0),
            );
            return;
        }

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("top_streets")
                    .striped(true)
                    .min_col_width(40.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("#").strong());
                        ui.label(RichText::new("on_street_name").strong());
                        ui.label(RichText::new(category.column()).strong());
                        ui.end_row();

                        for (i, rank) in ranks.iter().enumerate() {
                            ui.label((i + 1).to_string());
                            ui.label(rank.street.as_str());
                            ui.label(rank.count.to_string());
                            ui.end_row();
                        }
                    });
            });
    }

    /// Every column of `df`, rows rendered lazily as they scroll into view.
    pub fn draw_raw_table(ui: &mut egui::Ui, df: &DataFrame, max_height: f32) {
        if df.height() == 0 {
            ui.label(RichText::new("No rows in this hour").color(Color32::GRAY));
            return;
        }

        let columns = df.get_columns();
        ui.label(
            RichText::new(format!("{} rows × {} columns", df.height(), df.width()))
                .size(11.0)
                .color(Color32::GRAY),
        );

        ScrollArea::horizontal().id_salt("raw_data_h").show(ui, |ui| {
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    for column in columns {
                        ui.add_sized(
                            [RAW_CELL_WIDTH, RAW_ROW_HEIGHT],
                            egui::Label::new(RichText::new(column.name().as_str()).strong())
                                .truncate(),
                        );
                    }
                });
                ui.separator();

                ScrollArea::vertical()
                    .id_salt("raw_data_v")
                    .max_height(max_height)
                    .show_rows(ui, RAW_ROW_HEIGHT, df.height(), |ui, row_range| {
                        for row in row_range {
                            ui.horizontal(|ui| {
                                for column in columns {
                                    ui.add_sized(
                                        [RAW_CELL_WIDTH, RAW_ROW_HEIGHT],
                                        egui::Label::new(Self::cell_text(column, row)).truncate(),
                                    );
                                }
                            });
                        }
                    });
            });
        });
    }

    fn cell_text(column: &Column, row: usize) -> String {
        match column.get(row) {
            Ok(value) if !value.is_null() => value.to_string().trim_matches('"').to_string(),
            _ => String::new(),
        }
    }
}
