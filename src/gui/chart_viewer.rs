//! Chart Viewer Widget
//! Scrollable central panel with the map, minute breakdown, street ranking and raw data.

use crate::charts::ChartPlotter;
use crate::data::DashboardView;
use egui::{RichText, ScrollArea};

const MAP_HEIGHT: f32 = 420.0;
const CHART_HEIGHT: f32 = 300.0;
const RAW_TABLE_HEIGHT: f32 = 320.0;
const SECTION_SPACING: f32 = 15.0;

#[derive(Default)]
pub struct ChartViewer {
    view: Option<DashboardView>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.view = None;
    }

    pub fn set_view(&mut self, view: DashboardView) {
        self.view = Some(view);
    }

    pub fn view(&self) -> Option<&DashboardView> {
        self.view.as_ref()
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let Some(view) = &self.view else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("Motor Vehicle Collisions in New York City").size(26.0));
                ui.label(
                    "This application is a dashboard that can be used \
                     to analyze motor vehicle collisions in NYC 🚗",
                );
                ui.add_space(SECTION_SPACING);

                ui.heading("Most people injured in NYC?");
                ui.label(
                    RichText::new(format!(
                        "{} collisions with at least {} persons injured",
                        view.coordinates.len(),
                        view.params.injury_threshold()
                    ))
                    .size(11.0),
                );
                ChartPlotter::draw_map(ui, &view.coordinates, MAP_HEIGHT);
                ui.add_space(SECTION_SPACING);

                ui.heading("Collisions occur during a given time of day");
                ui.label(
                    RichText::new(format!("Breakdown by minute between {}", view.params.hour_window()))
                        .size(16.0)
                        .strong(),
                );
                ChartPlotter::draw_minute_chart(ui, &view.histogram, CHART_HEIGHT);
                ui.add_space(SECTION_SPACING);

                ui.heading("Top 10 dangerous streets by affected class");
                ChartPlotter::draw_top_streets(ui, &view.top_streets, view.params.category());
                ui.add_space(SECTION_SPACING);

                if let Some(raw) = &view.raw {
                    ui.heading("Raw Data");
                    ChartPlotter::draw_raw_table(ui, raw, RAW_TABLE_HEIGHT);
                }
            });
    }
}
