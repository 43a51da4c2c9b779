//! Control Panel Widget
//! Left side panel with the dataset source and the dashboard filters.

use crate::config::AppConfig;
use crate::data::{Category, QueryError, QueryParams, MAX_HOUR, MAX_INJURY_THRESHOLD};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// User settings for the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
    pub max_rows: usize,
    pub injury_threshold: u32,
    pub hour: u32,
    pub category: Category,
    pub show_raw: bool,
}

impl UserSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            csv_path: config.dataset.path.clone(),
            max_rows: config.dataset.max_rows,
            injury_threshold: config.defaults.injury_threshold,
            hour: config.defaults.hour,
            category: config.defaults.category,
            show_raw: config.defaults.show_raw,
        }
    }

    pub fn params(&self) -> Result<QueryParams, QueryError> {
        QueryParams::new(self.injury_threshold, self.hour, self.category, self.show_raw)
    }
}

/// Left side control panel with file selection and filter controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub row_count: Option<usize>,
    pub status: String,
    pub export_enabled: bool,
}

impl ControlPanel {
    pub fn new(settings: UserSettings) -> Self {
        Self {
            settings,
            row_count: None,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, is_loading: bool) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚗 NYC Collisions")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new("Motor vehicle crash dashboard").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                let path_text = self
                    .settings
                    .csv_path
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "No file selected".to_string());

                ui.label(RichText::new(&path_text).size(12.0).color(
                    if self.settings.csv_path.is_some() {
                        ui.visuals().text_color()
                    } else {
                        Color32::GRAY
                    },
                ));

                if let Some(rows) = self.row_count {
                    ui.label(
                        RichText::new(format!("{} collisions with coordinates", rows))
                            .size(11.0)
                            .color(Color32::GRAY),
                    );
                }

                ui.horizontal(|ui| {
                    ui.add_enabled_ui(!is_loading, |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                        let can_reload = self.settings.csv_path.is_some();
                        if ui.add_enabled(can_reload, egui::Button::new("🔄 Reload")).clicked() {
                            action = ControlPanelAction::Reload;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.add_space(8.0);

        ui.label("Number of persons injured in vehicle collisions");
        let threshold = ui.add(egui::Slider::new(
            &mut self.settings.injury_threshold,
            0..=MAX_INJURY_THRESHOLD,
        ));
        ui.add_space(8.0);

        ui.label("Hour to look at");
        let hour = ui.add(egui::Slider::new(&mut self.settings.hour, 0..=MAX_HOUR));
        ui.add_space(8.0);

        let mut category_changed = false;
        ui.horizontal(|ui| {
            ui.label("Affected class:");
            ComboBox::from_id_salt("affected_class")
                .width(150.0)
                .selected_text(self.settings.category.label())
                .show_ui(ui, |ui| {
                    for category in Category::ALL {
                        if ui
                            .selectable_value(&mut self.settings.category, category, category.label())
                            .changed()
                        {
                            category_changed = true;
                        }
                    }
                });
        });
        ui.add_space(8.0);

        let show_raw = ui.checkbox(&mut self.settings.show_raw, "Show Raw Data");

        if threshold.changed() || hour.changed() || category_changed || show_raw.changed() {
            action = ControlPanelAction::FiltersChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled && !is_loading, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export Charts").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.horizontal(|ui| {
            if is_loading {
                ui.spinner();
            }
            let status_color = if self.status.starts_with("Error") {
                Color32::from_rgb(220, 53, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        });

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    Reload,
    FiltersChanged,
    ExportCharts,
}
