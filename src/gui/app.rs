//! Collision Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::config::AppConfig;
use crate::data::{CollisionTable, DatasetLoader, LoadCache, QueryProcessor, SourceSchema};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, UserSettings};
use crate::report;
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

/// CSV loading result from background thread
enum LoadResult {
    Complete(Arc<CollisionTable>),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    schema: SourceSchema,
    cache: LoadCache,
    table: Option<Arc<CollisionTable>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: &AppConfig) -> Self {
        let mut app = Self::with_config(config);
        if app.control_panel.settings.csv_path.is_some() {
            app.start_load();
        }
        app
    }

    fn with_config(config: &AppConfig) -> Self {
        Self {
            schema: config.columns.clone(),
            cache: LoadCache::new(),
            table: None,
            control_panel: ControlPanel::new(UserSettings::from_config(config)),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        }
    }

    /// Load the selected CSV, from the cache when possible.
    fn start_load(&mut self) {
        if self.is_loading {
            return; // Already loading
        }
        let Some(path) = self.control_panel.settings.csv_path.clone() else {
            self.control_panel.set_status("No file selected");
            return;
        };
        let max_rows = self.control_panel.settings.max_rows;

        if let Some(table) = self.cache.get(&path, max_rows) {
            self.set_table(table);
            return;
        }

        // the previous table must not answer filter changes while loading
        self.table = None;
        self.chart_viewer.clear();
        self.control_panel.row_count = None;
        self.control_panel.export_enabled = false;
        self.control_panel.set_status("Loading CSV file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let loader = DatasetLoader::new(self.schema.clone());

        // Load CSV in background thread
        thread::spawn(move || {
            let result = match loader.load(&path, max_rows) {
                Ok(table) => LoadResult::Complete(Arc::new(table)),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.control_panel.settings.csv_path = Some(path);
            self.start_load();
        }
    }

    /// Drop the cached table for the current file and read it again.
    fn handle_reload(&mut self) {
        if let Some(path) = &self.control_panel.settings.csv_path {
            if self
                .cache
                .invalidate(path, self.control_panel.settings.max_rows)
            {
                info!("invalidated cached table for {}", path.display());
            }
        }
        self.start_load();
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(table)) => {
                self.is_loading = false;
                self.cache.insert(Arc::clone(&table));
                self.set_table(table);
            }
            Ok(LoadResult::Error(message)) => {
                self.is_loading = false;
                error!("load failed: {}", message);
                self.control_panel.set_status(&format!("Error: {}", message));
            }
            Err(TryRecvError::Empty) => {
                // Still loading
                self.load_rx = Some(rx);
            }
            Err(TryRecvError::Disconnected) => {
                self.is_loading = false;
                error!("loader thread exited without a result");
                self.control_panel.set_status("Error: loading stopped unexpectedly");
            }
        }
    }

    fn set_table(&mut self, table: Arc<CollisionTable>) {
        self.control_panel.row_count = Some(table.row_count());
        self.control_panel.set_status(&format!(
            "Loaded {} collisions, {} columns",
            table.row_count(),
            table.frame().width()
        ));
        self.table = Some(table);
        self.refresh_view();
    }

    /// Recompute every chart for the current filters.
    fn refresh_view(&mut self) {
        let Some(table) = &self.table else {
            return;
        };

        let params = match self.control_panel.settings.params() {
            Ok(params) => params,
            Err(e) => {
                self.control_panel.set_status(&format!("Error: {}", e));
                return;
            }
        };

        match QueryProcessor::run(table, params) {
            Ok(view) => {
                self.chart_viewer.set_view(view);
                self.control_panel.export_enabled = true;
            }
            Err(e) => {
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    /// Write the current map and minute chart to a chosen folder.
    fn handle_export_charts(&mut self) {
        let Some(view) = self.chart_viewer.view() else {
            self.control_panel.set_status("No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        match report::export_charts(&dir, view) {
            Ok(written) if written.is_empty() => {
                self.control_panel.set_status("Nothing to export for these filters");
            }
            Ok(written) => {
                self.control_panel.set_status(&format!(
                    "Exported {} charts to {}",
                    written.len(),
                    dir.display()
                ));
                if let Err(e) = open::that(&dir) {
                    error!("could not open {}: {}", dir.display(), e);
                }
            }
            Err(e) => {
                self.control_panel.set_status(&format!("Error: {:#}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui, self.is_loading) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::Reload => self.handle_reload(),
                        ControlPanelAction::FiltersChanged => self.refresh_view(),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CSV: &str = "CRASH_DATE,CRASH_TIME,LATITUDE,LONGITUDE,ON_STREET_NAME,\
INJURED_PERSONS,INJURED_PEDESTRIANS,INJURED_CYCLISTS,INJURED_MOTORISTS
09/11/2021,2:39,40.66,-73.86,BROADWAY,1,1,0,0
";

    #[test]
    fn starting_a_load_drops_the_previous_table() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.csv");
        let second = temp_dir.path().join("second.csv");
        fs::write(&first, CSV).unwrap();
        fs::write(&second, CSV).unwrap();

        let mut app = DashboardApp::with_config(&AppConfig::default());
        let table = DatasetLoader::default().load(&first, 10).unwrap();
        app.set_table(Arc::new(table));
        assert!(app.chart_viewer.view().is_some());
        assert!(app.control_panel.export_enabled);

        app.control_panel.settings.csv_path = Some(second);
        app.start_load();
        assert!(app.is_loading);
        assert!(app.table.is_none());
        assert!(app.chart_viewer.view().is_none());
        assert!(!app.control_panel.export_enabled);

        // filter change while the new file is still loading
        app.refresh_view();
        assert!(app.chart_viewer.view().is_none());
    }
}
