use anyhow::{bail, Context, Result};
use clap::Parser;
use collision_dashboard::cli::Args;
use collision_dashboard::config::{AppConfig, ConfigManager, APP_NAME};
use collision_dashboard::data::{DatasetLoader, LoadCache};
use collision_dashboard::gui::DashboardApp;
use collision_dashboard::{logging, report};
use eframe::egui;
use std::path::Path;
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();

    if args.generate_config {
        let manager = ConfigManager::new(APP_NAME)?;
        let path = manager.write_default_config(args.force)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    logging::init(&config.logging.filter);
    info!("startup");

    if let Some(dir) = &args.report {
        return run_report(dir, &config);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("NYC Motor Vehicle Collisions"),
        ..Default::default()
    };

    eframe::run_native(
        "Collision Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, &config)))),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {}", e))
}

fn run_report(dir: &Path, config: &AppConfig) -> Result<()> {
    let Some(path) = &config.dataset.path else {
        bail!("--report needs a dataset path (argument or [dataset] path in config)");
    };

    let loader = DatasetLoader::new(config.columns.clone());
    let mut cache = LoadCache::new();
    let table = cache
        .get_or_load(&loader, path, config.dataset.max_rows)
        .with_context(|| format!("loading {}", path.display()))?;

    let params = config.defaults.to_params()?;
    let json = report::write_report(dir, &table, params)?;
    info!("report written to {}", json.display());
    Ok(())
}
