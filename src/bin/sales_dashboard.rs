use anyhow::{Context, Result};
use log::info;
use sales_dashboard_core::{DashboardConfig, DashboardPipeline};
use std::env;
use std::fs;
use std::path::PathBuf;

fn arg_value(flag: &str) -> Option<String> {
    env::args()
        .position(|a| a == flag)
        .and_then(|i| env::args().nth(i + 1))
}

fn main() -> Result<()> {
    env_logger::init();

    let mut config = match arg_value("--config") {
        Some(path) => DashboardConfig::from_json_file(&path)
            .with_context(|| format!("Loading config {}", path))?,
        None => DashboardConfig::default(),
    };

    if let Some(budget) = arg_value("--budget") {
        config.annual_budget = budget
            .parse()
            .with_context(|| format!("Parsing --budget '{}'", budget))?;
    }

    let input = match arg_value("--input") {
        Some(path) => {
            let path = PathBuf::from(path);
            info!("Reading workbook {}", path.display());
            Some(fs::read(&path).with_context(|| format!("Reading {}", path.display()))?)
        }
        None => None,
    };

    let mut pipeline = DashboardPipeline::new();
    let state = pipeline
        .compute(input.as_deref(), &config)
        .context("compute dashboard")?;
    let json = state.to_json_pretty().context("serialize dashboard")?;

    match arg_value("--out") {
        Some(out) => {
            let out_path = PathBuf::from(out);
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&out_path, json)
                .with_context(|| format!("Writing {}", out_path.display()))?;
            info!("Dashboard written to {}", out_path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
