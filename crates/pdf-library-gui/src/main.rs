#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use eframe::egui;
use pdf_library::{Library, LibraryConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

mod app;
mod handlers;
mod logger;
mod ui_components;
mod viewer;
mod views;
mod worker;

async fn open_library() -> Result<worker::AppLibrary> {
    let config = match LibraryConfig::default_path() {
        Some(path) => LibraryConfig::load_or_default(&path)
            .await
            .with_context(|| format!("reading config {}", path.display()))?,
        None => LibraryConfig::default(),
    };
    log::info!("Opening library at {}", config.data_dir.display());
    Ok(Library::open(config).await?)
}

fn main() -> Result<()> {
    let logger = logger::AppLogger::new(500)
        .init()
        .context("installing logger")?;

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let library = Arc::new(runtime.block_on(open_library())?);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let worker = runtime.spawn(worker::worker_task(library, command_rx, update_tx));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_title("PDF Library")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "PDF Library",
        options,
        Box::new(move |_cc| Ok(Box::new(app::PdfLibraryApp::new(command_tx, update_rx, logger)))),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    // The app (and its command sender) is gone; let the worker save the open page
    runtime.block_on(async {
        if tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .is_err()
        {
            log::warn!("Worker did not shut down in time");
        }
    });

    Ok(())
}
