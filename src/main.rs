#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(unused_mut)]
#![allow(dead_code)]
#![allow(unused_doc_comments)]
#![allow(unused_labels)]
#![allow(unexpected_cfgs)]
// #![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

pub mod appconfig;
pub mod image_fetch;
pub mod logging;
pub mod roi;
pub mod saved_data;
pub mod server_conn;
pub mod tests;
pub mod ui;

use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

#[cfg(feature = "tests")]
fn main() -> Result<()> {
    logging::init_logs();

    tests::main_tests()?;

    Ok(())
}

/// Main App
#[cfg(not(feature = "tests"))]
fn main() -> eframe::Result<()> {
    use ui::ui_types::App;

    logging::init_logs();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };
    eframe::run_native(
        "detection_dashboard",
        native_options,
        Box::new(|cc| Ok(Box::new(App::new(cc)))),
    )
}
