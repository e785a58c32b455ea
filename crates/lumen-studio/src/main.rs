mod lesson;

use anyhow::Result;
use lumen_engine::assets::{FileFetcher, ResourceLoader};
use lumen_engine::device::GpuInit;
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::window::{Runtime, RuntimeConfig};

use crate::lesson::Lesson;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    // Asset root: first argument, else ./assets.
    let assets = std::env::args().nth(1).unwrap_or_else(|| "assets".to_string());
    log::info!("studio: assets from {assets}");
    log::info!("studio: drag to orbit, wheel to zoom, double-click for fullscreen");
    log::info!("studio: H panel, P camera, arrows elevation, PgUp/PgDn subdivision, W wireframe, C color, Space spin");

    let config = RuntimeConfig {
        title: "Lumen Studio".to_string(),
        ..Default::default()
    };
    let loader = ResourceLoader::new(FileFetcher::new(assets));

    Runtime::run(config, GpuInit::default(), loader, Lesson::build)
}
