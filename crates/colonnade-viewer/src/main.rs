mod app;
mod scene;

use colonnade_engine::device::GpuInit;
use colonnade_engine::frame::PipelineConfig;
use colonnade_engine::logging::{init_logging, LoggingConfig};
use colonnade_engine::window::{Runtime, RuntimeConfig};

use app::ColumnsApp;

/// Overrides the frame resource ring size.
const FRAMES_IN_FLIGHT_ENV: &str = "COLONNADE_FRAMES_IN_FLIGHT";

fn frames_in_flight() -> usize {
    let default = PipelineConfig::default().frames_in_flight;
    let Ok(raw) = std::env::var(FRAMES_IN_FLIGHT_ENV) else {
        return default;
    };

    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            log::warn!("ignoring {FRAMES_IN_FLIGHT_ENV}={raw:?}, using {default}");
            default
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let frames = frames_in_flight();
    log::info!("starting colonnade viewer with {frames} frames in flight");

    Runtime::run(
        RuntimeConfig {
            title: "colonnade - lit columns".to_string(),
            ..Default::default()
        },
        GpuInit::default(),
        ColumnsApp::new(frames),
    )
}
