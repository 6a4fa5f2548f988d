//! Driver Monitoring Dashboard - Main Entry Point
//!
//! Usage: `driver-dashboard [config.toml]`
//!
//! Commands on stdin: `r` recalibrates, `q` quits.

use anyhow::Context;
use dashboard::{
    init_logging, DashboardConfig, FusionCycle, HeadlessVision, LogRenderer, Renderer, SimulatedRadar,
};
use mmwave_protocol::{RadarConfig, RadarError};
use sensor_hub::{ads1115_opener, SensorHub};
use spi_link::{SpiTransfer, SpidevPort};
use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Frame period of the simulated radar
const SIM_FRAME_PERIOD: Duration = Duration::from_millis(500);

fn build_hub(config: &DashboardConfig) -> SensorHub {
    if !config.simulate_radar {
        return SensorHub::new(config.hub.clone());
    }

    info!("Radar channel fed by simulator");
    let open_radar = Box::new(|c: &RadarConfig| -> Result<Box<dyn Read + Send>, RadarError> {
        Ok(Box::new(SimulatedRadar::new(c.checksum_mode, SIM_FRAME_PERIOD)))
    });
    SensorHub::with_openers(config.hub.clone(), open_radar, ads1115_opener())
}

fn open_spi(config: &DashboardConfig) -> Option<Box<dyn SpiTransfer + Send>> {
    if !config.spi_enabled {
        info!("SPI link disabled");
        return None;
    }
    match SpidevPort::open(&config.spi) {
        Ok(port) => Some(Box::new(port)),
        Err(e) => {
            error!("SPI link unavailable: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DashboardConfig::load(config_path.as_deref()).context("Loading configuration")?;
    init_logging(&config.logging)?;

    info!("=== Driver Monitoring Dashboard v{} ===", env!("CARGO_PKG_VERSION"));

    let mut hub = build_hub(&config);
    hub.start()?;
    let spi = open_spi(&config);

    let mut cycle = FusionCycle::new(&config, HeadlessVision::default(), hub, spi);
    let mut renderer = LogRenderer::new(config.render_every);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let mut ticker = tokio::time::interval(config.cycle_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!("Running; 'r' + Enter recalibrates, 'q' + Enter quits");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let state = cycle.run_once(Instant::now());
                if let Err(e) = renderer.render(&state) {
                    warn!("Render failed: {}", e);
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match line.trim() {
                    "r" | "R" => cycle.recalibrate(Instant::now()),
                    "q" | "Q" => break,
                    "" => {}
                    other => warn!("Unknown command {:?}", other),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("stdin closed: {}", e);
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c => {
                info!("Interrupt received");
                break;
            }
        }
    }

    info!("Shutting down");
    cycle.hub_mut().stop();
    Ok(())
}
