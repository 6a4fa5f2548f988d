//! Sensor hub lifecycle and read API

use crate::snapshot::{FsrSnapshot, RadarSnapshot};
use crate::worker::{StopFlag, Worker};
use crate::{ChannelStatus, HubConfig, HubError};
use fsr_monitor::{Ads1115, AnalogChannel, BinarySensorState, DebouncedBinarySensor, FsrConfig, FsrError};
use mmwave_protocol::{
    open_serial_port, MeasurementKind, RadarConfig, RadarError, RadarReader, ReadEvent,
};
use std::io::Read;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Pause after an empty read so sources without a blocking timeout do not spin
const IDLE_BACKOFF: Duration = Duration::from_millis(10);
/// Pause after a failed read
const ERROR_BACKOFF: Duration = Duration::from_millis(200);

type RadarSource = Box<dyn Read + Send>;
type FsrChannel = Box<dyn AnalogChannel + Send>;

/// Opens the radar byte source
pub type RadarOpener = Box<dyn FnMut(&RadarConfig) -> Result<RadarSource, RadarError> + Send>;
/// Opens the FSR analog channel
pub type FsrOpener = Box<dyn FnMut(&FsrConfig) -> Result<FsrChannel, FsrError> + Send>;

/// Opener for the radar UART
pub fn serial_radar_opener() -> RadarOpener {
    Box::new(|c: &RadarConfig| -> Result<RadarSource, RadarError> {
        Ok(Box::new(open_serial_port(c)?))
    })
}

/// Opener for the ADS1115 on I2C
pub fn ads1115_opener() -> FsrOpener {
    Box::new(|c: &FsrConfig| -> Result<FsrChannel, FsrError> {
        Ok(Box::new(Ads1115::open(c)?))
    })
}

/// Background acquisition for the radar and FSR channels
pub struct SensorHub {
    config: HubConfig,
    open_radar: RadarOpener,
    open_fsr: FsrOpener,
    radar_rx: watch::Receiver<RadarSnapshot>,
    fsr_rx: watch::Receiver<FsrSnapshot>,
    radar_status: ChannelStatus,
    fsr_status: ChannelStatus,
    workers: Vec<Worker>,
    running: bool,
}

impl SensorHub {
    /// Hub backed by the radar UART and the ADS1115
    pub fn new(config: HubConfig) -> Self {
        Self::with_openers(config, serial_radar_opener(), ads1115_opener())
    }

    /// Hub with caller-supplied device openers
    pub fn with_openers(config: HubConfig, open_radar: RadarOpener, open_fsr: FsrOpener) -> Self {
        Self {
            config,
            open_radar,
            open_fsr,
            radar_rx: watch::channel(RadarSnapshot::default()).1,
            fsr_rx: watch::channel(FsrSnapshot::default()).1,
            radar_status: ChannelStatus::Stopped,
            fsr_status: ChannelStatus::Stopped,
            workers: Vec::new(),
            running: false,
        }
    }

    /// Open devices and start one worker per available channel
    ///
    /// Calling `start` on a running hub does nothing.
    pub fn start(&mut self) -> Result<(), HubError> {
        if self.running {
            return Ok(());
        }

        // Set first so a failed spawn still lets `stop` reap the other worker
        self.running = true;
        self.radar_status = self.start_radar()?;
        self.fsr_status = self.start_fsr()?;

        info!(
            "Sensor hub started (radar: {:?}, fsr: {:?})",
            self.radar_status, self.fsr_status
        );
        Ok(())
    }

    fn start_radar(&mut self) -> Result<ChannelStatus, HubError> {
        if !self.config.radar_enabled {
            info!("Radar channel disabled");
            return Ok(ChannelStatus::Unavailable);
        }

        let source = match (self.open_radar)(&self.config.radar) {
            Ok(source) => source,
            Err(e) => {
                error!("Radar unavailable on {}: {}", self.config.radar.port, e);
                return Ok(ChannelStatus::Unavailable);
            }
        };

        let (tx, rx) = watch::channel(RadarSnapshot::default());
        self.radar_rx = rx;
        let reader = RadarReader::new(source, self.config.radar.checksum_mode);
        let worker = Worker::spawn("mmwave", move |stop| run_radar(reader, tx, stop))?;
        self.workers.push(worker);
        Ok(ChannelStatus::Running)
    }

    fn start_fsr(&mut self) -> Result<ChannelStatus, HubError> {
        if !self.config.fsr_enabled {
            info!("FSR channel disabled");
            return Ok(ChannelStatus::Unavailable);
        }

        let channel = match (self.open_fsr)(&self.config.fsr) {
            Ok(channel) => channel,
            Err(e) => {
                error!("FSR unavailable on {}: {}", self.config.fsr.device, e);
                return Ok(ChannelStatus::Unavailable);
            }
        };

        let (tx, rx) = watch::channel(FsrSnapshot::default());
        self.fsr_rx = rx;
        let sensor = DebouncedBinarySensor::new(channel, &self.config.fsr);
        let worker = Worker::spawn("fsr", move |stop| run_fsr(sensor, tx, stop))?;
        self.workers.push(worker);
        Ok(ChannelStatus::Running)
    }

    /// Stop all workers, waiting at most the join timeout for each
    ///
    /// Calling `stop` on a stopped hub does nothing.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }

        let timeout = self.config.join_timeout();
        for worker in self.workers.drain(..) {
            worker.stop(timeout);
        }
        self.radar_status = ChannelStatus::Stopped;
        self.fsr_status = ChannelStatus::Stopped;
        self.running = false;
        info!("Sensor hub stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn radar_status(&self) -> ChannelStatus {
        self.radar_status
    }

    pub fn fsr_status(&self) -> ChannelStatus {
        self.fsr_status
    }

    /// Current heart rate, or `None` if the radar is stale
    pub fn latest_heart_rate(&self) -> Option<f32> {
        self.heart_rate_at(Instant::now())
    }

    /// Current breath rate, or `None` if the radar is stale
    pub fn latest_breath_rate(&self) -> Option<f32> {
        self.breath_rate_at(Instant::now())
    }

    pub fn heart_rate_at(&self, now: Instant) -> Option<f32> {
        self.radar_value_at(MeasurementKind::HeartRate, now)
    }

    pub fn breath_rate_at(&self, now: Instant) -> Option<f32> {
        self.radar_value_at(MeasurementKind::BreathRate, now)
    }

    fn radar_value_at(&self, kind: MeasurementKind, now: Instant) -> Option<f32> {
        self.radar_rx
            .borrow()
            .value_at(kind, now, self.config.radar.stale_after())
    }

    /// Copy of the latest radar snapshot
    pub fn radar_snapshot(&self) -> RadarSnapshot {
        self.radar_rx.borrow().clone()
    }

    /// Foot-rest state, or `None` while the FSR channel is not running
    pub fn latest_binary_state(&self) -> Option<BinarySensorState> {
        if self.fsr_status != ChannelStatus::Running {
            return None;
        }
        Some(self.fsr_rx.borrow().state.clone())
    }

    pub fn fsr_pressed(&self) -> Option<bool> {
        self.latest_binary_state().map(|s| s.pressed)
    }

    /// Copy of the latest FSR snapshot
    pub fn fsr_snapshot(&self) -> FsrSnapshot {
        self.fsr_rx.borrow().clone()
    }

    /// Prolonged-release signals since the FSR worker started
    pub fn prolonged_releases(&self) -> u64 {
        self.fsr_rx.borrow().prolonged_releases
    }
}

impl Drop for SensorHub {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_radar(mut reader: RadarReader<RadarSource>, tx: watch::Sender<RadarSnapshot>, stop: StopFlag) {
    info!("Radar worker running");
    while !stop.is_set() {
        match reader.poll() {
            Ok(ReadEvent::Measurements(measurements)) => {
                for m in &measurements {
                    debug!("Radar {:?} = {:.1}", m.kind, m.value);
                }
                let stats = reader.stats();
                tx.send_modify(|snap| {
                    measurements.into_iter().for_each(|m| snap.record(m));
                    snap.stats = stats;
                });
            }
            Ok(ReadEvent::Pending) => {
                let stats = reader.stats();
                tx.send_if_modified(|snap| {
                    // Valid frames of unknown type still count as radar activity
                    if stats.frames_ok > snap.stats.frames_ok {
                        snap.touch(Instant::now());
                    }
                    let changed = snap.stats != stats;
                    snap.stats = stats;
                    changed
                });
            }
            Ok(ReadEvent::NoData) => stop.sleep(IDLE_BACKOFF),
            Err(e) => {
                warn!("Radar read failed: {}", e);
                stop.sleep(ERROR_BACKOFF);
            }
        }
    }
    info!("Radar worker exiting");
}

fn run_fsr(
    mut sensor: DebouncedBinarySensor<FsrChannel>,
    tx: watch::Sender<FsrSnapshot>,
    stop: StopFlag,
) {
    info!("FSR worker running");
    while !stop.is_set() {
        let poll = sensor.poll(Instant::now());
        tx.send_modify(|snap| {
            snap.state = poll.state;
            snap.healthy = poll.healthy;
            if poll.prolonged_release {
                snap.prolonged_releases += 1;
            }
        });
        stop.sleep(poll.next_poll_in);
    }
    info!("FSR worker exiting");
}
