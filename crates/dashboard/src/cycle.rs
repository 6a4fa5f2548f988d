//! Fusion Cycle
//!
//! One call to [`FusionCycle::run_once`] reads every input once and returns
//! the state bundle for that tick. The cycle never blocks on a sensor worker;
//! the only synchronous I/O is the 8-byte SPI exchange.

use crate::config::DashboardConfig;
use crate::history::SlidingWindow;
use crate::vision::{expression_code, DriverVision};
use alerting::{select_alert, AlertKind, AlertThresholds, CalibrationWindow, TemporalAlertAggregator};
use sensor_hub::{ChannelStatus, SensorHub};
use serde::Serialize;
use spi_link::{exchange, RxStatus, SpiTransfer, TxFrame};
use std::time::Instant;
use tracing::{debug, info, warn};

/// MCU flag lights shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndicatorLights {
    pub pedal_anomaly: bool,
    /// Pedal anomaly together with an abnormal biosignal
    pub biosignal: bool,
    pub pedal_misuse: bool,
}

impl IndicatorLights {
    pub fn from_status(status: &RxStatus) -> Self {
        Self {
            pedal_anomaly: status.pedal_flag,
            biosignal: status.pedal_flag && status.cond_flag,
            pedal_misuse: status.pedal_misuse,
        }
    }
}

/// Everything a renderer needs for one tick
#[derive(Debug, Clone, Serialize)]
pub struct CycleState {
    pub heart_rate: Option<f32>,
    pub breath_rate: Option<f32>,
    pub hr_history: Vec<f32>,
    pub br_history: Vec<f32>,
    pub radar_status: ChannelStatus,
    pub face_detected: bool,
    pub brake_pct: u8,
    pub emotion: String,
    pub expression_code: u8,
    /// `None` while the FSR channel is unavailable
    pub fsr_pressed: Option<bool>,
    pub fsr_status: ChannelStatus,
    pub drowsy_secs: f32,
    pub not_forward_secs: f32,
    pub two_footed_secs: f32,
    pub spi: RxStatus,
    pub indicators: IndicatorLights,
    pub alert: Option<AlertKind>,
    pub alert_message: Option<&'static str>,
    /// Seconds left in a running calibration
    pub calibration_remaining: Option<f32>,
}

/// Per-tick orchestration of vision, sensors, MCU link and alerts
pub struct FusionCycle<V> {
    vision: V,
    hub: SensorHub,
    spi: Option<Box<dyn SpiTransfer + Send>>,
    aggregator: TemporalAlertAggregator,
    thresholds: AlertThresholds,
    calibration: CalibrationWindow,
    hr_history: SlidingWindow<f32>,
    br_history: SlidingWindow<f32>,
    last_alert: Option<AlertKind>,
}

impl<V: DriverVision> FusionCycle<V> {
    pub fn new(
        config: &DashboardConfig,
        vision: V,
        hub: SensorHub,
        spi: Option<Box<dyn SpiTransfer + Send>>,
    ) -> Self {
        Self {
            vision,
            hub,
            spi,
            aggregator: TemporalAlertAggregator::new(),
            thresholds: config.alerts.clone(),
            calibration: CalibrationWindow::new(config.calibration()),
            hr_history: SlidingWindow::new(config.history_len),
            br_history: SlidingWindow::new(config.history_len),
            last_alert: None,
        }
    }

    /// Run one tick
    pub fn run_once(&mut self, now: Instant) -> CycleState {
        let vision = self.vision.observe();
        let calibration_remaining = self.calibration.remaining(now);

        let heart_rate = self.hub.heart_rate_at(now);
        let breath_rate = self.hub.breath_rate_at(now);
        if let Some(hr) = heart_rate {
            self.hr_history.push(hr);
        }
        if let Some(br) = breath_rate {
            self.br_history.push(br);
        }

        let code = expression_code(&vision.emotion);
        let tx = TxFrame::masked(
            vision.brake_pct as i64,
            code as i64,
            heart_rate.unwrap_or(0.0) as i64,
            breath_rate.unwrap_or(0.0) as i64,
        );
        let spi = self.exchange(tx);
        let indicators = IndicatorLights::from_status(&spi);

        let fsr_pressed = self.hub.fsr_pressed();
        let two_footed = fsr_pressed == Some(false);
        let elapsed = self
            .aggregator
            .update(now, vision.drowsy, two_footed, !vision.forward_looking);

        let alert = match calibration_remaining {
            Some(_) => None,
            None => select_alert(&elapsed, &self.thresholds),
        };
        if alert != self.last_alert {
            match alert {
                Some(kind) => warn!("Alert raised: {:?}", kind),
                None => info!("Alert cleared"),
            }
            self.last_alert = alert;
        }

        CycleState {
            heart_rate,
            breath_rate,
            hr_history: self.hr_history.to_vec(),
            br_history: self.br_history.to_vec(),
            radar_status: self.hub.radar_status(),
            face_detected: vision.face_detected,
            brake_pct: vision.brake_pct,
            emotion: vision.emotion,
            expression_code: code,
            fsr_pressed,
            fsr_status: self.hub.fsr_status(),
            drowsy_secs: elapsed.drowsy_or_zero().as_secs_f32(),
            not_forward_secs: elapsed.not_forward_or_zero().as_secs_f32(),
            two_footed_secs: elapsed.two_footed_or_zero().as_secs_f32(),
            spi,
            indicators,
            alert,
            alert_message: alert.map(|kind| kind.message()),
            calibration_remaining: calibration_remaining.map(|d| d.as_secs_f32()),
        }
    }

    fn exchange(&mut self, tx: TxFrame) -> RxStatus {
        let Some(link) = self.spi.as_mut() else {
            return RxStatus::default();
        };
        match exchange(link.as_mut(), tx) {
            Ok(status) => {
                debug!("SPI rx {}", status.raw_hex);
                status
            }
            Err(e) => {
                warn!("SPI exchange failed: {}", e);
                RxStatus::default()
            }
        }
    }

    /// Reset alert timers and vision baselines, and start the calibration countdown
    pub fn recalibrate(&mut self, now: Instant) {
        self.aggregator.recalibrate();
        self.calibration.start(now);
        self.vision.recalibrate();
    }

    pub fn hub(&self) -> &SensorHub {
        &self.hub
    }

    pub fn hub_mut(&mut self) -> &mut SensorHub {
        &mut self.hub
    }
}
