//! Alert thresholds and priority selection

use crate::aggregator::AlertElapsed;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Driver alert types, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Eyes closed or drowsy for too long
    Drowsiness,
    /// Not looking at the road for too long
    Inattention,
    /// Foot off the rest for too long
    TwoFootedDriving,
}

impl AlertKind {
    /// Text shown to the driver
    pub fn message(&self) -> &'static str {
        match self {
            AlertKind::Drowsiness => "Drowsy driving detected.",
            AlertKind::Inattention => "Eyes off the road. Please look ahead.",
            AlertKind::TwoFootedDriving => "Two-footed driving detected.",
        }
    }
}

/// Hold time before each condition raises its alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub drowsy_secs: f64,
    pub not_forward_secs: f64,
    pub two_footed_secs: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            drowsy_secs: 3.0,
            not_forward_secs: 3.0,
            two_footed_secs: 5.0,
        }
    }
}

/// Seconds to a `Duration`, clamping negatives to zero and overflow to `Duration::MAX`
fn saturating_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

impl AlertThresholds {
    pub fn drowsy(&self) -> Duration {
        saturating_secs(self.drowsy_secs)
    }

    pub fn not_forward(&self) -> Duration {
        saturating_secs(self.not_forward_secs)
    }

    pub fn two_footed(&self) -> Duration {
        saturating_secs(self.two_footed_secs)
    }

    /// Threshold fields paired with their config names
    pub fn fields(&self) -> [(&'static str, f64); 3] {
        [
            ("drowsy_secs", self.drowsy_secs),
            ("not_forward_secs", self.not_forward_secs),
            ("two_footed_secs", self.two_footed_secs),
        ]
    }
}

/// Per-condition verdict for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertDecision {
    /// Condition not present
    Reset,
    /// Condition present, threshold not yet reached
    Pending,
    /// Condition held past its threshold
    Warn,
}

impl AlertDecision {
    /// Classify a held duration; `active` is whether the timer is running
    pub fn classify(active: bool, elapsed: Duration, threshold: Duration) -> Self {
        if !active {
            AlertDecision::Reset
        } else if elapsed >= threshold {
            AlertDecision::Warn
        } else {
            AlertDecision::Pending
        }
    }
}

/// Pick the single alert to show, if any
///
/// Drowsiness outranks inattention, which outranks two-footed driving.
pub fn select_alert(elapsed: &AlertElapsed, thresholds: &AlertThresholds) -> Option<AlertKind> {
    [
        (AlertKind::Drowsiness, elapsed.drowsy_decision(thresholds)),
        (AlertKind::Inattention, elapsed.not_forward_decision(thresholds)),
        (AlertKind::TwoFootedDriving, elapsed.two_footed_decision(thresholds)),
    ]
    .into_iter()
    .find(|(_, decision)| *decision == AlertDecision::Warn)
    .map(|(kind, _)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elapsed(drowsy: f64, not_forward: f64, two_footed: f64) -> AlertElapsed {
        let d = |s: f64| (s > 0.0).then(|| Duration::from_secs_f64(s));
        AlertElapsed {
            drowsy: d(drowsy),
            not_forward: d(not_forward),
            two_footed: d(two_footed),
        }
    }

    #[test]
    fn test_classify() {
        let t = Duration::from_secs(3);
        assert_eq!(AlertDecision::classify(false, Duration::ZERO, t), AlertDecision::Reset);
        assert_eq!(AlertDecision::classify(true, Duration::from_millis(2999), t), AlertDecision::Pending);
        assert_eq!(AlertDecision::classify(true, t, t), AlertDecision::Warn);
    }

    #[test]
    fn test_priority_order() {
        let th = AlertThresholds::default();
        assert_eq!(select_alert(&elapsed(3.0, 9.0, 9.0), &th), Some(AlertKind::Drowsiness));
        assert_eq!(select_alert(&elapsed(2.9, 3.0, 9.0), &th), Some(AlertKind::Inattention));
        assert_eq!(select_alert(&elapsed(0.0, 2.0, 5.0), &th), Some(AlertKind::TwoFootedDriving));
        assert_eq!(select_alert(&elapsed(2.9, 2.9, 4.9), &th), None);
    }

    #[test]
    fn test_custom_thresholds() {
        let th = AlertThresholds {
            two_footed_secs: 1.0,
            ..Default::default()
        };
        assert_eq!(select_alert(&elapsed(0.0, 0.0, 1.0), &th), Some(AlertKind::TwoFootedDriving));
    }

    #[test]
    fn test_out_of_range_thresholds_saturate() {
        let th = AlertThresholds {
            drowsy_secs: 1e300,
            not_forward_secs: -2.0,
            two_footed_secs: f64::NAN,
        };
        assert_eq!(th.drowsy(), Duration::MAX);
        assert_eq!(th.not_forward(), Duration::ZERO);
        assert_eq!(th.two_footed(), Duration::ZERO);
        assert_eq!(select_alert(&elapsed(9.0, 0.0, 0.0), &th), None);
    }

    #[test]
    fn test_messages_are_distinct() {
        let kinds = [AlertKind::Drowsiness, AlertKind::Inattention, AlertKind::TwoFootedDriving];
        for a in kinds {
            for b in kinds {
                assert_eq!(a == b, a.message() == b.message());
            }
        }
    }
}
