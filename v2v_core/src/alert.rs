//! Alert escalation: ranked risk stream → discrete, debounced alert events.
//!
//! A Mealy-style state machine with two severity tiers and one shared
//! cooldown timer. Policy note: the cooldown is uniform across tiers (one
//! timer, default 2000 ms), so a sustained risk fires at most once per
//! window no matter how many evaluation ticks occur, and a MEDIUM/HIGH
//! flap cannot double the alert rate. Playback (tone, haptics, speech,
//! flash rendering) is delegated through [`NotificationSink`]; the
//! escalator only decides *that* and *at what severity* to notify.

use crate::risk::{RiskLevel, RiskRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Alert severity. Only MEDIUM and HIGH risks escalate to alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    /// Maps a risk classification to an alert severity; LOW does not alert.
    pub fn from_risk(level: RiskLevel) -> Option<Self> {
        match level {
            RiskLevel::Low => None,
            RiskLevel::Medium => Some(Severity::Medium),
            RiskLevel::High => Some(Severity::High),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
        }
    }
}

/// One emitted alert: a discrete, timestamped fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub severity: Severity,

    /// TTC of the triggering risk record, if closing
    pub ttc_seconds: Option<f64>,

    pub emitted_at_ms: i64,
}

/// Transient visual-flash request accompanying HIGH alerts.
///
/// The escalator requests the flash; rendering (and its timer) belongs to
/// the playback collaborator, independent of the alert cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashRequest {
    pub duration_ms: u64,
}

/// Escalator tuning.
#[derive(Debug, Clone)]
pub struct EscalatorConfig {
    /// Minimum interval between emitted alerts, shared across severities
    pub cooldown_ms: i64,

    /// Flash duration requested with HIGH alerts
    pub flash_duration_ms: u64,
}

impl Default for EscalatorConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 2_000,
            flash_duration_ms: 400,
        }
    }
}

/// Outbound boundary toward the notification channels.
///
/// MEDIUM maps to a single low tone, short haptic pattern and a spoken
/// caution; HIGH to a higher tone, longer haptic pattern, spoken warning
/// and a visual flash. The concrete waveforms are the implementor's
/// concern.
pub trait NotificationSink {
    /// Delivers one alert event.
    fn notify(&mut self, event: &AlertEvent);

    /// Requests a transient visual flash (HIGH alerts only).
    fn flash(&mut self, request: FlashRequest);
}

/// Debounced alert state machine.
pub struct AlertEscalator {
    config: EscalatorConfig,

    /// Shared cooldown timer across both severities
    last_emitted_ms: Option<i64>,
}

impl AlertEscalator {
    pub fn new(config: EscalatorConfig) -> Self {
        Self {
            config,
            last_emitted_ms: None,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(EscalatorConfig::default())
    }

    /// Evaluates one tick against the top-ranked risk record.
    ///
    /// Emits at most one [`AlertEvent`]; LOW or absent risks never alert,
    /// and MEDIUM/HIGH within the cooldown window are suppressed with the
    /// timer left unchanged.
    pub fn evaluate(&mut self, top: Option<&RiskRecord>, now_ms: i64) -> Option<AlertEvent> {
        let record = top?;
        let severity = Severity::from_risk(record.risk_level)?;

        if let Some(last) = self.last_emitted_ms {
            if now_ms - last < self.config.cooldown_ms {
                debug!(%severity, now_ms, last, "alert suppressed by cooldown");
                return None;
            }
        }

        self.last_emitted_ms = Some(now_ms);
        Some(AlertEvent {
            severity,
            ttc_seconds: record.ttc_seconds,
            emitted_at_ms: now_ms,
        })
    }

    /// Evaluates one tick and forwards any emission to the sink, including
    /// the flash request for HIGH alerts.
    pub fn evaluate_into(
        &mut self,
        top: Option<&RiskRecord>,
        now_ms: i64,
        sink: &mut dyn NotificationSink,
    ) -> Option<AlertEvent> {
        let event = self.evaluate(top, now_ms)?;
        sink.notify(&event);
        if event.severity == Severity::High {
            sink.flash(FlashRequest {
                duration_ms: self.config.flash_duration_ms,
            });
        }
        Some(event)
    }
}
