//! Motion estimation: raw position fixes → kinematic state.
//!
//! A [`Fix`] is one raw, timestamped position sample. The estimator derives
//! speed and heading from two consecutive fixes and flags sudden braking
//! from the change in derived speed. Per-agent history is an explicit
//! [`AgentHistory`] value owned by the caller; there is no hidden state,
//! which keeps the update a pure function over what is passed in.

use crate::geo;
use serde::{Deserialize, Serialize};
use tracing::debug;
use v2v_env::{AgentId, PeerStateRecord};

/// Deceleration threshold for the sudden-braking flag, km/h per second.
pub const BRAKE_DECEL_KMH_PER_S: f64 = 20.0;

/// One raw, timestamped geographic position sample. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Sample timestamp in milliseconds
    pub timestamp_ms: i64,
}

/// Smoothed kinematic state of one agent.
///
/// Produced only by this module: either from consecutive fixes via
/// [`AgentHistory::apply_fix`], or from a peer's wire record via
/// [`KinematicState::from_record`]. Never mutated in place; each update
/// yields a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    /// Owning agent
    pub agent_id: AgentId,

    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Derived speed, km/h, always >= 0. Zero until a second fix exists.
    pub speed_kmh: f64,

    /// Derived heading, degrees [0, 360). Zero until a second fix exists.
    pub heading_deg: f64,

    /// Timestamp of the underlying fix, ms
    pub timestamp_ms: i64,

    /// Sudden-braking flag (defined from the third fix onward)
    pub braking: bool,
}

impl KinematicState {
    /// Converts a peer's wire record into a kinematic state.
    ///
    /// Returns `None` for records with non-finite numeric fields: invalid
    /// input is treated as absent, not as a fault. Speed is clamped to >= 0
    /// and heading normalized into [0, 360).
    pub fn from_record(agent_id: AgentId, record: &PeerStateRecord) -> Option<Self> {
        let finite = record.lat.is_finite()
            && record.lng.is_finite()
            && record.speed_kmh.is_finite()
            && record.heading_deg.is_finite();
        if !finite {
            debug!(agent = %agent_id, "rejecting peer record with non-finite fields");
            return None;
        }

        Some(Self {
            agent_id,
            latitude: record.lat,
            longitude: record.lng,
            speed_kmh: record.speed_kmh.max(0.0),
            heading_deg: record.heading_deg.rem_euclid(360.0),
            timestamp_ms: record.timestamp_ms,
            braking: record.braking,
        })
    }

    /// Renders this state as a wire record for broadcast.
    pub fn to_record(&self) -> PeerStateRecord {
        PeerStateRecord {
            lat: self.latitude,
            lng: self.longitude,
            speed_kmh: self.speed_kmh,
            heading_deg: self.heading_deg,
            timestamp_ms: self.timestamp_ms,
            braking: self.braking,
        }
    }

    /// True when all numeric fields are usable for risk analysis.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.speed_kmh.is_finite()
            && self.heading_deg.is_finite()
    }
}

/// Per-agent motion history, owned by the caller and threaded through each
/// update. Retains the previous fix with the state emitted for it, plus the
/// previously derived speed; the retained state is returned unchanged when
/// an update is discarded.
#[derive(Debug, Clone, Default)]
pub struct AgentHistory {
    /// The last applied fix and the state emitted for it, kept together so
    /// one cannot exist without the other.
    prev: Option<(Fix, KinematicState)>,

    /// Speed from the previous update; `None` until two fixes have been
    /// seen, so braking stays undefined (false) on the first two fixes.
    prev_speed_kmh: Option<f64>,
}

impl AgentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recently emitted state, if any.
    pub fn last_state(&self) -> Option<&KinematicState> {
        self.prev.as_ref().map(|(_, state)| state)
    }

    /// Applies a new fix and returns the resulting kinematic state.
    ///
    /// - First fix for the agent: state with speed 0, heading 0, braking
    ///   false.
    /// - `Δt <= 0` against the previous fix (out-of-order or duplicate
    ///   sample): the update is discarded and the previous state is
    ///   returned unchanged.
    pub fn apply_fix(&mut self, agent_id: &AgentId, fix: Fix) -> KinematicState {
        let prev_fix = match &self.prev {
            None => {
                let state = KinematicState {
                    agent_id: agent_id.clone(),
                    latitude: fix.latitude,
                    longitude: fix.longitude,
                    speed_kmh: 0.0,
                    heading_deg: 0.0,
                    timestamp_ms: fix.timestamp_ms,
                    braking: false,
                };
                self.prev = Some((fix, state.clone()));
                return state;
            }
            Some((prev_fix, prev_state)) => {
                let dt_ms = fix.timestamp_ms - prev_fix.timestamp_ms;
                if dt_ms <= 0 {
                    debug!(agent = %agent_id, dt_ms, "discarding non-monotonic fix");
                    // Guard against out-of-order or duplicate samples: no-op.
                    return prev_state.clone();
                }
                *prev_fix
            }
        };

        let dt_ms = fix.timestamp_ms - prev_fix.timestamp_ms;
        let dt_s = dt_ms as f64 / 1000.0;
        let distance = geo::distance_meters(
            prev_fix.latitude,
            prev_fix.longitude,
            fix.latitude,
            fix.longitude,
        );
        let speed_kmh = (distance / dt_s * 3.6).max(0.0);
        let heading_deg = geo::bearing_degrees(
            prev_fix.latitude,
            prev_fix.longitude,
            fix.latitude,
            fix.longitude,
        );

        let braking = match self.prev_speed_kmh {
            Some(prev_speed) => (prev_speed - speed_kmh) / dt_s > BRAKE_DECEL_KMH_PER_S,
            None => false,
        };

        let state = KinematicState {
            agent_id: agent_id.clone(),
            latitude: fix.latitude,
            longitude: fix.longitude,
            speed_kmh,
            heading_deg,
            timestamp_ms: fix.timestamp_ms,
            braking,
        };

        self.prev = Some((fix, state.clone()));
        self.prev_speed_kmh = Some(speed_kmh);
        state
    }
}
