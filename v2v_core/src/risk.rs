//! Pairwise collision-risk analysis and fleet-wide ranking.
//!
//! Risk records are derived values: recomputed on every evaluation tick
//! from the current kinematic states, never cached across ticks.
//!
//! Relative speed is the *closing speed*: the 2-D relative velocity
//! (derived from each state's speed and heading) projected onto the
//! self→peer line of sight, clamped at zero. A pair that is not closing
//! (opening, static, or moving parallel at matched velocity) has relative
//! speed 0 and therefore no TTC.

use crate::geo;
use crate::motion::KinematicState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use v2v_env::AgentId;

/// Peers beyond this distance are outside the analysis horizon, in meters.
pub const RISK_HORIZON_M: f64 = 500.0;

/// TTC below this is classified HIGH, in seconds.
pub const TTC_HIGH_S: f64 = 3.0;

/// TTC below this (and at/above [`TTC_HIGH_S`]) is classified MEDIUM.
pub const TTC_MEDIUM_S: f64 = 5.0;

/// Collision-course range gate, meters.
pub const COLLISION_COURSE_RANGE_M: f64 = 100.0;

/// Collision-course minimum closing speed, km/h.
pub const COLLISION_COURSE_MIN_KMH: f64 = 5.0;

/// Discrete risk classification, ordered LOW < MEDIUM < HIGH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Risk assessment for one self/peer pair at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    /// The peer this record scores
    pub peer_id: AgentId,

    /// Great-circle separation, meters
    pub distance_m: f64,

    /// Closing speed, km/h, >= 0 (0 = not closing)
    pub relative_speed_kmh: f64,

    /// Seconds to zero separation at the current closing speed;
    /// `None` means not closing (unbounded)
    pub ttc_seconds: Option<f64>,

    /// Classification from TTC (`None` => LOW)
    pub risk_level: RiskLevel,

    /// Heuristic close-range flag, distinct from the TTC classification
    pub collision_course: bool,
}

/// Nearest peer by great-circle distance, unbounded range.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestPeer {
    pub peer_id: AgentId,
    pub state: KinematicState,
    pub distance_m: f64,
}

/// Closing speed between two states in km/h, clamped at zero.
///
/// Projects the relative velocity onto the self→peer bearing. For
/// coincident points the bearing convention is 0 (north); the projection
/// direction is then arbitrary, but distance is already zero there.
fn closing_speed_kmh(this: &KinematicState, peer: &KinematicState) -> f64 {
    let bearing = geo::bearing_degrees(
        this.latitude,
        this.longitude,
        peer.latitude,
        peer.longitude,
    )
    .to_radians();
    let (los_east, los_north) = (bearing.sin(), bearing.cos());

    let (self_east, self_north) = geo::velocity_kmh(this.speed_kmh, this.heading_deg);
    let (peer_east, peer_north) = geo::velocity_kmh(peer.speed_kmh, peer.heading_deg);

    let closing = (self_east - peer_east) * los_east + (self_north - peer_north) * los_north;
    closing.max(0.0)
}

/// Computes the pairwise risk record for two agents.
///
/// Symmetric in content: swapping self and peer only flips which side the
/// line of sight is measured from, which leaves distance, closing speed,
/// TTC and classification unchanged.
pub fn pairwise_risk(this: &KinematicState, peer: &KinematicState) -> RiskRecord {
    let distance_m = geo::distance_meters(
        this.latitude,
        this.longitude,
        peer.latitude,
        peer.longitude,
    );
    let relative_speed_kmh = closing_speed_kmh(this, peer);

    let ttc_seconds = if relative_speed_kmh > 0.0 {
        Some(distance_m / (relative_speed_kmh * 1000.0 / 3600.0))
    } else {
        None
    };

    let risk_level = match ttc_seconds {
        Some(ttc) if ttc < TTC_HIGH_S => RiskLevel::High,
        Some(ttc) if ttc < TTC_MEDIUM_S => RiskLevel::Medium,
        _ => RiskLevel::Low,
    };

    let collision_course =
        distance_m < COLLISION_COURSE_RANGE_M && relative_speed_kmh > COLLISION_COURSE_MIN_KMH;

    RiskRecord {
        peer_id: peer.agent_id.clone(),
        distance_m,
        relative_speed_kmh,
        ttc_seconds,
        risk_level,
        collision_course,
    }
}

/// Scores every peer within the analysis horizon and ranks the results.
///
/// Peers at or beyond [`RISK_HORIZON_M`] are dropped: they are outside
/// the analysis horizon, not "no risk". The self id is excluded if present,
/// and invalid states (non-finite fields) are skipped; an invalid self
/// yields an empty result. Ordering is fully deterministic: risk level
/// descending, then distance ascending, then peer id ascending as the
/// documented tie-break (so identical distances don't depend on map
/// iteration order).
pub fn fleet_risks(
    this: &KinematicState,
    peers: &HashMap<AgentId, KinematicState>,
) -> Vec<RiskRecord> {
    if !this.is_valid() {
        return Vec::new();
    }

    let mut risks: Vec<RiskRecord> = peers
        .iter()
        .filter(|(id, peer)| **id != this.agent_id && peer.is_valid())
        .map(|(_, peer)| pairwise_risk(this, peer))
        .filter(|record| record.distance_m < RISK_HORIZON_M)
        .collect();

    risks.sort_by(|a, b| {
        b.risk_level
            .cmp(&a.risk_level)
            .then_with(|| {
                a.distance_m
                    .partial_cmp(&b.distance_m)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.peer_id.cmp(&b.peer_id))
    });

    risks
}

/// Finds the nearest peer by distance, with no range bound.
///
/// Distinct contract from [`fleet_risks`]: the 500 m horizon does not
/// apply here. Returns `None` when there are no (valid) peers or the self
/// state is invalid.
pub fn nearest_peer(
    this: &KinematicState,
    peers: &HashMap<AgentId, KinematicState>,
) -> Option<NearestPeer> {
    if !this.is_valid() {
        return None;
    }

    peers
        .iter()
        .filter(|(id, peer)| **id != this.agent_id && peer.is_valid())
        .map(|(id, peer)| NearestPeer {
            peer_id: id.clone(),
            state: peer.clone(),
            distance_m: geo::distance_meters(
                this.latitude,
                this.longitude,
                peer.latitude,
                peer.longitude,
            ),
        })
        .min_by(|a, b| {
            a.distance_m
                .partial_cmp(&b.distance_m)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.peer_id.cmp(&b.peer_id))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state(key: &str, lat: f64, lng: f64, speed_kmh: f64, heading_deg: f64) -> KinematicState {
        KinematicState {
            agent_id: AgentId::from_key(key),
            latitude: lat,
            longitude: lng,
            speed_kmh,
            heading_deg,
            timestamp_ms: 0,
            braking: false,
        }
    }

    /// Places a peer at a given range/bearing from a base coordinate using
    /// the small-sphere approximation (fine for sub-kilometer test setups).
    fn offset(base: &KinematicState, east_m: f64, north_m: f64) -> (f64, f64) {
        let lat = base.latitude + (north_m / geo::EARTH_RADIUS_M).to_degrees();
        let lng = base.longitude
            + (east_m / (geo::EARTH_RADIUS_M * base.latitude.to_radians().cos())).to_degrees();
        (lat, lng)
    }

    #[test]
    fn test_matched_velocity_no_ttc() {
        // Same coordinates, same speed and heading: relative speed 0.
        let a = state("a", 12.9716, 77.5946, 60.0, 0.0);
        let b = state("b", 12.9716, 77.5946, 60.0, 0.0);

        let record = pairwise_risk(&a, &b);
        assert_eq!(record.relative_speed_kmh, 0.0);
        assert_eq!(record.ttc_seconds, None);
        assert_eq!(record.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_head_on_scenario() {
        // A eastbound at 60, B ~1 km due east of A westbound at 60:
        // closing speed 120 km/h (33.3 m/s), TTC ~ 30 s => LOW at this range.
        let a = state("a", 12.9716, 77.5946, 60.0, 90.0);
        let b = state("b", 12.9716, 77.6036, 60.0, 270.0);

        let record = pairwise_risk(&a, &b);
        assert_relative_eq!(record.relative_speed_kmh, 120.0, max_relative = 1e-3);
        let ttc = record.ttc_seconds.unwrap();
        assert!((28.0..32.0).contains(&ttc), "ttc = {ttc}");
        assert_eq!(record.risk_level, RiskLevel::Low);
        assert!(!record.collision_course);
    }

    #[test]
    fn test_head_on_close_range_goes_high() {
        // Same head-on geometry closed to ~80 m: TTC ~ 2.4 s => HIGH.
        let a = state("a", 12.9716, 77.5946, 60.0, 90.0);
        let (lat, lng) = offset(&a, 80.0, 0.0);
        let b = state("b", lat, lng, 60.0, 270.0);

        let record = pairwise_risk(&a, &b);
        assert_eq!(record.risk_level, RiskLevel::High);
        assert!(record.collision_course);
    }

    #[test]
    fn test_rear_end_scenario() {
        // Following at 80 km/h, lead at 30 km/h, same heading, 400 m apart:
        // closing 50 km/h (13.9 m/s), TTC ~ 28.8 s => LOW at that range.
        let follower = state("follower", 12.9716, 77.5946, 80.0, 90.0);
        let (lat, lng) = offset(&follower, 400.0, 0.0);
        let lead = state("lead", lat, lng, 30.0, 90.0);

        let record = pairwise_risk(&follower, &lead);
        assert_relative_eq!(record.relative_speed_kmh, 50.0, max_relative = 1e-3);
        let ttc = record.ttc_seconds.unwrap();
        assert!((28.0..30.0).contains(&ttc), "ttc = {ttc}");
        assert_eq!(record.risk_level, RiskLevel::Low);

        // Same closing speed at 30 m: TTC ~ 2.2 s => HIGH.
        let (lat, lng) = offset(&follower, 30.0, 0.0);
        let lead_close = state("lead", lat, lng, 30.0, 90.0);
        let close = pairwise_risk(&follower, &lead_close);
        let ttc = close.ttc_seconds.unwrap();
        assert!((2.0..2.4).contains(&ttc), "ttc = {ttc}");
        assert_eq!(close.risk_level, RiskLevel::High);
        assert!(close.collision_course);
    }

    #[test]
    fn test_opening_pair_not_closing() {
        // Lead pulling away from a slower follower: no TTC, no risk.
        let follower = state("follower", 12.9716, 77.5946, 30.0, 90.0);
        let (lat, lng) = offset(&follower, 50.0, 0.0);
        let lead = state("lead", lat, lng, 80.0, 90.0);

        let record = pairwise_risk(&follower, &lead);
        assert_eq!(record.relative_speed_kmh, 0.0);
        assert_eq!(record.ttc_seconds, None);
        assert_eq!(record.risk_level, RiskLevel::Low);
        assert!(!record.collision_course);
    }

    #[test]
    fn test_symmetric_content() {
        let a = state("a", 12.9716, 77.5946, 60.0, 90.0);
        let b = state("b", 12.9716, 77.6036, 60.0, 270.0);

        let ab = pairwise_risk(&a, &b);
        let ba = pairwise_risk(&b, &a);

        assert_relative_eq!(ab.distance_m, ba.distance_m);
        assert_relative_eq!(ab.relative_speed_kmh, ba.relative_speed_kmh, epsilon = 1e-6);
        assert_eq!(ab.risk_level, ba.risk_level);
        assert_eq!(ab.collision_course, ba.collision_course);
    }

    #[test]
    fn test_fleet_risks_ranking_and_horizon() {
        // Self stationary at origin. Three peers:
        //  - "far" at 600 m: outside the horizon, excluded entirely
        //  - "close" at 50 m closing at 80 km/h: HIGH
        //  - "mid" at 200 m closing at 180 km/h: TTC 4 s => MEDIUM
        let me = state("me", 12.9716, 77.5946, 0.0, 0.0);

        let (lat, lng) = offset(&me, 600.0, 0.0);
        let far = state("far", lat, lng, 200.0, 270.0);

        let (lat, lng) = offset(&me, 50.0, 0.0);
        let close = state("close", lat, lng, 80.0, 270.0);

        let (lat, lng) = offset(&me, 0.0, 200.0);
        let mid = state("mid", lat, lng, 180.0, 180.0);

        let mut peers = HashMap::new();
        for peer in [far, close, mid] {
            peers.insert(peer.agent_id.clone(), peer);
        }
        // The self id must be excluded if present.
        peers.insert(me.agent_id.clone(), me.clone());

        let risks = fleet_risks(&me, &peers);
        assert_eq!(risks.len(), 2);

        assert_eq!(risks[0].peer_id, AgentId::from_key("close"));
        assert_eq!(risks[0].risk_level, RiskLevel::High);
        assert_eq!(risks[1].peer_id, AgentId::from_key("mid"));
        assert_eq!(risks[1].risk_level, RiskLevel::Medium);
        let ttc = risks[1].ttc_seconds.unwrap();
        assert!((3.9..4.1).contains(&ttc), "ttc = {ttc}");
    }

    #[test]
    fn test_fleet_risks_distance_orders_within_level() {
        let me = state("me", 12.9716, 77.5946, 0.0, 0.0);

        // Two LOW peers (not closing) at different ranges.
        let (lat, lng) = offset(&me, 300.0, 0.0);
        let far_low = state("far-low", lat, lng, 0.0, 0.0);
        let (lat, lng) = offset(&me, 100.0, 0.0);
        let near_low = state("near-low", lat, lng, 0.0, 0.0);

        let mut peers = HashMap::new();
        for peer in [far_low, near_low] {
            peers.insert(peer.agent_id.clone(), peer);
        }

        let risks = fleet_risks(&me, &peers);
        assert_eq!(risks.len(), 2);
        assert_eq!(risks[0].peer_id, AgentId::from_key("near-low"));
        assert_eq!(risks[1].peer_id, AgentId::from_key("far-low"));
    }

    #[test]
    fn test_fleet_risks_invalid_self() {
        let mut me = state("me", 12.9716, 77.5946, 0.0, 0.0);
        me.latitude = f64::NAN;

        let peer = state("peer", 12.9716, 77.5950, 0.0, 0.0);
        let mut peers = HashMap::new();
        peers.insert(peer.agent_id.clone(), peer);

        assert!(fleet_risks(&me, &peers).is_empty());
    }

    #[test]
    fn test_nearest_peer_unbounded_range() {
        // Only peer is 600 m out, beyond the risk horizon but still the
        // nearest peer, because this query has no range bound.
        let me = state("me", 12.9716, 77.5946, 0.0, 0.0);
        let (lat, lng) = offset(&me, 600.0, 0.0);
        let far = state("far", lat, lng, 0.0, 0.0);

        let mut peers = HashMap::new();
        peers.insert(far.agent_id.clone(), far);

        let nearest = nearest_peer(&me, &peers).unwrap();
        assert_eq!(nearest.peer_id, AgentId::from_key("far"));
        assert!((550.0..650.0).contains(&nearest.distance_m));

        assert!(fleet_risks(&me, &peers).is_empty(), "but outside the horizon");
    }

    #[test]
    fn test_nearest_peer_empty_or_invalid() {
        let me = state("me", 12.9716, 77.5946, 0.0, 0.0);
        assert!(nearest_peer(&me, &HashMap::new()).is_none());

        let mut invalid = me.clone();
        invalid.longitude = f64::NAN;
        let peer = state("peer", 12.9716, 77.5950, 0.0, 0.0);
        let mut peers = HashMap::new();
        peers.insert(peer.agent_id.clone(), peer);
        assert!(nearest_peer(&invalid, &peers).is_none());
    }
}
