//! V2V Collision-Risk Core
//!
//! Estimates collision risk between a tracked agent and a fleet of peers
//! from streaming position fixes, and drives a debounced alert escalation:
//!
//! 1. **Geo-Kinematics**: great-circle distance and bearing between fixes
//! 2. **Motion Estimator**: noisy fixes → kinematic state + braking flag
//! 3. **Fleet State Store**: latest peer states, staleness filter, throttle
//! 4. **Risk Analyzer**: pairwise TTC, classification, fleet-wide ranking
//! 5. **Alert Escalator**: ranked risks → at most one alert per cooldown
//!
//! Every elapsed-time comparison takes a caller-supplied `now_ms`, so the
//! whole pipeline is synchronous and deterministically testable. Nothing in
//! this crate is fatal: garbage or absent input yields fewer (or no) risk
//! records, never a fault.

pub mod alert;
pub mod fleet;
pub mod geo;
pub mod motion;
pub mod risk;

// Re-export key types for convenience
pub use alert::{AlertEscalator, AlertEvent, EscalatorConfig, FlashRequest, NotificationSink, Severity};
pub use fleet::FleetStore;
pub use motion::{AgentHistory, Fix, KinematicState};
pub use risk::{fleet_risks, nearest_peer, pairwise_risk, NearestPeer, RiskLevel, RiskRecord};
