//! Scenario runner: drives the full pipeline against ground-truth physics.
//!
//! Every run is a closed loop over the production code path: ground truth
//! produces noisy fixes, the motion estimator derives kinematic states,
//! states round-trip through the wire feed into the fleet store, the risk
//! analyzer ranks the snapshot, and the alert escalator emits events. The
//! oracle then checks alert activity against what physically happened.

use crate::export::{SimExport, SimFrame, VehicleFrame};
use crate::scenarios::ScenarioId;
use crate::world::{SimConfig, SimVehicle};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::{debug, info};
use v2v_core::alert::{AlertEscalator, EscalatorConfig, Severity};
use v2v_core::fleet::FleetStore;
use v2v_core::motion::AgentHistory;
use v2v_core::{fleet_risks, geo};
use v2v_env::{decode_feed, encode_feed, AgentId, Clock, ManualClock, PeerStateRecord};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether the oracle's assertions held
    pub passed: bool,

    /// Total physics ticks executed
    pub total_ticks: u64,

    /// Final simulation time in seconds
    pub final_time_secs: f64,

    /// MEDIUM alerts emitted for the ego vehicle
    pub medium_alerts: usize,

    /// HIGH alerts emitted for the ego vehicle
    pub high_alerts: usize,

    /// Minimum true separation observed, meters
    pub min_distance_m: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

/// Runs driving scenarios deterministically.
pub struct ScenarioRunner {
    config: SimConfig,

    /// Overrides the scenario's recommended duration when set
    duration_secs: Option<f64>,
}

impl ScenarioRunner {
    pub fn new(seed: u64) -> Self {
        Self {
            config: SimConfig {
                seed,
                ..SimConfig::default()
            },
            duration_secs: None,
        }
    }

    /// Sets the run duration in seconds.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    /// Sets the GPS noise standard deviation in meters.
    pub fn with_noise(mut self, std_m: f64) -> Self {
        self.config.fix_noise_std_m = std_m;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.run_inner(scenario, None)
    }

    /// Runs a scenario while recording frames for visualization.
    pub fn run_with_export(&self, scenario: ScenarioId, export: &mut SimExport) -> ScenarioResult {
        self.run_inner(scenario, Some(export))
    }

    fn run_inner(&self, scenario: ScenarioId, mut export: Option<&mut SimExport>) -> ScenarioResult {
        info!(
            "Starting scenario: {} (seed={})",
            scenario.name(),
            self.config.seed
        );

        let duration = self
            .duration_secs
            .unwrap_or_else(|| scenario.recommended_duration());
        let dt_s = 1.0 / self.config.tick_rate_hz as f64;
        let tick_ms = (1000.0 / self.config.tick_rate_hz as f64) as i64;
        let total_ticks = (duration * self.config.tick_rate_hz as f64) as u64;
        let ticks_per_fix =
            (self.config.fix_interval_secs * self.config.tick_rate_hz as f64).max(1.0) as u64;

        // Physics noise draws from a stream split off the master seed so
        // scenario setup changes don't shift it.
        let mut noise_rng =
            ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_mul(0x9e3779b97f4a7c15));

        let mut vehicles = scenario.spawn();
        let clock = ManualClock::new(0);
        let store = FleetStore::new();
        let mut escalator = AlertEscalator::new(EscalatorConfig::default());
        let mut histories: Vec<AgentHistory> =
            vehicles.iter().map(|_| AgentHistory::new()).collect();

        let mut medium_alerts = 0usize;
        let mut high_alerts = 0usize;
        let mut min_distance_m = f64::INFINITY;
        // Fix phases are staggered so vehicles never report in lockstep.
        let fix_stagger = ticks_per_fix / vehicles.len() as u64;

        for tick in 0..total_ticks {
            let now_ms = clock.now_ms();
            let time_s = tick as f64 * dt_s;

            // Scripted events.
            if scenario == ScenarioId::RearEnd && time_s >= 20.0 && !vehicles[1].braking {
                info!(time_s, "lead vehicle brakes hard");
                vehicles[1].braking = true;
            }

            // Fix phase: each vehicle samples GPS on its own cadence and
            // broadcasts its estimator-derived state on the fleet feed.
            let mut broadcast: HashMap<AgentId, PeerStateRecord> = HashMap::new();
            for (i, vehicle) in vehicles.iter().enumerate() {
                if tick % ticks_per_fix != (i as u64 * fix_stagger) % ticks_per_fix {
                    continue;
                }
                let fix = vehicle.noisy_fix(now_ms, &mut noise_rng, self.config.fix_noise_std_m);
                let state = histories[i].apply_fix(&vehicle.id, fix);
                broadcast.insert(vehicle.id.clone(), state.to_record());
            }

            if !broadcast.is_empty() {
                // Round-trip through the wire format, exactly as peers
                // would receive it.
                let json = encode_feed(&broadcast).expect("feed encodes");
                for (id, record) in decode_feed(&json).expect("feed decodes") {
                    store.ingest(id, &record, now_ms);
                }
            }

            // Scoring phase, rate-limited by the store's throttle.
            if !store.throttle(now_ms) {
                if let Some(ego_state) = histories[0].last_state() {
                    let snapshot = store.snapshot(now_ms);
                    let risks = fleet_risks(ego_state, &snapshot);
                    if let Some(event) = escalator.evaluate(risks.first(), now_ms) {
                        info!(
                            severity = %event.severity,
                            ttc = ?event.ttc_seconds,
                            time_s,
                            "alert emitted"
                        );
                        match event.severity {
                            Severity::Medium => medium_alerts += 1,
                            Severity::High => high_alerts += 1,
                        }
                    }
                }
            }

            // Ground-truth bookkeeping.
            let true_distance = geo::distance_meters(
                vehicles[0].latitude,
                vehicles[0].longitude,
                vehicles[1].latitude,
                vehicles[1].longitude,
            );
            min_distance_m = min_distance_m.min(true_distance);

            if let Some(export) = export.as_deref_mut() {
                if tick % 5 == 0 {
                    export.add_frame(SimFrame {
                        time_sec: time_s,
                        vehicles: vehicles.iter().map(VehicleFrame::from_vehicle).collect(),
                        true_distance_m: true_distance,
                        medium_alerts,
                        high_alerts,
                    });
                }
            }

            if tick % (self.config.tick_rate_hz as u64 * 5) == 0 {
                debug!(
                    "  t={:.1}s | distance={:.1}m | alerts={}/{}",
                    time_s, true_distance, medium_alerts, high_alerts
                );
            }

            for vehicle in &mut vehicles {
                vehicle.advance(dt_s);
            }
            clock.advance_ms(tick_ms);
        }

        let failure_reason = self.check_oracle(scenario, medium_alerts, high_alerts, min_distance_m);
        let passed = failure_reason.is_none();

        if let Some(export) = export {
            export.finalize(passed);
        }

        ScenarioResult {
            scenario,
            seed: self.config.seed,
            passed,
            total_ticks,
            final_time_secs: total_ticks as f64 * dt_s,
            medium_alerts,
            high_alerts,
            min_distance_m,
            failure_reason,
        }
    }

    /// Per-scenario pass criteria against ground truth.
    fn check_oracle(
        &self,
        scenario: ScenarioId,
        medium_alerts: usize,
        high_alerts: usize,
        min_distance_m: f64,
    ) -> Option<String> {
        match scenario {
            ScenarioId::HeadOn if high_alerts == 0 => {
                Some("no HIGH alert during head-on closure".to_string())
            }
            ScenarioId::RearEnd if high_alerts == 0 => {
                Some("no HIGH alert while closing on braking leader".to_string())
            }
            ScenarioId::Intersection if medium_alerts + high_alerts == 0 => {
                Some("no alert before intersection conflict".to_string())
            }
            // Alerts are permitted on a close pass; the oracle only demands
            // that true separation stayed safe.
            ScenarioId::SafePass if min_distance_m <= 10.0 => Some(format!(
                "vehicles came within {:.1}m on a supposedly safe pass",
                min_distance_m
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(scenario: ScenarioId, seed: u64) -> ScenarioResult {
        ScenarioRunner::new(seed).run(scenario)
    }

    #[test]
    fn test_head_on_raises_high_alert() {
        let result = run(ScenarioId::HeadOn, 42);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.high_alerts >= 1);
    }

    #[test]
    fn test_rear_end_raises_high_alert() {
        let result = run(ScenarioId::RearEnd, 42);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.high_alerts >= 1);
    }

    #[test]
    fn test_intersection_raises_alert() {
        let result = run(ScenarioId::Intersection, 42);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.medium_alerts + result.high_alerts >= 1);
    }

    #[test]
    fn test_safe_pass_keeps_separation() {
        let result = run(ScenarioId::SafePass, 42);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.min_distance_m > 10.0);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = run(ScenarioId::HeadOn, 1234);
        let b = run(ScenarioId::HeadOn, 1234);

        assert_eq!(a.medium_alerts, b.medium_alerts);
        assert_eq!(a.high_alerts, b.high_alerts);
        assert_eq!(a.min_distance_m.to_bits(), b.min_distance_m.to_bits());
        assert_eq!(a.total_ticks, b.total_ticks);
    }

    #[test]
    fn test_scenarios_pass_across_seeds() {
        for seed in [7, 99, 4096] {
            for scenario in ScenarioId::all() {
                let result = ScenarioRunner::new(seed).run(scenario);
                assert!(
                    result.passed,
                    "{} seed={} failed: {:?}",
                    scenario, seed, result.failure_reason
                );
            }
        }
    }

    #[test]
    fn test_alert_rate_bounded_by_cooldown() {
        // A 35s run can emit at most one alert per 2s cooldown window.
        let result = run(ScenarioId::HeadOn, 42);
        assert!(result.medium_alerts + result.high_alerts <= 18);
    }
}
