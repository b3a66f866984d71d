//! Driving scenarios for the collision-risk pipeline.
//!
//! Each scenario spawns two vehicles on fixed courses around a common urban
//! reference point and defines the oracle the runner checks at the end.

use crate::world::SimVehicle;
use v2v_env::AgentId;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Two vehicles approach head-on at 60 km/h each on the same parallel
    HeadOn,

    /// Fast vehicle closes on a slow leader in the same lane; the leader
    /// brakes hard partway through
    RearEnd,

    /// Perpendicular courses converging on the same crossing point
    Intersection,

    /// Opposing vehicles pass with a safe lateral offset
    SafePass,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::HeadOn,
            ScenarioId::RearEnd,
            ScenarioId::Intersection,
            ScenarioId::SafePass,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::HeadOn => "head_on",
            ScenarioId::RearEnd => "rear_end",
            ScenarioId::Intersection => "intersection",
            ScenarioId::SafePass => "safe_pass",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::HeadOn => "60 km/h vs 60 km/h head-on closure, ~1 km apart",
            ScenarioId::RearEnd => "80 km/h closing on 30 km/h leader that brakes at t=20s",
            ScenarioId::Intersection => "Perpendicular 50 km/h courses meeting at a crossing",
            ScenarioId::SafePass => "Opposing 50 km/h passes with ~22 m lateral offset",
        }
    }

    /// Recommended run duration in seconds, long enough for the closure to
    /// resolve with margin.
    pub fn recommended_duration(&self) -> f64 {
        match self {
            ScenarioId::HeadOn => 35.0,
            ScenarioId::RearEnd => 40.0,
            ScenarioId::Intersection => 45.0,
            ScenarioId::SafePass => 40.0,
        }
    }

    /// Spawns the scenario's vehicles. Index 0 is the ego vehicle whose
    /// alert stream the oracle inspects.
    pub fn spawn(&self) -> Vec<SimVehicle> {
        let ego = AgentId::from_key(format!("{}-ego", self.name()));
        let peer = AgentId::from_key(format!("{}-peer", self.name()));

        match self {
            // ~1 km apart along the same parallel, driving at each other.
            ScenarioId::HeadOn => vec![
                SimVehicle::new(ego, 12.9716, 77.5946, 60.0, 90.0),
                SimVehicle::new(peer, 12.9716, 77.6036, 60.0, 270.0),
            ],
            // Same lane, ~430 m gap, 50 km/h closing.
            ScenarioId::RearEnd => vec![
                SimVehicle::new(ego, 12.9716, 77.5946, 80.0, 90.0),
                SimVehicle::new(peer, 12.9716, 77.5986, 30.0, 90.0),
            ],
            // Ego eastbound, peer southbound from the north-east.
            ScenarioId::Intersection => vec![
                SimVehicle::new(ego, 12.9716, 77.5946, 50.0, 90.0),
                SimVehicle::new(peer, 12.9766, 77.5996, 50.0, 180.0),
            ],
            // Opposing courses offset ~22 m in latitude.
            ScenarioId::SafePass => vec![
                SimVehicle::new(ego, 12.9716, 77.5946, 50.0, 90.0),
                SimVehicle::new(peer, 12.9718, 77.6036, 50.0, 270.0),
            ],
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "head_on" | "headon" => Ok(ScenarioId::HeadOn),
            "rear_end" | "rearend" => Ok(ScenarioId::RearEnd),
            "intersection" => Ok(ScenarioId::Intersection),
            "safe_pass" | "safepass" => Ok(ScenarioId::SafePass),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
