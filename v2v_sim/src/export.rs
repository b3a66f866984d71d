//! JSON export of simulation runs for offline inspection.

use crate::world::SimVehicle;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One vehicle's ground-truth state in a frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleFrame {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub heading_deg: f64,
    pub braking: bool,
}

impl VehicleFrame {
    pub fn from_vehicle(vehicle: &SimVehicle) -> Self {
        Self {
            id: vehicle.id.as_str().to_string(),
            latitude: vehicle.latitude,
            longitude: vehicle.longitude,
            speed_kmh: vehicle.speed_kmh,
            heading_deg: vehicle.heading_deg,
            braking: vehicle.braking,
        }
    }
}

/// A single frame of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Simulation time in seconds
    pub time_sec: f64,

    /// Ground-truth vehicle states
    pub vehicles: Vec<VehicleFrame>,

    /// True separation between ego and peer, meters
    pub true_distance_m: f64,

    /// Cumulative alert counts up to this frame
    pub medium_alerts: usize,
    pub high_alerts: usize,
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Duration covered by the frames, seconds
    pub duration_sec: f64,

    /// All recorded frames
    pub frames: Vec<SimFrame>,

    /// Oracle verdict
    pub passed: bool,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Records the oracle verdict.
    pub fn finalize(&mut self, passed: bool) {
        self.passed = passed;
    }

    /// Writes the export as pretty-printed JSON.
    pub fn write_to_file(&self, path: &str) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
