//! Deterministic scenario harness for the V2V collision-risk pipeline.
//!
//! All sources of non-determinism are controlled:
//! - **Time**: a [`ManualClock`](v2v_env::ManualClock) advanced in fixed
//!   100 ms ticks; nothing reads the wall clock during a run.
//! - **Physics**: vehicles move on analytic courses defined by the scenario.
//! - **Noise**: GPS noise is drawn from a ChaCha8 stream derived from a
//!   single 64-bit seed, so a seed fully reproduces a run.
//!
//! Each run drives the full production pipeline end to end: noisy fixes
//! through the motion estimator, wire-encoded peer states through the fleet
//! store, risk ranking, and the alert escalator. A per-scenario oracle
//! compares alert activity against ground truth.
//!
//! ```ignore
//! use v2v_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let runner = ScenarioRunner::new(42).with_duration(35.0);
//! let result = runner.run(ScenarioId::HeadOn);
//! assert!(result.passed);
//! ```

mod export;
mod runner;
pub mod scenarios;
mod world;

pub use export::{ExportError, SimExport, SimFrame, VehicleFrame};
pub use runner::{ScenarioResult, ScenarioRunner};
pub use world::{SimConfig, SimVehicle};
