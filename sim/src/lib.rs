//! `sim` — Arena simulator: opponent trajectories, chassis yaw, sweep
//! synthesis, replay logs and closed-loop evaluation of the targeting core.

pub mod chassis;
pub mod opponent;
pub mod replay;
pub mod runner;
pub mod scenarios;
pub mod sweep_sim;

pub use chassis::{Chassis, YawProfile};
pub use opponent::{MotionSpec, Opponent};
pub use replay::{load_replay, save_replay, ReplayLog};
pub use runner::evaluate;
pub use scenarios::{Scenario, ScenarioKind};
pub use sweep_sim::{SweepFrame, SweepSimulator};
