//! Motion module for mixing-extruder.
//!
//! Provides the trapezoidal profile of an extruder block and the per-step
//! interval walk the stepper consumes.

mod executor;
mod profile;

pub use executor::MotionExecutor;
pub use profile::{Direction, MotionPhase, MotionProfile};
