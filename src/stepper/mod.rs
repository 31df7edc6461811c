//! Step emission for the mixing extruder.
//!
//! Distributes each block's logical steps across the channel steppers using
//! the runner, with per-step timing from the block's motion profile.

mod driver;

pub use driver::MixingStepper;
