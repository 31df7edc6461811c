//! Mixer module for mixing-extruder.
//!
//! Holds the virtual tool palette, the lock coordinator, the Z gradient and the
//! per-step channel runner consumed by the step interrupt.

mod engine;
mod gradient;
mod locks;
mod proportions;
mod runner;
mod shared;

pub use engine::MixingEngine;
pub use gradient::{GradientSettings, GradientState};
pub use locks::{AxisLocks, LockCoordinator, LockMask, PinLocks};
pub use proportions::MixRow;
pub use runner::RunnerState;
pub use shared::SharedMixer;

/// Full-scale value of one normalized channel weight.
pub const COLOR_A_MASK: u8 = 0x80;

/// Accumulator bits kept after a channel steps.
pub const COLOR_MASK: u8 = 0x7F;

/// Fewest physical channels a mixing extruder can have.
pub const MIN_CHANNELS: usize = 2;

/// Most physical channels supported.
pub const MAX_CHANNELS: usize = 6;

/// Most user-selectable virtual tools.
pub const MAX_VIRTUAL_TOOLS: usize = 16;

/// Palette rows, including the retract sync tool.
pub const MAX_TOOL_SLOTS: usize = MAX_VIRTUAL_TOOLS + 1;

/// Most redundant actuators the lock coordinator drives.
pub const MAX_LOCKS: usize = 4;
