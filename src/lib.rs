//! # mixing-extruder
//!
//! Real-time mixing core for multi-filament extruders, with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Virtual tool palette**: fixed-point per-channel proportions, normalized so
//!   the largest channel is full scale
//! - **Lock coordination**: redundant actuators are locked whenever the selected
//!   tool gives their channel zero weight
//! - **Z gradient**: blend between two tools across a height window
//! - **Step distribution**: each block carries its own row; a multi-channel
//!   Bresenham runner picks the channel for every logical step
//! - **Configuration-driven**: palette shape, locks and drive limits from TOML
//! - **no_std compatible**: no allocation, statically sized storage throughout
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mixing_extruder::{BlockQueue, LockMask, MixerCapabilities, MixingEngine};
//!
//! let config = mixing_extruder::load_config("mixer.toml")?;
//! let caps = MixerCapabilities::from_config(&config)?;
//! let mut engine = MixingEngine::new(caps, LockMask::new())?;
//!
//! // Stage a 1:3 mix and store it in tool 2
//! mixing_extruder::gcode::process_line(&mut engine, "M165 A1 B3")?;
//! mixing_extruder::gcode::process_line(&mut engine, "T2")?;
//!
//! let mut queue: BlockQueue<8> = BlockQueue::new();
//! let (mut producer, mut consumer) = queue.split();
//! mixing_extruder::plan_move(&mut engine, &mut producer, 400, &0.2f32)?;
//!
//! // in the step interrupt
//! while stepper.poll(&mut consumer)? {}
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets
//! - `log`: Enables `log` facade logging for hosted builds

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod gcode;
pub mod mixer;
pub mod motion;
pub mod planner;
pub mod stepper;

// Re-exports for ergonomic API
pub use config::{validate_config, LockBinding, MixerCapabilities, SystemConfig};
pub use error::{Error, Result};
pub use mixer::{
    AxisLocks, GradientSettings, LockMask, MixRow, MixingEngine, PinLocks, RunnerState,
    SharedMixer, COLOR_A_MASK, COLOR_MASK,
};
pub use motion::{Direction, MotionPhase, MotionProfile};
pub use planner::{plan_move, BlockQueue, MixBlock, ZPosition};
pub use stepper::MixingStepper;

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Millimeters, MillimetersPerSec, MillimetersPerSecSquared, Steps};
