//! Unit test harness for mixing-extruder.
//!
//! This module organizes configuration tests run through the public API.

mod config_parsing;
mod config_validation;
