//! Error types for mixing-extruder library.
//!
//! Provides unified error handling across configuration, mixing, command handling,
//! and step execution.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all mixing-extruder operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Mixing engine error
    Mix(MixError),
    /// Command (G-code) handling error
    Command(CommandError),
    /// Step timing or execution error
    Motion(MotionError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Channel count outside the supported range
    InvalidChannelCount(u8),
    /// Virtual tool count outside the supported range
    InvalidToolCount(u8),
    /// More lock bindings than the coordinator can drive
    TooManyLocks(usize),
    /// Lock binding refers to a channel the mixer does not have
    LockChannelOutOfRange {
        /// Actuator name from configuration
        actuator: heapless::String<32>,
        /// Referenced channel
        channel: u8,
    },
    /// Gradient alias refers to a tool the palette does not have
    InvalidGradientAlias(u8),
    /// Invalid steps per millimeter (must be > 0)
    InvalidStepsPerMm(f32),
    /// Invalid max velocity (must be > 0)
    InvalidMaxVelocity(f32),
    /// Invalid max acceleration (must be > 0)
    InvalidMaxAcceleration(f32),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Mixing engine errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MixError {
    /// Every weight is zero, so no proportion can be derived
    DegenerateMix,
    /// Virtual tool index outside the palette
    ToolOutOfRange {
        /// Requested tool
        tool: u8,
        /// Number of addressable tools
        count: u8,
    },
    /// Channel index outside the configured channels
    ChannelOutOfRange {
        /// Requested channel
        channel: u8,
        /// Number of configured channels
        count: u8,
    },
    /// Weight is NaN or infinite
    InvalidWeight(f32),
    /// Operation needs the gradient capability, which is not configured
    GradientUnavailable,
    /// Operation needs the retract sync tool, which is not configured
    RetractSyncUnavailable,
    /// No engine has been installed in the shared slot
    EngineUnavailable,
}

/// Command parsing and dispatch errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Line holds no command word
    Empty,
    /// Command is not a mixing command
    Unsupported(heapless::String<16>),
    /// A word could not be parsed
    InvalidWord(heapless::String<16>),
    /// A required parameter is missing
    MissingParameter(char),
}

/// Step timing and execution errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Pin operation failed
    PinError,
    /// Block queue is full
    QueueFull,
    /// No block is loaded
    NoActiveBlock,
    /// Block color has no active channel
    EmptyBlock,
    /// Stepper was built with a different number of channels than the block
    ChannelMismatch {
        /// Channels in the block
        block: u8,
        /// Channels driven by the stepper
        stepper: u8,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Mix(e) => write!(f, "Mixer error: {}", e),
            Error::Command(e) => write!(f, "Command error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidChannelCount(v) => {
                write!(f, "Invalid channel count: {}. Must be 2-6", v)
            }
            ConfigError::InvalidToolCount(v) => {
                write!(f, "Invalid virtual tool count: {}. Must be 1-16", v)
            }
            ConfigError::TooManyLocks(v) => write!(f, "Too many lock bindings: {} (max 4)", v),
            ConfigError::LockChannelOutOfRange { actuator, channel } => {
                write!(f, "Lock '{}' references unknown channel {}", actuator, channel)
            }
            ConfigError::InvalidGradientAlias(v) => {
                write!(f, "Gradient alias {} is not a configured virtual tool", v)
            }
            ConfigError::InvalidStepsPerMm(v) => write!(f, "Invalid steps/mm: {}. Must be > 0", v),
            ConfigError::InvalidMaxVelocity(v) => write!(f, "Invalid max velocity: {}. Must be > 0", v),
            ConfigError::InvalidMaxAcceleration(v) => {
                write!(f, "Invalid max acceleration: {}. Must be > 0", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixError::DegenerateMix => write!(f, "All mix weights are zero"),
            MixError::ToolOutOfRange { tool, count } => {
                write!(f, "Virtual tool {} out of range (have {})", tool, count)
            }
            MixError::ChannelOutOfRange { channel, count } => {
                write!(f, "Channel {} out of range (have {})", channel, count)
            }
            MixError::InvalidWeight(v) => write!(f, "Invalid mix weight: {}", v),
            MixError::GradientUnavailable => write!(f, "Gradient mixing is not configured"),
            MixError::RetractSyncUnavailable => write!(f, "Retract sync tool is not configured"),
            MixError::EngineUnavailable => write!(f, "No mixing engine installed"),
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "Empty command"),
            CommandError::Unsupported(cmd) => write!(f, "Unsupported command '{}'", cmd),
            CommandError::InvalidWord(word) => write!(f, "Invalid word '{}'", word),
            CommandError::MissingParameter(c) => write!(f, "Missing parameter '{}'", c),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::PinError => write!(f, "GPIO pin operation failed"),
            MotionError::QueueFull => write!(f, "Block queue is full"),
            MotionError::NoActiveBlock => write!(f, "No block loaded"),
            MotionError::EmptyBlock => write!(f, "Block has no active channel"),
            MotionError::ChannelMismatch { block, stepper } => {
                write!(f, "Block has {} channels but stepper drives {}", block, stepper)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MixError> for Error {
    fn from(e: MixError) -> Self {
        Error::Mix(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Error::Command(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MixError {}

#[cfg(feature = "std")]
impl std::error::Error for CommandError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "defmt")]
impl defmt::Format for MixError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            MixError::DegenerateMix => defmt::write!(f, "DegenerateMix"),
            MixError::ToolOutOfRange { tool, count } => {
                defmt::write!(f, "ToolOutOfRange({=u8}/{=u8})", tool, count)
            }
            MixError::ChannelOutOfRange { channel, count } => {
                defmt::write!(f, "ChannelOutOfRange({=u8}/{=u8})", channel, count)
            }
            MixError::InvalidWeight(v) => defmt::write!(f, "InvalidWeight({=f32})", v),
            MixError::GradientUnavailable => defmt::write!(f, "GradientUnavailable"),
            MixError::RetractSyncUnavailable => defmt::write!(f, "RetractSyncUnavailable"),
            MixError::EngineUnavailable => defmt::write!(f, "EngineUnavailable"),
        }
    }
}
