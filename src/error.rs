//! Error types for the ENC28J60 driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Startup, self-test and configuration failures
//! - [`BufferError`]: Packet buffer layout and framing issues
//! - [`IoError`]: Runtime transport, TX/RX and PHY failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most driver methods.
//!
//! Per-frame anomalies seen while polling (empty or oversized frames) are
//! logged and dropped by the receive path rather than reported here, so a
//! polling loop keeps running.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Startup and configuration errors
///
/// These errors occur while bringing the chip up. A failed bring-up step
/// leaves the driver in [`State::Failed`](crate::State::Failed). Requests
/// rejected before touching the chip (`NotInitialized`, or `InvalidConfig`
/// from [`ethernet_setup`](crate::Enc28j60::ethernet_setup)) keep the
/// current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Invalid configuration parameter
    InvalidConfig,
    /// ESTAT.CLKRDY never settled within the attempt bound
    ClockTimeout,
    /// EREVID holds a value outside the known silicon revisions
    UnknownRevision,
    /// Manual buffer memory test read back a mismatching byte
    SelfTestFailed,
    /// Operation requires a completed basic setup
    NotInitialized,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::ClockTimeout => "oscillator did not become ready",
            ConfigError::UnknownRevision => "unknown silicon revision",
            ConfigError::SelfTestFailed => "buffer memory self-test failed",
            ConfigError::NotInitialized => "basic setup not completed",
        }
    }
}

// =============================================================================
// Buffer Errors
// =============================================================================

/// Packet buffer and framing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// RX end was never configured, so no TX region exists either
    RegionNotConfigured,
    /// Frame does not fit the transmit region
    FrameTooLarge,
    /// Invalid frame length (zero or inconsistent)
    InvalidLength,
    /// Receive header points outside the RX ring
    CorruptHeader,
}

impl core::fmt::Display for BufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BufferError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            BufferError::RegionNotConfigured => "buffer regions not configured",
            BufferError::FrameTooLarge => "frame too large for transmit region",
            BufferError::InvalidLength => "invalid frame length",
            BufferError::CorruptHeader => "corrupt receive header",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime transport, TX/RX and PHY errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// SPI bus or chip-select pin failure
    Transport,
    /// Invalid state for operation (e.g., not running)
    InvalidState,
    /// No received frame pending
    NoFrame,
    /// MII busy flag did not clear within the poll bound
    PhyTimeout,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Transport => "SPI transport error",
            IoError::InvalidState => "invalid state for operation",
            IoError::NoFrame => "no frame pending",
            IoError::PhyTimeout => "MII busy-wait timed out",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::ClockTimeout)) => { /* ... */ }
///     Err(Error::Buffer(BufferError::FrameTooLarge)) => { /* ... */ }
///     Err(Error::Io(IoError::PhyTimeout)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Buffer error
    Buffer(BufferError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Buffer(e) => write!(f, "buffer: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<BufferError> for Error {
    fn from(e: BufferError) -> Self {
        Error::Buffer(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for buffer operations
pub type BufferResult<T> = core::result::Result<T, BufferError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
