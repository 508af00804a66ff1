//! Hardware Abstraction Layer
//!
//! - [`transport`]: SPI byte exchange with chip-select bracketing
//! - [`mii`]: indirect access to the embedded PHY
//!
//! Board bring-up (SPI clock, pin muxing) stays with the caller; the
//! transport receives an already configured `embedded-hal` bus.

pub mod mii;
pub mod transport;

pub use mii::{Led, LedMode};
pub use transport::{SpiTransport, Transport};
