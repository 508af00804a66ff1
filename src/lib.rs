//! ENC28J60 Ethernet Driver
//!
//! A `no_std`, `no_alloc` Rust driver for the Microchip ENC28J60, a stand-alone
//! 10BASE-T Ethernet controller attached over SPI.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Driver Layer** ([`driver`]): The [`Enc28j60`] type with its register
//!    facade, bank manager, buffer layout, RX/TX pipelines and startup sequence
//! 2. **HAL Layer** ([`hal`]): The SPI [`Transport`] seam and PHY access over MII
//! 3. **Integrations** (`integration`, `sync`): smoltcp device and an ISR-safe
//!    shared wrapper
//!
//! ## Chip Model
//!
//! - Control registers are split over four banks selected through ECON1;
//!   EIE, EIR, ESTAT, ECON2 and ECON1 are visible from every bank
//! - 8 KB of buffer RAM holds a circular receive ring starting at address 0
//!   and a linear transmit region placed after it
//! - PHY registers are reached indirectly through the MII management interface
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting and logging
//! - `smoltcp`: Enable smoltcp network stack integration
//! - `critical-section`: Enable ISR-safe [`SharedEnc28j60`] wrapper
//!
//! # Example
//!
//! ```ignore
//! use ph_enc28j60::{Enc28j60, Enc28j60Config, SpiTransport};
//!
//! let transport = SpiTransport::new(spi, cs);
//! let mut eth = Enc28j60::new(transport);
//!
//! let config = Enc28j60Config::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x12, 0x34, 0x56])
//!     .with_rx_end(0x0FFF);
//!
//! eth.init(config)?;
//!
//! let mut buf = [0u8; 1518];
//! if let Some(frame) = eth.poll_receive(&mut buf)? {
//!     eth.transmit(&buf[..frame.copied])?;
//! }
//! ```

#![no_std]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
// Clippy lint levels live here; Cargo.toml mirrors them for workspace tooling.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::struct_excessive_bools,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod error;
pub mod hal;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "smoltcp")]
#[cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
pub mod integration;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{Enc28j60Config, State};
pub use driver::enc28j60::Enc28j60;
pub use driver::rx::{FrameHeader, FrameSink, ReceivedFrame, RxStatus, SegmentedSink, SliceSink};
pub use driver::tx::{MAX_TX_FRAME, TransmitOutcome, TxStatusVector};
pub use error::{
    BufferError, BufferResult, ConfigError, ConfigResult, Error, IoError, IoResult, Result,
};
pub use hal::mii::{Led, LedMode};
pub use hal::transport::{SpiTransport, Transport};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::SharedEnc28j60;

/// Control and PHY register descriptors for direct access.
///
/// The driver's register facade ([`Enc28j60::read_reg`] and friends) takes
/// these descriptors and handles bank selection itself. Writing registers the
/// driver also manages can desynchronize its session; prefer the higher level
/// operations.
pub mod registers {
    pub use crate::internal::register::*;

    /// PHY register addresses and bit fields, for use with
    /// [`Enc28j60::read_phy`](crate::Enc28j60::read_phy).
    pub mod phy {
        pub use crate::internal::phy_regs::*;
    }
}

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types and integration points.
pub mod constants {
    pub use crate::internal::constants::{
        // Frame sizes
        CRC_SIZE,
        // Defaults
        DEFAULT_MAC_ADDR,
        DEFAULT_RX_END,
        ETH_HEADER_SIZE,
        // Silicon
        KNOWN_REVISIONS,
        MAC_ADDR_LEN,
        MAX_FRAME_SIZE,
        MTU,
        // Buffer memory
        RAM_END,
        RAM_SIZE,
        RX_HEADER_SIZE,
        RX_START,
        TX_STATUS_SIZE,
    };
}
