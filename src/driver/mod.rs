//! Core driver components for the ENC28J60.
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`enc28j60`] - The driver type and its device session
//! - [`access`] - Register facade and bank manager
//! - [`buffer`] - RX/TX buffer layout
//! - [`rx`] - Receive pipeline and frame sinks
//! - [`tx`] - Transmit pipeline
//! - [`startup`] - Clock handshake, revision check, self-test, Ethernet setup
//!
//! # Example
//!
//! ```ignore
//! use ph_enc28j60::driver::{Enc28j60, Enc28j60Config};
//!
//! let config = Enc28j60Config::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
//! ```

// Submodules
pub mod access;
pub mod buffer;
pub mod config;
pub mod enc28j60;
pub mod rx;
pub mod startup;
pub mod tx;

// Re-exports for convenience
pub use buffer::round_up_even;
pub use config::{Enc28j60Config, State};
pub use enc28j60::Enc28j60;
pub use rx::{FrameHeader, FrameSink, ReceivedFrame, RxStatus, SegmentedSink, SliceSink};
pub use tx::{MAX_TX_FRAME, TransmitOutcome, TxStatusVector};
