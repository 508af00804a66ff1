//! Synchronization support
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`] for ISR-safe
//!   interior mutability
//! - **Shared Wrapper** (`shared`): [`SharedEnc28j60`], a critical-section
//!   protected driver slot suitable for a `static`
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables this module
//!
//! # Example
//!
//! ```ignore
//! use ph_enc28j60::sync::SharedEnc28j60;
//!
//! static ETH: SharedEnc28j60<MyTransport> = SharedEnc28j60::new();
//!
//! fn main() {
//!     ETH.install(Enc28j60::new(transport));
//!     ETH.with(|eth| eth.init(Enc28j60Config::new()));
//! }
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::SharedEnc28j60;
