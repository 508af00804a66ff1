//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`constants`]: Opcodes, memory map, timing bounds and defaults
//! - [`register`]: Control register descriptors and bit fields
//! - [`phy_regs`]: PHY register addresses and bit fields
//!
//! # Stability
//!
//! **WARNING:** This module is `pub(crate)` only. Items that advanced users
//! may need are re-exported through [`crate::registers`].

pub(crate) mod constants;
pub(crate) mod phy_regs;
pub(crate) mod register;
