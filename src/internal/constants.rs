//! Centralized Constants
//!
//! Single source of truth for the magic numbers used throughout the driver.
//!
//! # Organization
//!
//! - **Wire protocol**: SPI opcodes
//! - **Memory map**: on-chip packet RAM dimensions
//! - **Frame sizes**: Ethernet and hardware framing sizes
//! - **Timing**: iteration bounds for busy-waits
//! - **Defaults**: configuration defaults
//!
//! Register addresses and bit fields live in [`super::register`] and
//! [`super::phy_regs`].

// =============================================================================
// SPI Opcodes
// =============================================================================

/// Read Control Register (`0x00 | address`)
pub const OPCODE_RCR: u8 = 0x00;

/// Write Control Register (`0x40 | address`)
pub const OPCODE_WCR: u8 = 0x40;

/// Bit Field Set (`0x80 | address`), ETH registers only
pub const OPCODE_BFS: u8 = 0x80;

/// Bit Field Clear (`0xA0 | address`), ETH registers only
pub const OPCODE_BFC: u8 = 0xA0;

/// Read Buffer Memory
pub const OPCODE_RBM: u8 = 0x3A;

/// Write Buffer Memory
pub const OPCODE_WBM: u8 = 0x7A;

/// System Reset Command (soft reset)
pub const OPCODE_SRC: u8 = 0xFF;

/// Mask selecting the 5-bit register address from a command byte
pub const ADDRESS_MASK: u8 = 0x1F;

/// Byte clocked out while reading (MOSI content is ignored by the chip)
pub const READ_FILLER: u8 = 0x00;

// =============================================================================
// Memory Map
// =============================================================================

/// Size of the on-chip packet buffer RAM in bytes
pub const RAM_SIZE: usize = 0x2000;

/// Last valid buffer memory address
pub const RAM_END: u16 = (RAM_SIZE - 1) as u16;

/// RX region start; errata item 5 requires it to stay at zero
pub const RX_START: u16 = 0x0000;

/// Block size used by the manual memory self-test
pub const SELF_TEST_BLOCK: usize = 256;

// =============================================================================
// Frame Sizes
// =============================================================================

/// Maximum untagged Ethernet frame including CRC
pub const MAX_FRAME_SIZE: usize = 1518;

/// Ethernet MTU (payload bytes)
pub const MTU: usize = 1500;

/// Ethernet header size (dst MAC + src MAC + EtherType)
pub const ETH_HEADER_SIZE: usize = 14;

/// CRC/FCS appended by the hardware
pub const CRC_SIZE: usize = 4;

/// Hardware-written header in front of every received frame
pub const RX_HEADER_SIZE: usize = 6;

/// Per-packet control byte in front of every outbound frame
pub const TX_CONTROL_SIZE: usize = 1;

/// Status vector the hardware writes after a completed transmission
pub const TX_STATUS_SIZE: usize = 7;

/// Byte counts above this are treated as a corrupted header, not a frame
pub const RX_BYTE_COUNT_SANITY: u16 = 32_000;

/// MAC address length in bytes
pub const MAC_ADDR_LEN: usize = 6;

// =============================================================================
// Timing (iteration bounds)
// =============================================================================

/// Status register reads allowed while waiting for the oscillator
pub const CLOCK_READY_ATTEMPTS: u32 = 100_000;

/// Identical consecutive status readouts required before CLKRDY is trusted
pub const CLOCK_STABLE_READS: u32 = 100;

/// ECON1 polls allowed for TXRTS to clear after a transmit request
pub const TX_POLL_LIMIT: u32 = 10_000;

/// MISTAT polls allowed for the MII busy flag to clear
pub const MII_POLL_LIMIT: u32 = 100_000;

/// Upper bound on PKTDEC pulses while flushing stale frames; EPKTCNT is 8 bits
pub const PKTDEC_FLUSH_LIMIT: u32 = 256;

// =============================================================================
// MAC Timing (data sheet section 6.5)
// =============================================================================

/// Non-back-to-back inter-packet gap, low byte
pub const MAIPGL_DEFAULT: u8 = 0x12;

/// Non-back-to-back inter-packet gap, high byte (half duplex)
pub const MAIPGH_DEFAULT: u8 = 0x0C;

/// Back-to-back inter-packet gap (half duplex)
pub const MABBIPG_HALF_DUPLEX: u8 = 0x12;

// =============================================================================
// Defaults
// =============================================================================

/// Default RX end address: 4 KiB of ring, ending on an odd address
pub const DEFAULT_RX_END: u16 = 0x0FFF;

/// Default locally-administered MAC address
pub const DEFAULT_MAC_ADDR: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

/// Silicon revisions with known behavior (EREVID values for B1, B4, B5, B7)
pub const KNOWN_REVISIONS: [u8; 4] = [0x02, 0x04, 0x05, 0x06];
