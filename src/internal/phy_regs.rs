//! ENC28J60 PHY register map
//!
//! The embedded 10BASE-T PHY is reached only through the MII indirection
//! (`MIREGADR`/`MICMD`/`MISTAT`/`MIRD`/`MIWR`). Addresses and bits follow
//! the ENC28J60 data sheet, section 3.3.

/// PHY register addresses
pub mod phy_reg {
    /// PHY control 1
    pub const PHCON1: u8 = 0x00;
    /// Physical layer status 1
    pub const PHSTAT1: u8 = 0x01;
    /// PHY identifier 1
    pub const PHID1: u8 = 0x02;
    /// PHY identifier 2
    pub const PHID2: u8 = 0x03;
    /// PHY control 2
    pub const PHCON2: u8 = 0x10;
    /// Physical layer status 2
    pub const PHSTAT2: u8 = 0x11;
    /// PHY interrupt enable
    pub const PHIE: u8 = 0x12;
    /// PHY interrupt request
    pub const PHIR: u8 = 0x13;
    /// PHY module LED control
    pub const PHLCON: u8 = 0x14;
}

/// PHCON1 bits
pub mod phcon1 {
    /// PHY software reset
    pub const PRST: u16 = 1 << 15;
    /// PHY loopback
    pub const PLOOPBK: u16 = 1 << 14;
    /// PHY power-down
    pub const PPWRSV: u16 = 1 << 11;
    /// PHY duplex mode (full duplex if set)
    pub const PDPXMD: u16 = 1 << 8;
}

/// PHSTAT1 bits
pub mod phstat1 {
    /// Full-duplex capable
    pub const PFDPX: u16 = 1 << 12;
    /// Half-duplex capable
    pub const PHDPX: u16 = 1 << 11;
    /// Latching link status (low until read after a link loss)
    pub const LLSTAT: u16 = 1 << 2;
    /// Latching jabber status
    pub const JBSTAT: u16 = 1 << 1;
}

/// PHCON2 bits
pub mod phcon2 {
    /// Force link up
    pub const FRCLNK: u16 = 1 << 14;
    /// Twisted-pair transmitter disable
    pub const TXDIS: u16 = 1 << 13;
    /// Jabber correction disable
    pub const JABBER: u16 = 1 << 10;
    /// Half-duplex loopback disable
    pub const HDLDIS: u16 = 1 << 8;
}

/// PHSTAT2 bits
pub mod phstat2 {
    /// Transmitting
    pub const TXSTAT: u16 = 1 << 13;
    /// Receiving
    pub const RXSTAT: u16 = 1 << 12;
    /// Collision
    pub const COLSTAT: u16 = 1 << 11;
    /// Link up (non-latching)
    pub const LSTAT: u16 = 1 << 10;
    /// Full duplex
    pub const DPXSTAT: u16 = 1 << 9;
    /// Polarity reversed
    pub const PLRITY: u16 = 1 << 5;
}

/// PHLCON fields
pub mod phlcon {
    /// Width mask of one LED configuration field
    pub const LCFG_MASK: u16 = 0x000F;
    /// Bit offset of the LEDA configuration field
    pub const LACFG_SHIFT: u16 = 8;
    /// Bit offset of the LEDB configuration field
    pub const LBCFG_SHIFT: u16 = 4;
}

/// Expected PHY identifier for every ENC28J60 revision
pub const ENC28J60_PHY_ID: u32 = 0x0083_1400;
