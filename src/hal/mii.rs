//! MII access to the embedded PHY
//!
//! PHY registers are not directly addressable. A read writes the target
//! address to MIREGADR, starts the operation through MICMD and waits for
//! MISTAT.BUSY to drop; a write loads MIWR, whose high-byte write starts the
//! transaction. Every busy-wait is bounded by the configured MII poll limit.

use crate::driver::enc28j60::Enc28j60;
use crate::error::{IoError, Result};
use crate::hal::transport::Transport;
use crate::internal::phy_regs::{phlcon, phstat2, phy_reg};
use crate::internal::register::{MICMD, MIREGADR, MIRDL, MISTAT, MIWRL, micmd, mistat};

// =============================================================================
// LED Configuration
// =============================================================================

/// One of the two PHY-driven LED outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Led {
    /// LEDA pin
    A,
    /// LEDB pin
    B,
}

impl Led {
    /// Bit offset of this LED's field in PHLCON
    pub const fn shift(self) -> u16 {
        match self {
            Led::A => phlcon::LACFG_SHIFT,
            Led::B => phlcon::LBCFG_SHIFT,
        }
    }
}

/// LED behavior (PHLCON `LxCFG` field values)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LedMode {
    /// Transmit activity
    TxActivity = 0x1,
    /// Receive activity
    RxActivity = 0x2,
    /// Collision activity
    Collision = 0x3,
    /// Link status
    LinkStatus = 0x4,
    /// Duplex status
    DuplexStatus = 0x5,
    /// Transmit and receive activity
    TxRxActivity = 0x7,
    /// Always on
    On = 0x8,
    /// Always off
    Off = 0x9,
    /// Blink fast
    BlinkFast = 0xA,
    /// Blink slow
    BlinkSlow = 0xB,
    /// Link status, receive activity stretched
    LinkStatusRxActivity = 0xC,
    /// Link status, transmit and receive activity stretched
    LinkStatusTxRxActivity = 0xD,
    /// Duplex status, collision activity stretched
    DuplexStatusCollision = 0xE,
}

impl LedMode {
    /// Field value
    pub const fn bits(self) -> u16 {
        self as u16
    }
}

// =============================================================================
// PHY Access
// =============================================================================

impl<T: Transport> Enc28j60<T> {
    /// Read a PHY register
    ///
    /// # Errors
    /// - `NotInitialized` - basic setup not completed
    /// - `PhyTimeout` - MISTAT.BUSY did not clear
    pub fn read_phy(&mut self, reg: u8) -> Result<u16> {
        self.ensure_ready()?;

        self.write_reg(MIREGADR, reg)?;
        self.write_reg(MICMD, micmd::MIIRD)?;
        let waited = self.wait_mii_idle();
        // MIIRD must drop even when the wait gave up
        self.write_reg(MICMD, 0)?;
        waited?;

        self.read_reg16(MIRDL)
    }

    /// Write a PHY register
    pub fn write_phy(&mut self, reg: u8, value: u16) -> Result<()> {
        self.ensure_ready()?;

        self.wait_mii_idle()?;
        self.write_reg(MIREGADR, reg)?;
        self.write_reg16(MIWRL, value)
    }

    /// Set the behavior of one LED
    pub fn led_configure(&mut self, led: Led, mode: LedMode) -> Result<()> {
        let shift = led.shift();
        let current = self.read_phy(phy_reg::PHLCON)?;
        let value = (current & !(phlcon::LCFG_MASK << shift)) | (mode.bits() << shift);
        self.write_phy(phy_reg::PHLCON, value)
    }

    /// Whether the PHY reports a link
    pub fn link_up(&mut self) -> Result<bool> {
        Ok(self.read_phy(phy_reg::PHSTAT2)? & phstat2::LSTAT != 0)
    }

    /// PHY identifier (`PHID1 << 16 | PHID2`)
    pub fn phy_identifier(&mut self) -> Result<u32> {
        let id1 = self.read_phy(phy_reg::PHID1)?;
        let id2 = self.read_phy(phy_reg::PHID2)?;
        Ok((u32::from(id1) << 16) | u32::from(id2))
    }

    /// Wait for a pending MII operation to finish
    fn wait_mii_idle(&mut self) -> Result<()> {
        for _ in 0..self.config.mii_poll_limit {
            if self.read_reg(MISTAT)? & mistat::BUSY == 0 {
                return Ok(());
            }
            core::hint::spin_loop();
        }

        #[cfg(feature = "defmt")]
        defmt::error!("MII busy after {=u32} polls", self.config.mii_poll_limit);

        Err(IoError::PhyTimeout.into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
