//! Register access facade and bank manager
//!
//! Every SPI command is one chip-select bracket. The helpers here are the
//! only place that issues opcodes; everything above works in terms of
//! [`Register`] descriptors and buffer addresses.

use super::enc28j60::Enc28j60;
use super::rx::FrameSink;
use crate::error::Result;
use crate::hal::transport::Transport;
use crate::internal::constants::{
    ADDRESS_MASK, OPCODE_BFC, OPCODE_BFS, OPCODE_RBM, OPCODE_RCR, OPCODE_WBM, OPCODE_WCR,
    READ_FILLER,
};
use crate::internal::register::{ECON1, ERDPTL, EWRPTL, Register, econ1};

impl<T: Transport> Enc28j60<T> {
    // =========================================================================
    // Command Bracket
    // =========================================================================

    /// Run `f` inside one chip-select bracket
    ///
    /// Chip-select is released even when `f` fails; the first error wins.
    pub(crate) fn command<R>(&mut self, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        self.transport.select()?;
        let result = f(&mut self.transport);
        let released = self.transport.deselect();
        let value = result?;
        released?;
        Ok(value)
    }

    /// Two-byte command: opcode with register address, then one operand
    fn op(&mut self, opcode: u8, reg: Register, operand: u8) -> Result<()> {
        let header = opcode | (reg.address() & ADDRESS_MASK);
        self.command(|t| {
            t.exchange(header)?;
            t.exchange(operand)?;
            Ok(())
        })
    }

    // =========================================================================
    // Bank Manager
    // =========================================================================

    /// Make `reg` reachable by selecting its bank if needed
    ///
    /// Common registers never switch. Otherwise at most one BFS and one BFC
    /// on ECON1 are issued, and only when the cached bank differs.
    pub(crate) fn ensure_accessible(&mut self, reg: Register) -> Result<()> {
        let Some(bank) = reg.bank() else {
            return Ok(());
        };
        if self.session.selected_bank == Some(bank) {
            return Ok(());
        }

        // Unknown until both commands have gone through
        self.session.selected_bank = None;

        let set = bank.bits() & econ1::BSEL_MASK;
        let clear = !bank.bits() & econ1::BSEL_MASK;
        if set != 0 {
            self.op(OPCODE_BFS, ECON1, set)?;
        }
        if clear != 0 {
            self.op(OPCODE_BFC, ECON1, clear)?;
        }

        self.session.selected_bank = Some(bank);
        Ok(())
    }

    // =========================================================================
    // Single-Byte Registers
    // =========================================================================

    /// Read a control register
    ///
    /// MAC and MII registers shift out a dummy byte before the value.
    pub fn read_reg(&mut self, reg: Register) -> Result<u8> {
        self.ensure_accessible(reg)?;
        let header = OPCODE_RCR | (reg.address() & ADDRESS_MASK);
        self.command(|t| {
            t.exchange(header)?;
            if reg.needs_dummy_byte() {
                t.exchange(READ_FILLER)?;
            }
            t.exchange(READ_FILLER)
        })
    }

    /// Write a control register
    pub fn write_reg(&mut self, reg: Register, value: u8) -> Result<()> {
        self.ensure_accessible(reg)?;
        self.op(OPCODE_WCR, reg, value)
    }

    /// Set the bits in `mask`
    ///
    /// ETH registers use the BFS command. MAC and MII registers ignore it, so
    /// they get a read-modify-write instead.
    pub fn set_bits(&mut self, reg: Register, mask: u8) -> Result<()> {
        if reg.supports_bit_field_ops() {
            self.ensure_accessible(reg)?;
            self.op(OPCODE_BFS, reg, mask)
        } else {
            let value = self.read_reg(reg)?;
            self.write_reg(reg, value | mask)
        }
    }

    /// Clear the bits in `mask`
    pub fn clear_bits(&mut self, reg: Register, mask: u8) -> Result<()> {
        if reg.supports_bit_field_ops() {
            self.ensure_accessible(reg)?;
            self.op(OPCODE_BFC, reg, mask)
        } else {
            let value = self.read_reg(reg)?;
            self.write_reg(reg, value & !mask)
        }
    }

    // =========================================================================
    // Register Pairs
    // =========================================================================

    /// Read a 16-bit register pair, low byte first
    pub fn read_reg16(&mut self, low: Register) -> Result<u16> {
        let lo = self.read_reg(low)?;
        let hi = self.read_reg(low.high())?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Write a 16-bit register pair, low byte first
    ///
    /// The order is load-bearing: ERXRDPT and MIWR latch on the high byte.
    pub fn write_reg16(&mut self, low: Register, value: u16) -> Result<()> {
        let [lo, hi] = value.to_le_bytes();
        self.write_reg(low, lo)?;
        self.write_reg(low.high(), hi)
    }

    // =========================================================================
    // Buffer Memory
    // =========================================================================

    /// Stream `len` bytes of buffer memory into `sink`
    ///
    /// With `start` the read pointer is moved first; with `None` the read
    /// continues where the previous one stopped. ERDPT wraps from ERXND back
    /// to ERXST in hardware.
    pub fn read_buffer<S: FrameSink + ?Sized>(
        &mut self,
        start: Option<u16>,
        len: usize,
        sink: &mut S,
    ) -> Result<()> {
        if let Some(addr) = start {
            self.write_reg16(ERDPTL, addr)?;
        }
        if len == 0 {
            return Ok(());
        }
        self.command(|t| {
            t.exchange(OPCODE_RBM)?;
            for _ in 0..len {
                sink.put(t.exchange(READ_FILLER)?);
            }
            Ok(())
        })
    }

    /// Write `data` to buffer memory
    ///
    /// With `start` the write pointer is moved first; with `None` the write
    /// continues at the current EWRPT.
    pub fn write_buffer(&mut self, start: Option<u16>, data: &[u8]) -> Result<()> {
        if let Some(addr) = start {
            self.write_reg16(EWRPTL, addr)?;
        }
        if data.is_empty() {
            return Ok(());
        }
        self.command(|t| {
            t.exchange(OPCODE_WBM)?;
            for &byte in data {
                t.exchange(byte)?;
            }
            Ok(())
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
