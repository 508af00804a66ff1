//! Transmit pipeline
//!
//! The TX region holds one outbound frame: a per-packet control byte, the
//! frame itself, then the 7-byte status vector the hardware writes once the
//! frame has left. Sending is `transmit_begin`, any number of
//! `transmit_append`, then `transmit_end`.

use super::enc28j60::{Enc28j60, TxProgress};
use super::rx::SliceSink;
use crate::error::{BufferError, IoError, Result};
use crate::hal::transport::Transport;
use crate::internal::constants::{
    CRC_SIZE, MAX_FRAME_SIZE, RAM_SIZE, TX_CONTROL_SIZE, TX_STATUS_SIZE,
};
use crate::internal::register::{ECON1, ETXNDL, ETXSTL, econ1};

/// Largest frame accepted for transmission; the MAC appends the CRC
pub const MAX_TX_FRAME: usize = MAX_FRAME_SIZE - CRC_SIZE;

// =============================================================================
// Status Vector
// =============================================================================

/// Transmit status vector written behind a completed frame
///
/// Kept as raw bytes; the accessors cover the commonly needed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxStatusVector(pub [u8; TX_STATUS_SIZE]);

impl TxStatusVector {
    /// Raw status bytes
    pub const fn as_bytes(&self) -> &[u8; TX_STATUS_SIZE] {
        &self.0
    }

    /// Frame length as counted by the MAC, padding included
    pub const fn byte_count(&self) -> u16 {
        u16::from_le_bytes([self.0[0], self.0[1]])
    }

    /// Collisions seen while sending
    pub const fn collision_count(&self) -> u8 {
        self.0[2] & 0x0F
    }

    /// Transmission completed
    pub const fn done(&self) -> bool {
        self.0[2] & 0x80 != 0
    }

    /// Bytes put on the wire, collided attempts included
    pub const fn total_wire_bytes(&self) -> u16 {
        u16::from_le_bytes([self.0[4], self.0[5]])
    }
}

/// How a transmission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitOutcome {
    /// Transmit request cleared; status vector read back
    Sent(TxStatusVector),
    /// Transmit request stuck and was reset; the frame may not have left
    Recovered,
}

impl TransmitOutcome {
    /// Whether the hardware confirmed the frame
    pub const fn is_sent(&self) -> bool {
        matches!(self, TransmitOutcome::Sent(_))
    }
}

// =============================================================================
// Transmit Pipeline
// =============================================================================

impl<T: Transport> Enc28j60<T> {
    /// Start a new outbound frame
    ///
    /// Points ETXST at the TX region and writes a zero control byte there,
    /// so the MACON3 defaults apply. EWRPT is left right behind it for
    /// [`transmit_append`](Self::transmit_append).
    pub fn transmit_begin(&mut self) -> Result<()> {
        let start = self.transmit_region_start()?;
        self.session.tx = None;
        self.write_reg16(ETXSTL, start)?;
        self.write_buffer(Some(start), &[0])?;
        self.session.tx = Some(TxProgress { start, appended: 0 });
        Ok(())
    }

    /// Append frame bytes after what was written so far
    pub fn transmit_append(&mut self, bytes: &[u8]) -> Result<()> {
        let progress = self.session.tx.ok_or(IoError::InvalidState)?;
        let appended = progress.appended + bytes.len();
        if !frame_fits(progress.start, appended) {
            return Err(BufferError::FrameTooLarge.into());
        }
        self.write_buffer(None, bytes)?;
        self.session.tx = Some(TxProgress { appended, ..progress });
        Ok(())
    }

    /// Send the assembled frame of `total_length` bytes
    ///
    /// Polls ECON1.TXRTS up to the configured limit. A request that never
    /// clears is the stuck-transmit erratum: TX logic is pulsed through reset
    /// and [`TransmitOutcome::Recovered`] is returned without reading the
    /// status vector.
    ///
    /// # Errors
    /// - `InvalidState` - no frame begun
    /// - `InvalidLength` - `total_length` is zero or differs from the bytes
    ///   appended
    pub fn transmit_end(&mut self, total_length: usize) -> Result<TransmitOutcome> {
        let progress = self.session.tx.take().ok_or(IoError::InvalidState)?;
        if total_length == 0 || total_length != progress.appended {
            return Err(BufferError::InvalidLength.into());
        }

        // Control byte sits at `start`, so the last frame byte is start + len
        let end = progress.start + total_length as u16;
        self.write_reg16(ETXNDL, end)?;
        self.set_bits(ECON1, econ1::TXRTS)?;

        for _ in 0..self.config.tx_poll_limit {
            if self.read_reg(ECON1)? & econ1::TXRTS == 0 {
                let mut status = [0u8; TX_STATUS_SIZE];
                let mut sink = SliceSink::new(&mut status);
                self.read_buffer(Some(end + 1), TX_STATUS_SIZE, &mut sink)?;
                return Ok(TransmitOutcome::Sent(TxStatusVector(status)));
            }
            core::hint::spin_loop();
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("TXRTS stuck after {=u32} polls, resetting TX logic", self.config.tx_poll_limit);

        self.set_bits(ECON1, econ1::TXRST)?;
        self.clear_bits(ECON1, econ1::TXRST)?;
        Ok(TransmitOutcome::Recovered)
    }

    /// Transmit one contiguous frame
    ///
    /// Blocks until the hardware is done or the transmit logic was recovered.
    ///
    /// # Errors
    /// - `InvalidState` - Ethernet setup not completed
    /// - `InvalidLength` - empty frame
    /// - `FrameTooLarge` - frame exceeds [`MAX_TX_FRAME`] or the TX region
    pub fn transmit(&mut self, frame: &[u8]) -> Result<TransmitOutcome> {
        self.transmit_segments(&[frame])
    }

    /// Transmit a frame scattered over several buffers
    pub fn transmit_segments(&mut self, segments: &[&[u8]]) -> Result<TransmitOutcome> {
        self.ensure_running()?;

        let total: usize = segments.iter().map(|s| s.len()).sum();
        if total == 0 {
            return Err(BufferError::InvalidLength.into());
        }
        if total > MAX_TX_FRAME || !frame_fits(self.transmit_region_start()?, total) {
            return Err(BufferError::FrameTooLarge.into());
        }

        self.transmit_begin()?;
        for segment in segments {
            self.transmit_append(segment)?;
        }
        let outcome = self.transmit_end(total)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("TX {=usize} bytes: {}", total, outcome);

        Ok(outcome)
    }
}

/// Whether control byte, `len` frame bytes and the status vector fit in RAM
fn frame_fits(start: u16, len: usize) -> bool {
    usize::from(start) + TX_CONTROL_SIZE + len + TX_STATUS_SIZE <= RAM_SIZE
}

// =============================================================================
// Unit Tests
// =============================================================================
