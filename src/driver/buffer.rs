//! Packet buffer layout
//!
//! The 8 KiB packet RAM is split in two: the RX ring `[0, rx_end]` and, right
//! behind it on an even address, the TX scratch region that holds one
//! outbound frame at a time.

use super::enc28j60::Enc28j60;
use crate::error::{BufferError, BufferResult, ConfigError, Result};
use crate::hal::transport::Transport;
use crate::internal::constants::RAM_END;
use crate::internal::register::ERXNDL;

/// Round `value` up to the next even number
#[inline(always)]
pub const fn round_up_even(value: usize) -> usize {
    (value + 1) & !1
}

impl<T: Transport> Enc28j60<T> {
    /// Set the last byte of the RX ring
    ///
    /// Writes ERXND only when the value differs from the cached one, so
    /// repeated calls are free. Changing it moves the TX region with it.
    pub fn configure_rx_end(&mut self, rx_end: u16) -> Result<()> {
        if rx_end > RAM_END {
            return Err(ConfigError::InvalidConfig.into());
        }
        if self.session.rx_end == Some(rx_end) {
            return Ok(());
        }

        // Stale until the pair write completes
        self.session.rx_end = None;
        self.write_reg16(ERXNDL, rx_end)?;
        self.session.rx_end = Some(rx_end);
        Ok(())
    }

    /// Cached end of the RX ring
    #[inline(always)]
    pub fn rx_end(&self) -> Option<u16> {
        self.session.rx_end
    }

    /// First address of the TX region, derived from the cached RX end
    ///
    /// Pure computation; no bus traffic.
    pub fn transmit_region_start(&self) -> BufferResult<u16> {
        let rx_end = self
            .session
            .rx_end
            .ok_or(BufferError::RegionNotConfigured)?;
        Ok(round_up_even(usize::from(rx_end) + 2) as u16)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Op, SimulatedChip};

    #[test]
    fn round_up_even_values() {
        assert_eq!(round_up_even(0), 0);
        assert_eq!(round_up_even(1), 2);
        assert_eq!(round_up_even(2), 2);
        assert_eq!(round_up_even(0x1001), 0x1002);
    }

    #[test]
    fn tx_start_is_even_for_every_rx_end() {
        let mut dev = Enc28j60::new(SimulatedChip::new());

        for rx_end in (0u16..=RAM_END).step_by(7).chain([0, 1, 0x0FFF, RAM_END - 1, RAM_END]) {
            dev.configure_rx_end(rx_end).unwrap();
            let start = dev.transmit_region_start().unwrap();

            assert_eq!(start % 2, 0, "rx_end {rx_end:#06x}");
            assert_eq!(usize::from(start), round_up_even(usize::from(rx_end) + 2));
            assert!(start > rx_end);
        }
    }

    #[test]
    fn tx_start_requires_configured_region() {
        let dev = Enc28j60::new(SimulatedChip::new());
        assert_eq!(dev.transmit_region_start(), Err(BufferError::RegionNotConfigured));
    }

    #[test]
    fn configure_rx_end_writes_only_on_change() {
        let mut dev = Enc28j60::new(SimulatedChip::new());

        dev.configure_rx_end(0x0FFF).unwrap();
        assert_eq!(dev.transport().register16(0, ERXNDL.address()), 0x0FFF);

        dev.transport_mut().clear_ops();
        dev.configure_rx_end(0x0FFF).unwrap();
        assert!(dev.transport().ops().is_empty());

        dev.configure_rx_end(0x07FF).unwrap();
        assert!(dev
            .transport()
            .ops()
            .iter()
            .any(|op| matches!(op, Op::Write { address, value: 0x07, .. } if *address == ERXNDL.address() + 1)));
        assert_eq!(dev.rx_end(), Some(0x07FF));
        assert_eq!(dev.transmit_region_start(), Ok(0x0802));
    }

    #[test]
    fn configure_rx_end_rejects_out_of_ram() {
        let mut dev = Enc28j60::new(SimulatedChip::new());
        assert_eq!(
            dev.configure_rx_end(0x2000),
            Err(ConfigError::InvalidConfig.into())
        );
        assert_eq!(dev.rx_end(), None);
    }
}
