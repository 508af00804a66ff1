//! Startup and self-test
//!
//! Bring-up runs in two stages. [`basic_setup`](Enc28j60::basic_setup)
//! verifies the chip (clock, revision) and walks the state machine from
//! `Reset` to `Ready`; [`ethernet_setup`](Enc28j60::ethernet_setup)
//! programs buffers, MAC and PHY and moves to `Running`. The manual memory
//! test may run in between. [`init`](Enc28j60::init) does all of it.

use super::config::{Enc28j60Config, State, rx_end_leaves_tx_room};
use super::enc28j60::Enc28j60;
use super::rx::SliceSink;
use crate::error::{ConfigError, IoError, Result};
use crate::hal::mii::Led;
use crate::hal::transport::Transport;
use crate::internal::constants::{
    KNOWN_REVISIONS, MABBIPG_HALF_DUPLEX, MAIPGH_DEFAULT, MAIPGL_DEFAULT, RAM_END, RAM_SIZE,
    RX_START, SELF_TEST_BLOCK,
};
use crate::internal::phy_regs::{phcon2, phy_reg};
use crate::internal::register::{
    ECON1, ECON2, EREVID, ERXFCON, ERXRDPTL, ERXSTL, ESTAT, MAADR, MABBIPG, MACON1, MACON3,
    MAIPGH, MAIPGL, econ1, econ2, erxfcon, estat, macon1, macon3,
};

/// ESTAT readout seen while the oscillator is still powering up
const ESTAT_POWER_UP_GLITCH: u8 = 0xFF;

/// Self-test pattern byte for offset `i` of the block at `addr`
#[inline(always)]
const fn pattern(addr: usize, i: usize) -> u8 {
    ((addr >> 8) + i) as u8
}

impl<T: Transport> Enc28j60<T> {
    /// Run the complete bring-up with `config`
    ///
    /// Order: basic setup, optional memory self-test, Ethernet setup,
    /// multicast filter, LEDs. Any failure leaves the driver in
    /// [`State::Failed`].
    pub fn init(&mut self, config: Enc28j60Config) -> Result<()> {
        if let Err(e) = config.validate() {
            self.state = State::Failed;
            return Err(e.into());
        }
        self.config = config;

        self.basic_setup()?;
        if self.config.self_test {
            self.manual_memory_test()?;
        }

        let mac = self.config.mac_address;
        self.ethernet_setup(self.config.rx_end, &mac)?;

        let result = self.apply_runtime_config();
        self.track(result)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "ENC28J60 rev {=u8:#x} running, RX ring 0..={=u16:#x}",
            self.revision.unwrap_or_default(),
            self.config.rx_end
        );

        Ok(())
    }

    fn apply_runtime_config(&mut self) -> Result<()> {
        self.set_multicast_reception(self.config.multicast)?;
        if let Some(mode) = self.config.led_a {
            self.led_configure(Led::A, mode)?;
        }
        if let Some(mode) = self.config.led_b {
            self.led_configure(Led::B, mode)?;
        }
        Ok(())
    }

    /// Verify the chip and enable buffer pointer auto-increment
    ///
    /// # Errors
    /// - `ClockTimeout` - oscillator never reported stable
    /// - `UnknownRevision` - EREVID outside the known silicon revisions
    pub fn basic_setup(&mut self) -> Result<()> {
        self.state = State::Reset;
        let result = self.run_basic_setup();
        self.track(result)
    }

    fn run_basic_setup(&mut self) -> Result<()> {
        self.revision = None;
        self.transport.setup()?;

        let revision = self.read_reg(EREVID)?;

        self.state = State::WaitClock;
        self.wait_clock_ready()?;

        // Registers may have been garbage until now
        self.session.invalidate();

        self.state = State::CheckRevision;
        if !KNOWN_REVISIONS.contains(&revision) {
            #[cfg(feature = "defmt")]
            defmt::error!("unknown ENC28J60 revision {=u8:#x}", revision);
            return Err(ConfigError::UnknownRevision.into());
        }
        self.revision = Some(revision);

        self.set_bits(ECON2, econ2::AUTOINC)?;
        self.state = State::Ready;

        #[cfg(feature = "defmt")]
        defmt::debug!("ENC28J60 basic setup done, rev {=u8:#x}", revision);

        Ok(())
    }

    /// Wait for ESTAT.CLKRDY behind a run of identical readouts
    ///
    /// SPI readouts are unreliable while the oscillator starts, so CLKRDY only
    /// counts once the same ESTAT value was read the configured number of
    /// times in a row. All-ones readouts are skipped.
    pub fn wait_clock_ready(&mut self) -> Result<()> {
        let mut last: Option<u8> = None;
        let mut run = 0u32;

        for _ in 0..self.config.clock_ready_attempts {
            let status = self.read_reg(ESTAT)?;
            if status == ESTAT_POWER_UP_GLITCH {
                continue;
            }

            if last == Some(status) {
                run += 1;
            } else {
                last = Some(status);
                run = 1;
            }

            if run >= self.config.clock_stable_reads && status & estat::CLKRDY != 0 {
                return Ok(());
            }
            core::hint::spin_loop();
        }

        #[cfg(feature = "defmt")]
        defmt::error!("ESTAT never settled with CLKRDY set");

        Err(ConfigError::ClockTimeout.into())
    }

    /// Fill the whole packet RAM with a pattern and verify it
    ///
    /// Block at `addr`, offset `i` holds `(addr >> 8) + i` modulo 256. The RX
    /// ring is stretched over the whole RAM so the read pointer never wraps
    /// early; [`ethernet_setup`](Self::ethernet_setup) restores the layout.
    ///
    /// # Errors
    /// - `NotInitialized` - basic setup not completed
    /// - `InvalidState` - Ethernet setup already ran and reception is live
    /// - `SelfTestFailed` - a byte read back differs
    pub fn manual_memory_test(&mut self) -> Result<()> {
        match self.state {
            State::Ready => {}
            State::Running => return Err(IoError::InvalidState.into()),
            _ => return Err(ConfigError::NotInitialized.into()),
        }
        let result = self.run_memory_test();
        self.track(result)
    }

    fn run_memory_test(&mut self) -> Result<()> {
        self.configure_rx_end(RAM_END)?;

        let mut block = [0u8; SELF_TEST_BLOCK];
        for addr in (0..RAM_SIZE).step_by(SELF_TEST_BLOCK) {
            for (i, byte) in block.iter_mut().enumerate() {
                *byte = pattern(addr, i);
            }
            self.write_buffer(Some(addr as u16), &block)?;
        }

        for addr in (0..RAM_SIZE).step_by(SELF_TEST_BLOCK) {
            let mut sink = SliceSink::new(&mut block);
            self.read_buffer(Some(addr as u16), SELF_TEST_BLOCK, &mut sink)?;

            if block.iter().enumerate().any(|(i, &byte)| byte != pattern(addr, i)) {
                #[cfg(feature = "defmt")]
                defmt::error!("self-test mismatch in block {=usize:#06x}", addr);
                return Err(ConfigError::SelfTestFailed.into());
            }
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("buffer memory self-test passed");

        Ok(())
    }

    /// Configure buffers, MAC and PHY and enable reception
    ///
    /// # Errors
    /// - `NotInitialized` - basic setup not completed
    /// - `InvalidConfig` - `rx_end` leaves no room for an outbound frame
    pub fn ethernet_setup(&mut self, rx_end: u16, mac: &[u8; 6]) -> Result<()> {
        self.ensure_ready()?;
        if !rx_end_leaves_tx_room(rx_end) {
            return Err(ConfigError::InvalidConfig.into());
        }
        let result = self.run_ethernet_setup(rx_end, mac);
        self.track(result)
    }

    fn run_ethernet_setup(&mut self, rx_end: u16, mac: &[u8; 6]) -> Result<()> {
        // Not coming out of a clean reset: drop whatever is pending
        self.set_bits(ECON1, econ1::TXRST | econ1::RXRST)?;
        self.drop_pending_frames()?;
        self.clear_bits(ECON1, econ1::TXRST | econ1::RXRST)?;

        // RX start must stay at zero (errata item 5)
        self.write_reg16(ERXSTL, RX_START)?;
        self.configure_rx_end(rx_end)?;
        self.session.next_frame = RX_START;
        self.session.rx = Default::default();
        self.session.tx = None;
        // Cursor zero retires to the ring end
        self.write_reg16(ERXRDPTL, rx_end)?;

        self.write_reg(MACON1, macon1::MARXEN | macon1::TXPAUS | macon1::RXPAUS)?;
        self.write_reg(MACON3, macon3::PADCFG_60 | macon3::TXCRCEN | macon3::FRMLNEN)?;
        self.write_reg(MAIPGL, MAIPGL_DEFAULT)?;
        self.write_reg(MAIPGH, MAIPGH_DEFAULT)?;
        self.write_reg(MABBIPG, MABBIPG_HALF_DUPLEX)?;

        for (reg, &byte) in MAADR.iter().zip(mac) {
            self.write_reg(*reg, byte)?;
        }

        // Own frames looped back would look like address conflicts
        self.write_phy(phy_reg::PHCON2, phcon2::HDLDIS)?;

        self.set_bits(ECON1, econ1::RXEN)?;
        self.clear_bits(ECON1, econ1::TXRST | econ1::RXRST)?;

        self.state = State::Running;
        Ok(())
    }

    /// Accept or reject multicast frames
    pub fn set_multicast_reception(&mut self, enable: bool) -> Result<()> {
        if enable {
            self.set_bits(ERXFCON, erxfcon::MCEN)
        } else {
            self.clear_bits(ERXFCON, erxfcon::MCEN)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
