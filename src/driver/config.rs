//! Configuration types for the ENC28J60 driver

use crate::error::{ConfigError, ConfigResult};
use crate::hal::mii::LedMode;
use crate::internal::constants::{
    CLOCK_READY_ATTEMPTS, CLOCK_STABLE_READS, DEFAULT_MAC_ADDR, DEFAULT_RX_END, MAX_FRAME_SIZE,
    MII_POLL_LIMIT, RAM_SIZE, TX_CONTROL_SIZE, TX_POLL_LIMIT, TX_STATUS_SIZE,
};

/// Driver life-cycle state
///
/// `Reset → WaitClock → CheckRevision → Ready` is walked by basic setup;
/// Ethernet setup then moves `Ready → Running`. Any startup failure parks
/// the driver in `Failed` until the next basic setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Constructed or soft-reset, nothing verified yet
    #[default]
    Reset,
    /// Waiting for the oscillator start-up timer
    WaitClock,
    /// Validating the silicon revision
    CheckRevision,
    /// Chip verified, Ethernet not configured
    Ready,
    /// Startup failed; normal operation is blocked
    Failed,
    /// Ethernet configured, RX enabled
    Running,
}

/// Complete driver configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Enc28j60Config {
    /// Station MAC address (6 bytes)
    pub mac_address: [u8; 6],
    /// Last byte of the RX ring; the TX region starts right after it
    pub rx_end: u16,
    /// Accept multicast frames
    pub multicast: bool,
    /// Run the manual buffer memory test during [`init`](crate::Enc28j60::init)
    pub self_test: bool,
    /// LEDA behavior, left at the power-on default if `None`
    pub led_a: Option<LedMode>,
    /// LEDB behavior, left at the power-on default if `None`
    pub led_b: Option<LedMode>,
    /// ECON1 polls before a stuck transmit request is reset
    pub tx_poll_limit: u32,
    /// ESTAT reads allowed while waiting for the clock
    pub clock_ready_attempts: u32,
    /// Identical consecutive ESTAT reads required before CLKRDY counts
    pub clock_stable_reads: u32,
    /// MISTAT polls before an MII operation is abandoned
    pub mii_poll_limit: u32,
}

impl Default for Enc28j60Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Enc28j60Config {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_address: DEFAULT_MAC_ADDR,
            rx_end: DEFAULT_RX_END,
            multicast: true,
            self_test: true,
            led_a: None,
            led_b: None,
            tx_poll_limit: TX_POLL_LIMIT,
            clock_ready_attempts: CLOCK_READY_ATTEMPTS,
            clock_stable_reads: CLOCK_STABLE_READS,
            mii_poll_limit: MII_POLL_LIMIT,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the MAC address
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; 6]) -> Self {
        self.mac_address = addr;
        self
    }

    /// Set the last address of the RX ring
    #[must_use]
    pub const fn with_rx_end(mut self, rx_end: u16) -> Self {
        self.rx_end = rx_end;
        self
    }

    /// Enable or disable multicast reception
    #[must_use]
    pub const fn with_multicast(mut self, enabled: bool) -> Self {
        self.multicast = enabled;
        self
    }

    /// Enable or disable the startup memory self-test
    #[must_use]
    pub const fn with_self_test(mut self, enabled: bool) -> Self {
        self.self_test = enabled;
        self
    }

    /// Configure both LEDs
    #[must_use]
    pub const fn with_leds(mut self, led_a: LedMode, led_b: LedMode) -> Self {
        self.led_a = Some(led_a);
        self.led_b = Some(led_b);
        self
    }

    /// Set the transmit completion poll bound
    #[must_use]
    pub const fn with_tx_poll_limit(mut self, limit: u32) -> Self {
        self.tx_poll_limit = limit;
        self
    }

    /// Set the clock-ready wait bounds
    #[must_use]
    pub const fn with_clock_wait(mut self, attempts: u32, stable_reads: u32) -> Self {
        self.clock_ready_attempts = attempts;
        self.clock_stable_reads = stable_reads;
        self
    }

    /// Set the MII busy-wait bound
    #[must_use]
    pub const fn with_mii_poll_limit(mut self, limit: u32) -> Self {
        self.mii_poll_limit = limit;
        self
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check that the layout leaves room for one outbound frame and that
    /// every wait bound is usable.
    pub fn validate(&self) -> ConfigResult<()> {
        if !rx_end_leaves_tx_room(self.rx_end) {
            return Err(ConfigError::InvalidConfig);
        }
        if self.tx_poll_limit == 0
            || self.clock_ready_attempts == 0
            || self.clock_stable_reads == 0
            || self.mii_poll_limit == 0
            || self.clock_stable_reads > self.clock_ready_attempts
        {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}

/// Whether a TX region behind `rx_end` can hold control byte, a maximum
/// frame and the status vector.
pub(crate) const fn rx_end_leaves_tx_room(rx_end: u16) -> bool {
    let tx_start = super::buffer::round_up_even(rx_end as usize + 2);
    tx_start + TX_CONTROL_SIZE + MAX_FRAME_SIZE + TX_STATUS_SIZE <= RAM_SIZE
}

// =============================================================================
// Unit Tests
// =============================================================================
