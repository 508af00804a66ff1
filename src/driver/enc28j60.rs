//! ENC28J60 driver core
//!
//! [`Enc28j60`] owns the transport and the device session (bank cache, RX
//! layout cache, receive cursor). The operations are spread over several
//! `impl` blocks:
//!
//! - Register facade and bank manager: [`access`](super::access)
//! - Buffer layout: [`buffer`](super::buffer)
//! - Receive pipeline: [`rx`](super::rx)
//! - Transmit pipeline: [`tx`](super::tx)
//! - Startup and self-test: [`startup`](super::startup)
//! - PHY access: [`mii`](crate::hal::mii)

use super::config::{Enc28j60Config, State};
use super::rx::FrameHeader;
use crate::error::{ConfigError, IoError, Result};
use crate::hal::transport::Transport;
use crate::internal::constants::OPCODE_SRC;
use crate::internal::register::{Bank, EPKTCNT};

// =============================================================================
// Device Session
// =============================================================================

/// Where the receive pipeline stands for the frame at the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RxPhase {
    #[default]
    Idle,
    /// Header consumed, payload not yet read
    HeaderRead(FrameHeader),
    /// Payload read, ring pointer not yet retired
    PayloadRead(FrameHeader),
}

/// Outbound frame being assembled in the TX region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TxProgress {
    pub(crate) start: u16,
    pub(crate) appended: usize,
}

/// Mutable state mirrored from the chip
///
/// Every cached value must match hardware truth; anything that may have
/// desynchronized it (soft reset, basic setup) calls [`Session::invalidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Session {
    /// Bank currently selected in ECON1, `None` if unknown
    pub(crate) selected_bank: Option<Bank>,
    /// Cached ERXND value, `None` until configured
    pub(crate) rx_end: Option<u16>,
    /// Address of the next unread frame header in the RX ring
    pub(crate) next_frame: u16,
    pub(crate) rx: RxPhase,
    pub(crate) tx: Option<TxProgress>,
}

impl Session {
    pub(crate) const fn new() -> Self {
        Self {
            selected_bank: None,
            rx_end: None,
            next_frame: 0,
            rx: RxPhase::Idle,
            tx: None,
        }
    }

    /// Forget everything that mirrors hardware registers
    pub(crate) fn invalidate(&mut self) {
        *self = Self::new();
    }
}

// =============================================================================
// Driver
// =============================================================================

/// ENC28J60 Ethernet controller driver
///
/// The driver is polling-based and holds no internal lock: one caller at a
/// time drives it through `&mut self`. Wrap it in
/// [`SharedEnc28j60`](crate::sync::SharedEnc28j60) to reach it from more
/// than one context.
///
/// # Example
/// ```ignore
/// use ph_enc28j60::{Enc28j60, Enc28j60Config, SpiTransport};
///
/// let transport = SpiTransport::new(spi, cs);
/// let mut eth = Enc28j60::new(transport);
/// eth.init(Enc28j60Config::new().with_mac_address(mac))?;
///
/// loop {
///     if let Some(frame) = eth.poll_receive(&mut buf)? {
///         handle(&buf[..frame.copied]);
///     }
/// }
/// ```
pub struct Enc28j60<T: Transport> {
    pub(crate) transport: T,
    pub(crate) config: Enc28j60Config,
    pub(crate) session: Session,
    pub(super) state: State,
    /// EREVID value seen by the last basic setup
    pub(super) revision: Option<u8>,
}

impl<T: Transport> Enc28j60<T> {
    /// Create a driver around `transport` with the default configuration
    ///
    /// No bus traffic happens until [`init`](Self::init) or
    /// [`basic_setup`](Self::basic_setup) is called.
    pub const fn new(transport: T) -> Self {
        Self::with_config(transport, Enc28j60Config::new())
    }

    /// Create a driver with an explicit configuration
    pub const fn with_config(transport: T, config: Enc28j60Config) -> Self {
        Self {
            transport,
            config,
            session: Session::new(),
            state: State::Reset,
            revision: None,
        }
    }

    /// Give back the transport
    pub fn release(self) -> T {
        self.transport
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Get the current state
    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Get the active configuration
    #[inline(always)]
    pub fn config(&self) -> &Enc28j60Config {
        &self.config
    }

    /// Get the configured MAC address
    #[inline(always)]
    pub fn mac_address(&self) -> &[u8; 6] {
        &self.config.mac_address
    }

    /// Silicon revision read by the last basic setup
    #[inline(always)]
    pub fn revision(&self) -> Option<u8> {
        self.revision
    }

    /// Bank the driver believes is selected
    #[inline(always)]
    pub fn selected_bank(&self) -> Option<Bank> {
        self.session.selected_bank
    }

    /// Address of the next frame header in the RX ring
    #[inline(always)]
    pub fn receive_cursor(&self) -> u16 {
        self.session.next_frame
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    ///
    /// Bus traffic issued behind the driver's back may desynchronize the
    /// bank cache; call [`system_reset`](Self::system_reset) afterwards if
    /// in doubt.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // =========================================================================
    // Runtime Helpers
    // =========================================================================

    /// Number of received frames waiting in the RX ring
    pub fn packet_count(&mut self) -> Result<u8> {
        self.read_reg(EPKTCNT)
    }

    /// Issue the soft reset command
    ///
    /// Every register returns to its power-on value, so all session caches are
    /// dropped and the driver goes back to [`State::Reset`]. Run
    /// [`init`](Self::init) again before further use.
    pub fn system_reset(&mut self) -> Result<()> {
        self.session.invalidate();
        self.state = State::Reset;
        self.revision = None;
        self.command(|t| t.exchange(OPCODE_SRC).map(|_| ()))?;

        #[cfg(feature = "defmt")]
        defmt::info!("ENC28J60 soft reset issued");

        Ok(())
    }

    /// Fail unless basic setup has verified the chip
    pub(crate) fn ensure_ready(&self) -> Result<()> {
        match self.state {
            State::Ready | State::Running => Ok(()),
            _ => Err(ConfigError::NotInitialized.into()),
        }
    }

    /// Fail unless Ethernet setup has completed
    pub(crate) fn ensure_running(&self) -> Result<()> {
        if self.state == State::Running {
            Ok(())
        } else {
            Err(IoError::InvalidState.into())
        }
    }

    /// Park the driver in [`State::Failed`] when `result` is an error
    pub(super) fn track<R>(&mut self, result: Result<R>) -> Result<R> {
        if result.is_err() {
            self.state = State::Failed;
        }
        result
    }
}

impl<T: Transport> core::fmt::Debug for Enc28j60<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Enc28j60")
            .field("state", &self.state)
            .field("revision", &self.revision)
            .field("selected_bank", &self.session.selected_bank)
            .field("rx_end", &self.session.rx_end)
            .field("next_frame", &self.session.next_frame)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
