//! smoltcp Network Stack Integration
#![cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
//!
//! This module implements the `smoltcp::phy::Device` trait for the ENC28J60
//! driver, so it can be handed straight to a smoltcp `Interface`.
//!
//! # Example
//!
//! ```ignore
//! use smoltcp::iface::{Config, Interface, SocketSet};
//! use smoltcp::wire::{EthernetAddress, IpCidr};
//! use ph_enc28j60::{Enc28j60, Enc28j60Config, SpiTransport};
//! use ph_enc28j60::integration::ethernet_address;
//!
//! let mut eth = Enc28j60::new(SpiTransport::new(spi, cs));
//! eth.init(Enc28j60Config::new().with_mac_address(mac)).unwrap();
//!
//! let config = Config::new(ethernet_address(&eth).into());
//! let mut iface = Interface::new(config, &mut eth, smoltcp::time::Instant::ZERO);
//! ```
//!
//! # Token Ownership
//!
//! smoltcp asks for an RX and a TX token at the same time. The RX token here
//! owns a copy of the frame, read out of the chip before the tokens are
//! handed over, so only the TX token borrows the driver.

use crate::driver::config::State;
use crate::driver::enc28j60::Enc28j60;
use crate::driver::tx::MAX_TX_FRAME;
use crate::hal::transport::Transport;
use crate::internal::constants::{ETH_HEADER_SIZE, MAX_FRAME_SIZE, MTU};

use smoltcp::phy::{ChecksumCapabilities, Device, DeviceCapabilities, Medium};
use smoltcp::time::Instant;
use smoltcp::wire::EthernetAddress;

// =============================================================================
// RX Token
// =============================================================================

/// Receive token holding one frame read from the RX ring
pub struct Enc28j60RxToken {
    buffer: [u8; MAX_FRAME_SIZE],
    len: usize,
}

impl smoltcp::phy::RxToken for Enc28j60RxToken {
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        f(&self.buffer[..self.len])
    }
}

// =============================================================================
// TX Token
// =============================================================================

/// Transmit token borrowing the driver until the frame is sent
pub struct Enc28j60TxToken<'a, T: Transport> {
    dev: &'a mut Enc28j60<T>,
}

impl<T: Transport> smoltcp::phy::TxToken for Enc28j60TxToken<'_, T> {
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let len = len.min(MAX_TX_FRAME);
        let mut buffer = [0u8; MAX_TX_FRAME];
        let result = f(&mut buffer[..len]);

        // Dropped frames are retried by the upper layers
        match self.dev.transmit(&buffer[..len]) {
            Ok(_outcome) => {
                #[cfg(feature = "defmt")]
                if !_outcome.is_sent() {
                    defmt::debug!("smoltcp frame sent through TX recovery");
                }
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("smoltcp transmit failed: {}", _e);
            }
        }

        result
    }
}

// =============================================================================
// Device Implementation
// =============================================================================

impl<T: Transport> Device for Enc28j60<T> {
    type RxToken<'a>
        = Enc28j60RxToken
    where
        Self: 'a;
    type TxToken<'a>
        = Enc28j60TxToken<'a, T>
    where
        Self: 'a;

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        if self.state() != State::Running {
            return None;
        }

        let mut rx = Enc28j60RxToken {
            buffer: [0u8; MAX_FRAME_SIZE],
            len: 0,
        };
        let frame = match self.poll_receive(&mut rx.buffer) {
            Ok(Some(frame)) => frame,
            Ok(None) => return None,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("smoltcp receive failed: {}", _e);
                return None;
            }
        };
        rx.len = frame.copied;

        Some((rx, Enc28j60TxToken { dev: self }))
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        if self.state() != State::Running {
            return None;
        }
        Some(Enc28j60TxToken { dev: self })
    }

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();
        caps.medium = Medium::Ethernet;
        // smoltcp counts the Ethernet header in the MTU for this medium
        caps.max_transmission_unit = MTU + ETH_HEADER_SIZE;
        caps.max_burst_size = Some(1);
        // No checksum offload on this chip
        caps.checksum = ChecksumCapabilities::default();
        caps
    }
}

/// Station address as a smoltcp `EthernetAddress`
pub fn ethernet_address<T: Transport>(dev: &Enc28j60<T>) -> EthernetAddress {
    EthernetAddress(*dev.mac_address())
}

// =============================================================================
// Unit Tests
// =============================================================================
