//! SPI Transport HAL
//!
//! The ENC28J60 speaks a byte-oriented SPI protocol: every command is a
//! chip-select bracket around one opcode byte and its operand or data bytes.
//! This module defines the [`Transport`] seam the driver is written against,
//! plus [`SpiTransport`], an implementation over the `embedded-hal` 1.0 SPI
//! bus and output pin traits.
//!
//! # Board Bring-Up
//!
//! Configuring the SPI peripheral (clock rate, mode 0, pin muxing) belongs to
//! the board crate. Hand the configured bus and the chip-select pin to
//! [`SpiTransport::new`]; [`Transport::setup`] only parks chip-select high.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::error::{IoError, Result};

// =============================================================================
// Transport Trait
// =============================================================================

/// Full-duplex byte exchange with chip-select bracketing
///
/// Implementations must not retry or reorder: the driver relies on every
/// exchanged byte reaching the chip in call order.
pub trait Transport {
    /// One-time bring-up hook, called from the driver's basic setup
    fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Assert chip-select, opening a command bracket
    fn select(&mut self) -> Result<()>;

    /// Release chip-select, closing the command bracket
    fn deselect(&mut self) -> Result<()>;

    /// Clock one byte out and return the byte clocked in
    fn exchange(&mut self, byte: u8) -> Result<u8>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn setup(&mut self) -> Result<()> {
        T::setup(self)
    }

    fn select(&mut self) -> Result<()> {
        T::select(self)
    }

    fn deselect(&mut self) -> Result<()> {
        T::deselect(self)
    }

    fn exchange(&mut self, byte: u8) -> Result<u8> {
        T::exchange(self, byte)
    }
}

// =============================================================================
// embedded-hal Transport
// =============================================================================

/// [`Transport`] over an `embedded-hal` SPI bus and an active-low chip-select
///
/// The bus must be configured for SPI mode 0 at no more than 20 MHz.
#[derive(Debug)]
pub struct SpiTransport<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> SpiTransport<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    /// Wrap a configured bus and chip-select pin
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    /// Give back the bus and pin
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> Transport for SpiTransport<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    fn setup(&mut self) -> Result<()> {
        self.cs.set_high().map_err(|_| IoError::Transport.into())
    }

    fn select(&mut self) -> Result<()> {
        self.cs.set_low().map_err(|_| IoError::Transport.into())
    }

    fn deselect(&mut self) -> Result<()> {
        // CS must not rise while the last byte is still shifting
        self.spi.flush().map_err(|_| IoError::Transport)?;
        self.cs.set_high().map_err(|_| IoError::Transport.into())
    }

    fn exchange(&mut self, byte: u8) -> Result<u8> {
        let mut word = [byte];
        self.spi
            .transfer_in_place(&mut word)
            .map_err(|_| IoError::Transport)?;
        Ok(word[0])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
