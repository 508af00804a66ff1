//! ENC28J60 control register map
//!
//! Every control register is described once by a [`Register`] value that
//! carries its bank, its 5-bit address and its access class. The register
//! facade consults the descriptor; call sites never decide bank switching or
//! dummy cycles themselves.
//!
//! Bit fields are grouped in one module per register, after the data sheet
//! names (`econ1::TXRTS`, `macon3::TXCRCEN`, ...).

// =============================================================================
// Descriptor Types
// =============================================================================

/// One of the four control register pages selected by `ECON1.BSEL1:BSEL0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Bank {
    /// Bank 0: buffer pointers and DMA
    Bank0 = 0,
    /// Bank 1: hash table, pattern match, receive filter, packet counter
    Bank1 = 1,
    /// Bank 2: MAC and MII control
    Bank2 = 2,
    /// Bank 3: station address, self-test, MII status, revision
    Bank3 = 3,
}

impl Bank {
    /// Value of the `BSEL1:BSEL0` field for this bank
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// How a register behaves on the SPI read path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessClass {
    /// ETH register: the value follows the opcode directly; supports BFS/BFC
    Eth,
    /// MAC or MII register: a dummy byte precedes the value; no BFS/BFC
    MacMii,
}

/// Control register descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    bank: Option<Bank>,
    address: u8,
    class: AccessClass,
}

impl Register {
    /// ETH register living in `bank`
    pub const fn eth(bank: Bank, address: u8) -> Self {
        Self {
            bank: Some(bank),
            address,
            class: AccessClass::Eth,
        }
    }

    /// MAC/MII register living in `bank`
    pub const fn mac(bank: Bank, address: u8) -> Self {
        Self {
            bank: Some(bank),
            address,
            class: AccessClass::MacMii,
        }
    }

    /// ETH register mapped into every bank (`0x1B..=0x1F`)
    pub const fn common(address: u8) -> Self {
        Self {
            bank: None,
            address,
            class: AccessClass::Eth,
        }
    }

    /// Bank this register lives in, `None` if reachable from all banks
    pub const fn bank(&self) -> Option<Bank> {
        self.bank
    }

    /// 5-bit register address within its bank
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Access class of the register
    pub const fn class(&self) -> AccessClass {
        self.class
    }

    /// Whether a read needs an extra exchange to shift out the value
    pub const fn needs_dummy_byte(&self) -> bool {
        matches!(self.class, AccessClass::MacMii)
    }

    /// Whether BFS/BFC commands act on this register
    pub const fn supports_bit_field_ops(&self) -> bool {
        matches!(self.class, AccessClass::Eth)
    }

    /// Upper half of a 16-bit register pair whose low byte is `self`
    pub const fn high(&self) -> Self {
        Self {
            bank: self.bank,
            address: self.address + 1,
            class: self.class,
        }
    }
}

// =============================================================================
// Common Registers (all banks)
// =============================================================================

/// Ethernet interrupt enable
pub const EIE: Register = Register::common(0x1B);
/// Ethernet interrupt request flags
pub const EIR: Register = Register::common(0x1C);
/// Ethernet status
pub const ESTAT: Register = Register::common(0x1D);
/// Ethernet control 2
pub const ECON2: Register = Register::common(0x1E);
/// Ethernet control 1 (holds the bank select bits)
pub const ECON1: Register = Register::common(0x1F);

// =============================================================================
// Bank 0
// =============================================================================

/// Buffer read pointer (low byte)
pub const ERDPTL: Register = Register::eth(Bank::Bank0, 0x00);
/// Buffer write pointer (low byte)
pub const EWRPTL: Register = Register::eth(Bank::Bank0, 0x02);
/// TX start (low byte)
pub const ETXSTL: Register = Register::eth(Bank::Bank0, 0x04);
/// TX end (low byte)
pub const ETXNDL: Register = Register::eth(Bank::Bank0, 0x06);
/// RX start (low byte)
pub const ERXSTL: Register = Register::eth(Bank::Bank0, 0x08);
/// RX end (low byte)
pub const ERXNDL: Register = Register::eth(Bank::Bank0, 0x0A);
/// RX read pointer (low byte); the pair latches on the high-byte write
pub const ERXRDPTL: Register = Register::eth(Bank::Bank0, 0x0C);
/// RX write pointer (low byte), hardware-owned
pub const ERXWRPTL: Register = Register::eth(Bank::Bank0, 0x0E);

// =============================================================================
// Bank 1
// =============================================================================

/// Receive filter control
pub const ERXFCON: Register = Register::eth(Bank::Bank1, 0x18);
/// Pending received packet count
pub const EPKTCNT: Register = Register::eth(Bank::Bank1, 0x19);

// =============================================================================
// Bank 2
// =============================================================================

/// MAC control 1
pub const MACON1: Register = Register::mac(Bank::Bank2, 0x00);
/// MAC control 3
pub const MACON3: Register = Register::mac(Bank::Bank2, 0x02);
/// MAC control 4
pub const MACON4: Register = Register::mac(Bank::Bank2, 0x03);
/// Back-to-back inter-packet gap
pub const MABBIPG: Register = Register::mac(Bank::Bank2, 0x04);
/// Non-back-to-back inter-packet gap, low byte
pub const MAIPGL: Register = Register::mac(Bank::Bank2, 0x06);
/// Non-back-to-back inter-packet gap, high byte
pub const MAIPGH: Register = Register::mac(Bank::Bank2, 0x07);
/// Maximum frame length (low byte)
pub const MAMXFLL: Register = Register::mac(Bank::Bank2, 0x0A);
/// MII command
pub const MICMD: Register = Register::mac(Bank::Bank2, 0x12);
/// MII PHY register address
pub const MIREGADR: Register = Register::mac(Bank::Bank2, 0x14);
/// MII write data (low byte); writing the high byte starts the transaction
pub const MIWRL: Register = Register::mac(Bank::Bank2, 0x16);
/// MII read data (low byte)
pub const MIRDL: Register = Register::mac(Bank::Bank2, 0x18);

// =============================================================================
// Bank 3
// =============================================================================

/// Station address byte 5
pub const MAADR5: Register = Register::mac(Bank::Bank3, 0x00);
/// Station address byte 6
pub const MAADR6: Register = Register::mac(Bank::Bank3, 0x01);
/// Station address byte 3
pub const MAADR3: Register = Register::mac(Bank::Bank3, 0x02);
/// Station address byte 4
pub const MAADR4: Register = Register::mac(Bank::Bank3, 0x03);
/// Station address byte 1 (first on the wire)
pub const MAADR1: Register = Register::mac(Bank::Bank3, 0x04);
/// Station address byte 2
pub const MAADR2: Register = Register::mac(Bank::Bank3, 0x05);
/// MII status
pub const MISTAT: Register = Register::mac(Bank::Bank3, 0x0A);
/// Silicon revision
pub const EREVID: Register = Register::eth(Bank::Bank3, 0x12);

/// Station address registers in wire order (`mac[0]` goes to `MAADR1`)
pub const MAADR: [Register; 6] = [MAADR1, MAADR2, MAADR3, MAADR4, MAADR5, MAADR6];

// =============================================================================
// Bit Fields
// =============================================================================

/// ECON1 bits
pub mod econ1 {
    /// Transmit logic reset
    pub const TXRST: u8 = 1 << 7;
    /// Receive logic reset
    pub const RXRST: u8 = 1 << 6;
    /// DMA start/busy
    pub const DMAST: u8 = 1 << 5;
    /// DMA checksum enable
    pub const CSUMEN: u8 = 1 << 4;
    /// Transmit request to send
    pub const TXRTS: u8 = 1 << 3;
    /// Receive enable
    pub const RXEN: u8 = 1 << 2;
    /// Bank select mask
    pub const BSEL_MASK: u8 = 0x03;
}

/// ECON2 bits
pub mod econ2 {
    /// Automatic buffer pointer increment
    pub const AUTOINC: u8 = 1 << 7;
    /// Packet decrement (self-clearing)
    pub const PKTDEC: u8 = 1 << 6;
    /// Power save enable
    pub const PWRSV: u8 = 1 << 5;
    /// Voltage regulator power save
    pub const VRPS: u8 = 1 << 3;
}

/// ESTAT bits
pub mod estat {
    /// INT interrupt flag
    pub const INT: u8 = 1 << 7;
    /// Ethernet buffer error
    pub const BUFER: u8 = 1 << 6;
    /// Late collision
    pub const LATECOL: u8 = 1 << 4;
    /// Receive busy
    pub const RXBUSY: u8 = 1 << 2;
    /// Transmit abort
    pub const TXABRT: u8 = 1 << 1;
    /// Oscillator start-up timer expired
    pub const CLKRDY: u8 = 1 << 0;
}

/// ERXFCON bits
pub mod erxfcon {
    /// Unicast filter enable
    pub const UCEN: u8 = 1 << 7;
    /// AND/OR filter select
    pub const ANDOR: u8 = 1 << 6;
    /// Post-filter CRC check enable
    pub const CRCEN: u8 = 1 << 5;
    /// Pattern match filter enable
    pub const PMEN: u8 = 1 << 4;
    /// Magic packet filter enable
    pub const MPEN: u8 = 1 << 3;
    /// Hash table filter enable
    pub const HTEN: u8 = 1 << 2;
    /// Multicast filter enable
    pub const MCEN: u8 = 1 << 1;
    /// Broadcast filter enable
    pub const BCEN: u8 = 1 << 0;
}

/// MACON1 bits
pub mod macon1 {
    /// Pause control frame transmission enable
    pub const TXPAUS: u8 = 1 << 3;
    /// Pause control frame reception enable
    pub const RXPAUS: u8 = 1 << 2;
    /// Pass all received frames
    pub const PASSALL: u8 = 1 << 1;
    /// MAC receive enable
    pub const MARXEN: u8 = 1 << 0;
}

/// MACON3 bits
pub mod macon3 {
    /// Pad short frames to 60 bytes and always append a CRC
    pub const PADCFG_60: u8 = 0b001 << 5;
    /// Transmit CRC enable
    pub const TXCRCEN: u8 = 1 << 4;
    /// Proprietary header enable
    pub const PHDREN: u8 = 1 << 3;
    /// Huge frame enable
    pub const HFRMEN: u8 = 1 << 2;
    /// Frame length checking enable
    pub const FRMLNEN: u8 = 1 << 1;
    /// MAC full-duplex enable
    pub const FULDPX: u8 = 1 << 0;
}

/// MICMD bits
pub mod micmd {
    /// MII scan enable
    pub const MIISCAN: u8 = 1 << 1;
    /// MII read enable
    pub const MIIRD: u8 = 1 << 0;
}

/// MISTAT bits
pub mod mistat {
    /// MII management read data not valid
    pub const NVALID: u8 = 1 << 2;
    /// MII management scan operation
    pub const SCAN: u8 = 1 << 1;
    /// MII management busy
    pub const BUSY: u8 = 1 << 0;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_registers_have_no_bank() {
        for reg in [EIE, EIR, ESTAT, ECON2, ECON1] {
            assert_eq!(reg.bank(), None);
            assert!(reg.supports_bit_field_ops());
        }
    }

    #[test]
    fn mac_and_mii_registers_need_dummy_byte() {
        for reg in [MACON1, MACON3, MAIPGL, MICMD, MIREGADR, MIRDL, MISTAT, MAADR1] {
            assert!(reg.needs_dummy_byte(), "{reg:?} should need a dummy byte");
            assert!(!reg.supports_bit_field_ops());
        }
    }

    #[test]
    fn eth_registers_read_directly() {
        for reg in [ERDPTL, ERXNDL, EPKTCNT, EREVID, ERXFCON] {
            assert!(!reg.needs_dummy_byte());
        }
    }

    #[test]
    fn high_half_keeps_bank_and_class() {
        let high = MIRDL.high();
        assert_eq!(high.address(), 0x19);
        assert_eq!(high.bank(), Some(Bank::Bank2));
        assert_eq!(high.class(), AccessClass::MacMii);
    }

    #[test]
    fn station_address_wire_order() {
        let addresses: [u8; 6] = MAADR.map(|r| r.address());
        assert_eq!(addresses, [0x04, 0x05, 0x02, 0x03, 0x00, 0x01]);
    }

    #[test]
    fn bank_bits_fit_select_mask() {
        for bank in [Bank::Bank0, Bank::Bank1, Bank::Bank2, Bank::Bank3] {
            assert_eq!(bank.bits() & !econ1::BSEL_MASK, 0);
        }
    }
}
