//! Testing utilities and a simulated ENC28J60
//!
//! [`SimulatedChip`] decodes the SPI command stream byte by byte and models
//! enough of the silicon to run the driver on the host: banked control
//! registers, MAC/MII dummy bytes, 8 KiB of buffer memory with pointer
//! auto-increment and RX wraparound, the packet counter, the transmit engine
//! and the MII engine. Faults (stuck TXRTS, stuck MII busy, noisy ESTAT,
//! corrupted RAM cells, odd revisions) can be switched on per test.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use std::collections::VecDeque;
use std::vec;
use std::vec::Vec;

use crate::error::{IoError, Result};
use crate::hal::transport::Transport;
use crate::internal::constants::{
    ADDRESS_MASK, CRC_SIZE, OPCODE_BFC, OPCODE_BFS, OPCODE_RBM, OPCODE_RCR, OPCODE_SRC,
    OPCODE_WBM, OPCODE_WCR, RAM_END, RAM_SIZE, RX_HEADER_SIZE, TX_STATUS_SIZE,
};
use crate::internal::phy_regs::{ENC28J60_PHY_ID, phstat1, phstat2, phy_reg};
use crate::internal::register::{
    ECON1, ECON2, EPKTCNT, ERDPTL, EREVID, ERXFCON, ERXNDL, ERXSTL, ERXWRPTL, ESTAT, ETXNDL,
    ETXSTL, EWRPTL, MAMXFLL, MICMD, MIRDL, MIREGADR, MISTAT, MIWRL, econ1, econ2, estat, micmd,
    mistat,
};

/// Byte shifted out in place of the value during a MAC/MII dummy cycle
pub const DUMMY_BYTE: u8 = 0xA5;

/// Completed SPI command, as seen by the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read { bank: u8, address: u8 },
    Write { bank: u8, address: u8, value: u8 },
    SetBits { bank: u8, address: u8, mask: u8 },
    ClearBits { bank: u8, address: u8, mask: u8 },
    ReadBuffer { len: usize },
    WriteBuffer { len: usize },
    SystemReset,
}

/// Position inside the current chip-select bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Deselected,
    Opcode,
    ReadReg { address: u8, dummy: bool },
    WriteReg { address: u8 },
    SetBits { address: u8 },
    ClearBits { address: u8 },
    ReadBuffer { len: usize },
    WriteBuffer { len: usize },
    Done,
}

/// Simulated ENC28J60 behind a [`Transport`]
#[derive(Debug)]
pub struct SimulatedChip {
    /// Control registers per bank; common registers live in bank 0
    regs: [[u8; 32]; 4],
    memory: Vec<u8>,
    phy: [u16; 32],
    phase: Phase,
    revision: u8,
    packet_count: u8,
    /// Hardware RX write position used by frame injection
    rx_write: u16,
    estat_script: VecDeque<u8>,
    estat_cycle: Vec<u8>,
    estat_index: usize,
    corrupt: Option<u16>,
    /// Buffer bytes still readable before one exchange fails
    buffer_read_fault: Option<usize>,
    stuck_transmit: bool,
    tx_busy_polls: u32,
    tx_busy_remaining: u32,
    tx_aborts: usize,
    mii_stuck: bool,
    mii_busy_polls: u32,
    mii_busy_remaining: u32,
    sent: Vec<Vec<u8>>,
    ops: Vec<Op>,
    setups: usize,
}

impl Default for SimulatedChip {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedChip {
    /// Healthy rev B7 chip right after power-up, link down
    pub fn new() -> Self {
        let mut chip = Self {
            regs: [[0; 32]; 4],
            memory: vec![0; RAM_SIZE],
            phy: [0; 32],
            phase: Phase::Deselected,
            revision: 0x06,
            packet_count: 0,
            rx_write: 0,
            estat_script: VecDeque::new(),
            estat_cycle: Vec::new(),
            estat_index: 0,
            corrupt: None,
            buffer_read_fault: None,
            stuck_transmit: false,
            tx_busy_polls: 0,
            tx_busy_remaining: 0,
            tx_aborts: 0,
            mii_stuck: false,
            mii_busy_polls: 0,
            mii_busy_remaining: 0,
            sent: Vec::new(),
            ops: Vec::new(),
            setups: 0,
        };
        chip.power_on_registers();
        chip.phy[usize::from(phy_reg::PHID1)] = (ENC28J60_PHY_ID >> 16) as u16;
        chip.phy[usize::from(phy_reg::PHID2)] = ENC28J60_PHY_ID as u16;
        chip.phy[usize::from(phy_reg::PHSTAT1)] = phstat1::PHDPX;
        chip.phy[usize::from(phy_reg::PHLCON)] = 0x3422;
        chip
    }

    fn power_on_registers(&mut self) {
        self.regs = [[0; 32]; 4];
        self.set_register(0, ECON2.address(), econ2::AUTOINC);
        self.set_register(0, ESTAT.address(), estat::CLKRDY);
        self.set_register(1, ERXFCON.address(), 0xA1);
        self.set_register16(0, ERXNDL.address(), RAM_END);
        self.set_register16(0, ERDPTL.address(), 0x05FA);
        self.set_register16(2, MAMXFLL.address(), 0x05EE);
        self.packet_count = 0;
        self.rx_write = 0;
        self.tx_busy_remaining = 0;
        self.mii_busy_remaining = 0;
    }

    // =========================================================================
    // Test Setup
    // =========================================================================

    /// Value returned by EREVID
    pub fn set_revision(&mut self, revision: u8) {
        self.revision = revision;
    }

    /// ESTAT readouts to return before falling back to the register value
    pub fn script_estat(&mut self, readouts: &[u8]) {
        self.estat_script.extend(readouts.iter().copied());
    }

    /// ESTAT readouts to repeat forever
    pub fn cycle_estat(&mut self, readouts: &[u8]) {
        self.estat_cycle = readouts.to_vec();
        self.estat_index = 0;
    }

    /// Store the complement of every byte written to `addr`
    pub fn corrupt_address(&mut self, addr: u16) {
        self.corrupt = Some(addr);
    }

    /// Let `bytes` more buffer bytes through, then fail one exchange
    pub fn fail_buffer_read_after(&mut self, bytes: usize) {
        self.buffer_read_fault = Some(bytes);
    }

    /// Keep TXRTS set until TX logic is reset
    pub fn set_stuck_transmit(&mut self, stuck: bool) {
        self.stuck_transmit = stuck;
    }

    /// ECON1 reads that still see TXRTS after a transmit request
    pub fn set_tx_busy_polls(&mut self, polls: u32) {
        self.tx_busy_polls = polls;
    }

    /// MISTAT reads that still see BUSY after an MII command
    pub fn set_mii_busy_polls(&mut self, polls: u32) {
        self.mii_busy_polls = polls;
    }

    /// Report MISTAT.BUSY forever
    pub fn set_mii_stuck(&mut self, stuck: bool) {
        self.mii_stuck = stuck;
    }

    /// Raise or drop the link
    pub fn set_link(&mut self, up: bool) {
        let stat2 = &mut self.phy[usize::from(phy_reg::PHSTAT2)];
        if up {
            *stat2 |= phstat2::LSTAT;
        } else {
            *stat2 &= !phstat2::LSTAT;
        }
    }

    pub fn set_phy_register(&mut self, reg: u8, value: u16) {
        self.phy[usize::from(reg & ADDRESS_MASK)] = value;
    }

    pub fn set_register(&mut self, bank: u8, address: u8, value: u8) {
        let (b, a) = slot(bank, address);
        self.regs[b][a] = value;
    }

    fn set_register16(&mut self, bank: u8, low: u8, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.set_register(bank, low, lo);
        self.set_register(bank, low + 1, hi);
    }

    pub fn set_packet_count(&mut self, count: u8) {
        self.packet_count = count;
    }

    /// Move the hardware RX write position used by [`inject_frame`](Self::inject_frame)
    pub fn set_rx_write_pointer(&mut self, addr: u16) {
        self.rx_write = addr;
    }

    /// Copy `data` into buffer memory without going through SPI
    pub fn write_memory(&mut self, addr: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.memory[(usize::from(addr) + i) % RAM_SIZE] = byte;
        }
    }

    /// Place a received frame at the RX write position as the hardware would
    ///
    /// A 4-byte CRC placeholder is appended and counted in the header.
    pub fn inject_frame(&mut self, frame: &[u8]) {
        let mut data = frame.to_vec();
        data.extend_from_slice(&[0xC0, 0xFF, 0xEE, 0x00][..CRC_SIZE]);

        let at = self.rx_write;
        let mut next = at;
        for _ in 0..RX_HEADER_SIZE + data.len() {
            next = self.ring_next(next);
        }
        if next % 2 == 1 {
            next = self.ring_next(next);
        }

        let mut status_high = 0u8;
        if frame.len() >= 6 && frame[..6].iter().all(|&b| b == 0xFF) {
            status_high |= 0x02;
        } else if frame.first().is_some_and(|b| b & 0x01 != 0) {
            status_high |= 0x01;
        }

        let [next_lo, next_hi] = next.to_le_bytes();
        let [count_lo, count_hi] = (data.len() as u16).to_le_bytes();
        let header = [next_lo, next_hi, count_lo, count_hi, 0x80, status_high];
        self.inject_raw(at, &header, &data);
    }

    /// Write a raw header and payload into the RX ring at `at`
    ///
    /// The RX write position moves to the header's next pointer and the
    /// packet counter is incremented.
    pub fn inject_raw(&mut self, at: u16, header: &[u8; RX_HEADER_SIZE], payload: &[u8]) {
        let mut addr = at;
        for &byte in header.iter().chain(payload) {
            self.memory[usize::from(addr)] = byte;
            addr = self.ring_next(addr);
        }
        self.rx_write = u16::from_le_bytes([header[0], header[1]]);
        self.packet_count += 1;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn register(&self, bank: u8, address: u8) -> u8 {
        let (b, a) = slot(bank, address);
        self.regs[b][a]
    }

    pub fn register16(&self, bank: u8, low: u8) -> u16 {
        u16::from_le_bytes([self.register(bank, low), self.register(bank, low + 1)])
    }

    pub fn phy_register(&self, reg: u8) -> u16 {
        self.phy[usize::from(reg & ADDRESS_MASK)]
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn packet_count(&self) -> u8 {
        self.packet_count
    }

    /// Bank currently selected in ECON1
    pub fn selected_bank(&self) -> u8 {
        self.regs[0][usize::from(ECON1.address())] & econ1::BSEL_MASK
    }

    /// Frames that left through the transmit engine
    pub fn sent_frames(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Transmit requests aborted by a TX reset
    pub fn tx_aborts(&self) -> usize {
        self.tx_aborts
    }

    /// Calls to [`Transport::setup`]
    pub fn setups(&self) -> usize {
        self.setups
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    // =========================================================================
    // Register Model
    // =========================================================================

    fn is_mac_mii(bank: u8, address: u8) -> bool {
        match bank {
            _ if address >= 0x1B => false,
            2 => true,
            3 => address <= 0x05 || address == MISTAT.address(),
            _ => false,
        }
    }

    fn read_register(&mut self, address: u8) -> u8 {
        let bank = self.selected_bank();
        match (bank, address) {
            (_, a) if a == ESTAT.address() => {
                if let Some(value) = self.estat_script.pop_front() {
                    value
                } else if !self.estat_cycle.is_empty() {
                    let value = self.estat_cycle[self.estat_index % self.estat_cycle.len()];
                    self.estat_index += 1;
                    value
                } else {
                    self.register(bank, a)
                }
            }
            (_, a) if a == ECON1.address() => {
                let pending = self.register(bank, a) & econ1::TXRTS != 0;
                if pending && !self.stuck_transmit {
                    if self.tx_busy_remaining == 0 {
                        self.complete_transmit();
                    } else {
                        self.tx_busy_remaining -= 1;
                    }
                }
                self.register(bank, a)
            }
            (1, a) if a == EPKTCNT.address() => self.packet_count,
            (3, a) if a == EREVID.address() => self.revision,
            (3, a) if a == MISTAT.address() => {
                if self.mii_stuck {
                    mistat::BUSY
                } else if self.mii_busy_remaining > 0 {
                    self.mii_busy_remaining -= 1;
                    mistat::BUSY
                } else {
                    0
                }
            }
            (0, a) if a == ERXWRPTL.address() => self.rx_write.to_le_bytes()[0],
            (0, a) if a == ERXWRPTL.address() + 1 => self.rx_write.to_le_bytes()[1],
            (b, a) => self.register(b, a),
        }
    }

    fn write_register(&mut self, address: u8, value: u8) {
        let bank = self.selected_bank();
        match (bank, address) {
            (_, a) if a == ECON1.address() => self.update_econ1(value),
            (_, a) if a == ECON2.address() => {
                if value & econ2::PKTDEC != 0 {
                    self.packet_count = self.packet_count.saturating_sub(1);
                }
                self.set_register(bank, a, value & !econ2::PKTDEC);
            }
            (2, a) if a == MICMD.address() => {
                self.set_register(bank, a, value);
                if value & micmd::MIIRD != 0 {
                    let reg = self.register(2, MIREGADR.address());
                    let data = self.phy_register(reg);
                    self.set_register16(2, MIRDL.address(), data);
                    self.mii_busy_remaining = self.mii_busy_polls;
                }
            }
            (2, a) if a == MIWRL.address() + 1 => {
                self.set_register(bank, a, value);
                let reg = self.register(2, MIREGADR.address());
                let data = self.register16(2, MIWRL.address());
                self.set_phy_register(reg, data);
                self.mii_busy_remaining = self.mii_busy_polls;
            }
            (b, a) => self.set_register(b, a, value),
        }
    }

    fn update_econ1(&mut self, value: u8) {
        let old = self.register(0, ECON1.address());
        let mut new = value;

        if new & econ1::TXRST != 0 {
            if old & econ1::TXRTS != 0 {
                self.tx_aborts += 1;
            }
            new &= !econ1::TXRTS;
        }
        if new & econ1::RXRST != 0 && old & econ1::RXRST == 0 {
            self.rx_write = self.register16(0, ERXSTL.address());
        }
        if new & econ1::TXRTS != 0 && old & econ1::TXRTS == 0 {
            self.tx_busy_remaining = self.tx_busy_polls;
        }

        self.set_register(0, ECON1.address(), new);
    }

    /// Send the frame between ETXST and ETXND and write its status vector
    fn complete_transmit(&mut self) {
        let start = usize::from(self.register16(0, ETXSTL.address()));
        let end = usize::from(self.register16(0, ETXNDL.address()));
        // First byte at ETXST is the per-packet control byte
        let frame = self.memory[start + 1..=end].to_vec();
        let [len_lo, len_hi] = (frame.len() as u16).to_le_bytes();
        let [wire_lo, wire_hi] = ((frame.len() + CRC_SIZE) as u16).to_le_bytes();
        let status: [u8; TX_STATUS_SIZE] = [len_lo, len_hi, 0x80, 0x00, wire_lo, wire_hi, 0x00];
        for (i, byte) in status.into_iter().enumerate() {
            self.memory[(end + 1 + i) % RAM_SIZE] = byte;
        }
        self.sent.push(frame);

        let control = self.register(0, ECON1.address());
        self.set_register(0, ECON1.address(), control & !econ1::TXRTS);
    }

    // =========================================================================
    // Buffer Memory Model
    // =========================================================================

    fn autoinc(&self) -> bool {
        self.register(0, ECON2.address()) & econ2::AUTOINC != 0
    }

    /// RX ring successor of `addr`
    fn ring_next(&self, addr: u16) -> u16 {
        if addr == self.register16(0, ERXNDL.address()) {
            self.register16(0, ERXSTL.address())
        } else {
            (addr + 1) & RAM_END
        }
    }

    fn read_memory_byte(&mut self) -> u8 {
        let addr = self.register16(0, ERDPTL.address());
        let value = self.memory[usize::from(addr & RAM_END)];
        if self.autoinc() {
            let next = self.ring_next(addr);
            self.set_register16(0, ERDPTL.address(), next);
        }
        value
    }

    fn write_memory_byte(&mut self, byte: u8) {
        let addr = self.register16(0, EWRPTL.address()) & RAM_END;
        self.memory[usize::from(addr)] = if self.corrupt == Some(addr) {
            !byte
        } else {
            byte
        };
        if self.autoinc() {
            self.set_register16(0, EWRPTL.address(), (addr + 1) & RAM_END);
        }
    }

    fn decode_opcode(&mut self, byte: u8) -> Phase {
        let address = byte & ADDRESS_MASK;
        match byte {
            OPCODE_SRC => {
                self.power_on_registers();
                self.ops.push(Op::SystemReset);
                Phase::Done
            }
            OPCODE_RBM => Phase::ReadBuffer { len: 0 },
            OPCODE_WBM => Phase::WriteBuffer { len: 0 },
            _ => match byte & !ADDRESS_MASK {
                OPCODE_RCR => Phase::ReadReg {
                    address,
                    dummy: Self::is_mac_mii(self.selected_bank(), address),
                },
                OPCODE_WCR => Phase::WriteReg { address },
                OPCODE_BFS => Phase::SetBits { address },
                OPCODE_BFC => Phase::ClearBits { address },
                _ => Phase::Done,
            },
        }
    }
}

/// Storage slot for a register; common registers are shared by all banks
fn slot(bank: u8, address: u8) -> (usize, usize) {
    let address = address & ADDRESS_MASK;
    let bank = if address >= 0x1B { 0 } else { bank & 0x03 };
    (usize::from(bank), usize::from(address))
}

impl Transport for SimulatedChip {
    fn setup(&mut self) -> Result<()> {
        self.setups += 1;
        Ok(())
    }

    fn select(&mut self) -> Result<()> {
        assert_eq!(self.phase, Phase::Deselected, "chip-select asserted twice");
        self.phase = Phase::Opcode;
        Ok(())
    }

    fn deselect(&mut self) -> Result<()> {
        match self.phase {
            Phase::ReadBuffer { len } => self.ops.push(Op::ReadBuffer { len }),
            Phase::WriteBuffer { len } => self.ops.push(Op::WriteBuffer { len }),
            _ => {}
        }
        self.phase = Phase::Deselected;
        Ok(())
    }

    fn exchange(&mut self, byte: u8) -> Result<u8> {
        if let Phase::ReadBuffer { .. } = self.phase {
            match self.buffer_read_fault {
                Some(0) => {
                    self.buffer_read_fault = None;
                    return Err(IoError::Transport.into());
                }
                Some(n) => self.buffer_read_fault = Some(n - 1),
                None => {}
            }
        }

        let bank = self.selected_bank();
        let (next, reply) = match self.phase {
            Phase::Deselected => panic!("exchange outside a chip-select bracket"),
            Phase::Opcode => (self.decode_opcode(byte), 0),
            Phase::ReadReg { address, dummy: true } => {
                (Phase::ReadReg { address, dummy: false }, DUMMY_BYTE)
            }
            Phase::ReadReg { address, dummy: false } => {
                self.ops.push(Op::Read { bank, address });
                (Phase::Done, self.read_register(address))
            }
            Phase::WriteReg { address } => {
                self.ops.push(Op::Write { bank, address, value: byte });
                self.write_register(address, byte);
                (Phase::Done, 0)
            }
            Phase::SetBits { address } => {
                self.ops.push(Op::SetBits { bank, address, mask: byte });
                if !Self::is_mac_mii(bank, address) {
                    let value = self.register(bank, address) | byte;
                    self.write_register(address, value);
                }
                (Phase::Done, 0)
            }
            Phase::ClearBits { address } => {
                self.ops.push(Op::ClearBits { bank, address, mask: byte });
                if !Self::is_mac_mii(bank, address) {
                    let value = self.register(bank, address) & !byte;
                    self.write_register(address, value);
                }
                (Phase::Done, 0)
            }
            Phase::ReadBuffer { len } => (Phase::ReadBuffer { len: len + 1 }, self.read_memory_byte()),
            Phase::WriteBuffer { len } => {
                self.write_memory_byte(byte);
                (Phase::WriteBuffer { len: len + 1 }, 0)
            }
            Phase::Done => (Phase::Done, 0),
        };
        self.phase = next;
        Ok(reply)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn command(chip: &mut SimulatedChip, bytes: &[u8]) -> Vec<u8> {
        chip.select().unwrap();
        let reply = bytes.iter().map(|&b| chip.exchange(b).unwrap()).collect();
        chip.deselect().unwrap();
        reply
    }

    #[test]
    fn mac_register_read_shifts_dummy_first() {
        let mut chip = SimulatedChip::new();
        chip.set_register(2, 0x06, 0x12);
        command(&mut chip, &[OPCODE_BFS | 0x1F, 0x02]);

        let reply = command(&mut chip, &[OPCODE_RCR | 0x06, 0, 0]);
        assert_eq!(reply, [0, DUMMY_BYTE, 0x12]);
    }

    #[test]
    fn bit_ops_ignored_on_mac_registers() {
        let mut chip = SimulatedChip::new();
        command(&mut chip, &[OPCODE_BFS | 0x1F, 0x02]);
        command(&mut chip, &[OPCODE_BFS | 0x00, 0x01]);

        assert_eq!(chip.register(2, 0x00), 0);
    }

    #[test]
    fn pktdec_decrements_counter() {
        let mut chip = SimulatedChip::new();
        chip.set_packet_count(2);
        command(&mut chip, &[OPCODE_BFS | ECON2.address(), econ2::PKTDEC]);

        assert_eq!(chip.packet_count(), 1);
        assert_eq!(chip.register(0, ECON2.address()) & econ2::PKTDEC, 0);
    }

    #[test]
    fn read_pointer_wraps_at_rx_end() {
        let mut chip = SimulatedChip::new();
        chip.set_register16(0, ERXNDL.address(), 0x0003);
        chip.write_memory(0, &[10, 11, 12, 13]);
        chip.set_register16(0, ERDPTL.address(), 0x0002);

        let reply = command(&mut chip, &[OPCODE_RBM, 0, 0, 0, 0]);
        assert_eq!(&reply[1..], &[12, 13, 10, 11]);
    }

    #[test]
    fn soft_reset_restores_power_on_values() {
        let mut chip = SimulatedChip::new();
        command(&mut chip, &[OPCODE_BFS | 0x1F, 0x03]);
        chip.set_packet_count(4);

        command(&mut chip, &[OPCODE_SRC]);

        assert_eq!(chip.selected_bank(), 0);
        assert_eq!(chip.packet_count(), 0);
        assert_eq!(chip.register16(0, ERXNDL.address()), RAM_END);
        assert_eq!(chip.ops().last(), Some(&Op::SystemReset));
    }
}
