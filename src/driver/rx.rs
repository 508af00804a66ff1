//! Receive pipeline
//!
//! Every frame in the RX ring is preceded by a 6-byte header written by the
//! hardware. Consuming a frame walks `Idle → HeaderRead → PayloadRead →
//! Idle`:
//!
//! 1. [`receive_begin`](Enc28j60::receive_begin) reads the header at the
//!    receive cursor.
//! 2. [`receive_drain`](Enc28j60::receive_drain) streams the payload into a
//!    [`FrameSink`], continuing from where the header read stopped.
//! 3. [`receive_end`](Enc28j60::receive_end) moves the cursor and frees the
//!    ring space.
//!
//! [`poll_receive`](Enc28j60::poll_receive) runs the whole sequence and
//! drops degenerate frames on the way.

use super::enc28j60::{Enc28j60, RxPhase};
use crate::error::{BufferError, Error, IoError, Result};
use crate::hal::transport::Transport;
use crate::internal::constants::{
    CRC_SIZE, PKTDEC_FLUSH_LIMIT, RX_BYTE_COUNT_SANITY, RX_HEADER_SIZE, RX_START,
};
use crate::internal::register::{ECON1, ECON2, ERXRDPTL, econ1, econ2};

// =============================================================================
// Frame Header
// =============================================================================

/// Receive status word (bits 16..=31 of the receive status vector)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxStatus(u16);

impl RxStatus {
    const LONG_EVENT: u16 = 1 << 0;
    const CARRIER_EVENT: u16 = 1 << 2;
    const CRC_ERROR: u16 = 1 << 4;
    const LENGTH_CHECK_ERROR: u16 = 1 << 5;
    const LENGTH_OUT_OF_RANGE: u16 = 1 << 6;
    const RECEIVED_OK: u16 = 1 << 7;
    const MULTICAST: u16 = 1 << 8;
    const BROADCAST: u16 = 1 << 9;
    const DRIBBLE_NIBBLE: u16 = 1 << 10;
    const CONTROL_FRAME: u16 = 1 << 11;
    const PAUSE_FRAME: u16 = 1 << 12;
    const UNKNOWN_OPCODE: u16 = 1 << 13;
    const VLAN: u16 = 1 << 14;

    /// Wrap a raw status word
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw status word
    pub const fn bits(&self) -> u16 {
        self.0
    }

    const fn has(&self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    /// Frame was received without CRC or length errors
    pub const fn received_ok(&self) -> bool {
        self.has(Self::RECEIVED_OK)
    }

    /// CRC did not match
    pub const fn crc_error(&self) -> bool {
        self.has(Self::CRC_ERROR)
    }

    /// Type/length field did not match the payload size
    pub const fn length_check_error(&self) -> bool {
        self.has(Self::LENGTH_CHECK_ERROR)
    }

    /// Type/length field larger than 1500
    pub const fn length_out_of_range(&self) -> bool {
        self.has(Self::LENGTH_OUT_OF_RANGE)
    }

    /// Packet longer than 50 000 bit times, or dropped
    pub const fn long_event(&self) -> bool {
        self.has(Self::LONG_EVENT)
    }

    /// Carrier event seen since the last receive
    pub const fn carrier_event(&self) -> bool {
        self.has(Self::CARRIER_EVENT)
    }

    /// Destination was a multicast address
    pub const fn multicast(&self) -> bool {
        self.has(Self::MULTICAST)
    }

    /// Destination was the broadcast address
    pub const fn broadcast(&self) -> bool {
        self.has(Self::BROADCAST)
    }

    /// Extra bits received after the last full byte
    pub const fn dribble_nibble(&self) -> bool {
        self.has(Self::DRIBBLE_NIBBLE)
    }

    /// MAC control frame
    pub const fn control_frame(&self) -> bool {
        self.has(Self::CONTROL_FRAME)
    }

    /// PAUSE control frame
    pub const fn pause_frame(&self) -> bool {
        self.has(Self::PAUSE_FRAME)
    }

    /// Control frame with an unsupported opcode
    pub const fn unknown_opcode(&self) -> bool {
        self.has(Self::UNKNOWN_OPCODE)
    }

    /// VLAN-tagged frame
    pub const fn vlan(&self) -> bool {
        self.has(Self::VLAN)
    }
}

/// Hardware header in front of every received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Address of the following frame's header
    pub next_pointer: u16,
    /// Frame length including the 4-byte CRC
    pub byte_count: u16,
    /// Receive status flags
    pub status: RxStatus,
}

impl FrameHeader {
    /// Decode the 6 header bytes as read from the ring
    pub const fn parse(raw: &[u8; RX_HEADER_SIZE]) -> Self {
        Self {
            next_pointer: u16::from_le_bytes([raw[0], raw[1]]),
            byte_count: u16::from_le_bytes([raw[2], raw[3] & 0x7F]),
            status: RxStatus::from_bits(u16::from_le_bytes([raw[4], raw[5]])),
        }
    }
}

/// Outcome of [`Enc28j60::poll_receive`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceivedFrame {
    /// Header as read from the ring
    pub header: FrameHeader,
    /// Frame length without CRC
    pub frame_len: usize,
    /// Bytes actually copied into the caller's buffer
    pub copied: usize,
}

impl ReceivedFrame {
    /// Whether the caller's buffer was too small for the frame
    pub const fn is_truncated(&self) -> bool {
        self.copied < self.frame_len
    }
}

// =============================================================================
// Frame Sinks
// =============================================================================

/// Sequential byte destination for buffer memory reads
///
/// Ring-read logic exists once in the driver; contiguous and segmented
/// destinations only differ in where [`put`](FrameSink::put) stores a byte.
pub trait FrameSink {
    /// Bytes that can still be accepted
    fn capacity(&self) -> usize;

    /// Store the next byte; bytes beyond capacity are discarded
    fn put(&mut self, byte: u8);
}

/// Contiguous destination
#[derive(Debug)]
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    written: usize,
}

impl<'a> SliceSink<'a> {
    /// Fill `buf` from the start
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, written: 0 }
    }

    /// Bytes stored so far
    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for SliceSink<'_> {
    fn capacity(&self) -> usize {
        self.buf.len() - self.written
    }

    fn put(&mut self, byte: u8) {
        if let Some(slot) = self.buf.get_mut(self.written) {
            *slot = byte;
            self.written += 1;
        }
    }
}

/// Destination made of several buffers filled in order
#[derive(Debug)]
pub struct SegmentedSink<'a, 'b> {
    segments: &'a mut [&'b mut [u8]],
    index: usize,
    offset: usize,
    written: usize,
}

impl<'a, 'b> SegmentedSink<'a, 'b> {
    /// Fill `segments` one after another
    pub fn new(segments: &'a mut [&'b mut [u8]]) -> Self {
        Self {
            segments,
            index: 0,
            offset: 0,
            written: 0,
        }
    }

    /// Bytes stored so far
    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for SegmentedSink<'_, '_> {
    fn capacity(&self) -> usize {
        let total: usize = self.segments.iter().map(|s| s.len()).sum();
        total - self.written
    }

    fn put(&mut self, byte: u8) {
        while let Some(segment) = self.segments.get_mut(self.index) {
            if let Some(slot) = segment.get_mut(self.offset) {
                *slot = byte;
                self.offset += 1;
                self.written += 1;
                return;
            }
            self.index += 1;
            self.offset = 0;
        }
    }
}

// =============================================================================
// Receive Pipeline
// =============================================================================

impl<T: Transport> Enc28j60<T> {
    /// Read the header of the frame at the receive cursor
    ///
    /// # Errors
    /// - `InvalidState` - a previous frame was not retired
    /// - `RegionNotConfigured` - RX end never configured
    /// - `NoFrame` - packet counter is zero
    /// - `CorruptHeader` - next pointer lies outside the RX ring; the ring
    ///   has been restarted and every pending frame is lost
    pub fn receive_begin(&mut self) -> Result<FrameHeader> {
        if self.session.rx != RxPhase::Idle {
            return Err(IoError::InvalidState.into());
        }
        let rx_end = self.session.rx_end.ok_or(BufferError::RegionNotConfigured)?;
        if self.packet_count()? == 0 {
            return Err(IoError::NoFrame.into());
        }

        let mut raw = [0u8; RX_HEADER_SIZE];
        let mut sink = SliceSink::new(&mut raw);
        self.read_buffer(Some(self.session.next_frame), RX_HEADER_SIZE, &mut sink)?;
        let header = FrameHeader::parse(&raw);

        if header.next_pointer > rx_end {
            #[cfg(feature = "defmt")]
            defmt::error!(
                "RX header at {=u16:#x} points to {=u16:#x}, outside ring",
                self.session.next_frame,
                header.next_pointer
            );
            self.restart_receive(rx_end)?;
            return Err(BufferError::CorruptHeader.into());
        }

        self.session.rx = RxPhase::HeaderRead(header);
        Ok(header)
    }

    /// Copy the current frame into `sink`
    ///
    /// Reads `min(byte_count, capacity)` bytes and returns the true
    /// `byte_count`, so a return value larger than the sink's capacity means
    /// the frame was truncated. The rest stays in the ring and is skipped by
    /// [`receive_end`](Self::receive_end).
    pub fn receive_drain<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let header = match self.session.rx {
            RxPhase::HeaderRead(header) => header,
            _ => return Err(IoError::InvalidState.into()),
        };
        let byte_count = usize::from(header.byte_count);
        self.drain_at_most(header, byte_count, sink)?;
        Ok(byte_count)
    }

    /// Retire the current frame
    ///
    /// Moves the cursor to the header's next pointer and hands the space
    /// back to the hardware through ERXRDPT, then decrements EPKTCNT. ERXRDPT
    /// must stay odd and inside the ring, so a cursor of zero writes the RX
    /// end instead of `cursor - 1` (errata item 14).
    pub fn receive_end(&mut self) -> Result<()> {
        let header = match self.session.rx {
            RxPhase::HeaderRead(header) | RxPhase::PayloadRead(header) => header,
            RxPhase::Idle => return Err(IoError::InvalidState.into()),
        };
        let rx_end = self.session.rx_end.ok_or(BufferError::RegionNotConfigured)?;

        let read_pointer = match header.next_pointer {
            0 => rx_end,
            cursor => cursor - 1,
        };
        self.write_reg16(ERXRDPTL, read_pointer)?;
        self.set_bits(ECON2, econ2::PKTDEC)?;

        // Commit only once the hardware has taken the frame back
        self.session.next_frame = header.next_pointer;
        self.session.rx = RxPhase::Idle;
        Ok(())
    }

    /// Receive the next frame into `buf`
    ///
    /// Returns `Ok(None)` when no frame is pending. Frames shorter than the
    /// CRC or with an implausible byte count are retired and dropped. The
    /// CRC is not copied; `frame_len` excludes it.
    ///
    /// A corrupt header restarts the RX ring and yields `Ok(None)`; the
    /// frames pending at that point are lost. If a previous call failed in
    /// the middle of a frame, that frame is retired and dropped first.
    ///
    /// # Errors
    /// - `InvalidState` - Ethernet setup not completed
    /// - `Transport` - the SPI bus failed; polling again is safe
    pub fn poll_receive(&mut self, buf: &mut [u8]) -> Result<Option<ReceivedFrame>> {
        let mut sink = SliceSink::new(buf);
        self.poll_receive_into(&mut sink)
    }

    /// Receive the next frame into an arbitrary [`FrameSink`]
    pub fn poll_receive_into<S: FrameSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<Option<ReceivedFrame>> {
        self.ensure_running()?;

        if self.session.rx != RxPhase::Idle {
            #[cfg(feature = "defmt")]
            defmt::warn!("dropping frame left half-read by a failed poll");
            self.receive_end()?;
        }

        while self.packet_count()? > 0 {
            let header = match self.receive_begin() {
                Ok(header) => header,
                Err(Error::Buffer(BufferError::CorruptHeader)) => return Ok(None),
                Err(e) => return Err(e),
            };

            if header.byte_count < CRC_SIZE as u16 || header.byte_count > RX_BYTE_COUNT_SANITY {
                #[cfg(feature = "defmt")]
                defmt::warn!("dropping frame with byte count {=u16}", header.byte_count);
                self.receive_end()?;
                continue;
            }

            let frame_len = usize::from(header.byte_count) - CRC_SIZE;
            let copied = frame_len.min(sink.capacity());
            self.drain_at_most(header, copied, sink)?;
            self.receive_end()?;

            if copied < frame_len {
                #[cfg(feature = "defmt")]
                defmt::warn!("frame truncated: {=usize} of {=usize} bytes", copied, frame_len);
            }

            return Ok(Some(ReceivedFrame {
                header,
                frame_len,
                copied,
            }));
        }

        Ok(None)
    }

    /// Put the RX ring back at its start, discarding everything in it
    ///
    /// RX logic is held in reset while EPKTCNT is drained, which moves the
    /// hardware write pointer back to ERXST.
    fn restart_receive(&mut self, rx_end: u16) -> Result<()> {
        self.session.rx = RxPhase::Idle;
        self.set_bits(ECON1, econ1::RXRST)?;
        self.drop_pending_frames()?;
        self.clear_bits(ECON1, econ1::RXRST)?;

        self.session.next_frame = RX_START;
        // Cursor zero retires to the ring end
        self.write_reg16(ERXRDPTL, rx_end)?;
        self.set_bits(ECON1, econ1::RXEN)?;

        #[cfg(feature = "defmt")]
        defmt::warn!("RX ring restarted");

        Ok(())
    }

    /// Decrement EPKTCNT until it reads zero, within a fixed bound
    pub(crate) fn drop_pending_frames(&mut self) -> Result<()> {
        for _ in 0..PKTDEC_FLUSH_LIMIT {
            if self.packet_count()? == 0 {
                break;
            }
            self.set_bits(ECON2, econ2::PKTDEC)?;
        }
        Ok(())
    }

    /// Read up to `limit` payload bytes, continuing after the header
    fn drain_at_most<S: FrameSink + ?Sized>(
        &mut self,
        header: FrameHeader,
        limit: usize,
        sink: &mut S,
    ) -> Result<()> {
        let len = limit.min(sink.capacity());
        self.read_buffer(None, len, sink)?;
        self.session.rx = RxPhase::PayloadRead(header);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
