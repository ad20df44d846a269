/*
 * SPDX-License-Identifier: MIT
 */

//! BCM283x DMA controller, one channel's register window.
//!
//! Channels 0 through 14 sit back to back at `0x7000 + 0x100 * channel`
//! inside the peripheral window; channel 15 lives on its own page and is
//! never used here.

use tock_registers::{register_bitfields, register_structs, registers::ReadWrite};

/// Offset of channel 0's registers inside the peripheral window.
pub const DMA_OFFSET: u32 = 0x0000_7000;
/// Register stride between adjacent channels.
pub const DMA_CHANNEL_STRIDE: u32 = 0x100;

/// DREQ peripheral map numbers for the two serializers we can feed.
pub const PERMAP_PCM_TX: u32 = 2;
pub const PERMAP_PWM: u32 = 5;

register_bitfields! {
    u32,

    /// Control and status.
    pub CS [
        RESET OFFSET(31) NUMBITS(1) [],
        ABORT OFFSET(30) NUMBITS(1) [],
        DISDEBUG OFFSET(29) NUMBITS(1) [],
        WAIT_OUTSTANDING_WRITES OFFSET(28) NUMBITS(1) [],
        PANIC_PRIORITY OFFSET(20) NUMBITS(4) [],
        PRIORITY OFFSET(16) NUMBITS(4) [],
        ERROR OFFSET(8) NUMBITS(1) [],
        WAITING_OUTSTANDING_WRITES OFFSET(6) NUMBITS(1) [],
        DREQ_STOPS_DMA OFFSET(5) NUMBITS(1) [],
        PAUSED OFFSET(4) NUMBITS(1) [],
        DREQ OFFSET(3) NUMBITS(1) [],
        INT OFFSET(2) NUMBITS(1) [],
        END OFFSET(1) NUMBITS(1) [],
        ACTIVE OFFSET(0) NUMBITS(1) []
    ],

    /// Transfer information, mirrored from the active control block.
    pub TI [
        NO_WIDE_BURSTS OFFSET(26) NUMBITS(1) [],
        WAITS OFFSET(21) NUMBITS(5) [],
        PERMAP OFFSET(16) NUMBITS(5) [],
        BURST_LENGTH OFFSET(12) NUMBITS(4) [],
        SRC_IGNORE OFFSET(11) NUMBITS(1) [],
        SRC_DREQ OFFSET(10) NUMBITS(1) [],
        SRC_WIDTH OFFSET(9) NUMBITS(1) [],
        SRC_INC OFFSET(8) NUMBITS(1) [],
        DEST_IGNORE OFFSET(7) NUMBITS(1) [],
        DEST_DREQ OFFSET(6) NUMBITS(1) [],
        DEST_WIDTH OFFSET(5) NUMBITS(1) [],
        DEST_INC OFFSET(4) NUMBITS(1) [],
        WAIT_RESP OFFSET(3) NUMBITS(1) [],
        TDMODE OFFSET(1) NUMBITS(1) [],
        INTEN OFFSET(0) NUMBITS(1) []
    ],

    /// Debug, write ones to clear the error latches.
    pub DEBUG [
        LITE OFFSET(28) NUMBITS(1) [],
        VERSION OFFSET(25) NUMBITS(3) [],
        DMA_STATE OFFSET(16) NUMBITS(9) [],
        DMA_ID OFFSET(8) NUMBITS(8) [],
        OUTSTANDING_WRITES OFFSET(4) NUMBITS(4) [],
        READ_ERROR OFFSET(2) NUMBITS(1) [],
        FIFO_ERROR OFFSET(1) NUMBITS(1) [],
        READ_LAST_NOT_SET_ERROR OFFSET(0) NUMBITS(1) []
    ]
}

register_structs! {
    #[allow(non_snake_case)]
    pub RegisterBlock {
        (0x00 => pub CS: ReadWrite<u32, CS::Register>),
        (0x04 => pub CONBLK_AD: ReadWrite<u32>),
        (0x08 => pub TI: ReadWrite<u32, TI::Register>),
        (0x0c => pub SOURCE_AD: ReadWrite<u32>),
        (0x10 => pub DEST_AD: ReadWrite<u32>),
        (0x14 => pub TXFR_LEN: ReadWrite<u32>),
        (0x18 => pub STRIDE: ReadWrite<u32>),
        (0x1c => pub NEXTCONBK: ReadWrite<u32>),
        (0x20 => pub DEBUG: ReadWrite<u32, DEBUG::Register>),
        (0x24 => @END),
    }
}

/// One in-memory DMA control block, fetched by the engine from the bus
/// address written to `CONBLK_AD`. Must sit on a 32-byte boundary; the
/// engine only honours 256-byte aligned fetch addresses for the first block.
#[repr(C, align(32))]
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlBlock {
    pub ti: u32,
    pub source_ad: u32,
    pub dest_ad: u32,
    pub txfr_len: u32,
    pub stride: u32,
    pub nextconbk: u32,
    _reserved: [u32; 2],
}

static_assertions::const_assert_eq!(core::mem::size_of::<ControlBlock>(), 32);

/// Byte offset of a channel's register window inside the peripheral window.
pub fn channel_offset(channel: u32) -> u32 {
    DMA_OFFSET + DMA_CHANNEL_STRIDE * channel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_windows() {
        assert_eq!(channel_offset(0), 0x7000);
        assert_eq!(channel_offset(10), 0x7a00);
        assert_eq!(channel_offset(14), 0x7e00);
    }

    #[test]
    fn control_block_layout() {
        assert_eq!(core::mem::align_of::<ControlBlock>(), 32);
        let cb = ControlBlock::default();
        let base = &cb as *const _ as usize;
        assert_eq!(&cb.dest_ad as *const _ as usize - base, 8);
        assert_eq!(&cb.nextconbk as *const _ as usize - base, 20);
    }
}
