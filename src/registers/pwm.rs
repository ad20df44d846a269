/*
 * SPDX-License-Identifier: MIT
 */

//! BCM283x PWM controller.
//!
//! Both channels run in serializer mode off the shared FIFO, shifting 32-bit
//! words MSB first. Words pushed into `FIF1` alternate between channel 1 and
//! channel 2 whenever both are enabled.

use tock_registers::{
    register_bitfields, register_structs,
    registers::{ReadWrite, WriteOnly},
};

/// Offset of the PWM block inside the peripheral window.
pub const PWM_OFFSET: u32 = 0x0020_c000;
/// Bus address of the FIFO, as the DMA engine must address it.
pub const PWM_FIFO_BUS: u32 = 0x7e20_c018;

register_bitfields! {
    u32,

    /// Control.
    pub CTL [
        MSEN2 OFFSET(15) NUMBITS(1) [],
        USEF2 OFFSET(13) NUMBITS(1) [],
        POLA2 OFFSET(12) NUMBITS(1) [],
        SBIT2 OFFSET(11) NUMBITS(1) [],
        RPTL2 OFFSET(10) NUMBITS(1) [],
        MODE2 OFFSET(9) NUMBITS(1) [
            Pwm = 0,
            Serializer = 1
        ],
        PWEN2 OFFSET(8) NUMBITS(1) [],
        MSEN1 OFFSET(7) NUMBITS(1) [],
        CLRF1 OFFSET(6) NUMBITS(1) [],
        USEF1 OFFSET(5) NUMBITS(1) [],
        POLA1 OFFSET(4) NUMBITS(1) [],
        SBIT1 OFFSET(3) NUMBITS(1) [],
        RPTL1 OFFSET(2) NUMBITS(1) [],
        MODE1 OFFSET(1) NUMBITS(1) [
            Pwm = 0,
            Serializer = 1
        ],
        PWEN1 OFFSET(0) NUMBITS(1) []
    ],

    /// Status, write ones to clear the error latches.
    pub STA [
        STA4 OFFSET(12) NUMBITS(1) [],
        STA3 OFFSET(11) NUMBITS(1) [],
        STA2 OFFSET(10) NUMBITS(1) [],
        STA1 OFFSET(9) NUMBITS(1) [],
        BERR OFFSET(8) NUMBITS(1) [],
        GAPO4 OFFSET(7) NUMBITS(1) [],
        GAPO3 OFFSET(6) NUMBITS(1) [],
        GAPO2 OFFSET(5) NUMBITS(1) [],
        GAPO1 OFFSET(4) NUMBITS(1) [],
        RERR1 OFFSET(3) NUMBITS(1) [],
        WERR1 OFFSET(2) NUMBITS(1) [],
        EMPT1 OFFSET(1) NUMBITS(1) [],
        FULL1 OFFSET(0) NUMBITS(1) []
    ],

    /// DMA configuration.
    pub DMAC [
        ENAB OFFSET(31) NUMBITS(1) [],
        PANIC OFFSET(8) NUMBITS(8) [],
        DREQ OFFSET(0) NUMBITS(8) []
    ]
}

register_structs! {
    #[allow(non_snake_case)]
    pub RegisterBlock {
        (0x00 => pub CTL: ReadWrite<u32, CTL::Register>),
        (0x04 => pub STA: ReadWrite<u32, STA::Register>),
        (0x08 => pub DMAC: ReadWrite<u32, DMAC::Register>),
        (0x0c => _reserved0),
        (0x10 => pub RNG1: ReadWrite<u32>),
        (0x14 => pub DAT1: ReadWrite<u32>),
        (0x18 => pub FIF1: WriteOnly<u32>),
        (0x1c => _reserved1),
        (0x20 => pub RNG2: ReadWrite<u32>),
        (0x24 => pub DAT2: ReadWrite<u32>),
        (0x28 => @END),
    }
}
