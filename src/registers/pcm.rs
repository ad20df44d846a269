/*
 * SPDX-License-Identifier: MIT
 */

//! BCM283x PCM/I2S controller, used here as a plain shift register.
//!
//! Transmit channel 1 is configured for 32-bit frames so each FIFO word
//! comes out MSB first on DOUT, exactly like the PWM serializer but on a
//! single output.

use tock_registers::{
    register_bitfields, register_structs,
    registers::{ReadWrite, WriteOnly},
};

/// Offset of the PCM block inside the peripheral window.
pub const PCM_OFFSET: u32 = 0x0020_3000;
/// Bus address of the FIFO, as the DMA engine must address it.
pub const PCM_FIFO_BUS: u32 = 0x7e20_3004;

register_bitfields! {
    u32,

    /// Control and status.
    pub CS_A [
        STBY OFFSET(25) NUMBITS(1) [],
        SYNC OFFSET(24) NUMBITS(1) [],
        RXSEX OFFSET(23) NUMBITS(1) [],
        RXF OFFSET(22) NUMBITS(1) [],
        TXE OFFSET(21) NUMBITS(1) [],
        RXD OFFSET(20) NUMBITS(1) [],
        TXD OFFSET(19) NUMBITS(1) [],
        RXR OFFSET(18) NUMBITS(1) [],
        TXW OFFSET(17) NUMBITS(1) [],
        RXERR OFFSET(16) NUMBITS(1) [],
        TXERR OFFSET(15) NUMBITS(1) [],
        RXSYNC OFFSET(14) NUMBITS(1) [],
        TXSYNC OFFSET(13) NUMBITS(1) [],
        DMAEN OFFSET(9) NUMBITS(1) [],
        RXTHR OFFSET(7) NUMBITS(2) [],
        TXTHR OFFSET(5) NUMBITS(2) [],
        RXCLR OFFSET(4) NUMBITS(1) [],
        TXCLR OFFSET(3) NUMBITS(1) [],
        TXON OFFSET(2) NUMBITS(1) [],
        RXON OFFSET(1) NUMBITS(1) [],
        EN OFFSET(0) NUMBITS(1) []
    ],

    /// Mode. FLEN is the frame length minus one.
    pub MODE_A [
        CLK_DIS OFFSET(28) NUMBITS(1) [],
        PDMN OFFSET(27) NUMBITS(1) [],
        PDME OFFSET(26) NUMBITS(1) [],
        FRXP OFFSET(25) NUMBITS(1) [],
        FTXP OFFSET(24) NUMBITS(1) [],
        CLKM OFFSET(23) NUMBITS(1) [],
        CLKI OFFSET(22) NUMBITS(1) [],
        FSM OFFSET(21) NUMBITS(1) [],
        FSI OFFSET(20) NUMBITS(1) [],
        FLEN OFFSET(10) NUMBITS(10) [],
        FSLEN OFFSET(0) NUMBITS(10) []
    ],

    /// Transmit channel configuration. CH1WEX extends CH1WID by 16 bits.
    pub TXC_A [
        CH1WEX OFFSET(31) NUMBITS(1) [],
        CH1EN OFFSET(30) NUMBITS(1) [],
        CH1POS OFFSET(20) NUMBITS(10) [],
        CH1WID OFFSET(16) NUMBITS(4) [],
        CH2WEX OFFSET(15) NUMBITS(1) [],
        CH2EN OFFSET(14) NUMBITS(1) [],
        CH2POS OFFSET(4) NUMBITS(10) [],
        CH2WID OFFSET(0) NUMBITS(4) []
    ],

    /// DMA request thresholds.
    pub DREQ_A [
        TX_PANIC OFFSET(24) NUMBITS(7) [],
        RX_PANIC OFFSET(16) NUMBITS(7) [],
        TX OFFSET(8) NUMBITS(7) [],
        RX OFFSET(0) NUMBITS(7) []
    ]
}

register_structs! {
    #[allow(non_snake_case)]
    pub RegisterBlock {
        (0x00 => pub CS_A: ReadWrite<u32, CS_A::Register>),
        (0x04 => pub FIFO_A: WriteOnly<u32>),
        (0x08 => pub MODE_A: ReadWrite<u32, MODE_A::Register>),
        (0x0c => pub RXC_A: ReadWrite<u32>),
        (0x10 => pub TXC_A: ReadWrite<u32, TXC_A::Register>),
        (0x14 => pub DREQ_A: ReadWrite<u32, DREQ_A::Register>),
        (0x18 => pub INTEN_A: ReadWrite<u32>),
        (0x1c => pub INTSTC_A: ReadWrite<u32>),
        (0x20 => pub GRAY: ReadWrite<u32>),
        (0x24 => @END),
    }
}
