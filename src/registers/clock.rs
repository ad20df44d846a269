/*
 * SPDX-License-Identifier: MIT
 */

//! Clock manager slices for the PWM and PCM peripherals.
//!
//! Every write must carry the 0x5a password in the top byte or the clock
//! manager silently drops it. ENAB and the divisor must never change in the
//! same write; stop the clock, wait for BUSY to fall, program DIV, then
//! enable and wait for BUSY to rise.

use tock_registers::{register_bitfields, register_structs, registers::ReadWrite};

/// Offset of the PCM clock slice inside the peripheral window.
pub const CM_PCM_OFFSET: u32 = 0x0010_1098;
/// Offset of the PWM clock slice inside the peripheral window.
pub const CM_PWM_OFFSET: u32 = 0x0010_10a0;

/// Magic the clock manager requires in bits 24..32 of every write.
pub const CM_PASSWD: u32 = 0x5a;

register_bitfields! {
    u32,

    /// Control.
    pub CTL [
        PASSWD OFFSET(24) NUMBITS(8) [],
        MASH OFFSET(9) NUMBITS(2) [],
        FLIP OFFSET(8) NUMBITS(1) [],
        BUSY OFFSET(7) NUMBITS(1) [],
        KILL OFFSET(5) NUMBITS(1) [],
        ENAB OFFSET(4) NUMBITS(1) [],
        SRC OFFSET(0) NUMBITS(4) [
            Gnd = 0,
            Osc = 1,
            Plla = 4,
            Pllc = 5,
            Plld = 6,
            Hdmi = 7
        ]
    ],

    /// Divisor, integer part only is used here.
    pub DIV [
        PASSWD OFFSET(24) NUMBITS(8) [],
        DIVI OFFSET(12) NUMBITS(12) [],
        DIVF OFFSET(0) NUMBITS(12) []
    ]
}

register_structs! {
    #[allow(non_snake_case)]
    pub RegisterBlock {
        (0x00 => pub CTL: ReadWrite<u32, CTL::Register>),
        (0x04 => pub DIV: ReadWrite<u32, DIV::Register>),
        (0x08 => @END),
    }
}
