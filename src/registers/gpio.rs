/*
 * SPDX-License-Identifier: MIT
 */

//! BCM283x GPIO function select.
//!
//! Each pin owns a 3-bit field inside one of six GPFSEL registers, ten pins
//! per register. The alternate-function numbers are not encoded in order.

use {
    crate::errors::{Result, Ws281xError},
    tock_registers::{register_structs, registers::ReadWrite},
};

/// Offset of the GPIO block inside the peripheral window.
pub const GPIO_OFFSET: u32 = 0x0020_0000;

register_structs! {
    #[allow(non_snake_case)]
    pub RegisterBlock {
        (0x00 => pub GPFSEL: [ReadWrite<u32>; 6]),
        (0x18 => _reserved0),
        (0x1c => pub GPSET: [ReadWrite<u32>; 2]),
        (0x24 => _reserved1),
        (0x28 => pub GPCLR: [ReadWrite<u32>; 2]),
        (0x30 => _reserved2),
        (0x34 => pub GPLEV: [ReadWrite<u32>; 2]),
        (0x3c => @END),
    }
}

/// Function select field values, indexed by alternate-function number.
const FSEL_ALT: [u32; 6] = [4, 5, 6, 7, 3, 2];

pub const FSEL_INPUT: u32 = 0;
pub const FSEL_OUTPUT: u32 = 1;

/// Field value selecting alternate function `altnum` (0..=5).
pub fn fsel_alt(altnum: u8) -> Result<u32> {
    FSEL_ALT
        .get(usize::from(altnum))
        .copied()
        .ok_or(Ws281xError::GpioInit)
}

/// Which GPFSEL register and bit position hold `pin`'s field.
pub fn fsel_position(pin: u8) -> (usize, u32) {
    (usize::from(pin / 10), u32::from(pin % 10) * 3)
}

/// Replace `pin`'s 3-bit field in the current GPFSEL value.
pub fn fsel_patch(current: u32, pin: u8, fsel: u32) -> u32 {
    let (_, shift) = fsel_position(pin);
    (current & !(0b111 << shift)) | ((fsel & 0b111) << shift)
}
