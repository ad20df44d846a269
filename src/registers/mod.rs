/*
 * SPDX-License-Identifier: MIT
 */

//! Register-level descriptions of the BCM283x peripherals this driver
//! touches. Each module pairs a `register_structs!` block with the bitfields
//! that make its writes readable at the call site.

pub mod clock;
pub mod dma;
pub mod gpio;
pub mod pcm;
pub mod pwm;
