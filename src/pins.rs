/*
 * SPDX-License-Identifier: MIT
 */

//! GPIO pins that can carry a serialized LED signal, and which peripheral
//! drives them.
//!
//! PWM channel 0 and channel 1 each reach a small set of header pins through
//! alternate functions; the PCM DOUT line reaches two more. Which serializer
//! a configuration uses falls out of where its pins land in these tables.

use crate::errors::{Result, Ws281xError};

/// A GPIO pin together with the alternate function that routes a
/// serializer output onto it.
#[derive(Debug, Clone, Copy)]
pub struct PinAlt {
    pub pin: u8,
    pub alt: u8,
}

const fn pa(pin: u8, alt: u8) -> PinAlt {
    PinAlt { pin, alt }
}

pub const PWM0_PINS: &[PinAlt] = &[pa(12, 0), pa(18, 5), pa(40, 0)];
pub const PWM1_PINS: &[PinAlt] = &[pa(13, 0), pa(19, 5), pa(41, 0), pa(45, 0)];
pub const PCM_DOUT_PINS: &[PinAlt] = &[pa(21, 0), pa(31, 2)];

/// Which serializer feeds the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverMode {
    /// Both PWM channels available, words interleaved in the shared FIFO.
    Pwm,
    /// Single output on PCM DOUT.
    Pcm,
}

fn lookup(table: &[PinAlt], pin: u8) -> Option<u8> {
    table.iter().find(|pa| pa.pin == pin).map(|pa| pa.alt)
}

/// Alternate function routing PWM channel `channel` onto `pin`.
pub fn pwm_alt(channel: usize, pin: u8) -> Option<u8> {
    match channel {
        0 => lookup(PWM0_PINS, pin),
        1 => lookup(PWM1_PINS, pin),
        _ => None,
    }
}

/// Alternate function routing PCM DOUT onto `pin`.
pub fn pcm_dout_alt(pin: u8) -> Option<u8> {
    lookup(PCM_DOUT_PINS, pin)
}

/// Decide which peripheral a pair of channel pins needs, before any
/// hardware is touched. Pin 0 marks an unused channel.
///
/// PWM wins when every used pin sits in its channel's PWM table. PCM only
/// drives a single output, so it requires channel 1 unused.
pub fn resolve_mode(ch0_pin: u8, ch1_pin: u8) -> Result<DriverMode> {
    let ch0_pwm = ch0_pin != 0 && pwm_alt(0, ch0_pin).is_some();
    let ch1_pwm = ch1_pin != 0 && pwm_alt(1, ch1_pin).is_some();

    if (ch0_pin == 0 || ch0_pwm) && (ch1_pin == 0 || ch1_pwm) && (ch0_pin != 0 || ch1_pin != 0) {
        return Ok(DriverMode::Pwm);
    }
    if ch1_pin == 0 && ch0_pin != 0 && pcm_dout_alt(ch0_pin).is_some() {
        return Ok(DriverMode::Pcm);
    }
    Err(Ws281xError::IllegalGpio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pwm_pin_lookup() {
        assert_eq!(pwm_alt(0, 18), Some(5));
        assert_eq!(pwm_alt(0, 12), Some(0));
        assert_eq!(pwm_alt(1, 13), Some(0));
        assert_eq!(pwm_alt(1, 45), Some(0));
        // Channel 1 pins do not satisfy channel 0 and vice versa.
        assert_eq!(pwm_alt(0, 13), None);
        assert_eq!(pwm_alt(1, 18), None);
    }

    #[test]
    fn default_pin_is_pwm() {
        assert_eq!(resolve_mode(18, 0).unwrap(), DriverMode::Pwm);
    }

    #[test]
    fn dual_channel_pwm() {
        assert_eq!(resolve_mode(18, 13).unwrap(), DriverMode::Pwm);
        assert_eq!(resolve_mode(12, 19).unwrap(), DriverMode::Pwm);
    }

    #[test]
    fn pcm_requires_single_channel() {
        assert_eq!(resolve_mode(21, 0).unwrap(), DriverMode::Pcm);
        assert_eq!(resolve_mode(31, 0).unwrap(), DriverMode::Pcm);
        assert_eq!(resolve_mode(21, 13), Err(Ws281xError::IllegalGpio));
    }

    #[test]
    fn unroutable_pins_rejected() {
        assert_eq!(resolve_mode(17, 0), Err(Ws281xError::IllegalGpio));
        assert_eq!(resolve_mode(0, 0), Err(Ws281xError::IllegalGpio));
        // SPI pin, not reachable by either serializer.
        assert_eq!(resolve_mode(10, 0), Err(Ws281xError::IllegalGpio));
    }
}
