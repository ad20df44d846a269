/*
 * SPDX-License-Identifier: MIT
 */

//! Board descriptor resolution.
//!
//! The peripherals live at a SoC-specific physical base, the VideoCore sees
//! RAM through a SoC-specific bus alias, and the clock crystal differs on the
//! BCM2711. All three are derived from the board revision code published in
//! `/proc/cpuinfo`. Everything downstream consumes only the resolved
//! [`BoardInfo`].

use {
    crate::errors::{Result, Ws281xError},
    std::fs,
};

const CPUINFO_PATH: &str = "/proc/cpuinfo";
const REVISION_KEY: &str = "Revision";

/// New-style revision codes have bit 23 set; the processor lives in bits 12..16.
const REVISION_SCHEME_NEW: u32 = 1 << 23;
const REVISION_PROCESSOR_SHIFT: u32 = 12;
const REVISION_PROCESSOR_MASK: u32 = 0xf;
/// Warranty bits are set by overvolting and must not affect the lookup.
const REVISION_WARRANTY_MASK: u32 = 0x3 << 24;

const PERIPH_BASE_RPI: u32 = 0x2000_0000;
const PERIPH_BASE_RPI2: u32 = 0x3f00_0000;
const PERIPH_BASE_RPI4: u32 = 0xfe00_0000;

const VIDEOCORE_BASE_RPI: u32 = 0x4000_0000;
const VIDEOCORE_BASE_RPI2: u32 = 0xc000_0000;

const OSC_FREQ: u32 = 19_200_000;
const OSC_FREQ_RPI4: u32 = 54_000_000;

/// The SoC driving the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processor {
    Bcm2835,
    Bcm2836,
    Bcm2837,
    Bcm2711,
}

/// Resolved hardware addresses for one board revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardInfo {
    pub processor: Processor,
    /// Physical base of the peripheral register window, as the ARM sees it.
    pub periph_base: u32,
    /// Base of the bus alias through which the VideoCore (and the DMA engine)
    /// addresses RAM.
    pub videocore_base: u32,
    /// Crystal feeding the clock manager's OSC source.
    pub osc_freq: u32,
}

impl BoardInfo {
    /// Decode a raw revision code.
    ///
    /// Old-scheme codes (bit 23 clear) are all BCM2835 boards. New-scheme
    /// codes carry the processor in bits 12..16; anything we do not know how
    /// to drive is `HwNotSupported`.
    pub fn from_revision(revision: u32) -> Result<Self> {
        let revision = revision & !REVISION_WARRANTY_MASK;

        if revision & REVISION_SCHEME_NEW == 0 {
            return Ok(Self::for_processor(Processor::Bcm2835));
        }

        match (revision >> REVISION_PROCESSOR_SHIFT) & REVISION_PROCESSOR_MASK {
            0 => Ok(Self::for_processor(Processor::Bcm2835)),
            1 => Ok(Self::for_processor(Processor::Bcm2836)),
            2 => Ok(Self::for_processor(Processor::Bcm2837)),
            3 => Ok(Self::for_processor(Processor::Bcm2711)),
            _ => Err(Ws281xError::HwNotSupported),
        }
    }

    /// Read and decode the revision of the board we are running on.
    pub fn detect() -> Result<Self> {
        let cpuinfo =
            fs::read_to_string(CPUINFO_PATH).map_err(|_| Ws281xError::HwNotSupported)?;
        Self::from_revision(parse_revision(&cpuinfo)?)
    }

    fn for_processor(processor: Processor) -> Self {
        match processor {
            Processor::Bcm2835 => Self {
                processor,
                periph_base: PERIPH_BASE_RPI,
                videocore_base: VIDEOCORE_BASE_RPI,
                osc_freq: OSC_FREQ,
            },
            Processor::Bcm2836 | Processor::Bcm2837 => Self {
                processor,
                periph_base: PERIPH_BASE_RPI2,
                videocore_base: VIDEOCORE_BASE_RPI2,
                osc_freq: OSC_FREQ,
            },
            Processor::Bcm2711 => Self {
                processor,
                periph_base: PERIPH_BASE_RPI4,
                videocore_base: VIDEOCORE_BASE_RPI2,
                osc_freq: OSC_FREQ_RPI4,
            },
        }
    }

    /// Strip the VideoCore bus alias off a bus address, yielding the ARM
    /// physical address of the same bytes.
    pub fn bus_to_phys(bus_addr: u32) -> u32 {
        bus_addr & !0xc000_0000
    }
}

fn parse_revision(cpuinfo: &str) -> Result<u32> {
    cpuinfo
        .lines()
        .find(|line| line.starts_with(REVISION_KEY))
        .and_then(|line| line.split(':').nth(1))
        .and_then(|value| u32::from_str_radix(value.trim(), 16).ok())
        .ok_or(Ws281xError::HwNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_scheme_is_bcm2835() {
        let info = BoardInfo::from_revision(0x0002).unwrap();
        assert_eq!(info.processor, Processor::Bcm2835);
        assert_eq!(info.periph_base, 0x2000_0000);
        assert_eq!(info.videocore_base, 0x4000_0000);
    }

    #[test]
    fn pi3_revision() {
        // Pi 3 Model B, a02082.
        let info = BoardInfo::from_revision(0x00a0_2082).unwrap();
        assert_eq!(info.processor, Processor::Bcm2837);
        assert_eq!(info.periph_base, 0x3f00_0000);
        assert_eq!(info.osc_freq, 19_200_000);
    }

    #[test]
    fn pi4_revision() {
        // Pi 4 Model B, c03111.
        let info = BoardInfo::from_revision(0x00c0_3111).unwrap();
        assert_eq!(info.processor, Processor::Bcm2711);
        assert_eq!(info.periph_base, 0xfe00_0000);
        assert_eq!(info.osc_freq, 54_000_000);
    }

    #[test]
    fn warranty_bits_ignored() {
        let plain = BoardInfo::from_revision(0x00a0_2082).unwrap();
        let voided = BoardInfo::from_revision(0x03a0_2082).unwrap();
        assert_eq!(plain.processor, voided.processor);
    }

    #[test]
    fn unknown_processor_rejected() {
        let revision = REVISION_SCHEME_NEW | (0x4 << REVISION_PROCESSOR_SHIFT);
        assert_eq!(
            BoardInfo::from_revision(revision),
            Err(Ws281xError::HwNotSupported)
        );
    }

    #[test]
    fn cpuinfo_parsing() {
        let cpuinfo = "processor\t: 0\nmodel name\t: ARMv7\nRevision\t: a02082\nSerial\t: 0000\n";
        assert_eq!(parse_revision(cpuinfo).unwrap(), 0x00a0_2082);
        assert!(parse_revision("no revision here").is_err());
    }

    #[test]
    fn bus_alias_strip() {
        assert_eq!(BoardInfo::bus_to_phys(0xde40_0000), 0x1e40_0000);
        assert_eq!(BoardInfo::bus_to_phys(0x4e40_0000), 0x0e40_0000);
    }
}
