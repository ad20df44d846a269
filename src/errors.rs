/*
 * SPDX-License-Identifier: MIT
 */

//! Driver error taxonomy.
//!
//! The display strings below are a public contract: callers match on the
//! variants, scripts match on the messages. Do not reword them casually.

use snafu::Snafu;

/// Every failure a strand can report.
///
/// Configuration errors ([`IllegalFrequency`], [`IllegalDmaChannel`],
/// [`IllegalGpio`], [`HwNotSupported`]) are detected before any device file is
/// opened. Resource errors are fatal to initialization and leave nothing
/// acquired. [`Dma`] is the only error a running strand reports; it does not
/// tear the strand down.
///
/// [`IllegalFrequency`]: Ws281xError::IllegalFrequency
/// [`IllegalDmaChannel`]: Ws281xError::IllegalDmaChannel
/// [`IllegalGpio`]: Ws281xError::IllegalGpio
/// [`HwNotSupported`]: Ws281xError::HwNotSupported
/// [`Dma`]: Ws281xError::Dma
#[derive(Snafu, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ws281xError {
    #[snafu(display("Out of memory"))]
    OutOfMemory,
    #[snafu(display("Hardware revision is not supported"))]
    HwNotSupported,
    #[snafu(display("Memory lock failed"))]
    MemLock,
    #[snafu(display("mmap() failed"))]
    Mmap,
    #[snafu(display("Unable to map registers into userspace"))]
    MapRegisters,
    #[snafu(display("Unable to initialize GPIO"))]
    GpioInit,
    #[snafu(display("Unable to initialize PWM"))]
    PwmSetup,
    #[snafu(display("Unable to initialize PCM"))]
    PcmSetup,
    #[snafu(display("Failed to create mailbox device"))]
    MailboxDevice,
    #[snafu(display("DMA error"))]
    Dma,
    #[snafu(display("Selected GPIO not possible"))]
    IllegalGpio,
    #[snafu(display("Frequency outside the 400000..=800000 Hz range"))]
    IllegalFrequency,
    #[snafu(display("DMA channel reserved or out of range"))]
    IllegalDmaChannel,
}

pub type Result<T, E = Ws281xError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    // The messages are matched by callers; pin the load-bearing ones.
    #[test]
    fn stable_messages() {
        assert_eq!(Ws281xError::OutOfMemory.to_string(), "Out of memory");
        assert_eq!(
            Ws281xError::HwNotSupported.to_string(),
            "Hardware revision is not supported"
        );
        assert_eq!(Ws281xError::MemLock.to_string(), "Memory lock failed");
        assert_eq!(Ws281xError::Mmap.to_string(), "mmap() failed");
        assert_eq!(
            Ws281xError::MapRegisters.to_string(),
            "Unable to map registers into userspace"
        );
        assert_eq!(Ws281xError::Dma.to_string(), "DMA error");
        assert_eq!(
            Ws281xError::IllegalGpio.to_string(),
            "Selected GPIO not possible"
        );
    }
}
