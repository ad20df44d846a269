/*
 * SPDX-License-Identifier: MIT
 */

//! Userspace driver for WS2811/WS2812/SK6812 addressable LEDs on the
//! Raspberry Pi.
//!
//! The strips are driven without kernel support: a DMA-coherent buffer is
//! allocated from the VideoCore firmware over the property mailbox, the
//! waveform for a whole frame is encoded into it bit by bit, and the DMA
//! engine streams it into the PWM or PCM serializer whose output is routed
//! onto a header pin. Once armed, the transfer runs with zero CPU
//! involvement until the next frame.
//!
//! Requires root (or equivalent capabilities) for `/dev/mem` and
//! `/dev/vcio`.
//!
//! ```no_run
//! use ws281x_dma::{ChannelConfig, Strand, StrandConfig, StripLayout};
//!
//! # fn main() -> ws281x_dma::Result<()> {
//! let mut config = StrandConfig::default();
//! config.channels[0] = ChannelConfig {
//!     gpio_pin: 18,
//!     led_count: 30,
//!     strip: StripLayout::WS2812,
//!     ..Default::default()
//! };
//!
//! let mut strand = Strand::open(config)?;
//! strand.leds_mut(0).fill(0x0000_2000);
//! strand.render()?;
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod cancel;
pub mod driver;
pub mod encoder;
pub mod errors;
pub mod mailbox;
pub mod mmio;
pub mod pins;
pub mod registers;

pub use {
    cancel::CancelToken,
    driver::{
        Channel, ChannelConfig, Strand, StrandConfig, DEFAULT_DMA_CHANNEL, TARGET_FREQ,
    },
    encoder::StripLayout,
    errors::{Result, Ws281xError},
};
