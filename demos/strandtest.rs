/*
 * SPDX-License-Identifier: MIT
 */

//! Moving rainbow on a single strip, GPIO 18. Run as root:
//!
//!     cargo run --example strandtest

use {
    std::sync::atomic::{AtomicBool, Ordering},
    ws281x_dma::{CancelToken, ChannelConfig, Strand, StrandConfig, StripLayout},
};

const LED_COUNT: usize = 60;
const GPIO_PIN: u8 = 18;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::Relaxed);
}

/// One revolution of the color wheel mapped to 0..=255.
fn wheel(pos: u8) -> u32 {
    match pos {
        0..=84 => {
            let pos = u32::from(pos);
            ((255 - pos * 3) << 16) | pos * 3
        }
        85..=169 => {
            let pos = u32::from(pos - 85);
            (pos * 3) << 8 | (255 - pos * 3)
        }
        _ => {
            let pos = u32::from(pos - 170);
            ((255 - pos * 3) << 8) | (pos * 3) << 16
        }
    }
}

fn main() -> ws281x_dma::Result<()> {
    env_logger::init();
    unsafe {
        libc::signal(libc::SIGINT, on_sigint as libc::sighandler_t);
    }

    let mut config = StrandConfig::default();
    config.clear_on_exit = true;
    config.channels[0] = ChannelConfig {
        gpio_pin: GPIO_PIN,
        led_count: LED_COUNT,
        strip: StripLayout::WS2812,
        brightness: 64,
        ..Default::default()
    };

    let mut strand = Strand::open(config)?;

    let token = CancelToken::new();
    let canceller = token.clone();
    let mut offset = 0u32;

    strand.render_loop(&token, move |channels| {
        if INTERRUPTED.load(Ordering::Relaxed) {
            canceller.cancel();
            return;
        }
        for (i, led) in channels[0].leds_mut().iter_mut().enumerate() {
            *led = wheel(((i as u32 * 256 / LED_COUNT as u32 + offset) & 0xff) as u8);
        }
        offset = offset.wrapping_add(1);
    })?;

    println!("interrupted, clearing strip");
    Ok(())
}
