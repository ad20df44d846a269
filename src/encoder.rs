/*
 * SPDX-License-Identifier: MIT
 */

//! Bit-level waveform construction.
//!
//! WS281x strips sample the line once per bit period; the serializer runs at
//! three times the bit rate so a one becomes the symbol `110` and a zero
//! `100`. Color bytes go out MSB first, symbols pack MSB first into 32-bit
//! FIFO words. Everything in this module is pure arithmetic over a word
//! slice, so it is testable without any hardware.

/// Color components per LED slot. Three-color strips simply skip the white
/// byte, the buffer is always sized for four.
pub const LED_COLOURS: u32 = 4;

/// Low time the strips require to latch a frame, in microseconds. Also the
/// length of the all-zero tail appended to every frame.
pub const LED_RESET_US: u32 = 300;

/// Serializer symbols at three slots per bit.
pub const SYMBOL_HIGH: u32 = 0b110;
pub const SYMBOL_LOW: u32 = 0b100;

/// Symbols for strips driven through an inverting level shifter, used when
/// the serializer cannot invert in hardware.
pub const SYMBOL_HIGH_INV: u32 = 0b001;
pub const SYMBOL_LOW_INV: u32 = 0b011;

/// Byte order the strip expects on the wire, as four shift amounts into the
/// user-facing `0xWWRRGGBB` pixel word. The top byte doubles as the
/// has-white marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripLayout(pub u32);

impl StripLayout {
    pub const SK6812_RGBW: Self = Self(0x1810_0800);
    pub const SK6812_RBGW: Self = Self(0x1810_0008);
    pub const SK6812_GRBW: Self = Self(0x1808_1000);
    pub const SK6812_GBRW: Self = Self(0x1808_0010);
    pub const SK6812_BRGW: Self = Self(0x1800_1008);
    pub const SK6812_BGRW: Self = Self(0x1800_0810);

    pub const WS2811_RGB: Self = Self(0x0010_0800);
    pub const WS2811_RBG: Self = Self(0x0010_0008);
    pub const WS2811_GRB: Self = Self(0x0008_1000);
    pub const WS2811_GBR: Self = Self(0x0008_0010);
    pub const WS2811_BRG: Self = Self(0x0000_1008);
    pub const WS2811_BGR: Self = Self(0x0000_0810);

    /// WS2812 and SK6812 three-color strips share the GRB wire order.
    pub const WS2812: Self = Self::WS2811_GRB;
    pub const SK6812: Self = Self::WS2811_GRB;
    pub const SK6812W: Self = Self::SK6812_GRBW;

    pub fn has_white(self) -> bool {
        self.0 & 0xf000_0000 != 0
    }

    /// Shift amounts in wire emission order, and how many of them apply.
    pub fn emission_shifts(self) -> ([u32; 4], usize) {
        let shifts = [
            (self.0 >> 16) & 0xff,
            (self.0 >> 8) & 0xff,
            self.0 & 0xff,
            (self.0 >> 24) & 0xff,
        ];
        (shifts, if self.has_white() { 4 } else { 3 })
    }
}

/// Serializer bits needed for one frame: three symbol slots per color bit,
/// plus enough zero slots to cover the latch time.
pub fn led_bit_count(led_count: u32, freq: u32) -> u32 {
    let data = led_count * LED_COLOURS * 8 * 3;
    let reset = (u64::from(LED_RESET_US) * (u64::from(freq) * 3) / 1_000_000) as u32;
    data + reset
}

/// Buffer bytes for a PCM frame: bit count rounded down to a whole number
/// of words, one word of slack, plus the 32-bit FIFO word granularity.
pub fn pcm_byte_count(led_count: u32, freq: u32) -> usize {
    let bits = led_bit_count(led_count, freq);
    ((((bits >> 3) & !0x7) + 4) + 4) as usize
}

/// Buffer bytes for a PWM frame. The FIFO interleaves two channels, so the
/// stream is twice as long regardless of whether channel 1 is used.
pub fn pwm_byte_count(led_count: u32, freq: u32) -> usize {
    pcm_byte_count(led_count, freq) * 2
}

/// Wall-clock time one frame occupies the wire, in microseconds. A render
/// must not start sooner than this after the previous one.
pub fn render_wait_us(led_count: u32, freq: u32) -> u64 {
    u64::from(led_count) * u64::from(LED_COLOURS) * 8 * 1_000_000 / u64::from(freq)
        + u64::from(LED_RESET_US)
}

/// One channel's pixel data and transforms, borrowed for encoding.
pub struct ChannelEncoding<'a> {
    pub leds: &'a [u32],
    pub layout: StripLayout,
    pub brightness: u8,
    pub gamma: &'a [u8; 256],
    /// Software inversion of the symbol stream. Only set when the
    /// serializer cannot invert the line itself.
    pub invert: bool,
}

/// Serialize one channel into the raw FIFO stream.
///
/// `start` is the first word this channel owns and `stride` the distance to
/// its next word, so two interleaved PWM channels encode with starts 0 and 1
/// and stride 2 without touching each other's bits. Every owned bit is
/// written, set or cleared, so stale data from a previous frame cannot leak.
pub fn encode_channel(words: &mut [u32], start: usize, stride: usize, ch: &ChannelEncoding<'_>) {
    let (shifts, colors) = ch.layout.emission_shifts();
    let scale = u32::from(ch.brightness) + 1;

    let mut wordpos = start;
    let mut bitpos = 31i32;

    for &led in ch.leds {
        for &shift in &shifts[..colors] {
            let corrected = ch.gamma[((led >> shift) & 0xff) as usize];
            let byte = (u32::from(corrected) * scale) >> 8;

            for bit in (0..8).rev() {
                let symbol = match ((byte >> bit) & 1 != 0, ch.invert) {
                    (true, false) => SYMBOL_HIGH,
                    (false, false) => SYMBOL_LOW,
                    (true, true) => SYMBOL_HIGH_INV,
                    (false, true) => SYMBOL_LOW_INV,
                };

                for slot in (0..3).rev() {
                    words[wordpos] &= !(1 << bitpos);
                    if (symbol >> slot) & 1 != 0 {
                        words[wordpos] |= 1 << bitpos;
                    }
                    bitpos -= 1;
                    if bitpos < 0 {
                        bitpos = 31;
                        wordpos += stride;
                    }
                }
            }
        }
    }
}

/// Identity gamma table, used when the caller supplies none.
pub fn linear_gamma() -> [u8; 256] {
    let mut table = [0u8; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = i as u8;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoding<'a>(leds: &'a [u32], gamma: &'a [u8; 256]) -> ChannelEncoding<'a> {
        ChannelEncoding {
            leds,
            layout: StripLayout::WS2811_RGB,
            brightness: 255,
            gamma,
            invert: false,
        }
    }

    #[test]
    fn frame_sizing() {
        // 30 LEDs at the stock 800 kHz: 2880 data bits + 720 reset bits.
        assert_eq!(led_bit_count(30, 800_000), 3600);
        assert_eq!(pcm_byte_count(30, 800_000), 456);
        assert_eq!(pwm_byte_count(30, 800_000), 912);
    }

    #[test]
    fn sizing_is_monotonic() {
        let mut last = 0;
        for leds in 0..200 {
            let n = pcm_byte_count(leds, 800_000);
            assert!(n >= last);
            assert_eq!(n % 4, 0);
            last = n;
        }
    }

    #[test]
    fn reset_tail_covers_latch_time() {
        // Even an empty strip reserves the full reset window.
        let bits = led_bit_count(0, 800_000);
        assert_eq!(bits, 720);
        assert!(u64::from(bits) * 1_000_000 >= 300 * 800_000 * 3);
    }

    #[test]
    fn full_red_is_all_ones_symbols() {
        let gamma = linear_gamma();
        let mut words = [0u32; 4];
        encode_channel(&mut words, 0, 1, &encoding(&[0x00ff_0000], &gamma));
        // Red byte 0xff: eight 110 symbols, then green 0x00: 100 symbols.
        assert_eq!(words[0], 0xdb6d_b692);
        assert_eq!(words[1], 0x4924_9249);
    }

    #[test]
    fn zero_pixels_emit_low_symbols() {
        let gamma = linear_gamma();
        let mut words = [0xffff_ffffu32; 4];
        encode_channel(&mut words, 0, 1, &encoding(&[0], &gamma));
        // 24 color bits = 72 symbol slots = 2.25 words, all 100 patterns.
        assert_eq!(words[0], 0x9249_2492);
        assert_eq!(words[1], 0x4924_9249);
        // Bits past the pixel data stay untouched.
        assert_eq!(words[2] & 0x00ff_ffff, 0x00ff_ffff);
        assert_eq!(words[3], 0xffff_ffff);
    }

    #[test]
    fn gamma_applies_before_brightness() {
        let mut gamma = linear_gamma();
        gamma[0xff] = 0x80;
        gamma[0x7f] = 0x00;
        let mut scaled = [0u32; 4];
        let mut reference = [0u32; 4];

        let ch = ChannelEncoding {
            brightness: 127,
            ..encoding(&[0x00ff_0000], &gamma)
        };
        encode_channel(&mut scaled, 0, 1, &ch);

        // gamma[0xff] = 0x80 scaled by (127 + 1) / 256 gives 0x40. The
        // reversed order would hit gamma[0x7f] = 0 instead.
        let identity = linear_gamma();
        encode_channel(&mut reference, 0, 1, &encoding(&[0x0040_0000], &identity));
        assert_eq!(scaled, reference);
    }

    #[test]
    fn white_channel_only_with_rgbw_layout() {
        let gamma = linear_gamma();
        let mut rgb = [0u32; 4];
        let mut rgbw = [0u32; 4];

        let led = [0xff00_0000u32];
        encode_channel(&mut rgb, 0, 1, &encoding(&led, &gamma));
        let ch = ChannelEncoding {
            layout: StripLayout::SK6812_GRBW,
            ..encoding(&led, &gamma)
        };
        encode_channel(&mut rgbw, 0, 1, &ch);

        // RGB layout ignores the white byte entirely.
        assert_eq!(rgb[0], 0x9249_2492);
        assert_eq!(rgb[2], 0x2400_0000);
        // GRBW emits it last: three zero colors then eight 110 symbols.
        assert_eq!(rgbw[2], 0x24db_6db6);
    }

    #[test]
    fn inverted_symbols() {
        let gamma = linear_gamma();
        let mut words = [0u32; 4];
        let ch = ChannelEncoding {
            invert: true,
            ..encoding(&[0x00ff_0000], &gamma)
        };
        encode_channel(&mut words, 0, 1, &ch);
        // One bits become 001, zero bits 011.
        assert_eq!(words[0], 0x2492_496d);
    }

    #[test]
    fn interleaved_channels_do_not_collide() {
        let gamma = linear_gamma();
        let mut words = [0u32; 8];
        encode_channel(&mut words, 0, 2, &encoding(&[0x00ff_0000], &gamma));
        encode_channel(&mut words, 1, 2, &encoding(&[0x0000_0000], &gamma));

        assert_eq!(words[0], 0xdb6d_b692);
        assert_eq!(words[1], 0x9249_2492);
        assert_eq!(words[2], 0x4924_9249);
        assert_eq!(words[3], 0x4924_9249);
    }

    #[test]
    fn layout_decoding() {
        assert!(!StripLayout::WS2812.has_white());
        assert!(StripLayout::SK6812W.has_white());

        let (shifts, n) = StripLayout::WS2811_GRB.emission_shifts();
        assert_eq!(n, 3);
        // GRB: green byte first, then red, then blue.
        assert_eq!(&shifts[..3], &[8, 16, 0]);

        let (shifts, n) = StripLayout::SK6812_RGBW.emission_shifts();
        assert_eq!(n, 4);
        assert_eq!(shifts, [16, 8, 0, 24]);
    }
}
