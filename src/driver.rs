/*
 * SPDX-License-Identifier: MIT
 */

//! Strand lifecycle: bring-up, rendering and teardown.
//!
//! A [`Strand`] owns the register mappings, the firmware-allocated pixel
//! buffer and up to two channels of pixel state. Bring-up maps everything,
//! programs the clock and serializer once, and leaves the DMA engine idle;
//! each `render` re-encodes the buffer and re-arms only the DMA transfer.
//!
//! All control flow is single threaded. The DMA engine and the firmware are
//! the only concurrent actors, which is why the one ordering point is the
//! compiler fence between encoding and arming.

use {
    crate::{
        board::BoardInfo,
        cancel::CancelToken,
        encoder::{self, ChannelEncoding, StripLayout},
        errors::{Result, Ws281xError},
        mailbox::VideoCoreMem,
        mmio::{self, MappedBlock},
        pins::{self, DriverMode},
        registers::{clock, dma, gpio, pcm, pwm},
    },
    core::sync::atomic::{compiler_fence, Ordering},
    log::{debug, info},
    std::{
        fs::File,
        thread,
        time::{Duration, Instant},
    },
    tock_registers::interfaces::{ReadWriteable, Readable, Writeable},
};

/// Stock data rate of WS2812 and SK6812 strips.
pub const TARGET_FREQ: u32 = 800_000;
/// First-generation WS2811 strips run at half rate.
pub const FREQ_MIN: u32 = 400_000;
pub const FREQ_MAX: u32 = 800_000;

/// Channels 0..=6 are claimed by the firmware and kernel drivers, 15 is in
/// use by the firmware and lives on a separate register page.
pub const DMA_CHANNEL_MIN: usize = 7;
pub const DMA_CHANNEL_MAX: usize = 14;
pub const DEFAULT_DMA_CHANNEL: usize = 10;

/// Iteration bound for every busy-wait on a status bit. A stuck peripheral
/// surfaces as a deterministic error instead of a hang.
const SPIN_BOUND: usize = 1 << 25;

/// The peripherals drop back-to-back writes; every configuration write is
/// followed by this settle delay.
const SETTLE: Duration = Duration::from_micros(10);

/// The DMA control block occupies the head of the pixel buffer; pixel words
/// start right after it. Page alignment of the buffer makes the control
/// block fetch-aligned by construction.
const CONTROL_BLOCK_BYTES: usize = core::mem::size_of::<dma::ControlBlock>();

/// Static configuration of one output channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// BCM pin number; 0 leaves the channel unused.
    pub gpio_pin: u8,
    /// Drive through an inverting level shifter.
    pub invert: bool,
    pub led_count: usize,
    pub strip: StripLayout,
    pub brightness: u8,
    /// Gamma correction table; linear when absent.
    pub gamma: Option<Box<[u8; 256]>>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            gpio_pin: 0,
            invert: false,
            led_count: 0,
            strip: StripLayout::WS2812,
            brightness: 255,
            gamma: None,
        }
    }
}

/// Strand-wide configuration.
#[derive(Debug, Clone)]
pub struct StrandConfig {
    /// Strip data rate in Hz.
    pub frequency: u32,
    pub dma_channel: usize,
    /// Render a black frame during teardown.
    pub clear_on_exit: bool,
    pub channels: [ChannelConfig; 2],
}

impl Default for StrandConfig {
    fn default() -> Self {
        Self {
            frequency: TARGET_FREQ,
            dma_channel: DEFAULT_DMA_CHANNEL,
            clear_on_exit: false,
            channels: [ChannelConfig::default(), ChannelConfig::default()],
        }
    }
}

/// Live pixel state of one channel, mutated by the caller between renders.
pub struct Channel {
    gpio_pin: u8,
    invert: bool,
    strip: StripLayout,
    brightness: u8,
    gamma: Box<[u8; 256]>,
    leds: Vec<u32>,
}

impl Channel {
    fn new(config: &ChannelConfig) -> Self {
        let gamma = config
            .gamma
            .clone()
            .unwrap_or_else(|| Box::new(encoder::linear_gamma()));
        Self {
            gpio_pin: config.gpio_pin,
            invert: config.invert,
            strip: config.strip,
            brightness: config.brightness,
            gamma,
            leds: vec![0; config.led_count],
        }
    }

    fn active(&self) -> bool {
        self.gpio_pin != 0 && !self.leds.is_empty()
    }

    /// Pixels as `0xWWRRGGBB` words, one per LED.
    pub fn leds(&self) -> &[u32] {
        &self.leds
    }

    pub fn leds_mut(&mut self) -> &mut [u32] {
        &mut self.leds
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn encoding(&self, soft_invert: bool) -> ChannelEncoding<'_> {
        ChannelEncoding {
            leds: &self.leds,
            layout: self.strip,
            brightness: self.brightness,
            gamma: &self.gamma,
            invert: soft_invert,
        }
    }
}

/// Minimum spacing between DMA arms, tracked against a monotonic clock so a
/// slow caller pays nothing extra.
struct RenderGate {
    ready_at: Option<Instant>,
}

impl RenderGate {
    fn new() -> Self {
        Self { ready_at: None }
    }

    /// Sleep out whatever remains of the previous frame's wire time.
    fn wait(&mut self) {
        if let Some(ready_at) = self.ready_at.take() {
            let now = Instant::now();
            if ready_at > now {
                thread::sleep(ready_at - now);
            }
        }
    }

    fn arm(&mut self, wire_time: Duration) {
        self.ready_at = Some(Instant::now() + wire_time);
    }
}

/// Everything mapped or allocated against live hardware. Dropping it stops
/// the serializer and clock, then releases mappings and the firmware
/// allocation in reverse acquisition order.
struct Device {
    mode: DriverMode,
    dma: MappedBlock<dma::RegisterBlock>,
    gpio: MappedBlock<gpio::RegisterBlock>,
    clock: MappedBlock<clock::RegisterBlock>,
    pwm: Option<MappedBlock<pwm::RegisterBlock>>,
    pcm: Option<MappedBlock<pcm::RegisterBlock>>,
    buffer: VideoCoreMem,
    byte_count: usize,
    // Keeps /dev/mem open for the lifetime of the mappings.
    _dev_mem: File,
}

fn settle() {
    thread::sleep(SETTLE);
}

fn spin_until(mut done: impl FnMut() -> bool, timeout: Ws281xError) -> Result<()> {
    for _ in 0..SPIN_BOUND {
        if done() {
            return Ok(());
        }
    }
    Err(timeout)
}

impl Device {
    fn open(board: &BoardInfo, config: &StrandConfig, mode: DriverMode) -> Result<Self> {
        let dev_mem = mmio::open_dev_mem()?;
        let periph = u64::from(board.periph_base);

        let dma = MappedBlock::map(
            &dev_mem,
            periph + u64::from(dma::channel_offset(config.dma_channel as u32)),
        )?;
        let gpio = MappedBlock::map(&dev_mem, periph + u64::from(gpio::GPIO_OFFSET))?;

        let (clock_offset, pwm_block, pcm_block) = match mode {
            DriverMode::Pwm => (
                clock::CM_PWM_OFFSET,
                Some(MappedBlock::map(&dev_mem, periph + u64::from(pwm::PWM_OFFSET))?),
                None,
            ),
            DriverMode::Pcm => (
                clock::CM_PCM_OFFSET,
                None,
                Some(MappedBlock::map(&dev_mem, periph + u64::from(pcm::PCM_OFFSET))?),
            ),
        };
        let clock = MappedBlock::map(&dev_mem, periph + u64::from(clock_offset))?;

        let max_count = config.channels.iter().map(|ch| ch.led_count).max().unwrap_or(0);
        let byte_count = match mode {
            DriverMode::Pwm => encoder::pwm_byte_count(max_count as u32, config.frequency),
            DriverMode::Pcm => encoder::pcm_byte_count(max_count as u32, config.frequency),
        };

        let buffer =
            VideoCoreMem::alloc(board, &dev_mem, CONTROL_BLOCK_BYTES + byte_count)?;
        unsafe {
            core::ptr::write_bytes(buffer.as_mut_ptr(), 0, buffer.size());
        }
        debug!(
            "pixel buffer: {} bytes at bus {:#010x}",
            byte_count,
            buffer.bus_of(CONTROL_BLOCK_BYTES)
        );

        Ok(Self {
            mode,
            dma,
            gpio,
            clock,
            pwm: pwm_block,
            pcm: pcm_block,
            buffer,
            byte_count,
            _dev_mem: dev_mem,
        })
    }

    /// Route the serializer output onto `pin` through its alternate function.
    fn bind_gpio(&self, pin: u8, altnum: u8) -> Result<()> {
        let fsel = gpio::fsel_alt(altnum)?;
        let (reg, _) = gpio::fsel_position(pin);
        let patched = gpio::fsel_patch(self.gpio.GPFSEL[reg].get(), pin, fsel);
        self.gpio.GPFSEL[reg].set(patched);
        settle();
        Ok(())
    }

    fn setup_error(&self) -> Ws281xError {
        match self.mode {
            DriverMode::Pwm => Ws281xError::PwmSetup,
            DriverMode::Pcm => Ws281xError::PcmSetup,
        }
    }

    /// Kill whatever the clock slice was doing, program the divider for
    /// three serializer slots per strip bit, and bring it back up.
    fn init_clock(&self, osc_freq: u32, frequency: u32) -> Result<()> {
        self.stop_serializer();

        self.clock
            .CTL
            .write(clock::CTL::PASSWD.val(clock::CM_PASSWD) + clock::CTL::KILL::SET);
        settle();
        spin_until(
            || !self.clock.CTL.is_set(clock::CTL::BUSY),
            self.setup_error(),
        )?;

        let divisor = osc_freq / (3 * frequency);
        self.clock.DIV.write(
            clock::DIV::PASSWD.val(clock::CM_PASSWD) + clock::DIV::DIVI.val(divisor),
        );
        settle();
        self.clock
            .CTL
            .write(clock::CTL::PASSWD.val(clock::CM_PASSWD) + clock::CTL::SRC::Osc);
        settle();
        self.clock.CTL.write(
            clock::CTL::PASSWD.val(clock::CM_PASSWD)
                + clock::CTL::SRC::Osc
                + clock::CTL::ENAB::SET,
        );
        settle();
        spin_until(|| self.clock.CTL.is_set(clock::CTL::BUSY), self.setup_error())
    }

    fn stop_serializer(&self) {
        if let Some(pwm) = &self.pwm {
            pwm.CTL.set(0);
            settle();
        }
        if let Some(pcm) = &self.pcm {
            pcm.CS_A.set(0);
            settle();
        }
    }

    /// One-time serializer configuration; stays in force across renders.
    fn setup_serializer(&self, invert: [bool; 2]) {
        if let Some(regs) = &self.pwm {
            Self::setup_pwm(regs, invert);
        }
        if let Some(regs) = &self.pcm {
            Self::setup_pcm(regs);
        }
    }

    fn setup_pwm(regs: &pwm::RegisterBlock, invert: [bool; 2]) {
        regs.RNG1.set(32);
        settle();
        regs.CTL.write(pwm::CTL::CLRF1::SET);
        settle();
        regs.DMAC.write(
            pwm::DMAC::ENAB::SET + pwm::DMAC::PANIC.val(7) + pwm::DMAC::DREQ.val(3),
        );
        settle();

        let mut ctl = pwm::CTL::USEF1::SET
            + pwm::CTL::MODE1::Serializer
            + pwm::CTL::USEF2::SET
            + pwm::CTL::MODE2::Serializer;
        if invert[0] {
            ctl += pwm::CTL::POLA1::SET;
        }
        if invert[1] {
            ctl += pwm::CTL::POLA2::SET;
        }
        regs.CTL.write(ctl);
        settle();
        regs.CTL
            .modify(pwm::CTL::PWEN1::SET + pwm::CTL::PWEN2::SET);
        settle();
    }

    fn setup_pcm(regs: &pcm::RegisterBlock) {
        regs.CS_A.write(pcm::CS_A::EN::SET);
        settle();
        regs.MODE_A
            .write(pcm::MODE_A::FLEN.val(31) + pcm::MODE_A::FSLEN.val(1));
        settle();
        // 8-bit width plus CH1WEX gives the full 32-bit frame.
        regs.TXC_A.write(
            pcm::TXC_A::CH1WEX::SET
                + pcm::TXC_A::CH1EN::SET
                + pcm::TXC_A::CH1POS.val(0)
                + pcm::TXC_A::CH1WID.val(8),
        );
        settle();
        regs.CS_A.modify(pcm::CS_A::TXCLR::SET);
        settle();
        regs.DREQ_A
            .write(pcm::DREQ_A::TX.val(0x3f) + pcm::DREQ_A::TX_PANIC.val(0x10));
        settle();
        regs.CS_A.modify(pcm::CS_A::DMAEN::SET);
        settle();
    }

    fn fifo_bus(&self) -> u32 {
        match self.mode {
            DriverMode::Pwm => pwm::PWM_FIFO_BUS,
            DriverMode::Pcm => pcm::PCM_FIFO_BUS,
        }
    }

    fn transfer_info(&self) -> u32 {
        let permap = match self.mode {
            DriverMode::Pwm => dma::PERMAP_PWM,
            DriverMode::Pcm => dma::PERMAP_PCM_TX,
        };
        u32::from(
            dma::TI::NO_WIDE_BURSTS::SET
                + dma::TI::WAIT_RESP::SET
                + dma::TI::DEST_DREQ::SET
                + dma::TI::PERMAP.val(permap)
                + dma::TI::SRC_INC::SET,
        )
    }

    /// Fill in the in-buffer control block the engine will fetch on arm.
    fn write_control_block(&mut self) {
        let mut block = dma::ControlBlock::default();
        block.ti = self.transfer_info();
        block.source_ad = self.buffer.bus_of(CONTROL_BLOCK_BYTES);
        block.dest_ad = self.fifo_bus();
        block.txfr_len = self.byte_count as u32;

        unsafe {
            (self.buffer.as_mut_ptr() as *mut dma::ControlBlock).write(block);
        }
    }

    /// Pixel words of the shared buffer, past the control block.
    fn pixel_words(&mut self) -> &mut [u32] {
        unsafe {
            core::slice::from_raw_parts_mut(
                self.buffer.as_mut_ptr().add(CONTROL_BLOCK_BYTES) as *mut u32,
                self.byte_count / 4,
            )
        }
    }

    /// Re-arm the engine at the control block. The fence orders the buffer
    /// writes before the hardware can observe the arm.
    fn dma_start(&self) {
        compiler_fence(Ordering::Release);

        self.dma.CS.write(dma::CS::RESET::SET);
        settle();
        self.dma.CS.write(dma::CS::INT::SET + dma::CS::END::SET);
        settle();
        self.dma.CONBLK_AD.set(self.buffer.bus_of(0));
        self.dma.DEBUG.set(
            u32::from(
                dma::DEBUG::READ_ERROR::SET
                    + dma::DEBUG::FIFO_ERROR::SET
                    + dma::DEBUG::READ_LAST_NOT_SET_ERROR::SET,
            ),
        );
        self.dma.CS.write(
            dma::CS::WAIT_OUTSTANDING_WRITES::SET
                + dma::CS::PANIC_PRIORITY.val(15)
                + dma::CS::PRIORITY.val(15)
                + dma::CS::ACTIVE::SET,
        );

        if let Some(pcm) = &self.pcm {
            pcm.CS_A.modify(pcm::CS_A::TXON::SET);
        }
    }

    /// Inspect what the previous cycle left in the status registers. Error
    /// latches are cleared so one fault is reported once.
    fn check_status(&self) -> Result<()> {
        let mut faulted = self.dma.CS.is_set(dma::CS::ERROR);

        if let Some(pwm) = &self.pwm {
            let sta = pwm.STA.extract();
            if sta.is_set(pwm::STA::BERR)
                || sta.is_set(pwm::STA::GAPO1)
                || sta.is_set(pwm::STA::GAPO2)
                || sta.is_set(pwm::STA::RERR1)
                || sta.is_set(pwm::STA::WERR1)
            {
                pwm.STA.set(sta.get());
                faulted = true;
            }
        }
        if let Some(pcm) = &self.pcm {
            if pcm.CS_A.is_set(pcm::CS_A::TXERR) {
                pcm.CS_A.modify(pcm::CS_A::TXERR::SET);
                faulted = true;
            }
        }

        if faulted {
            return Err(Ws281xError::Dma);
        }
        Ok(())
    }

    /// Bounded wait for the engine to drain the current frame.
    fn wait_idle(&self) -> Result<()> {
        spin_until(
            || {
                !self.dma.CS.is_set(dma::CS::ACTIVE) || self.dma.CS.is_set(dma::CS::ERROR)
            },
            Ws281xError::Dma,
        )?;
        if self.dma.CS.is_set(dma::CS::ERROR) {
            return Err(Ws281xError::Dma);
        }
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.stop_serializer();
        self.clock
            .CTL
            .write(clock::CTL::PASSWD.val(clock::CM_PASSWD) + clock::CTL::KILL::SET);
        let _ = spin_until(
            || !self.clock.CTL.is_set(clock::CTL::BUSY),
            Ws281xError::Dma,
        );
        // Mappings and the firmware allocation release in field drop order.
    }
}

/// A configured LED strand, bound to the hardware until dropped.
pub struct Strand {
    channels: [Channel; 2],
    frequency: u32,
    clear_on_exit: bool,
    device: Device,
    gate: RenderGate,
    running: bool,
}

/// Reject impossible configurations before any device file is opened.
fn validate(config: &StrandConfig) -> Result<DriverMode> {
    if !(FREQ_MIN..=FREQ_MAX).contains(&config.frequency) {
        return Err(Ws281xError::IllegalFrequency);
    }
    if !(DMA_CHANNEL_MIN..=DMA_CHANNEL_MAX).contains(&config.dma_channel) {
        return Err(Ws281xError::IllegalDmaChannel);
    }
    pins::resolve_mode(config.channels[0].gpio_pin, config.channels[1].gpio_pin)
}

impl Strand {
    /// Validate `config`, bring the hardware up and leave it configured but
    /// idle. The first waveform goes out on the first [`render`](Self::render).
    pub fn open(config: StrandConfig) -> Result<Self> {
        let mode = validate(&config)?;

        let board = BoardInfo::detect()?;
        info!(
            "strand open: {:?} on {:?}, dma channel {}, {} Hz",
            mode, board.processor, config.dma_channel, config.frequency
        );

        let mut device = Device::open(&board, &config, mode)?;

        for (index, ch) in config.channels.iter().enumerate() {
            if ch.gpio_pin == 0 {
                continue;
            }
            let altnum = match mode {
                DriverMode::Pwm => pins::pwm_alt(index, ch.gpio_pin),
                DriverMode::Pcm => pins::pcm_dout_alt(ch.gpio_pin),
            }
            .ok_or(Ws281xError::IllegalGpio)?;
            device.bind_gpio(ch.gpio_pin, altnum)?;
        }

        device.init_clock(board.osc_freq, config.frequency)?;
        device.setup_serializer([
            config.channels[0].invert,
            config.channels[1].invert,
        ]);
        device.write_control_block();

        Ok(Self {
            channels: [
                Channel::new(&config.channels[0]),
                Channel::new(&config.channels[1]),
            ],
            frequency: config.frequency,
            clear_on_exit: config.clear_on_exit,
            device,
            gate: RenderGate::new(),
            running: false,
        })
    }

    pub fn channel(&self, index: usize) -> &Channel {
        &self.channels[index]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut Channel {
        &mut self.channels[index]
    }

    /// Pixels of channel `index`, for mutation between renders.
    pub fn leds_mut(&mut self, index: usize) -> &mut [u32] {
        self.channels[index].leds_mut()
    }

    fn encode(&mut self) {
        let mode = self.device.mode;
        let words = self.device.pixel_words();

        for (index, ch) in self.channels.iter().enumerate() {
            if !ch.active() {
                continue;
            }
            // The PWM FIFO interleaves both channels even when only one is
            // in use; PCM carries a single contiguous stream.
            let (start, stride) = match mode {
                DriverMode::Pwm => (index, 2),
                DriverMode::Pcm => (0, 1),
            };
            let soft_invert = mode == DriverMode::Pcm && ch.invert;
            encoder::encode_channel(words, start, stride, &ch.encoding(soft_invert));
        }
    }

    /// Push the current pixel state out to the strips.
    ///
    /// Enforces the inter-frame spacing, surfaces any hardware fault left by
    /// the previous cycle, re-encodes the buffer and re-arms the DMA engine.
    /// On a reported fault the strand stays armed; recovery is reopening.
    pub fn render(&mut self) -> Result<()> {
        self.gate.wait();

        if self.running {
            self.device.check_status()?;
        }

        self.encode();
        self.device.dma_start();
        self.running = true;

        let max_count = self.channels.iter().map(|ch| ch.leds.len()).max().unwrap_or(0);
        self.gate.arm(Duration::from_micros(encoder::render_wait_us(
            max_count as u32,
            self.frequency,
        )));
        Ok(())
    }

    /// Block until the DMA engine has drained the current frame.
    pub fn wait(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        self.device.wait_idle()
    }

    /// Drive frames until `token` is cancelled. `frame` mutates the channel
    /// pixels; cancellation is observed between frames only.
    pub fn render_loop<F>(&mut self, token: &CancelToken, mut frame: F) -> Result<()>
    where
        F: FnMut(&mut [Channel; 2]),
    {
        while !token.is_cancelled() {
            frame(&mut self.channels);
            self.render()?;
        }
        Ok(())
    }

    /// Tear down explicitly. Equivalent to dropping the strand.
    pub fn fini(self) {}
}

impl Drop for Strand {
    fn drop(&mut self) {
        if self.running {
            self.gate.wait();
            if self.clear_on_exit {
                for ch in &mut self.channels {
                    ch.leds.fill(0);
                }
                self.encode();
                self.device.dma_start();
            }
            let _ = self.device.wait_idle();
        }
        debug!("strand teardown");
        // Device drop stops the serializer and clock, then unwinds the
        // mappings and the firmware allocation.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_frequency() {
        let config = StrandConfig {
            frequency: 1_200_000,
            channels: [
                ChannelConfig {
                    gpio_pin: 18,
                    led_count: 8,
                    ..Default::default()
                },
                ChannelConfig::default(),
            ],
            ..Default::default()
        };
        assert_eq!(validate(&config), Err(Ws281xError::IllegalFrequency));
    }

    #[test]
    fn rejects_reserved_dma_channels() {
        for channel in [0, 5, 6, 15] {
            let config = StrandConfig {
                dma_channel: channel,
                channels: [
                    ChannelConfig {
                        gpio_pin: 18,
                        led_count: 8,
                        ..Default::default()
                    },
                    ChannelConfig::default(),
                ],
                ..Default::default()
            };
            assert_eq!(validate(&config), Err(Ws281xError::IllegalDmaChannel));
        }
    }

    #[test]
    fn rejects_unroutable_pin_before_any_mapping() {
        // Pin 17 has no serializer route; the failure must come from pure
        // validation, reachable on any host without device files.
        let config = StrandConfig {
            channels: [
                ChannelConfig {
                    gpio_pin: 17,
                    led_count: 8,
                    ..Default::default()
                },
                ChannelConfig::default(),
            ],
            ..Default::default()
        };
        assert_eq!(validate(&config), Err(Ws281xError::IllegalGpio));
        assert_eq!(
            Strand::open(config).err(),
            Some(Ws281xError::IllegalGpio)
        );
    }

    #[test]
    fn mode_selection_follows_pins() {
        let mut config = StrandConfig::default();
        config.channels[0].gpio_pin = 18;
        config.channels[0].led_count = 1;
        assert_eq!(validate(&config).unwrap(), DriverMode::Pwm);

        config.channels[0].gpio_pin = 21;
        assert_eq!(validate(&config).unwrap(), DriverMode::Pcm);
    }

    #[test]
    fn gate_spaces_consecutive_renders() {
        let mut gate = RenderGate::new();
        gate.arm(Duration::from_millis(30));

        let start = Instant::now();
        gate.wait();
        assert!(start.elapsed() >= Duration::from_millis(30));

        // Unarmed gate returns immediately.
        let start = Instant::now();
        gate.wait();
        assert!(start.elapsed() < Duration::from_millis(5));
    }

    #[test]
    fn slow_caller_is_not_penalized() {
        let mut gate = RenderGate::new();
        gate.arm(Duration::from_millis(10));
        thread::sleep(Duration::from_millis(20));

        let start = Instant::now();
        gate.wait();
        assert!(start.elapsed() < Duration::from_millis(5));
    }

    #[test]
    fn channel_defaults() {
        let ch = Channel::new(&ChannelConfig {
            gpio_pin: 18,
            led_count: 4,
            ..Default::default()
        });
        assert!(ch.active());
        assert_eq!(ch.leds().len(), 4);
        assert_eq!(ch.brightness(), 255);
        assert!(ch.leds().iter().all(|&led| led == 0));

        let idle = Channel::new(&ChannelConfig::default());
        assert!(!idle.active());
    }
}
