//! NEC infrared remote receiver.
//!
//! The RMT RX peripheral captures the demodulated pulse train from the
//! VS1838B; a callback in the RMT task classifies each burst into a 32-bit
//! NEC code (IRremote raw ordering, LSB first) or a repeat burst, and
//! pushes it into a small lock-free queue.  [`IrReceiver::poll`] hands out
//! at most one frame per call and never blocks.
//!
//! On host targets the queue is fed by [`sim_push_ir_code`] /
//! [`sim_push_ir_repeat`] instead.

use core::sync::atomic::{AtomicU8, Ordering};

use log::info;

use crate::app::commands::IrFrame;

/// Raw value used on the wire queue for a repeat burst.  A real NEC frame
/// can never be all-ones (the command byte is always followed by its
/// complement), so the sentinel cannot collide with a decoded code.
const NEC_REPEAT_RAW: u32 = 0xFFFF_FFFF;

// ── Lock-free SPSC frame queue ────────────────────────────────
//
// RMT callback writes (produce), control loop reads (consume).

const IR_QUEUE_CAP: usize = 8;

static IR_HEAD: AtomicU8 = AtomicU8::new(0);
static IR_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: SPSC discipline — producer is the RMT task callback (or the sim
// injection helpers in single-threaded tests), consumer is the main loop.
// Acquire/release pairs on head/tail order the buffer accesses.
static mut IR_BUFFER: [u32; IR_QUEUE_CAP] = [0; IR_QUEUE_CAP];

fn push_code(code: u32) -> bool {
    let head = IR_HEAD.load(Ordering::Relaxed);
    let tail = IR_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % IR_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — frame dropped.
    }

    // SAFETY: single producer; the Release store publishes the write.
    unsafe {
        IR_BUFFER[head as usize] = code;
    }

    IR_HEAD.store(next_head, Ordering::Release);
    true
}

fn pop_code() -> Option<u32> {
    let tail = IR_TAIL.load(Ordering::Relaxed);
    let head = IR_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None;
    }

    let raw = unsafe { IR_BUFFER[tail as usize] };
    IR_TAIL.store((tail + 1) % IR_QUEUE_CAP as u8, Ordering::Release);
    Some(raw)
}

// ── Receiver ──────────────────────────────────────────────────

pub struct IrReceiver {
    initialized: bool,
}

impl IrReceiver {
    pub fn new() -> Self {
        Self { initialized: false }
    }

    /// Install the RMT RX channel and start capturing.  Idempotent; a
    /// failed install is logged and the receiver simply stays silent.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.platform_init();
        self.initialized = true;
        info!("IR receiver ready");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Take at most one decoded frame.  Non-blocking; `None` when nothing
    /// was received or the receiver is not initialised.
    pub fn poll(&mut self) -> Option<IrFrame> {
        if !self.initialized {
            return None;
        }
        pop_code().map(|raw| {
            if raw == NEC_REPEAT_RAW {
                IrFrame::Repeat
            } else {
                IrFrame::Code(raw)
            }
        })
    }

    #[cfg(target_os = "espidf")]
    fn platform_init(&self) {
        if let Err(rc) = rmt::install(crate::pins::IR_RX_GPIO) {
            log::error!("IR: RMT RX install failed (rc={}) — remote disabled", rc);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_init(&self) {
        log::info!("IR(sim): receiver using injected frames");
    }
}

impl crate::app::ports::IrPort for IrReceiver {
    fn poll(&mut self) -> Option<IrFrame> {
        IrReceiver::poll(self)
    }
}

/// Inject a decoded NEC code (host tests).
#[cfg(not(target_os = "espidf"))]
pub fn sim_push_ir_code(code: u32) -> bool {
    push_code(code)
}

/// Inject a repeat burst (host tests).
#[cfg(not(target_os = "espidf"))]
pub fn sim_push_ir_repeat() -> bool {
    push_code(NEC_REPEAT_RAW)
}

// ── RMT RX + NEC classification (ESP-IDF) ─────────────────────

#[cfg(target_os = "espidf")]
mod rmt {
    use esp_idf_svc::sys::*;

    use super::{push_code, NEC_REPEAT_RAW};

    // NEC timing windows in microseconds (1 MHz RMT resolution).
    const HDR_MARK: (u16, u16) = (8_500, 9_500);
    const HDR_SPACE: (u16, u16) = (4_000, 5_000);
    const REPEAT_SPACE: (u16, u16) = (2_000, 2_600);
    const BIT_MARK: (u16, u16) = (400, 750);
    const ONE_SPACE: (u16, u16) = (1_400, 1_900);
    const ZERO_SPACE: (u16, u16) = (400, 750);

    static mut RX_CHANNEL: rmt_channel_handle_t = core::ptr::null_mut();
    static mut RX_SYMBOLS: [rmt_symbol_word_t; 64] =
        unsafe { core::mem::zeroed() };

    fn within(d: u16, window: (u16, u16)) -> bool {
        d >= window.0 && d <= window.1
    }

    /// Classify one captured burst.  Returns the raw code, the repeat
    /// sentinel, or None for anything that is not NEC.
    fn classify(symbols: &[rmt_symbol_word_t]) -> Option<u32> {
        let first = symbols.first()?;
        if !within(first.duration0() as u16, HDR_MARK) {
            return None;
        }
        if within(first.duration1() as u16, REPEAT_SPACE) {
            return Some(NEC_REPEAT_RAW);
        }
        if !within(first.duration1() as u16, HDR_SPACE) || symbols.len() < 33 {
            return None;
        }

        let mut code: u32 = 0;
        for (i, sym) in symbols[1..33].iter().enumerate() {
            if !within(sym.duration0() as u16, BIT_MARK) {
                return None;
            }
            if within(sym.duration1() as u16, ONE_SPACE) {
                code |= 1 << i; // LSB first, IRremote raw ordering
            } else if !within(sym.duration1() as u16, ZERO_SPACE) {
                return None;
            }
        }
        Some(code)
    }

    unsafe extern "C" fn on_recv_done(
        channel: rmt_channel_handle_t,
        edata: *const rmt_rx_done_event_data_t,
        _user: *mut core::ffi::c_void,
    ) -> bool {
        // SAFETY: edata points at the receive descriptor for the capture
        // that just finished; the symbol buffer is RX_SYMBOLS.
        let data = unsafe { &*edata };
        let symbols = unsafe {
            core::slice::from_raw_parts(data.received_symbols, data.num_symbols)
        };
        if let Some(code) = classify(symbols) {
            push_code(code);
        }
        // Re-arm for the next burst.
        let receive_cfg = rmt_receive_config_t {
            signal_range_min_ns: 1_000,
            signal_range_max_ns: 12_000_000,
            ..Default::default()
        };
        unsafe {
            rmt_receive(
                channel,
                (&raw mut RX_SYMBOLS).cast(),
                core::mem::size_of::<[rmt_symbol_word_t; 64]>(),
                &receive_cfg,
            );
        }
        false
    }

    /// Create, enable, and arm the RMT RX channel on `gpio`.
    pub fn install(gpio: i32) -> Result<(), i32> {
        let chan_cfg = rmt_rx_channel_config_t {
            gpio_num: gpio,
            clk_src: rmt_clock_source_t_RMT_CLK_SRC_DEFAULT,
            resolution_hz: 1_000_000, // 1 µs ticks
            mem_block_symbols: 64,
            ..Default::default()
        };
        // SAFETY: RX_CHANNEL is written once here, from the boot path,
        // before any RMT callback can fire.
        unsafe {
            let ret = rmt_new_rx_channel(&chan_cfg, &raw mut RX_CHANNEL);
            if ret != ESP_OK {
                return Err(ret);
            }

            let mut cbs = rmt_rx_event_callbacks_t::default();
            cbs.on_recv_done = Some(on_recv_done);
            let ret =
                rmt_rx_register_event_callbacks(RX_CHANNEL, &cbs, core::ptr::null_mut());
            if ret != ESP_OK {
                return Err(ret);
            }

            let ret = rmt_enable(RX_CHANNEL);
            if ret != ESP_OK {
                return Err(ret);
            }

            let receive_cfg = rmt_receive_config_t {
                signal_range_min_ns: 1_000,
                signal_range_max_ns: 12_000_000,
                ..Default::default()
            };
            let ret = rmt_receive(
                RX_CHANNEL,
                (&raw mut RX_SYMBOLS).cast(),
                core::mem::size_of::<[rmt_symbol_word_t; 64]>(),
                &receive_cfg,
            );
            if ret != ESP_OK {
                return Err(ret);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_before_init_returns_none() {
        let mut ir = IrReceiver::new();
        assert_eq!(ir.poll(), None);
    }

    // The frame queue is a process-wide static, so all queue traffic stays
    // in this single sequential scenario.
    #[test]
    fn frames_come_out_in_order() {
        let mut ir = IrReceiver::new();
        ir.init();
        assert_eq!(ir.poll(), None);

        sim_push_ir_code(0xA758_FF00);
        sim_push_ir_repeat();
        sim_push_ir_code(0x1234_5678);

        assert_eq!(ir.poll(), Some(IrFrame::Code(0xA758_FF00)));
        assert_eq!(ir.poll(), Some(IrFrame::Repeat));
        assert_eq!(ir.poll(), Some(IrFrame::Code(0x1234_5678)));
        assert_eq!(ir.poll(), None);
    }
}
