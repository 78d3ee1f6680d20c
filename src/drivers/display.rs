//! 16x2 character LCD behind a PCF8574 I²C backpack.
//!
//! Line formatting is pure and host-testable; only the byte transport
//! (HD44780 4-bit nibbles over I²C) is cfg-gated.  A display that fails to
//! initialise leaves the node fully functional — `show` just becomes a
//! no-op.

use core::fmt::Write as _;

use crate::error::Error;
use crate::sensors::PowerSnapshot;

pub struct Lcd1602 {
    initialized: bool,
}

impl Lcd1602 {
    pub fn new() -> Self {
        Self { initialized: false }
    }

    /// Configure the I²C bus and run the HD44780 init sequence.
    pub fn init(&mut self) -> Result<(), Error> {
        if self.initialized {
            return Ok(());
        }
        self.platform_init()?;
        self.initialized = true;
        log::info!("LCD ready");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Render the cycle's readings.  No-op until `init` has succeeded.
    pub fn show(&mut self, snapshot: &PowerSnapshot) {
        if !self.initialized {
            return;
        }
        let (line1, line2) = format_lines(snapshot);
        self.platform_write_line(0, line1.as_str());
        self.platform_write_line(1, line2.as_str());
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_init(&self) -> Result<(), Error> {
        log::info!("LCD(sim): init skipped");
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_write_line(&mut self, row: u8, text: &str) {
        log::debug!("LCD(sim) row {}: {}", row, text);
    }

    #[cfg(target_os = "espidf")]
    fn platform_init(&self) -> Result<(), Error> {
        hw::init().map_err(|_| Error::Init("LCD I2C init failed"))
    }

    #[cfg(target_os = "espidf")]
    fn platform_write_line(&mut self, row: u8, text: &str) {
        hw::write_line(row, text);
    }
}

/// Format the two display lines (current / power on top, line voltage
/// below).  Pure so the layout is testable on the host.
pub fn format_lines(
    s: &PowerSnapshot,
) -> (heapless::String<16>, heapless::String<16>) {
    let mut line1 = heapless::String::new();
    let mut line2 = heapless::String::new();
    let _ = write!(line1, "I:{:.3} P:{:.0}", s.total_current_a, s.total_power_w);
    let _ = write!(line2, "Voltage={:.1} v", s.voltage_v);
    (line1, line2)
}

// ── HD44780 over PCF8574 (ESP-IDF) ────────────────────────────

#[cfg(target_os = "espidf")]
mod hw {
    use esp_idf_svc::sys::*;

    use crate::pins;

    const I2C_PORT: i32 = 0;
    const BACKLIGHT: u8 = 0x08;
    const ENABLE: u8 = 0x04;
    const RS_DATA: u8 = 0x01;

    pub fn init() -> Result<(), i32> {
        let mut cfg = i2c_config_t::default();
        cfg.mode = i2c_mode_t_I2C_MODE_MASTER;
        cfg.sda_io_num = pins::I2C_SDA_GPIO;
        cfg.scl_io_num = pins::I2C_SCL_GPIO;
        cfg.sda_pullup_en = true;
        cfg.scl_pullup_en = true;
        cfg.__bindgen_anon_1.master.clk_speed = 100_000;

        // SAFETY: called once from the boot path before any LCD writes.
        unsafe {
            let ret = i2c_param_config(I2C_PORT, &cfg);
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = i2c_driver_install(I2C_PORT, i2c_mode_t_I2C_MODE_MASTER, 0, 0, 0);
            if ret != ESP_OK {
                return Err(ret);
            }
        }

        // HD44780 4-bit init sequence.
        for cmd in [0x33u8, 0x32, 0x28, 0x0C, 0x06, 0x01] {
            send(cmd, false);
        }
        Ok(())
    }

    pub fn write_line(row: u8, text: &str) {
        // DDRAM addresses: row 0 at 0x00, row 1 at 0x40.
        send(0x80 | (row * 0x40), false);
        let mut written = 0;
        for b in text.bytes().take(16) {
            send(b, true);
            written += 1;
        }
        for _ in written..16 {
            send(b' ', true); // pad so stale characters never linger
        }
    }

    fn send(byte: u8, is_data: bool) {
        let rs = if is_data { RS_DATA } else { 0 };
        for nibble in [byte & 0xF0, (byte << 4) & 0xF0] {
            let base = nibble | BACKLIGHT | rs;
            write_raw(base | ENABLE);
            write_raw(base);
        }
    }

    fn write_raw(byte: u8) {
        // SAFETY: the I2C driver was installed in init(); single-threaded
        // main-loop access only.
        unsafe {
            i2c_master_write_to_device(I2C_PORT, pins::LCD_I2C_ADDR, &byte, 1, 100);
        }
    }
}
