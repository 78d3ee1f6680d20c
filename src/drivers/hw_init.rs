//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 oneshot unit (voltage + both CT channels) and the
//! relay GPIO outputs using raw ESP-IDF sys calls.  Called once from
//! `main()` before the control loop starts.
//!
//! On non-espidf targets the raw accessors are backed by per-pin /
//! per-channel sim statics so the pipeline and drivers can be exercised in
//! host tests.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_outputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the control loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for channel in [pins::VOLTAGE_ADC_CH, pins::CT1_ADC_CH, pins::CT2_ADC_CH] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!(
        "hw_init: ADC1 configured (CH{}=voltage, CH{}=CT1, CH{}=CT2)",
        pins::VOLTAGE_ADC_CH,
        pins::CT1_ADC_CH,
        pins::CT2_ADC_CH
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded main-loop access only;
    // the handle was written once during init_adc() before this runs.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

// ── GPIO outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [pins::RELAY1_GPIO, pins::RELAY2_GPIO];

    for pin in output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: gpio_config is called once per pin from the boot path.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: relay GPIOs configured as outputs");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: pin was configured as an output in init_gpio_outputs().
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

// ── Host simulation ───────────────────────────────────────────
//
// Per-channel / per-pin atomics stand in for the real peripherals so the
// sensing pipeline and relay driver run unmodified in host tests.

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU16, AtomicU32, AtomicU8, Ordering};

    const ADC_CHANNELS: usize = 10;
    const GPIO_PINS: usize = 40;

    pub static ADC_RAW: [AtomicU16; ADC_CHANNELS] =
        [const { AtomicU16::new(0) }; ADC_CHANNELS];
    pub static GPIO_LEVEL: [AtomicU8; GPIO_PINS] = [const { AtomicU8::new(0) }; GPIO_PINS];
    pub static GPIO_WRITES: [AtomicU32; GPIO_PINS] = [const { AtomicU32::new(0) }; GPIO_PINS];

    pub fn read(channel: u32) -> u16 {
        ADC_RAW
            .get(channel as usize)
            .map_or(0, |a| a.load(Ordering::Relaxed))
    }

    pub fn write(pin: i32, high: bool) {
        if let Some(level) = GPIO_LEVEL.get(pin as usize) {
            level.store(u8::from(high), Ordering::Relaxed);
        }
        if let Some(count) = GPIO_WRITES.get(pin as usize) {
            count.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(channel: u32) -> u16 {
    sim::read(channel)
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    sim::write(pin, high);
}

/// Inject a raw ADC value for a channel (host tests).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc_raw(channel: u32, raw: u16) {
    use core::sync::atomic::Ordering;
    if let Some(a) = sim::ADC_RAW.get(channel as usize) {
        a.store(raw, Ordering::Relaxed);
    }
}

/// Last driven level of a pin (host tests).  `true` = HIGH.
#[cfg(not(target_os = "espidf"))]
pub fn sim_gpio_level(pin: i32) -> bool {
    use core::sync::atomic::Ordering;
    sim::GPIO_LEVEL
        .get(pin as usize)
        .is_some_and(|a| a.load(Ordering::Relaxed) != 0)
}

/// Number of writes issued to a pin since process start (host tests).
#[cfg(not(target_os = "espidf"))]
pub fn sim_gpio_write_count(pin: i32) -> u32 {
    use core::sync::atomic::Ordering;
    sim::GPIO_WRITES
        .get(pin as usize)
        .map_or(0, |a| a.load(Ordering::Relaxed))
}
