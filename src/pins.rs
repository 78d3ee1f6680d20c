//! GPIO / peripheral pin assignments for the mainsmon board (ESP32 DevKit).
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Relay outputs (SRD-05VDC relay board, active-LOW inputs)
// ---------------------------------------------------------------------------

/// Relay 1 drive pin.  Logical ON = pin LOW.
pub const RELAY1_GPIO: i32 = 26;
/// Relay 2 drive pin.  Logical ON = pin LOW.
pub const RELAY2_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// ZMPT101B voltage transducer — ADC1 channel 5 (GPIO 33).
pub const VOLTAGE_ADC_CH: u32 = 5;
pub const VOLTAGE_ADC_GPIO: i32 = 33;

/// SCT-013 current transformer, circuit 1 — ADC1 channel 6 (GPIO 34).
pub const CT1_ADC_CH: u32 = 6;
pub const CT1_ADC_GPIO: i32 = 34;

/// SCT-013 current transformer, circuit 2 — ADC1 channel 7 (GPIO 35).
pub const CT2_ADC_CH: u32 = 7;
pub const CT2_ADC_GPIO: i32 = 35;

// ---------------------------------------------------------------------------
// IR receiver (VS1838B, NEC protocol)
// ---------------------------------------------------------------------------

/// IR demodulator data pin, captured by the RMT RX peripheral.
pub const IR_RX_GPIO: i32 = 19;

// ---------------------------------------------------------------------------
// I²C bus (16x2 LCD behind a PCF8574 backpack)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;

/// 7-bit I²C address of the PCF8574 LCD backpack.
pub const LCD_I2C_ADDR: u8 = 0x27;
