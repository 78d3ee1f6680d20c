//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements       | Connects to               |
//! |------------|------------------|---------------------------|
//! | `hardware` | MeterPort        | ESP32 ADC front end       |
//! |            | RelayPort        | Relay GPIOs               |
//! | `log_sink` | EventSink        | Serial log output         |
//! | `wifi`     | ConnectivityPort | ESP-IDF WiFi STA          |
//! | `http`     | CommandPort      | Server command endpoint   |
//! |            | EventSink        | Server telemetry endpoint |

pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod wifi;
