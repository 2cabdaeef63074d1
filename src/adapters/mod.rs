//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements  | Connects to                      |
//! |---------------|-------------|----------------------------------|
//! | `hardware`    | SensorPort  | I2C IR thermometers, ADC, GPIO   |
//! | `serial_sink` | EventSink   | Host link (PONG byte, CSV lines) |
//! | `log_sink`    | EventSink   | Serial log output                |
//! | `nvs`         | ConfigPort  | NVS / in-memory store            |
//! | `time`        | —           | ESP32 system timer               |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod serial_sink;
pub mod time;
