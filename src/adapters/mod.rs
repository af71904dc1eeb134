//! Adapters, concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | LevelPort          | Float switch GPIO        |
//! |                | PumpPort           | Pump relay GPIO          |
//! | `time`         | Clock              | ESP32 system timer       |
//! | `ws_transport` | Transport          | ESP-IDF WebSocket client |
//! | `wifi`         | (boot only)        | ESP-IDF WiFi STA         |

pub mod hardware;
pub mod time;
pub mod wifi;
pub mod ws_transport;
