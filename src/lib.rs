//! TankPump firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod protocol;
pub mod sensors;
pub mod session;

// The hardware-facing modules compile on the host too; the actual
// register access is guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;

// `critical-section` provider for the device build.
mod esp_link_shims;
