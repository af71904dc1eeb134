//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the control rules for the pump: the device state
//! aggregate, the decision engine, and the controller that applies peer
//! commands and float events. All interaction with hardware and the network
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod commands;
pub mod decision;
pub mod events;
pub mod ports;
pub mod service;
pub mod state;
