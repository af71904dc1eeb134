//! GPIO pin assignments for the TankPump controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Float switches (pull-up inputs, any-edge interrupt)
// ---------------------------------------------------------------------------

/// Overhead (destination) tank float switch. HIGH = tank full.
pub const OVERHEAD_FLOAT_GPIO: i32 = 27;
/// Underground (source) tank float switch. HIGH = tank full.
pub const UNDERGROUND_FLOAT_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Pump relay
// ---------------------------------------------------------------------------

/// Digital output driving the pump relay module.
pub const PUMP_RELAY_GPIO: i32 = 26;

/// The relay module energises on a LOW input. Fixed at design time; the
/// pump driver never changes this at runtime.
pub const PUMP_ACTIVE_LOW: bool = true;
