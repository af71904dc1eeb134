//! One-shot hardware peripheral initialization.
//!
//! Configures the float switch inputs, the pump relay output and the GPIO
//! ISR service using raw ESP-IDF sys calls. Called once from `main()` before
//! the control loop starts.
//!
//! On the host every pin is backed by an atomic level so tests can drive
//! the float inputs and observe the relay output.

use core::convert::Infallible;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::{ErrorType, OutputPin};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::app::state::SwitchState;
use crate::drivers::pump::pin_level;
use crate::error::Error;
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrHandlerFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrHandlerFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::GpioConfigFailed(_) => Self::Init("GPIO config failed"),
            HwInitError::IsrInstallFailed(_) => Self::Init("GPIO ISR service install failed"),
            HwInitError::IsrHandlerFailed(_) => Self::Init("GPIO ISR handler add failed"),
        }
    }
}

// ── Peripherals ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_float_inputs()?;
        init_pump_output()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // Relay starts de-energised, same as on the board.
    gpio_write(pins::PUMP_RELAY_GPIO, pin_level(SwitchState::Off, pins::PUMP_ACTIVE_LOW));
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_float_inputs() -> Result<(), HwInitError> {
    for pin in [pins::OVERHEAD_FLOAT_GPIO, pins::UNDERGROUND_FLOAT_GPIO] {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as esp_err_t { return Err(HwInitError::GpioConfigFailed(ret)); }
    }

    info!("hw_init: float inputs configured (pull-up, any edge)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

/// Simulated pin levels, pulled up (HIGH) until a test says otherwise.
#[cfg(not(target_os = "espidf"))]
static SIM_LEVELS: [AtomicBool; 40] = [const { AtomicBool::new(true) }; 40];

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    usize::try_from(pin)
        .ok()
        .and_then(|i| SIM_LEVELS.get(i))
        .is_some_and(|level| level.load(Ordering::Acquire))
}

/// Drive a simulated input pin.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_level(pin: i32, high: bool) {
    if let Some(level) = usize::try_from(pin).ok().and_then(|i| SIM_LEVELS.get(i)) {
        level.store(high, Ordering::Release);
    }
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_pump_output() -> Result<(), HwInitError> {
    let pin = pins::PUMP_RELAY_GPIO;
    // Latch the OFF level before the driver is enabled so the relay never
    // glitches on at boot.
    let off = pin_level(SwitchState::Off, pins::PUMP_ACTIVE_LOW);
    unsafe { gpio_set_level(pin, u32::from(off)) };

    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as esp_err_t { return Err(HwInitError::GpioConfigFailed(ret)); }

    info!("hw_init: pump relay output configured (off)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    // Main-loop only.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    sim_set_level(pin, high);
}

/// [`OutputPin`] over a raw GPIO number configured by [`init_peripherals`].
#[derive(Debug, Clone, Copy)]
pub struct RawOutputPin(pub i32);

impl ErrorType for RawOutputPin {
    type Error = Infallible;
}

impl OutputPin for RawOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.0, true);
        Ok(())
    }
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::adapters::time::uptime_ms;
#[cfg(target_os = "espidf")]
use crate::sensors::{OVERHEAD_EDGES, UNDERGROUND_EDGES};

#[cfg(target_os = "espidf")]
unsafe extern "C" fn overhead_float_isr(_arg: *mut core::ffi::c_void) {
    OVERHEAD_EDGES.on_raw_edge(uptime_ms());
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn underground_float_isr(_arg: *mut core::ffi::c_void) {
    UNDERGROUND_EDGES.on_raw_edge(uptime_ms());
}

/// Install per-pin GPIO ISR service and register the float handlers.
/// Call after init_peripherals() and before the control loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed. The handlers below are static
    // functions that only touch their channel's atomics.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as esp_err_t && ret != ESP_ERR_INVALID_STATE as esp_err_t {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let handlers: [(i32, unsafe extern "C" fn(*mut core::ffi::c_void)); 2] = [
            (pins::OVERHEAD_FLOAT_GPIO, overhead_float_isr),
            (pins::UNDERGROUND_FLOAT_GPIO, underground_float_isr),
        ];
        for (pin, handler) in handlers {
            let ret = gpio_isr_handler_add(pin, Some(handler), core::ptr::null_mut());
            if ret != ESP_OK as esp_err_t {
                return Err(HwInitError::IsrHandlerFailed(ret));
            }
            gpio_intr_enable(pin);
        }

        info!("hw_init: ISR service installed (OHT, UGT floats)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
