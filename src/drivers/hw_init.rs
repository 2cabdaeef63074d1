//! One-shot hardware peripheral initialization.
//!
//! Configures the thermistor ADC channel, the tachometer GPIO and (in
//! interrupt mode) the GPIO ISR using raw ESP-IDF sys calls. Called once
//! from `main()` before the control loop starts. The I2C bus and UART are
//! owned by `esp-idf-hal` drivers constructed in `main`.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::sensors::tachometer::EdgePolarity;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR install failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(match e {
            HwInitError::AdcInitFailed(_) => "thermistor ADC",
            HwInitError::GpioConfigFailed(_) => "tachometer GPIO",
            HwInitError::IsrInstallFailed(_) => "tachometer ISR",
        })
    }
}

#[cfg(target_os = "espidf")]
use crate::pins;

/// Configure the thermistor ADC and the tachometer input.
#[cfg(target_os = "espidf")]
pub fn init_peripherals(edge: EdgePolarity, tach_interrupt: bool) -> crate::error::Result<()> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_tach_gpio(edge, tach_interrupt)?;
    }
    if tach_interrupt {
        init_isr_service()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(_edge: EdgePolarity, _tach_interrupt: bool) -> crate::error::Result<()> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path. `init_adc()` completes before the control loop
/// starts.
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

    // 12 dB attenuation covers the full 0–3.3 V divider swing.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe {
        adc_oneshot_config_channel(adc1_handle(), pins::THERMISTOR_ADC_CHANNEL, &chan_cfg)
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!(
        "hw_init: ADC1 configured (CH{}=axle thermistor)",
        pins::THERMISTOR_ADC_CHANNEL
    );
    Ok(())
}

/// One oneshot conversion. The driver call blocks for one conversion
/// (tens of µs), never longer.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, crate::error::SensorError> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(crate::error::SensorError::AdcReadFailed);
    }
    Ok(raw.max(0) as u16)
}

// ── Tachometer GPIO ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_tach_gpio(edge: EdgePolarity, interrupt: bool) -> Result<(), HwInitError> {
    let intr_type = match (interrupt, edge) {
        (false, _) => gpio_int_type_t_GPIO_INTR_DISABLE,
        (true, EdgePolarity::Falling) => gpio_int_type_t_GPIO_INTR_NEGEDGE,
        (true, EdgePolarity::Rising) => gpio_int_type_t_GPIO_INTR_POSEDGE,
    };
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::TACH_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type,
        ..Default::default()
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    info!(
        "hw_init: tach GPIO{} input, pull-up, {:?} edge, {}",
        pins::TACH_GPIO,
        edge,
        if interrupt { "interrupt" } else { "polled" }
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tach_gpio_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: esp_timer_get_time is an RTC counter read; safe in ISR context.
    let now_us = unsafe { esp_timer_get_time() } as u64;
    crate::sensors::tachometer::tach_isr_handler(now_us);
}

/// Install the per-pin GPIO ISR service and register the tach handler.
#[cfg(target_os = "espidf")]
fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed. The handler only touches the
    // critical-section guarded edge latch.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let ret = gpio_isr_handler_add(pins::TACH_GPIO, Some(tach_gpio_isr), core::ptr::null_mut());
        if ret != ESP_OK as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        // Armed on START; a session-less wheel must not interrupt the loop.
        gpio_intr_disable(pins::TACH_GPIO);
    }
    info!("hw_init: ISR service installed (tach, disabled until START)");
    Ok(())
}

/// Enable or disable the tachometer edge interrupt.
#[cfg(target_os = "espidf")]
pub fn set_tach_interrupt(enabled: bool) {
    // SAFETY: toggles the interrupt enable bit of a pin whose ISR was
    // registered in `init_isr_service`.
    let ret = unsafe {
        if enabled {
            gpio_intr_enable(pins::TACH_GPIO)
        } else {
            gpio_intr_disable(pins::TACH_GPIO)
        }
    };
    if ret != ESP_OK as i32 {
        log::warn!("hw_init: tach interrupt {} failed (rc={})", if enabled { "enable" } else { "disable" }, ret);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn set_tach_interrupt(_enabled: bool) {}
