//! Hardware timer module using ESP-IDF's esp_timer API.
//!
//! Creates the periodic sampling and control-cycle timers that push events
//! into the lock-free SPSC queue.  On simulation targets the main loop
//! drives the queue itself with thread::sleep.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! they can safely call push_event() which uses AtomicU8.

use crate::events::{push_event, Event};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut SAMPLE_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut CONTROL_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: SAMPLE_TIMER is written once in `start_timers()` before any
/// timer callbacks fire.  Only called from the single main task.
#[cfg(target_os = "espidf")]
unsafe fn sample_timer() -> esp_timer_handle_t {
    unsafe { SAMPLE_TIMER }
}

/// SAFETY: Same invariants as `sample_timer()`.
#[cfg(target_os = "espidf")]
unsafe fn control_timer() -> esp_timer_handle_t {
    unsafe { CONTROL_TIMER }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn sample_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::SampleTick);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn control_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::ControlTick);
}

/// Start the hardware tick timers.
///
/// - sampling timer at `sample_interval_us` (1 kHz by default)
/// - control tick timer at `control_interval_ms` (1 Hz by default)
#[cfg(target_os = "espidf")]
pub fn start_timers(sample_interval_us: u32, control_interval_ms: u32) {
    // SAFETY: SAMPLE_TIMER and CONTROL_TIMER are written here once at boot
    // from the single main-task context before any timer callbacks fire.
    // The callbacks themselves only call push_event(), which is ISR-safe.
    unsafe {
        let sample_args = esp_timer_create_args_t {
            callback: Some(sample_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"sample\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&sample_args, &raw mut SAMPLE_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: sample timer create failed (rc={}) — continuing without sampling ticks",
                ret
            );
            return;
        }
        let ret = esp_timer_start_periodic(SAMPLE_TIMER, u64::from(sample_interval_us));
        if ret != ESP_OK {
            log::error!("hw_timer: sample timer start failed (rc={})", ret);
            return;
        }

        let control_args = esp_timer_create_args_t {
            callback: Some(control_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"control\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&control_args, &raw mut CONTROL_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: control timer create failed (rc={}) — continuing without control ticks",
                ret
            );
            return;
        }
        let ret =
            esp_timer_start_periodic(CONTROL_TIMER, u64::from(control_interval_ms) * 1_000);
        if ret != ESP_OK {
            log::error!("hw_timer: control timer start failed (rc={})", ret);
            return;
        }

        info!(
            "hw_timer: sampling every {}us + control every {}ms",
            sample_interval_us, control_interval_ms
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers(_sample_interval_us: u32, _control_interval_ms: u32) {
    log::info!("hw_timer(sim): timers not started (events driven by sleep loop)");
}

/// Stop all hardware tick timers.
#[cfg(target_os = "espidf")]
pub fn stop_timers() {
    // SAFETY: handles are valid if start_timers() succeeded; null-check
    // prevents stopping a timer that was never created.
    unsafe {
        let st = sample_timer();
        if !st.is_null() {
            esp_timer_stop(st);
        }
        let ct = control_timer();
        if !ct.is_null() {
            esp_timer_stop(ct);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_timers() {}
