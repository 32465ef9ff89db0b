//! Logging helpers for drained lock events.
//!
//! Records go to defmt over RTT on target and to stdout on host builds.

use lock_core::peripherals::PeripheralFault;
use lock_core::telemetry::EventRecord;

/// Mirrors one drained event.
pub fn log_event(record: &EventRecord) {
    emit_event(record);
}

/// Reports that the entry window expired and the scheduler stopped.
pub fn log_lock_out(elapsed: u64, slot: usize) {
    emit_lock_out(elapsed, slot);
}

/// Reports a peripheral that rejected its one-time setup.
pub fn log_setup_fault(fault: PeripheralFault) {
    emit_setup_fault(fault);
}

/// Reports how many events were lost since the previous report.
pub fn log_dropped(count: u32) {
    emit_dropped(count);
}

#[cfg(target_os = "none")]
fn emit_event(record: &EventRecord) {
    defmt::info!(
        "telemetry:lock t={}ms {}",
        record.at,
        defmt::Display2Format(&record.event)
    );
}

#[cfg(not(target_os = "none"))]
fn emit_event(record: &EventRecord) {
    println!("telemetry:lock t={}ms {}", record.at, record.event);
}

#[cfg(target_os = "none")]
fn emit_lock_out(elapsed: u64, slot: usize) {
    defmt::warn!("telemetry:lock halted t={}ms slot={}", elapsed, slot);
}

#[cfg(not(target_os = "none"))]
fn emit_lock_out(elapsed: u64, slot: usize) {
    println!("telemetry:lock halted t={elapsed}ms slot={slot}");
}

#[cfg(target_os = "none")]
fn emit_setup_fault(fault: PeripheralFault) {
    defmt::error!("telemetry:lock setup failed {}", defmt::Display2Format(&fault));
}

#[cfg(not(target_os = "none"))]
fn emit_setup_fault(fault: PeripheralFault) {
    println!("telemetry:lock setup failed {fault}");
}

#[cfg(target_os = "none")]
fn emit_dropped(count: u32) {
    defmt::warn!("telemetry:lock dropped {} events", count);
}

#[cfg(not(target_os = "none"))]
fn emit_dropped(count: u32) {
    println!("telemetry:lock dropped {count} events");
}
