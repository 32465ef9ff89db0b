#![no_std]

// Shared logic for the sonar-dial access controller.
//
// Everything here stays free of the Rust standard library so the firmware and
// the host emulator drive the exact same scheduler and password state machine.

pub mod config;
pub mod console;
pub mod controller;
pub mod device;
pub mod password;
pub mod peripherals;
pub mod scheduler;
pub mod tasks;
pub mod telemetry;
