#![allow(dead_code)]

use lock_core::config::LockConfig;
use lock_core::controller::LockController;
use lock_core::password::Digit;
use lock_core::peripherals::Button;
use lock_core::peripherals::memory::{MemoryBoard, memory_board};
use lock_core::telemetry::LockEvent;

pub type Lock = LockController<MemoryBoard>;

/// Powers the lock on and runs it until password entry opens.
pub fn booted(config: LockConfig) -> Lock {
    let mut lock = LockController::new(memory_board(0), config);
    lock.start().expect("memory peripherals configure");
    lock.run(config.entry_screen_at);
    lock
}

fn poll(lock: &mut Lock) {
    let period = lock.device().config().poll_period;
    lock.run(period);
}

/// Moves the hand to `digit` and waits for a fresh reading.
pub fn dial(lock: &mut Lock, digit: u8) {
    let digit = Digit::new(digit).expect("digit");
    let distance = lock.device().config().distance_for(digit);
    lock.device_mut()
        .peripherals_mut()
        .sonar
        .set_distance(distance);
    poll(lock);
}

pub fn tap(lock: &mut Lock, button: Button) {
    lock.device_mut().peripherals_mut().buttons.press(button);
    poll(lock);
    lock.device_mut().peripherals_mut().buttons.release(button);
    poll(lock);
}

/// Dials and confirms every digit of `code`.
pub fn enter(lock: &mut Lock, code: &str) {
    for byte in code.bytes() {
        dial(lock, byte - b'0');
        tap(lock, Button::Confirm);
    }
}

/// Dials every digit of `code` and captures it with the mode button.
pub fn change(lock: &mut Lock, code: &str) {
    for byte in code.bytes() {
        dial(lock, byte - b'0');
        tap(lock, Button::Mode);
    }
}

/// Waits out the pause after a reset until entry reopens.
pub fn await_entry(lock: &mut Lock) {
    let pause = lock.device().config().input_start;
    lock.run(pause);
}

pub fn drain(lock: &mut Lock) -> Vec<LockEvent> {
    std::iter::from_fn(|| lock.pop_event())
        .map(|record| record.event)
        .collect()
}

pub fn screen(lock: &Lock) -> (String, String) {
    let display = &lock.device().peripherals().display;
    (
        display.line(0).trim_end().to_owned(),
        display.line(1).trim_end().to_owned(),
    )
}
