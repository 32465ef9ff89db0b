use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::i2c::{self, I2c};
use embassy_time::Delay;
use lock_core::config::LockConfig;
use lock_core::controller::LockController;
use lock_core::peripherals::Board;

use crate::hw::{ActiveLowButtons, FirmwareBoard, Hd44780, PinLedBar, Srf08};
use crate::telemetry;

mod lock_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA1,
        PB0,
        PB1,
        PB2,
        PB3,
        PB4,
        PB5,
        PB8,
        PB9,
        PC0,
        PC1,
        PC2,
        PC3,
        PC4,
        PC5,
        PC6,
        PC7,
        I2C1,
        ..
    } = hal::init(config);

    let mut display = Hd44780::new(
        Output::new(PB0, Level::Low, Speed::Low),
        Output::new(PB1, Level::Low, Speed::Low),
        [
            Output::new(PB2, Level::Low, Speed::Low),
            Output::new(PB3, Level::Low, Speed::Low),
            Output::new(PB4, Level::Low, Speed::Low),
            Output::new(PB5, Level::Low, Speed::Low),
        ],
        Delay,
    );
    let Ok(()) = display.init();

    // Active-low: start dark until the power-on pattern is written.
    let leds = PinLedBar::new([
        Output::new(PC0, Level::High, Speed::Low),
        Output::new(PC1, Level::High, Speed::Low),
        Output::new(PC2, Level::High, Speed::Low),
        Output::new(PC3, Level::High, Speed::Low),
        Output::new(PC4, Level::High, Speed::Low),
        Output::new(PC5, Level::High, Speed::Low),
        Output::new(PC6, Level::High, Speed::Low),
        Output::new(PC7, Level::High, Speed::Low),
    ]);

    let buttons = ActiveLowButtons::new(Input::new(PA0, Pull::Up), Input::new(PA1, Pull::Up));
    let sonar = Srf08::new(I2c::new_blocking(I2C1, PB8, PB9, i2c::Config::default()));

    let board: FirmwareBoard = Board::new(display, sonar, buttons, leds, Delay);
    let mut lock = LockController::new(board, LockConfig::DEFAULT);
    if let Err(fault) = lock.start() {
        telemetry::log_setup_fault(fault);
    }

    spawner
        .spawn(lock_task::run(lock))
        .expect("failed to spawn lock task");

    core::future::pending::<()>().await;
}
