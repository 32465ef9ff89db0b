use embassy_time::Timer;
use lock_core::controller::LockController;
use lock_core::scheduler::TickOutcome;

use crate::hw::FirmwareBoard;
use crate::telemetry;

#[embassy_executor::task]
pub async fn run(mut lock: LockController<FirmwareBoard>) -> ! {
    let mut reported_drops = 0;

    loop {
        let outcome = lock.tick();
        while let Some(record) = lock.pop_event() {
            telemetry::log_event(&record);
        }

        let dropped = lock.device().events().dropped();
        if dropped != reported_drops {
            telemetry::log_dropped(dropped - reported_drops);
            reported_drops = dropped;
        }

        if let TickOutcome::Halted { slot } = outcome {
            telemetry::log_lock_out(lock.elapsed(), slot);
            break;
        }

        Timer::after_millis(1).await;
    }

    // Locked out until power-cycled.
    loop {
        Timer::after_secs(3_600).await;
    }
}
