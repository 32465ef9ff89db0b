//! Owner of the scheduler and the device context.
//!
//! Front-ends build a [`LockController`] from a peripheral bundle, call
//! [`LockController::start`] once, then [`LockController::tick`] once per
//! [`crate::config::TICK`] and drain events in between.

use crate::config::LockConfig;
use crate::device::{Device, Outcome, Phase};
use crate::peripherals::{PeripheralFault, Peripherals};
use crate::scheduler::{Countdown, RearmSource, Scheduler, TickOutcome};
use crate::tasks::{LockTask, TASK_COUNT, TaskId, task_table};
use crate::telemetry::EventRecord;

/// Scheduler over the lock's task table.
pub type LockScheduler = Scheduler<LockTask, TASK_COUNT>;

pub struct LockController<P: Peripherals> {
    scheduler: LockScheduler,
    device: Device<P>,
}

impl<P: Peripherals> LockController<P> {
    #[must_use]
    pub fn new(peripherals: P, config: LockConfig) -> Self {
        Self {
            scheduler: Scheduler::new(task_table(&config)),
            device: Device::new(peripherals, config),
        }
    }

    /// Performs the one-time hardware configuration.
    ///
    /// # Errors
    ///
    /// Returns the peripheral that rejected its configuration.
    pub fn start(&mut self) -> Result<(), PeripheralFault> {
        self.device.configure()
    }

    /// Runs one scheduler pass.
    pub fn tick(&mut self) -> TickOutcome {
        self.device.set_clock(self.scheduler.elapsed() + 1);
        self.scheduler.tick(&mut self.device)
    }

    /// Runs up to `ticks` passes, stopping early on a halt.
    pub fn run(&mut self, ticks: u32) -> TickOutcome {
        let mut fired = 0;
        for _ in 0..ticks {
            match self.tick() {
                TickOutcome::Continue { fired: count } => fired += count,
                halted @ TickOutcome::Halted { .. } => return halted,
            }
        }
        TickOutcome::Continue { fired }
    }

    /// Restores the entry state as after a failed attempt and applies the
    /// resulting rearms immediately.
    pub fn reset(&mut self) {
        self.device.reset();
        while let Some(rearm) = self.device.next_rearm() {
            self.scheduler.rearm(rearm.slot, rearm.countdown);
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.device.phase()
    }

    #[must_use]
    pub const fn last_outcome(&self) -> Option<Outcome> {
        self.device.last_outcome()
    }

    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.scheduler.halted_by().is_some()
    }

    /// Ticks executed since power-on.
    #[must_use]
    pub const fn elapsed(&self) -> u64 {
        self.scheduler.elapsed()
    }

    /// Countdown of one task.
    #[must_use]
    pub fn countdown(&self, task: TaskId) -> Option<Countdown> {
        self.scheduler.countdown(task.slot())
    }

    #[must_use]
    pub const fn device(&self) -> &Device<P> {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut Device<P> {
        &mut self.device
    }

    /// Removes the oldest pending event.
    pub fn pop_event(&mut self) -> Option<EventRecord> {
        self.device.pop_event()
    }
}
