//! The eight tasks that make up the lock, and their slot table.
//!
//! Slot order is run order within a tick and matches [`TaskId`]. The sensor
//! slot precedes the button slot so that a press is always judged against a
//! reading taken in the same tick.

use core::fmt;

use crate::config::LockConfig;
use crate::device::{Device, ScreenId};
use crate::peripherals::Peripherals;
use crate::scheduler::{Countdown, Reschedule, Task, TaskSlot};

mod buttons;
mod feedback;
mod messages;
mod sensor;

pub use buttons::ButtonTask;
pub use feedback::{LedTask, TimeoutTask};
pub use messages::{ChangePasswordTask, MessageTask};
pub use sensor::SensorTask;

/// Number of slots in the lock's task table.
pub const TASK_COUNT: usize = 8;

/// Slot identifiers, in run order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TaskId {
    Led,
    Welcome,
    Prompt,
    EntryScreen,
    Sensor,
    Buttons,
    Timeout,
    ChangePassword,
}

impl TaskId {
    pub const ALL: [TaskId; TASK_COUNT] = [
        TaskId::Led,
        TaskId::Welcome,
        TaskId::Prompt,
        TaskId::EntryScreen,
        TaskId::Sensor,
        TaskId::Buttons,
        TaskId::Timeout,
        TaskId::ChangePassword,
    ];

    /// Index of the task in the slot table.
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::ALL.get(slot).copied()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskId::Led => "led",
            TaskId::Welcome => "welcome",
            TaskId::Prompt => "prompt",
            TaskId::EntryScreen => "entry-screen",
            TaskId::Sensor => "sensor",
            TaskId::Buttons => "buttons",
            TaskId::Timeout => "timeout",
            TaskId::ChangePassword => "change-password",
        };
        f.write_str(label)
    }
}

/// Any of the lock's tasks.
#[derive(Clone, Debug)]
pub enum LockTask {
    Led(LedTask),
    Message(MessageTask),
    Sensor(SensorTask),
    Buttons(ButtonTask),
    Timeout(TimeoutTask),
    ChangePassword(ChangePasswordTask),
}

impl<P: Peripherals> Task<Device<P>> for LockTask {
    fn run(&mut self, device: &mut Device<P>) -> Reschedule {
        match self {
            LockTask::Led(task) => task.run(device),
            LockTask::Message(task) => task.run(device),
            LockTask::Sensor(task) => task.run(device),
            LockTask::Buttons(task) => task.run(device),
            LockTask::Timeout(task) => task.run(device),
            LockTask::ChangePassword(task) => task.run(device),
        }
    }
}

/// Builds the slot table with the power-on countdowns from `config`.
#[must_use]
pub fn task_table(config: &LockConfig) -> [TaskSlot<LockTask>; TASK_COUNT] {
    let input = Countdown::Armed(config.input_start);
    [
        TaskSlot::new(Countdown::IMMEDIATE, LockTask::Led(LedTask)),
        TaskSlot::new(
            Countdown::Armed(config.welcome_at),
            LockTask::Message(MessageTask::new(ScreenId::Welcome)),
        ),
        TaskSlot::new(
            Countdown::Armed(config.prompt_at),
            LockTask::Message(MessageTask::new(ScreenId::Prompt)),
        ),
        TaskSlot::new(
            Countdown::Armed(config.entry_screen_at),
            LockTask::Message(MessageTask::new(ScreenId::PasswordEntry)),
        ),
        TaskSlot::new(input, LockTask::Sensor(SensorTask)),
        TaskSlot::new(input, LockTask::Buttons(ButtonTask::new())),
        TaskSlot::new(input, LockTask::Timeout(TimeoutTask)),
        TaskSlot::new(Countdown::Parked, LockTask::ChangePassword(ChangePasswordTask)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_indices_follow_run_order() {
        for (index, id) in TaskId::ALL.iter().enumerate() {
            assert_eq!(id.slot(), index);
            assert_eq!(TaskId::from_slot(index), Some(*id));
        }
        assert_eq!(TaskId::from_slot(TASK_COUNT), None);
    }

    #[test]
    fn table_uses_configured_start_times() {
        let table = task_table(&LockConfig::DEFAULT);
        let countdowns: [Countdown; TASK_COUNT] = core::array::from_fn(|i| table[i].countdown());
        assert_eq!(
            countdowns,
            [
                Countdown::Armed(0),
                Countdown::Armed(0),
                Countdown::Armed(1_000),
                Countdown::Armed(2_000),
                Countdown::Armed(2_000),
                Countdown::Armed(2_000),
                Countdown::Armed(2_000),
                Countdown::Parked,
            ]
        );
        assert!(matches!(
            table[TaskId::ChangePassword.slot()].task(),
            LockTask::ChangePassword(_)
        ));
    }
}
