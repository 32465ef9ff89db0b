//! Cooperative countdown scheduler.
//!
//! The scheduler owns a fixed, ordered table of task slots. Every [`tick`]
//! walks the table in order, counts each armed slot down by one and runs the
//! task whose countdown reaches zero. The value the task returns decides when
//! it fires next. Nothing here knows about the lock itself: tasks and their
//! shared context are supplied by the caller.
//!
//! Tasks cannot touch the table directly while they run. A task that needs to
//! wake or reschedule another slot queues a [`Rearm`] on the shared context;
//! the scheduler applies queued rearms right after the task returns, before
//! the running slot takes the delay it asked for.
//!
//! [`tick`]: Scheduler::tick

/// Scheduler time unit.
pub type Ticks = u32;

/// Countdown state of a task slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Countdown {
    /// Fires once the remaining ticks have elapsed. Zero fires on the next tick.
    Armed(Ticks),
    /// Dormant until another task rearms the slot.
    Parked,
}

impl Countdown {
    /// Countdown that fires on the very next tick.
    pub const IMMEDIATE: Self = Countdown::Armed(0);

    /// Returns `true` when the slot is dormant.
    #[must_use]
    pub const fn is_parked(self) -> bool {
        matches!(self, Countdown::Parked)
    }

    /// Remaining ticks, or `None` when parked.
    #[must_use]
    pub const fn remaining(self) -> Option<Ticks> {
        match self {
            Countdown::Armed(ticks) => Some(ticks),
            Countdown::Parked => None,
        }
    }
}

/// What a task asks for once it has run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Reschedule {
    /// Run again after the given number of ticks.
    After(Ticks),
    /// Stay dormant until rearmed.
    Park,
    /// Stop the whole run loop. The current tick ends immediately.
    Halt,
}

/// A unit of cooperative work driven by the [`Scheduler`].
pub trait Task<C> {
    /// Runs the task to completion and reports when it wants to run again.
    fn run(&mut self, context: &mut C) -> Reschedule;
}

/// Request to overwrite the countdown of a slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Rearm {
    pub slot: usize,
    pub countdown: Countdown,
}

impl Rearm {
    /// Creates a rearm request for `slot`.
    #[must_use]
    pub const fn new(slot: usize, countdown: Countdown) -> Self {
        Self { slot, countdown }
    }
}

/// Shared context able to hand queued rearm requests to the scheduler.
pub trait RearmSource {
    /// Pops the oldest pending rearm request.
    fn next_rearm(&mut self) -> Option<Rearm>;
}

/// One entry of the task table.
#[derive(Clone, Debug)]
pub struct TaskSlot<T> {
    countdown: Countdown,
    task: T,
}

impl<T> TaskSlot<T> {
    /// Creates a slot with its initial countdown.
    pub const fn new(countdown: Countdown, task: T) -> Self {
        Self { countdown, task }
    }

    /// Current countdown of the slot.
    pub const fn countdown(&self) -> Countdown {
        self.countdown
    }

    /// Task stored in the slot.
    pub const fn task(&self) -> &T {
        &self.task
    }
}

/// Result of a single scheduler pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    /// All slots were visited; `fired` tasks ran.
    Continue { fired: usize },
    /// The task in `slot` asked the run loop to stop.
    Halted { slot: usize },
}

impl TickOutcome {
    /// Returns `true` when the run loop must stop.
    #[must_use]
    pub const fn is_halted(self) -> bool {
        matches!(self, TickOutcome::Halted { .. })
    }
}

/// Fixed-size table of countdown-driven tasks.
#[derive(Clone, Debug)]
pub struct Scheduler<T, const N: usize> {
    slots: [TaskSlot<T>; N],
    elapsed: u64,
    halted: Option<usize>,
}

impl<T, const N: usize> Scheduler<T, N> {
    /// Builds a scheduler over the given slot table. Slot order is run order.
    pub const fn new(slots: [TaskSlot<T>; N]) -> Self {
        Self {
            slots,
            elapsed: 0,
            halted: None,
        }
    }

    /// Number of slots in the table.
    pub const fn len(&self) -> usize {
        N
    }

    /// Returns `true` when the table has no slots.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Number of ticks executed so far.
    pub const fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Slot that halted the scheduler, if any.
    pub const fn halted_by(&self) -> Option<usize> {
        self.halted
    }

    /// Countdown of `slot`, or `None` when the index is out of range.
    pub fn countdown(&self, slot: usize) -> Option<Countdown> {
        self.slots.get(slot).map(TaskSlot::countdown)
    }

    /// Read-only view of the slot table.
    pub fn slots(&self) -> &[TaskSlot<T>] {
        &self.slots
    }

    /// Overwrites the countdown of `slot`. Out-of-range slots are ignored.
    pub fn rearm(&mut self, slot: usize, countdown: Countdown) {
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.countdown = countdown;
        }
    }

    /// Executes one pass over the task table.
    ///
    /// Once a task has halted the scheduler, further calls do nothing and keep
    /// reporting the halt.
    pub fn tick<C>(&mut self, context: &mut C) -> TickOutcome
    where
        T: Task<C>,
        C: RearmSource,
    {
        if let Some(slot) = self.halted {
            return TickOutcome::Halted { slot };
        }

        self.elapsed = self.elapsed.saturating_add(1);
        let mut fired = 0;

        for index in 0..N {
            let due = {
                let slot = &mut self.slots[index];
                match slot.countdown {
                    Countdown::Parked => false,
                    Countdown::Armed(remaining) => {
                        let remaining = remaining.saturating_sub(1);
                        slot.countdown = Countdown::Armed(remaining);
                        remaining == 0
                    }
                }
            };
            if !due {
                continue;
            }

            fired += 1;
            let next = self.slots[index].task.run(context);
            self.apply_rearms(context);

            match next {
                Reschedule::After(delay) => self.slots[index].countdown = Countdown::Armed(delay),
                Reschedule::Park => self.slots[index].countdown = Countdown::Parked,
                Reschedule::Halt => {
                    self.slots[index].countdown = Countdown::Parked;
                    self.halted = Some(index);
                    return TickOutcome::Halted { slot: index };
                }
            }
        }

        TickOutcome::Continue { fired }
    }

    fn apply_rearms<C: RearmSource>(&mut self, context: &mut C) {
        while let Some(request) = context.next_rearm() {
            self.rearm(request.slot, request.countdown);
        }
    }
}
