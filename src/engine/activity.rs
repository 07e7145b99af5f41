use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Presentation state the rendering surface should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PetState {
    Idle,
    Active,
    LevelUp,
}

impl PetState {
    pub fn as_str(self) -> &'static str {
        match self {
            PetState::Idle => "Idle",
            PetState::Active => "Active",
            PetState::LevelUp => "Level-Up",
        }
    }
}

/// The machine's one-shot timers. Each is single-outstanding: re-arming
/// replaces any pending deadline for the same id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerId {
    Inactivity,
    LevelUpRevert,
}

/// Named deadlines polled by the tick loop. Firing a timer clears it.
#[derive(Debug, Default)]
struct TimerTable {
    inactivity: Option<Instant>,
    level_up_revert: Option<Instant>,
}

impl TimerTable {
    fn slot(&mut self, id: TimerId) -> &mut Option<Instant> {
        match id {
            TimerId::Inactivity => &mut self.inactivity,
            TimerId::LevelUpRevert => &mut self.level_up_revert,
        }
    }

    fn arm(&mut self, id: TimerId, deadline: Instant) {
        *self.slot(id) = Some(deadline);
    }

    /// Timers due at `now`, in deadline order. Due timers are consumed.
    fn due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired: Vec<(Instant, TimerId)> = Vec::new();
        for id in [TimerId::LevelUpRevert, TimerId::Inactivity] {
            let slot = self.slot(id);
            if let Some(deadline) = *slot {
                if deadline <= now {
                    *slot = None;
                    fired.push((deadline, id));
                }
            }
        }
        fired.sort_by_key(|(deadline, _)| *deadline);
        fired.into_iter().map(|(_, id)| id).collect()
    }
}

/// Decides the presentation state from typing events and elapsed time.
///
/// Never reads the clock itself; callers pass `now`, which keeps the
/// transitions deterministic under test.
#[derive(Debug)]
pub struct ActivityMachine {
    state: PetState,
    timers: TimerTable,
    idle_timeout: Duration,
    level_up_hold: Duration,
}

impl ActivityMachine {
    pub fn new(idle_timeout: Duration, level_up_hold: Duration) -> Self {
        Self {
            state: PetState::Idle,
            timers: TimerTable::default(),
            idle_timeout,
            level_up_hold,
        }
    }

    pub fn state(&self) -> PetState {
        self.state
    }

    /// A qualifying typing event. Returns the state to present.
    ///
    /// A pending level-up revert is deliberately left armed when further
    /// non-leveling typing arrives: the original widget let it run to
    /// completion, and its later firing is an idempotent re-emit of Active.
    pub fn on_typing(&mut self, leveled_up: bool, now: Instant) -> PetState {
        self.timers.arm(TimerId::Inactivity, now + self.idle_timeout);
        self.state = if leveled_up {
            self.timers
                .arm(TimerId::LevelUpRevert, now + self.level_up_hold);
            PetState::LevelUp
        } else {
            PetState::Active
        };
        self.state
    }

    /// Fire any due timers, returning the states to present in order.
    pub fn poll(&mut self, now: Instant) -> Vec<PetState> {
        let mut emitted = Vec::new();
        for id in self.timers.due(now) {
            self.state = match id {
                TimerId::LevelUpRevert => PetState::Active,
                TimerId::Inactivity => PetState::Idle,
            };
            emitted.push(self.state);
        }
        emitted
    }
}
