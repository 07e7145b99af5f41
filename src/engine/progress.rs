/// Characters that must accumulate before they convert into experience.
pub const BATCH_CHARS: u64 = 100;
/// Experience granted per full batch of characters.
pub const BATCH_XP: u64 = 5;
/// Experience per level band.
pub const XP_PER_LEVEL: u64 = 100;

/// Level derived from total experience: fixed 100-point bands, starting at 1.
pub fn level(xp: u64) -> u32 {
    (xp / XP_PER_LEVEL) as u32 + 1
}

/// Outcome of feeding a character count into the accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GainReport {
    pub xp_gained: u64,
    pub leveled_up: bool,
}

/// Experience accumulator. Invariant: `pending_chars < BATCH_CHARS` after
/// every operation, so pending is always the remainder of total characters
/// typed modulo the batch size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExperienceState {
    total_xp: u64,
    pending_chars: u64,
}

impl Default for ExperienceState {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl ExperienceState {
    /// Build from persisted values. A stale file may carry pending >= 100;
    /// fold the overflow through the normal conversion so the invariant
    /// holds from the start.
    pub fn new(total_xp: u64, pending_chars: u64) -> Self {
        let mut state = Self {
            total_xp,
            pending_chars: 0,
        };
        state.apply_characters(pending_chars);
        state
    }

    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    pub fn pending_chars(&self) -> u64 {
        self.pending_chars
    }

    pub fn level(&self) -> u32 {
        level(self.total_xp)
    }

    /// Progress through the current level band as a ratio in [0, 1).
    pub fn level_progress(&self) -> f64 {
        (self.total_xp % XP_PER_LEVEL) as f64 / XP_PER_LEVEL as f64
    }

    /// Feed `count` newly inserted characters into the accumulator.
    /// A count of zero changes nothing and reports no gain.
    pub fn apply_characters(&mut self, count: u64) -> GainReport {
        if count == 0 {
            return GainReport {
                xp_gained: 0,
                leveled_up: false,
            };
        }

        self.pending_chars += count;
        let xp_gained = (self.pending_chars / BATCH_CHARS) * BATCH_XP;
        let mut leveled_up = false;
        if xp_gained > 0 {
            let level_before = level(self.total_xp);
            self.total_xp += xp_gained;
            self.pending_chars %= BATCH_CHARS;
            leveled_up = level(self.total_xp) > level_before;
        }

        GainReport {
            xp_gained,
            leveled_up,
        }
    }
}
