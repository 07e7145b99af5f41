use serde::{Deserialize, Serialize};

const SCHEMA_VERSION: u32 = 1;

/// The whole persisted surface of the app: the experience total and the
/// sub-batch character remainder, plus a version guard.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileData {
    pub schema_version: u32,
    pub total_xp: u64,
    pub pending_chars: u64,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            total_xp: 0,
            pending_chars: 0,
        }
    }
}

impl ProfileData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
