//! Persistent key-value boundary
//!
//! The core reads and writes a handful of named slots. Failures are
//! logged and treated as "absent"; they never propagate to callers.

use ahash::AHashMap;

/// Slot holding the current player record (JSON-encoded `PlayerData`)
pub const CURRENT_PLAYER: &str = "currentPlayer";

/// Slot holding the auto-login flag ("true" / "false")
pub const AUTO_LOGIN: &str = "autoLogin";

/// Minimal key-value store the session layer persists through
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;

    /// Returns false when the write failed; callers log and continue.
    fn set(&mut self, key: &str, value: &str) -> bool;

    fn remove(&mut self, key: &str);
}

/// In-memory implementation, also the test double
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: AHashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.slots.insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&mut self, key: &str) {
        self.slots.remove(key);
    }
}
