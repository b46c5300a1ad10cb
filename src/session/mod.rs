//! Session phase machine
//!
//! login -> ready -> playing -> ended, with restart and logout escape
//! hatches. Every transition is total: calls that are invalid for the
//! current phase are ignored rather than erroring. Auto-login resumes
//! straight into `Ready` when both persisted slots are present.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::observer::{Listeners, SubscriptionId};
use crate::core::storage::{self, KeyValueStorage};
use crate::core::time::Clock;

/// Top-level phase gating which UI subtree mounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Login,
    Ready,
    Playing,
    Ended,
}

/// Persisted record of who is logged in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    pub nickname: String,
    /// Clock milliseconds at login
    pub logged_in_at_ms: u64,
}

/// Published on every actual transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseEvent {
    pub from: GamePhase,
    pub to: GamePhase,
}

/// The session state machine
pub struct Session {
    phase: GamePhase,
    player: Option<PlayerData>,
    storage: Box<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    listeners: Listeners<PhaseEvent>,
}

impl Session {
    /// Start in `Ready` when the auto-login flag and a readable player
    /// record are both persisted; otherwise start at the login screen.
    pub fn new(storage: Box<dyn KeyValueStorage>, clock: Arc<dyn Clock>) -> Self {
        let auto_login = storage
            .get(storage::AUTO_LOGIN)
            .map(|v| v == "true")
            .unwrap_or(false);
        let player = storage.get(storage::CURRENT_PLAYER).and_then(|raw| {
            match serde_json::from_str::<PlayerData>(&raw) {
                Ok(player) => Some(player),
                Err(e) => {
                    tracing::warn!("discarding unreadable player record: {e}");
                    None
                }
            }
        });
        let (phase, player) = match (auto_login, player) {
            (true, Some(player)) => (GamePhase::Ready, Some(player)),
            _ => (GamePhase::Login, None),
        };
        Self {
            phase,
            player,
            storage,
            clock,
            listeners: Listeners::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn player(&self) -> Option<&PlayerData> {
        self.player.as_ref()
    }

    /// login -> ready; persists the player record and auto-login flag.
    /// Ignored from any other phase.
    pub fn login(&mut self, nickname: &str) -> bool {
        if self.phase != GamePhase::Login {
            return false;
        }
        let player = PlayerData {
            nickname: nickname.to_string(),
            logged_in_at_ms: self.clock.now_ms(),
        };
        match serde_json::to_string(&player) {
            Ok(raw) => {
                if !self.storage.set(storage::CURRENT_PLAYER, &raw) {
                    tracing::warn!("failed to persist player record for {nickname}");
                }
            }
            Err(e) => tracing::warn!("failed to encode player record: {e}"),
        }
        if !self.storage.set(storage::AUTO_LOGIN, "true") {
            tracing::warn!("failed to persist auto-login flag");
        }
        self.player = Some(player);
        self.transition(GamePhase::Ready);
        true
    }

    /// ready -> playing only
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Ready {
            return false;
        }
        self.transition(GamePhase::Playing);
        true
    }

    /// playing -> ended only
    pub fn end(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.transition(GamePhase::Ended);
        true
    }

    /// Unconditionally back to ready; player data is preserved.
    pub fn restart(&mut self) {
        self.transition(GamePhase::Ready);
    }

    /// Unconditionally back to login; clears persisted player state.
    pub fn logout(&mut self) {
        self.storage.remove(storage::CURRENT_PLAYER);
        self.storage.remove(storage::AUTO_LOGIN);
        self.player = None;
        self.transition(GamePhase::Login);
    }

    pub fn subscribe(&mut self, listener: Box<dyn FnMut(&PhaseEvent)>) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.unsubscribe(id);
    }

    fn transition(&mut self, to: GamePhase) {
        let from = self.phase;
        self.phase = to;
        self.listeners.emit(&PhaseEvent { from, to });
    }
}
