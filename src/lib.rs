//! Greenhollow - Village Simulation Game Core
//!
//! Skill and specialization progression, the notification queue it
//! reports through, form validation, NPC metrics and the session phase
//! machine. Everything is owned explicit state driven by injected
//! clocks, schedulers and storage; the UI layer subscribes to events
//! and calls the public mutators.

pub mod core;
pub mod notify;
pub mod npc;
pub mod session;
pub mod skills;
pub mod validate;
