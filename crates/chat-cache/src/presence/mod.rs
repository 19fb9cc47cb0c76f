//! Presence storage module.
//!
//! Tracks per-guild online membership and connection routing.

mod user_presence;

pub use user_presence::{PresenceData, PresenceStore, UserStatus};
