//! Connection management
//!
//! `ConnMgr` (§4.6) owns `Session` objects and enforces the single-session-
//! per-user invariant (I2).

mod manager;
mod session;

pub use manager::ConnMgr;
pub use session::{generate_session_id, Session, OUTBOUND_QUEUE_DEPTH};
