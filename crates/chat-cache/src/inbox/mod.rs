//! Offline message inbox.
//!
//! Guarantees at-least-once delivery (I3) for members who are offline when
//! a message is fanned out: the pipeline's consumer side pushes a copy into
//! every offline recipient's inbox, and the gateway drains it on reconnect.

mod store;

pub use store::{Inbox, InboxEntry};
