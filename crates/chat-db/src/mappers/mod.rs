//! Entity to model mappers
//!
//! This module provides conversions between domain entities (chat-core) and database models.
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert`/`*Update` structs: Prepare entity data for database operations

mod guild;
mod invite;
mod member;
mod message;
mod user;

pub use guild::{GuildInsert, GuildUpdate};
pub use invite::InviteInsert;
pub use member::{MembershipInsert, MembershipUpdate};
pub use message::MessageInsert;
pub use user::{UserInsert, UserUpdate};
