//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in chat-core.
//! Each repository handles database operations for a specific domain entity.

mod error;
mod guild;
mod invite;
mod membership;
mod message;
mod user;

pub use guild::PgGuildRepository;
pub use invite::PgInviteRepository;
pub use membership::PgMembershipRepository;
pub use message::PgMessageRepository;
pub use user::PgUserRepository;
