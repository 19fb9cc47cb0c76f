//! Domain entities - core business objects

mod guild;
mod invite;
mod member;
mod message;
mod user;

pub use guild::Guild;
pub use invite::{generate_invite_code, Invite};
pub use member::{GuildRole, Membership};
pub use message::{Message, MessageType};
pub use user::{is_valid_username, User, UserStatus};
