//! Shared value types for Seeker.
//!
//! - [`id`] - Newtype IDs for Cardtrader entities and Discord users
//! - [`card`] - Card attribute types (finish)

pub mod card;
pub mod id;

pub use card::CardFinish;
pub use id::{BlueprintId, ExpansionId, UserId};
