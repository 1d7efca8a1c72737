//! Domain types for the Seeker API.

pub mod card;
pub mod catalog;
pub mod user;

pub use card::{CardKey, NewSeekingCard, SeekingCard, StockSnapshot};
pub use catalog::{Blueprint, Expansion};
pub use user::{CurrentUser, User, UserSummary};
