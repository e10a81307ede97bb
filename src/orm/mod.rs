//! SeaORM entities for the board schema.

pub mod ads;
pub mod email_confirmations;
pub mod group_permissions;
pub mod groups;
pub mod managers;
pub mod permissions;
pub mod responses;
pub mod subscribers;
pub mod user_groups;
pub mod users;
