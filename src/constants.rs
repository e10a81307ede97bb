//! Application-wide constants
//!
//! This module contains constants used throughout the application.

/// Ads shown per page on the board listing.
pub const ADS_PER_PAGE: usize = 5;

/// Responses shown per page on the author's response listing.
pub const RESPONSES_PER_PAGE: usize = 5;

/// Number of digits in an email confirmation code.
pub const CONFIRMATION_CODE_LENGTH: usize = 6;

/// Minutes an email confirmation code stays valid.
pub const CONFIRMATION_CODE_TTL_MINUTES: i64 = 60;

/// Name of the group users join when they elevate themselves to manager.
pub const MANAGERS_GROUP: &str = "managers";

/// Permission that gates mass email. Granted to the managers group.
pub const PERM_SEND_MASS_EMAIL: &str = "board.can_send_mass_email";

/// Session key holding the authenticated user's id.
pub const SESSION_USER_ID: &str = "user_id";
