//! Database entity models for the outreach site.
//!
//! One table backs everything the site persists: `kv_entry`, the durable
//! key-value store holding submissions, the staff principal and visitor
//! sessions.

/// Key-value entry model backing [`crate::LocalStore`].
pub mod kv_entry;
