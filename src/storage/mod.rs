//! Durable storage: the key-value store, the submission log built on it,
//! and the visitor session store used by the HTTP surface.

mod local_store;
mod session_store;
mod submission_store;

pub use local_store::LocalStore;
pub use session_store::VisitorSessionStore;
pub use submission_store::{Partition, SubmissionRecord, SubmissionStore};
