//! core
//!
//! Domain types and the index-lock guard.
//!
//! Everything here is free of presentation and process concerns: validated
//! names, the cancellation token, and the lock guard that serializes this
//! tool against other git processes touching the same repository.

pub mod cancel;
pub mod lock;
pub mod types;

pub use cancel::CancelToken;
pub use lock::{LockError, LockGuard, LockWait};
pub use types::{BranchName, RemoteName, TypeError};
