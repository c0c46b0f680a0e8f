pub mod auth_manager;
pub mod user_locks;

pub use auth_manager::{AuthManager, AuthManagerError, DecodedToken};
pub use user_locks::{UserLockGuard, UserLocks};
