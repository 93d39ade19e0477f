pub mod guard;
pub mod store;

pub use guard::{SessionGuard, SessionState};
pub use store::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore, UserType};
