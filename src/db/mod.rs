pub mod pool;
pub mod sessions;
pub mod users;

pub use pool::{DbPool, open_pool};
pub use sessions::SessionStore;
pub use users::{User, UserStore};
