pub mod manager;
pub mod sessions;

pub use manager::{connect, DatabaseError};
pub use sessions::{Session, SessionDraft, SessionStore};
