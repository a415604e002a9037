// src/repository/mod.rs

//! Persistence contracts. Handlers only see these traits (through `AppState`);
//! the SQLite implementations live next to them.

pub mod posts;
pub mod users;

pub use posts::{PostRepository, SqlitePostRepository};
pub use users::{SqliteUserRepository, UserRepository};
