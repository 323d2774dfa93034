// Phonebook - local contact book with durable key-value persistence

pub mod book;
pub mod config;
pub mod contact;
pub mod error;
pub mod filter;
pub mod storage;
pub mod validate;

// Re-export main types for convenience
pub use book::{CONTACTS_KEY, ContactBook};
pub use config::{Backend, Config};
pub use contact::{Contact, seed_contacts};
pub use error::{Error, Result};
pub use filter::NameFilter;
pub use storage::{FileStorage, MemoryStorage, SqliteStorage, Storage};
pub use validate::{ValidationError, validate_contact};
