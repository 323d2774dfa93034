// Error types for the contact book and its storage backends

/// Errors returned by [`ContactBook`](crate::ContactBook) and [`Storage`](crate::Storage) implementations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A contact with a case-insensitively equal name already exists.
    /// `name` is the existing contact's display name.
    #[error("{name} is already in contacts")]
    DuplicateName { name: String },

    #[error("invalid storage key: {key} ({reason})")]
    InvalidKey { key: String, reason: String },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite storage failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode contacts: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
