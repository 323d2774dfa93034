// Contact record and the seed set

use serde::{Deserialize, Serialize};

/// A single phone book entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub number: String,
}

impl Contact {
    /// Create a contact with a freshly generated id
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            number: number.into(),
        }
    }

    /// Case-insensitive name comparison used for duplicate detection
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Generate a unique contact id (UUID v7, time-ordered)
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// The example contacts a fresh book starts with
pub fn seed_contacts() -> Vec<Contact> {
    [
        ("id-1", "Rosie Simpson", "459-12-56"),
        ("id-2", "Hermione Kline", "443-89-12"),
        ("id-3", "Eden Clements", "645-17-79"),
        ("id-4", "Annie Copeland", "227-91-26"),
    ]
    .into_iter()
    .map(|(id, name, number)| Contact {
        id: id.to_string(),
        name: name.to_string(),
        number: number.to_string(),
    })
    .collect()
}
