// Name filtering for the visible contact list

use crate::contact::Contact;

/// Case-insensitive substring filter over contact names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    /// Lowercased needle; empty matches everything
    text: String,
}

impl NameFilter {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_lowercase(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        self.is_empty() || contact.name.to_lowercase().contains(&self.text)
    }
}
