// Contact book: ordered contacts, current filter, persistence on mutation

use crate::contact::{Contact, seed_contacts};
use crate::error::{Error, Result};
use crate::filter::NameFilter;
use crate::storage::Storage;
use tracing::{debug, info, warn};

/// Storage slot holding the serialized contact list
pub const CONTACTS_KEY: &str = "contacts";

/// The contact collection plus the transient name filter
///
/// Contacts are kept newest first. Every successful add or delete writes the
/// full collection back to the storage slot before returning; the filter is
/// never persisted.
pub struct ContactBook<S: Storage> {
    storage: S,
    contacts: Vec<Contact>,
    filter: NameFilter,
}

impl<S: Storage> ContactBook<S> {
    /// Load contacts from `storage`, or start from the seed set
    ///
    /// A missing, `null` or unparsable slot falls back to the seed set without
    /// an error. The seed set is not written until the first mutation.
    pub fn open(storage: S) -> Result<Self> {
        let contacts = match storage.get(CONTACTS_KEY)? {
            Some(raw) => match serde_json::from_str::<Option<Vec<Contact>>>(&raw) {
                Ok(Some(contacts)) => {
                    info!(count = contacts.len(), "Loaded contacts from storage");
                    contacts
                }
                Ok(None) => {
                    info!("Stored contacts are null, using seed contacts");
                    seed_contacts()
                }
                Err(e) => {
                    warn!(error = ?e, "Stored contacts are malformed, using seed contacts");
                    seed_contacts()
                }
            },
            None => {
                info!("No stored contacts, using seed contacts");
                seed_contacts()
            }
        };

        Ok(Self {
            storage,
            contacts,
            filter: NameFilter::default(),
        })
    }

    /// Add a contact at the front of the list
    ///
    /// Inputs are expected to be validated already. Fails with
    /// [`Error::DuplicateName`] if a contact with the same name (ignoring case)
    /// exists, leaving the collection untouched.
    pub fn add_contact(&mut self, name: &str, number: &str) -> Result<Contact> {
        if let Some(existing) = self.contacts.iter().find(|c| c.has_name(name)) {
            debug!(name, existing = %existing.name, "Rejected duplicate contact");
            return Err(Error::DuplicateName {
                name: existing.name.clone(),
            });
        }

        let contact = Contact::new(name, number);
        self.contacts.insert(0, contact.clone());
        if let Err(e) = self.save() {
            self.contacts.remove(0);
            return Err(e);
        }

        info!(id = %contact.id, name = %contact.name, "Added contact");
        Ok(contact)
    }

    /// Remove the contact with `id`, returning it if it existed
    ///
    /// An unknown id is not an error. The collection is persisted either way.
    pub fn delete_contact(&mut self, id: &str) -> Result<Option<Contact>> {
        let index = self.contacts.iter().position(|c| c.id == id);
        let removed = index.map(|index| self.contacts.remove(index));

        if let Err(e) = self.save() {
            // Keep memory in step with what is stored
            if let (Some(index), Some(contact)) = (index, &removed) {
                self.contacts.insert(index, contact.clone());
            }
            return Err(e);
        }

        match &removed {
            Some(contact) => info!(id, name = %contact.name, "Deleted contact"),
            None => debug!(id, "No contact to delete"),
        }
        Ok(removed)
    }

    pub fn set_filter(&mut self, text: &str) {
        self.filter = NameFilter::new(text);
    }

    pub fn filter(&self) -> &str {
        self.filter.text()
    }

    /// Contacts matching the current filter, in collection order
    pub fn visible_contacts(&self) -> Vec<&Contact> {
        self.contacts.iter().filter(|c| self.filter.matches(c)).collect()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Write the full collection to the contacts slot
    pub fn save(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.contacts)?;
        self.storage.set(CONTACTS_KEY, &json)?;
        debug!(count = self.contacts.len(), "Saved contacts");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage, SqliteStorage};
    use std::fs;
    use tempfile::TempDir;

    fn empty_book() -> ContactBook<MemoryStorage> {
        ContactBook::open(MemoryStorage::with_slot(CONTACTS_KEY, "[]")).unwrap()
    }

    fn names<'a>(contacts: impl IntoIterator<Item = &'a Contact>) -> Vec<&'a str> {
        contacts.into_iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_open_without_stored_value_seeds() {
        let book = ContactBook::open(MemoryStorage::new()).unwrap();

        assert_eq!(book.contacts(), seed_contacts().as_slice());
        assert_eq!(book.filter(), "");
        // Seed set is not persisted until something changes
        assert_eq!(book.storage().get(CONTACTS_KEY).unwrap(), None);
    }

    #[test]
    fn test_open_malformed_value_seeds() {
        let book = ContactBook::open(MemoryStorage::with_slot(CONTACTS_KEY, "{not json")).unwrap();
        assert_eq!(book.contacts(), seed_contacts().as_slice());
    }

    #[test]
    fn test_open_wrong_shape_seeds() {
        let book = ContactBook::open(MemoryStorage::with_slot(CONTACTS_KEY, r#"[{"id":"x"}]"#)).unwrap();
        assert_eq!(book.len(), 4);
    }

    #[test]
    fn test_open_non_utf8_file_seeds() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("contacts.json"), [0xFF, 0xFE, b'[', b']']).unwrap();

        let book = ContactBook::open(FileStorage::open(temp.path()).unwrap()).unwrap();
        assert_eq!(book.contacts(), seed_contacts().as_slice());
    }

    #[test]
    fn test_open_null_value_seeds() {
        let book = ContactBook::open(MemoryStorage::with_slot(CONTACTS_KEY, "null")).unwrap();
        assert_eq!(book.contacts(), seed_contacts().as_slice());
    }

    #[test]
    fn test_open_empty_array_is_empty_book() {
        let book = empty_book();
        assert!(book.is_empty());
    }

    #[test]
    fn test_add_prepends_newest_first() {
        let mut book = empty_book();

        book.add_contact("Ann", "111-11-11").unwrap();
        book.add_contact("Bob", "222-22-22").unwrap();
        book.add_contact("Cid", "333-33-33").unwrap();

        assert_eq!(book.len(), 3);
        assert_eq!(names(book.contacts()), vec!["Cid", "Bob", "Ann"]);
    }

    #[test]
    fn test_add_returns_new_contact() {
        let mut book = empty_book();

        let contact = book.add_contact("Ann", "111-11-11").unwrap();
        assert_eq!(contact.name, "Ann");
        assert_eq!(contact.number, "111-11-11");
        assert_eq!(book.get(&contact.id), Some(&contact));
    }

    #[test]
    fn test_add_duplicate_name_ignores_case() {
        let mut book = empty_book();

        book.add_contact("Rosie", "111-11-11").unwrap();
        let err = book.add_contact("rosie", "222-22-22").unwrap_err();

        match err {
            Error::DuplicateName { name } => assert_eq!(name, "Rosie"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(book.len(), 1);
        assert_eq!(book.contacts()[0].number, "111-11-11");
    }

    #[test]
    fn test_add_duplicate_does_not_persist() {
        let mut book = ContactBook::open(MemoryStorage::new()).unwrap();

        assert!(book.add_contact("ROSIE SIMPSON", "111-11-11").is_err());
        assert_eq!(book.storage().get(CONTACTS_KEY).unwrap(), None);
    }

    #[test]
    fn test_add_persists_collection() {
        let mut book = ContactBook::open(MemoryStorage::new()).unwrap();
        book.add_contact("Ann", "111-11-11").unwrap();

        let raw = book.storage().get(CONTACTS_KEY).unwrap().unwrap();
        let stored: Vec<Contact> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 5);
        assert_eq!(stored[0].name, "Ann");
        assert_eq!(stored, book.contacts());
    }

    #[test]
    fn test_delete_existing() {
        let mut book = ContactBook::open(MemoryStorage::new()).unwrap();

        let removed = book.delete_contact("id-2").unwrap();
        assert_eq!(removed.map(|c| c.name), Some("Hermione Kline".to_string()));
        assert_eq!(
            names(book.contacts()),
            vec!["Rosie Simpson", "Eden Clements", "Annie Copeland"]
        );

        let raw = book.storage().get(CONTACTS_KEY).unwrap().unwrap();
        let stored: Vec<Contact> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, book.contacts());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut book = ContactBook::open(MemoryStorage::new()).unwrap();
        let before = book.contacts().to_vec();

        let removed = book.delete_contact("no-such-id").unwrap();

        assert!(removed.is_none());
        assert_eq!(book.contacts(), before.as_slice());
        // Still persisted
        assert!(book.storage().get(CONTACTS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_deleted_name_can_be_added_again() {
        let mut book = ContactBook::open(MemoryStorage::new()).unwrap();

        book.delete_contact("id-1").unwrap();
        let contact = book.add_contact("rosie simpson", "459-12-56").unwrap();
        assert_eq!(book.contacts()[0], contact);
    }

    #[test]
    fn test_filter_visible_contacts() {
        let mut book = ContactBook::open(MemoryStorage::new()).unwrap();
        book.add_contact("Aaron", "111-11-11").unwrap();

        book.set_filter("RO");
        assert_eq!(book.filter(), "ro");
        assert_eq!(names(book.visible_contacts()), vec!["Aaron", "Rosie Simpson"]);

        book.set_filter("");
        assert_eq!(
            names(book.visible_contacts()),
            vec!["Aaron", "Rosie Simpson", "Hermione Kline", "Eden Clements", "Annie Copeland"]
        );
    }

    #[test]
    fn test_filter_no_matches() {
        let mut book = ContactBook::open(MemoryStorage::new()).unwrap();
        book.set_filter("zzz");
        assert!(book.visible_contacts().is_empty());
        assert_eq!(book.len(), 4);
    }

    #[test]
    fn test_filter_is_not_persisted() {
        let mut book = ContactBook::open(MemoryStorage::new()).unwrap();
        book.set_filter("ro");
        assert_eq!(book.storage().get(CONTACTS_KEY).unwrap(), None);
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let mut book = ContactBook::open(FailingStorage).unwrap();

        let err = book.add_contact("Ann", "111-11-11").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(book.contacts(), seed_contacts().as_slice());

        assert!(book.delete_contact("id-2").is_err());
        assert_eq!(book.contacts(), seed_contacts().as_slice());
    }

    #[test]
    fn test_reopen_round_trip_memory() {
        let mut book = ContactBook::open(MemoryStorage::new()).unwrap();
        book.add_contact("Ann", "111-11-11").unwrap();
        book.delete_contact("id-3").unwrap();
        let expected = book.contacts().to_vec();

        let reopened = ContactBook::open(book.into_storage()).unwrap();
        assert_eq!(reopened.contacts(), expected.as_slice());
        assert_eq!(reopened.filter(), "");
    }

    #[test]
    fn test_reopen_round_trip_sqlite() {
        let temp = TempDir::new().unwrap();

        let expected = {
            let mut book = ContactBook::open(SqliteStorage::open(temp.path()).unwrap()).unwrap();
            book.add_contact("Ann", "111-11-11").unwrap();
            book.add_contact("Bob", "222-22-22").unwrap();
            book.contacts().to_vec()
        };

        let book = ContactBook::open(SqliteStorage::open(temp.path()).unwrap()).unwrap();
        assert_eq!(book.contacts(), expected.as_slice());
    }

    #[test]
    fn test_reopen_round_trip_file() {
        let temp = TempDir::new().unwrap();

        let expected = {
            let mut book = ContactBook::open(FileStorage::open(temp.path()).unwrap()).unwrap();
            book.delete_contact("id-1").unwrap();
            book.add_contact("Ann", "111-11-11").unwrap();
            book.contacts().to_vec()
        };

        let book = ContactBook::open(FileStorage::open(temp.path()).unwrap()).unwrap();
        assert_eq!(book.contacts(), expected.as_slice());
        assert!(temp.path().join("contacts.json").exists());
    }
}
