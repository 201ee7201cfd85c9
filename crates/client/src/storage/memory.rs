//! In-memory storage backend.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{KeyValueStorage, StorageError};

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
    available: bool,
}

impl Inner {
    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }
}

/// In-process storage.
///
/// Clones share the same entries, which models several store instances
/// (tabs) over one origin's `localStorage`.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    inner: Rc<RefCell<Inner>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create empty storage without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None, true)
    }

    /// Create empty storage that rejects writes once keys plus values
    /// exceed `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self::build(Some(quota_bytes), true)
    }

    /// Create storage on which every operation fails, like `localStorage`
    /// in a locked-down browser.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::build(None, false)
    }

    fn build(quota: Option<usize>, available: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                entries: BTreeMap::new(),
                quota,
                available,
            })),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Whether no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let inner = self.inner.borrow();
        inner.check_available()?;
        Ok(inner.entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        inner.check_available()?;
        if let Some(limit) = inner.quota {
            if inner.used_bytes_without(key) + key.len() + value.len() > limit {
                return Err(StorageError::QuotaExceeded { limit });
            }
        }
        inner.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        inner.check_available()?;
        inner.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let inner = self.inner.borrow();
        inner.check_available()?;
        Ok(inner.entries.keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        inner.check_available()?;
        inner.entries.clear();
        Ok(())
    }
}
