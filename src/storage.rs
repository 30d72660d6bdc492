//! Anonymous cart reference storage.
//!
//! Guests have no account to hang a cart on, so the id of the cart created for
//! them is kept client-side under a single well-known key.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use mockall::automock;
use thiserror::Error;
use tracing::debug;

use crate::cart::CartId;

/// Key the anonymous cart id is stored under.
pub const ANONYMOUS_CART_KEY: &str = "cartId";

/// Anonymous cart store error variants.
#[derive(Debug, Error)]
pub enum StoreError {
    /// State file could not be read or written.
    #[error("failed to access cart state file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// State file holds something other than the expected JSON.
    #[error("cart state file {path} is corrupt")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[automock]
pub trait AnonymousCartStore: Send + Sync {
    /// The stored anonymous cart id, if any.
    fn load(&self) -> Result<Option<CartId>, StoreError>;

    /// Remembers the anonymous cart id, replacing any previous one.
    fn save(&self, id: CartId) -> Result<(), StoreError>;

    /// Forgets the anonymous cart id. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Store kept in process memory; forgotten when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    id: Mutex<Option<CartId>>,
}

impl MemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with an anonymous cart id.
    #[must_use]
    pub fn with_id(id: CartId) -> Self {
        Self {
            id: Mutex::new(Some(id)),
        }
    }
}

impl AnonymousCartStore for MemoryCartStore {
    fn load(&self) -> Result<Option<CartId>, StoreError> {
        Ok(*self.id.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn save(&self, id: CartId) -> Result<(), StoreError> {
        *self.id.lock().unwrap_or_else(PoisonError::into_inner) = Some(id);

        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.id.lock().unwrap_or_else(PoisonError::into_inner) = None;

        Ok(())
    }
}

/// Store backed by a small JSON key/value file, e.g. `{"cartId": 12}`.
///
/// Keys other than [`ANONYMOUS_CART_KEY`] are preserved on write.
#[derive(Debug)]
pub struct FileCartStore {
    path: PathBuf,
}

type Entries = BTreeMap<String, serde_json::Value>;

impl FileCartStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        if text.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        fs::write(&self.path, text).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl AnonymousCartStore for FileCartStore {
    fn load(&self) -> Result<Option<CartId>, StoreError> {
        let entries = self.read_entries()?;

        Ok(entries
            .get(ANONYMOUS_CART_KEY)
            .and_then(serde_json::Value::as_u64)
            .map(CartId::new))
    }

    fn save(&self, id: CartId) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;

        entries.insert(ANONYMOUS_CART_KEY.to_string(), id.get().into());

        debug!(cart = %id, path = %self.path.display(), "remembering anonymous cart");

        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;

        if entries.remove(ANONYMOUS_CART_KEY).is_none() {
            return Ok(());
        }

        debug!(path = %self.path.display(), "forgetting anonymous cart");

        self.write_entries(&entries)
    }
}
