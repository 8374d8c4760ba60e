use crate::models::sheet::SheetCollection;
use crate::persistence::sheet_file::SheetFile;
use anyhow::Result;
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use tracing::{debug, warn};

/// Per-user sheet collections, loaded from disk on first use and written
/// back after every successful mutation.
pub struct SheetStore {
    collections: DashMap<u32, SheetCollection>,
    file: SheetFile,
}

impl SheetStore {
    pub fn new(file: SheetFile) -> Self {
        Self {
            collections: DashMap::new(),
            file,
        }
    }

    /// Make sure the user's collection is in memory.
    pub fn hydrate(&self, user_id: u32) -> Result<()> {
        self.entry(user_id).map(|_| ())
    }

    /// Run `f` against the user's collection. Nothing is written.
    pub fn read<T>(&self, user_id: u32, f: impl FnOnce(&SheetCollection) -> T) -> Result<T> {
        let collection = self.entry(user_id)?;
        Ok(f(&*collection))
    }

    /// Run `f` against the user's collection while holding its lock, and
    /// rewrite the user's file if `f` succeeds.
    ///
    /// A failed write is logged and the in-memory change is kept.
    pub fn mutate<T, E>(
        &self,
        user_id: u32,
        f: impl FnOnce(&mut SheetCollection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<anyhow::Error>,
    {
        let mut collection = self.entry(user_id)?;
        let value = f(&mut *collection)?;

        if let Err(e) = self.file.save(user_id, &collection) {
            warn!(
                user_id,
                path = %self.file.path_for(user_id).display(),
                error = %e,
                "Failed to persist sheets, in-memory state kept"
            );
        }

        Ok(value)
    }

    /// Locked handle on the user's collection, loading it from disk if absent.
    /// A failed load leaves the map untouched.
    fn entry(&self, user_id: u32) -> Result<RefMut<'_, u32, SheetCollection>> {
        self.collections.entry(user_id).or_try_insert_with(|| {
            let loaded = self.file.load(user_id)?;
            debug!(user_id, sheets = loaded.len(), "Sheet collection hydrated");
            Ok(loaded)
        })
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
