use crate::models::user::User;
use crate::persistence::user_file::UserFile;
use anyhow::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory account registry backed by the user file
pub struct UserStore {
    users: DashMap<String, Arc<User>>,
    next_id: AtomicU32,
    file: UserFile,
    /// Serializes rewrites of the user file
    write_lock: Mutex<()>,
}

impl UserStore {
    pub fn new(file: UserFile) -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicU32::new(1),
            file,
            write_lock: Mutex::new(()),
        }
    }

    /// Replace the registry with the content of the user file.
    /// Returns the number of accounts loaded.
    pub fn load(&self) -> Result<usize> {
        let loaded = self.file.load()?;

        self.users.clear();
        let mut max_id = 0;
        for user in loaded {
            max_id = max_id.max(user.id);
            self.users.insert(user.name.clone(), Arc::new(user));
        }
        self.next_id.store(max_id + 1, Ordering::SeqCst);

        Ok(self.users.len())
    }

    /// Look a user up by exact name
    pub fn get(&self, name: &str) -> Option<Arc<User>> {
        self.users.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Register a new account. Returns `None` if the name is taken.
    ///
    /// The id is one past the largest id seen so far.
    pub fn insert(&self, name: &str, password_digest: &str) -> Option<Arc<User>> {
        match self.users.entry(name.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let user = Arc::new(User::new(id, name, password_digest));
                vacant.insert(Arc::clone(&user));
                Some(user)
            }
        }
    }

    /// All users ordered by id
    pub fn all(&self) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .map(|entry| entry.value().as_ref().clone())
            .collect();
        users.sort_by_key(|user| user.id);
        users
    }

    /// Rewrite the user file from the registry.
    pub fn persist(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.file.save(&self.all())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
