// Application state (AppState)

use crate::core::config::Config;
use crate::persistence::{sheet_file::SheetFile, user_file::UserFile};
use crate::services::{accounts::AccountService, sheets::SheetService};
use crate::stores::{session::SessionSlot, sheet_store::SheetStore, user_store::UserStore};
use std::sync::Arc;

/// Shared application state
///
/// Built once at startup and handed to the router. Every field is an `Arc`
/// so routes can hold their own handles.
#[derive(Clone)]
pub struct AppState {
    /// Account registry backed by the user file
    pub users: Arc<UserStore>,

    /// Per-user sheet collections
    pub sheet_store: Arc<SheetStore>,

    /// The connected user, if any
    pub session: Arc<SessionSlot>,

    pub accounts: Arc<AccountService>,
    pub sheets: Arc<SheetService>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let users = Arc::new(UserStore::new(UserFile::new(config.users_path())));
        let sheet_store = Arc::new(SheetStore::new(SheetFile::new(
            config.storage.data_dir.clone(),
        )));
        let session = Arc::new(SessionSlot::new());

        let accounts = Arc::new(AccountService::new(
            Arc::clone(&users),
            Arc::clone(&sheet_store),
            Arc::clone(&session),
        ));
        let sheets = Arc::new(SheetService::new(Arc::clone(&sheet_store)));

        Self {
            users,
            sheet_store,
            session,
            accounts,
            sheets,
            config,
        }
    }
}
