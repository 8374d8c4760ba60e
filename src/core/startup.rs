use anyhow::{Context, Result};
use std::fs;
use tracing::info;

use crate::core::state::AppState;

// this runs at boot time
pub fn load_accounts(state: &AppState) -> Result<()> {
    let data_dir = &state.config.storage.data_dir;
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let loaded = state
        .users
        .load()
        .context("Failed to load user accounts")?;

    info!(
        users = loaded,
        data_dir = %data_dir.display(),
        "User accounts loaded"
    );

    Ok(())
}
