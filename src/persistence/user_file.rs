use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::models::user::User;

/// The flat account file: one `id;name;digest` line per user.
#[derive(Debug, Clone)]
pub struct UserFile {
    path: PathBuf,
}

impl UserFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the whole file, users ordered by id.
    pub fn save(&self, users: &[User]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let mut sorted: Vec<&User> = users.iter().collect();
        sorted.sort_by_key(|user| user.id);

        let file = File::create(&self.path)
            .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        for user in sorted {
            writeln!(writer, "{};{};{}", user.id, user.name, user.password_digest)
                .context("Failed to write user record")?;
        }
        writer.flush().context("Failed to flush user file")?;
        Ok(())
    }

    /// Read all users. A missing file means no accounts yet.
    pub fn load(&self) -> Result<Vec<User>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let reader = BufReader::new(file);
        let mut users = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.context("Failed to read line from user file")?;
            let line = line.trim_end_matches('\r');

            if line.is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split(';').collect();
            if parts.len() != 3 {
                warn!(
                    line_num = line_num + 1,
                    fields = parts.len(),
                    "Skipping user record without exactly three fields"
                );
                continue;
            }

            match parts[0].parse::<u32>() {
                Ok(id) => users.push(User::new(id, parts[1], parts[2])),
                Err(e) => {
                    warn!(
                        line_num = line_num + 1,
                        error = %e,
                        "Skipping user record with invalid id"
                    );
                }
            }
        }

        Ok(users)
    }
}
