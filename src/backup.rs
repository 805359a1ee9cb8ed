//! Copies of the SQLite database taken before a command rewrites it.

use crate::error::Res;
use crate::{utils, Config};
use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of the database backup files.
pub const SQLITE: &str = "dues.sqlite";

/// Manages backup file creation and rotation.
///
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
    sqlite_path: PathBuf,
}

impl Backup {
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
            sqlite_path: config.sqlite_path().to_path_buf(),
        }
    }

    /// Copies the SQLite database file to the backups directory as `dues.sqlite.YYYY-MM-DD-NNN`
    /// and then deletes the oldest copies beyond `backup_copies`.
    ///
    /// Returns the path to the created backup file.
    pub(crate) async fn copy_sqlite(&self) -> Res<PathBuf> {
        let date = Local::now().format("%Y-%m-%d").to_string();
        let seq = self.next_sequence_number(&date).await?;
        let path = self.backups_dir.join(format!("{SQLITE}.{date}-{seq:03}"));

        utils::copy(&self.sqlite_path, &path).await?;
        debug!("Backed up the database to {}", path.display());

        self.rotate().await?;
        Ok(path)
    }

    async fn backup_files(&self) -> Res<Vec<(PathBuf, String)>> {
        let mut files = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&format!("{SQLITE}.")) {
                files.push((entry.path(), name));
            }
        }
        Ok(files)
    }

    async fn next_sequence_number(&self, date: &str) -> Res<u32> {
        let max = self
            .backup_files()
            .await?
            .iter()
            .filter_map(|(_, name)| parse_sequence_number(name, date))
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn rotate(&self) -> Res<()> {
        let files = self.backup_files().await?;
        // Oldest first. Sequence numbers are compared as numbers since they can outgrow 3 digits.
        let mut dated: Vec<_> = files
            .iter()
            .filter_map(|(path, name)| Some((parse_backup_name(name)?, path)))
            .collect();
        dated.sort();
        let excess = dated.len().saturating_sub(self.backup_copies as usize);
        for (_, path) in dated.into_iter().take(excess) {
            remove_backup(path).await?;
        }
        Ok(())
    }
}

async fn remove_backup(path: &Path) -> Res<()> {
    debug!("Removing old backup {}", path.display());
    utils::remove(path).await
}

/// Parses `NNN` out of `dues.sqlite.{date}-NNN`. Returns `None` for any other file name.
fn parse_sequence_number(filename: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{SQLITE}.{date}-"))?
        .parse()
        .ok()
}

/// Splits `dues.sqlite.{date}-NNN` into its date and sequence number.
fn parse_backup_name(filename: &str) -> Option<(&str, u32)> {
    let (date, seq) = filename
        .strip_prefix(&format!("{SQLITE}."))?
        .rsplit_once('-')?;
    Some((date, seq.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("dues.sqlite.2025-12-14-001", "2025-12-14"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("dues.sqlite.2025-12-14-042", "2025-12-14"),
            Some(42)
        );
        assert_eq!(
            parse_sequence_number("dues.sqlite.2025-12-13-001", "2025-12-14"),
            None
        );
        assert_eq!(
            parse_sequence_number("other.2025-12-14-001", "2025-12-14"),
            None
        );
        assert_eq!(
            parse_sequence_number("dues.sqlite.2025-12-14-abc", "2025-12-14"),
            None
        );
    }

    #[tokio::test]
    async fn test_copy_sqlite_rotates() {
        let env = TestEnv::new().await;
        let backup = env.config().backup();

        let mut last = PathBuf::new();
        for _ in 0..7 {
            last = backup.copy_sqlite().await.unwrap();
        }

        let files = backup.backup_files().await.unwrap();
        assert_eq!(files.len(), 5);
        assert!(last.is_file());
        assert!(last.to_string_lossy().ends_with("-007"));
    }

    #[test]
    fn test_parse_backup_name() {
        assert_eq!(
            parse_backup_name("dues.sqlite.2025-12-14-1000"),
            Some(("2025-12-14", 1000))
        );
        assert_eq!(parse_backup_name("dues.sqlite.2025-12-14-x"), None);
        assert_eq!(parse_backup_name("notes.txt"), None);
    }

    #[tokio::test]
    async fn test_rotate_past_999() {
        let env = TestEnv::new().await;
        let backup = env.config().backup();
        let dir = env.config().backups().to_path_buf();
        for seq in [996, 997, 998, 999, 1000, 1001] {
            std::fs::write(dir.join(format!("{SQLITE}.2024-01-01-{seq:03}")), b"").unwrap();
        }
        std::fs::write(dir.join(format!("{SQLITE}.2023-12-31-999")), b"").unwrap();

        backup.rotate().await.unwrap();

        let mut names: Vec<_> = backup
            .backup_files()
            .await
            .unwrap()
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "dues.sqlite.2024-01-01-1000",
                "dues.sqlite.2024-01-01-1001",
                "dues.sqlite.2024-01-01-997",
                "dues.sqlite.2024-01-01-998",
                "dues.sqlite.2024-01-01-999",
            ]
        );
    }
}
