//! Isolated test environment with temp directory.

// Allow dead code since not every test binary uses every helper
#![allow(dead_code)]

use super::{RadarCommand, TestSubscription};
use renewalradar::domain::{Currency, YearMonth};
use renewalradar::store::{SqliteStore, SubscriptionRepository};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment with its own database and config directory.
///
/// Creates a temp directory that is automatically cleaned up on drop.
/// Commands run from here never see the user's real config file.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the subscription database.
    pub fn db_path(&self) -> PathBuf {
        self.root.join("subscriptions.db")
    }

    /// Returns the directory used as `XDG_CONFIG_HOME`.
    pub fn config_home(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Opens the environment's database directly.
    pub fn store(&self) -> SqliteStore {
        SqliteStore::open(&self.db_path()).expect("Failed to open test database")
    }

    /// Stores a subscription and returns its id.
    pub fn add(&self, subscription: &TestSubscription) -> i64 {
        self.store()
            .insert_subscription(&subscription.to_subscription())
            .expect("Failed to insert test subscription")
    }

    /// Stores a budget for the given month.
    pub fn budget(&self, year: i32, month: u32, currency: &str, amount: f64) {
        let period = YearMonth::new(year, month).expect("Invalid budget period");
        let currency = Currency::new(currency).expect("Invalid currency");
        self.store()
            .set_budget(period, &currency, amount)
            .expect("Failed to store test budget");
    }

    /// Writes `renewalradar/config.toml` under the config home.
    pub fn write_config(&self, contents: &str) -> PathBuf {
        let dir = self.config_home().join("renewalradar");
        std::fs::create_dir_all(&dir).expect("Failed to create config directory");
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).expect("Failed to write config file");
        path
    }

    /// Creates a RadarCommand configured for this test environment.
    pub fn cmd(&self) -> RadarCommand {
        RadarCommand::new()
            .env("HOME", &self.root)
            .env("XDG_CONFIG_HOME", &self.config_home())
            .db(&self.db_path())
    }

    /// Same as `cmd` but without `--db`, so the config file decides.
    pub fn cmd_without_db(&self) -> RadarCommand {
        RadarCommand::new()
            .env("HOME", &self.root)
            .env("XDG_CONFIG_HOME", &self.config_home())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.root().to_path_buf()
        };
        assert!(
            !path.exists(),
            "temp directory should be cleaned up on drop"
        );
    }

    #[test]
    fn test_env_provides_command() {
        let env = TestEnv::new();
        let cmd = env.cmd();
        let args = cmd.get_args();
        assert_eq!(args[0], "--db");
        assert_eq!(args[1], env.db_path().to_string_lossy());
    }

    #[test]
    fn test_env_add_stores_subscription() {
        let env = TestEnv::new();
        let id = env.add(&TestSubscription::new("Seeded", 4.0));

        let stored = env.store().get_subscription(id).unwrap().unwrap();
        assert_eq!(stored.name(), "Seeded");
        assert!(env.db_path().exists());
    }
}
