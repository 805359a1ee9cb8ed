//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::import::{read_charges, read_contributions, read_houses};
use crate::Config;
use chrono::NaiveDate;
use tempfile::TempDir;

/// Test environment that sets up a dues home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

pub const HOUSES_CSV: &str = "\
id,responsible,role,location,email
1,Administración,admin,Oficina,
5,Pérez,resident,Calle 1,
7,Gómez,resident,Calle 2,
9,López,resident,Calle 3,
";

pub const CONTRIBUTIONS_CSV: &str = "\
id,name,description,border_color,charge_day,period_days,charge_type
1,Jardines,Mantenimiento Jardines,#2e7d32,10,30,group
2,Cuota,Cuota mensual,#1565c0,31,30,house
";

/// Group 1 is houses 5 and 7, group 2 is house 9. Group 2's January turn is already done.
pub const CHARGES_CSV: &str = "\
house_id,contribution_id,due_date,group_id,paid,done,paid_date,receipt_url
5,1,2024-01-10,1,,N,,
7,1,2024-01-10,1,,N,,
9,1,2024-01-10,2,,S,2024-01-09,
5,1,2024-02-10,1,,N,,
7,1,2024-02-10,1,,N,,
9,1,2024-02-10,2,,N,,
5,2,2024-01-31,,,N,,
";

impl TestEnv {
    /// Creates a test environment with Config and an empty, initialized database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("dues");
        let config = Config::create(&root, "Residencial de Prueba").await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Creates a test environment and loads the small community described by the CSV constants.
    pub async fn seeded() -> Self {
        let env = Self::new().await;
        let db = env.config.db();
        db.save_houses(&read_houses(HOUSES_CSV.as_bytes()).unwrap())
            .await
            .unwrap();
        db.save_contributions(&read_contributions(CONTRIBUTIONS_CSV.as_bytes()).unwrap())
            .await
            .unwrap();
        db.save_charges(&read_charges(CHARGES_CSV.as_bytes()).unwrap())
            .await
            .unwrap();
        env
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Writes `contents` to a file in the temp directory and returns its path.
    pub fn write_file(&self, name: &str, contents: &str) -> std::path::PathBuf {
        let path = self._temp_dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}
