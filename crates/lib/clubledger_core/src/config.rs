//! Runtime configuration.

use std::path::{Path, PathBuf};

/// Where Clubledger keeps its files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClubConfig {
    /// Directory holding the persisted session.
    pub data_dir: PathBuf,
    /// Roster file with accounts and members.
    pub roster_path: PathBuf,
}

impl ClubConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable              | Default                              |
    /// |-----------------------|--------------------------------------|
    /// | `CLUBLEDGER_DATA_DIR` | `<platform data dir>/clubledger`     |
    /// | `CLUBLEDGER_ROSTER`   | `<data dir>/roster.json`             |
    pub fn from_env() -> Self {
        let data_dir = env_path("CLUBLEDGER_DATA_DIR").unwrap_or_else(default_data_dir);
        let roster_path =
            env_path("CLUBLEDGER_ROSTER").unwrap_or_else(|| data_dir.join("roster.json"));
        Self {
            data_dir,
            roster_path,
        }
    }

    /// Configuration rooted at `data_dir`, roster inside it.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            roster_path: data_dir.join("roster.json"),
            data_dir,
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        // Keep a roster that was derived from the old data dir alongside it.
        if self.roster_path == self.data_dir.join("roster.json") {
            self.roster_path = data_dir.join("roster.json");
        }
        self.data_dir = data_dir;
        self
    }

    pub fn with_roster(mut self, roster_path: impl Into<PathBuf>) -> Self {
        self.roster_path = roster_path.into();
        self
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn roster_path(&self) -> &Path {
        &self.roster_path
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clubledger")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_dir_places_files_under_data_dir() {
        let cfg = ClubConfig::in_dir("/tmp/club");
        assert_eq!(cfg.session_path(), PathBuf::from("/tmp/club/session.json"));
        assert_eq!(cfg.roster_path(), Path::new("/tmp/club/roster.json"));
    }

    #[test]
    fn with_data_dir_moves_derived_roster() {
        let cfg = ClubConfig::in_dir("/a").with_data_dir("/b");
        assert_eq!(cfg.roster_path(), Path::new("/b/roster.json"));
    }

    #[test]
    fn explicit_roster_survives_data_dir_change() {
        let cfg = ClubConfig::in_dir("/a")
            .with_roster("/etc/club/roster.json")
            .with_data_dir("/b");
        assert_eq!(cfg.roster_path(), Path::new("/etc/club/roster.json"));
        assert_eq!(cfg.session_path(), PathBuf::from("/b/session.json"));
    }
}
