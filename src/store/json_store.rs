use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::session::SessionReport;
use crate::store::schema::{ProfileData, SessionHistoryData, SessionRecord};

const PROFILE_FILE: &str = "profile.json";
const HISTORY_FILE: &str = "session_history.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(Self::default_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathadv")
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Profile from disk; a missing, unreadable or stale profile starts fresh.
    pub fn load_profile(&self) -> ProfileData {
        let profile: ProfileData = self.load(PROFILE_FILE);
        if profile.needs_reset() {
            ProfileData::default()
        } else {
            profile
        }
    }

    pub fn save_profile(&self, data: &ProfileData) -> Result<()> {
        self.save(PROFILE_FILE, data)
    }

    pub fn load_history(&self) -> SessionHistoryData {
        self.load(HISTORY_FILE)
    }

    pub fn save_history(&self, data: &SessionHistoryData) -> Result<()> {
        self.save(HISTORY_FILE, data)
    }

    /// Applies a finished session to the profile and appends it to history.
    /// Returns the updated profile.
    pub fn record_session(&self, report: &SessionReport) -> Result<ProfileData> {
        let now = Utc::now();

        let mut profile = self.load_profile();
        profile.player_name = report.player_name.clone();
        profile.rating = report.rating.new_rating;
        profile.games_played += 1;
        profile.best_score = profile.best_score.max(report.rating.score);
        profile.last_level = Some(report.recommended_level);
        profile.last_played = Some(now);

        let mut history = self.load_history();
        history.sessions.push(SessionRecord {
            timestamp: now,
            player_name: report.player_name.clone(),
            summary: report.summary.clone(),
            final_level: report.final_level,
            rating: report.rating,
        });

        self.save_history(&history)?;
        self.save_profile(&profile)?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_files_load_defaults() {
        let (_dir, store) = make_test_store();
        assert_eq!(store.load_profile(), ProfileData::default());
        assert!(store.load_history().sessions.is_empty());
    }

    #[test]
    fn test_profile_round_trip() {
        let (_dir, store) = make_test_store();
        let profile = ProfileData {
            player_name: "Sam".to_string(),
            rating: 1234,
            games_played: 7,
            ..ProfileData::default()
        };
        store.save_profile(&profile).unwrap();
        assert_eq!(store.load_profile(), profile);
        assert!(!store.file_path("profile.tmp").exists());
    }

    #[test]
    fn test_corrupt_profile_falls_back_to_default() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROFILE_FILE), "{ not json").unwrap();
        assert_eq!(store.load_profile(), ProfileData::default());
    }

    #[test]
    fn test_stale_schema_resets() {
        let (_dir, store) = make_test_store();
        let stale = ProfileData {
            schema_version: 99,
            rating: 2000,
            ..ProfileData::default()
        };
        store.save_profile(&stale).unwrap();
        assert_eq!(store.load_profile().rating, ProfileData::default().rating);
    }
}
