use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::bank::Category;
use crate::store::schema::{AttemptsData, CompletedAttempt, SCHEMA_VERSION, SnapshotData};

const ATTEMPTS_FILE: &str = "attempts.json";
const SNAPSHOT_FILE: &str = "snapshot.json";

/// Durable store for completed attempts plus the single resume snapshot.
/// All writes go through a tmp-file-and-rename so a crash mid-write leaves
/// the previous record intact.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizr");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
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

    /// A stale schema version resets the attempt log rather than guessing at
    /// a migration.
    pub fn load_attempts(&self) -> AttemptsData {
        let data: AttemptsData = self.load(ATTEMPTS_FILE);
        if data.schema_version != SCHEMA_VERSION {
            return AttemptsData::default();
        }
        data
    }

    pub fn append_attempt(&self, attempt: &CompletedAttempt) -> Result<()> {
        let mut data = self.load_attempts();
        data.attempts.push(attempt.clone());
        self.save(ATTEMPTS_FILE, &data)
    }

    pub fn completed_categories(&self, owner_id: &str) -> HashSet<Category> {
        self.load_attempts()
            .attempts
            .iter()
            .filter(|a| a.owner_id == owner_id)
            .map(|a| a.category)
            .collect()
    }

    pub fn best_attempt(&self, owner_id: &str, category: Category) -> Option<CompletedAttempt> {
        self.load_attempts()
            .attempts
            .into_iter()
            .filter(|a| a.owner_id == owner_id && a.category == category)
            .max_by_key(|a| a.percentage)
    }

    /// Attempts for one owner, newest first, for the scores screen.
    pub fn attempts_for(&self, owner_id: &str) -> Vec<CompletedAttempt> {
        let mut attempts: Vec<CompletedAttempt> = self
            .load_attempts()
            .attempts
            .into_iter()
            .filter(|a| a.owner_id == owner_id)
            .collect();
        attempts.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        attempts
    }

    /// Returns None when the snapshot is missing, unparseable, or written by
    /// a different schema version. Corruption is recovered by starting fresh,
    /// never by failing.
    pub fn load_snapshot(&self) -> Option<SnapshotData> {
        let path = self.file_path(SNAPSHOT_FILE);
        let content = fs::read_to_string(&path).ok()?;
        let snapshot: SnapshotData = serde_json::from_str(&content).ok()?;
        if snapshot.is_stale() {
            return None;
        }
        Some(snapshot)
    }

    pub fn save_snapshot(&self, snapshot: &SnapshotData) -> Result<()> {
        self.save(SNAPSHOT_FILE, snapshot)
    }

    pub fn clear_snapshot(&self) {
        let _ = fs::remove_file(self.file_path(SNAPSHOT_FILE));
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::bank::load_catalog;
    use crate::session::state::Session;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn attempt(owner: &str, category: Category, percentage: u32) -> CompletedAttempt {
        CompletedAttempt {
            owner_id: owner.to_string(),
            category,
            raw_score: percentage * 7 / 100,
            total_questions: 7,
            percentage,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn append_then_reload_preserves_attempts() {
        let (_dir, store) = make_test_store();
        store.append_attempt(&attempt("a", Category::Info, 71)).unwrap();
        store.append_attempt(&attempt("a", Category::Proba, 57)).unwrap();

        let data = store.load_attempts();
        assert_eq!(data.attempts.len(), 2);
        assert_eq!(data.attempts[0].category, Category::Info);
    }

    #[test]
    fn completed_categories_is_per_owner() {
        let (_dir, store) = make_test_store();
        store.append_attempt(&attempt("a", Category::Info, 71)).unwrap();
        store.append_attempt(&attempt("b", Category::Proba, 57)).unwrap();

        let completed = store.completed_categories("a");
        assert!(completed.contains(&Category::Info));
        assert!(!completed.contains(&Category::Proba));
        assert!(store.completed_categories("nobody").is_empty());
    }

    #[test]
    fn best_attempt_picks_highest_percentage() {
        let (_dir, store) = make_test_store();
        store.append_attempt(&attempt("a", Category::Info, 43)).unwrap();
        store.append_attempt(&attempt("a", Category::Info, 86)).unwrap();
        store.append_attempt(&attempt("a", Category::Info, 71)).unwrap();

        let best = store.best_attempt("a", Category::Info).unwrap();
        assert_eq!(best.percentage, 86);
        assert!(store.best_attempt("a", Category::MathGen).is_none());
    }

    #[test]
    fn attempts_for_sorts_newest_first() {
        let (_dir, store) = make_test_store();
        let mut old = attempt("a", Category::Info, 50);
        old.completed_at = Utc::now() - Duration::hours(2);
        store.append_attempt(&old).unwrap();
        store.append_attempt(&attempt("a", Category::Proba, 60)).unwrap();

        let attempts = store.attempts_for("a");
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].category, Category::Proba);
    }

    #[test]
    fn corrupt_attempts_file_resets_to_empty() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(ATTEMPTS_FILE), "not json").unwrap();
        assert!(store.load_attempts().attempts.is_empty());
    }

    #[test]
    fn snapshot_round_trip_restores_session() {
        let (_dir, store) = make_test_store();
        let mut session = Session::start(
            "tester".to_string(),
            Category::Info,
            load_catalog(Category::Info).unwrap(),
        )
        .unwrap();
        session.select_option(0).unwrap();
        session.submit_answer().unwrap();

        store
            .save_snapshot(&SnapshotData::from_session(&session))
            .unwrap();

        let restored = store.load_snapshot().unwrap();
        assert!(restored.is_consistent());
        let restored = restored.into_session();
        assert_eq!(restored.current_index, session.current_index);
        assert_eq!(restored.answers, session.answers);
        assert_eq!(restored.running_score, session.running_score);
        let ids: Vec<u32> = session.questions.iter().map(|q| q.id).collect();
        let restored_ids: Vec<u32> = restored.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, restored_ids);
    }

    #[test]
    fn corrupt_snapshot_reads_as_absent() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(SNAPSHOT_FILE), "{broken").unwrap();
        assert!(store.load_snapshot().is_none());
    }

    #[test]
    fn stale_snapshot_version_reads_as_absent() {
        let (_dir, store) = make_test_store();
        let session = Session::start(
            "tester".to_string(),
            Category::Proba,
            load_catalog(Category::Proba).unwrap(),
        )
        .unwrap();
        let mut snapshot = SnapshotData::from_session(&session);
        snapshot.schema_version = 99;
        store.save_snapshot(&snapshot).unwrap();
        assert!(store.load_snapshot().is_none());
    }

    #[test]
    fn clear_snapshot_removes_the_file() {
        let (_dir, store) = make_test_store();
        let session = Session::start(
            "tester".to_string(),
            Category::Info,
            load_catalog(Category::Info).unwrap(),
        )
        .unwrap();
        store
            .save_snapshot(&SnapshotData::from_session(&session))
            .unwrap();
        assert!(store.load_snapshot().is_some());

        store.clear_snapshot();
        assert!(store.load_snapshot().is_none());
        // Clearing twice is harmless.
        store.clear_snapshot();
    }
}
