//! Key-value persistence. Each collection is one JSON document under its
//! own key, written compact and read back in whichever shape it was saved.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::codec::{self, Codec};
use crate::db::DB;
use crate::models::{LibraryExercise, Program, WorkoutSession};
use crate::tracker::Tracker;

/// Written next to the data so later formats can tell this one apart.
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Library,
    Programs,
    History,
    CurrentSession,
    Theme,
    SchemaVersion,
}

impl Key {
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Library => "library",
            Key::Programs => "programs",
            Key::History => "history",
            Key::CurrentSession => "current_session",
            Key::Theme => "theme",
            Key::SchemaVersion => "schema_version",
        }
    }
}

pub struct Store {
    pool: DB,
}

impl Store {
    pub fn new(pool: DB) -> Self {
        Self { pool }
    }

    pub async fn get_raw(&self, key: Key) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("could not read `{}`", key.as_str()))
    }

    pub async fn set_raw(&self, key: Key, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key.as_str())
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("could not write `{}`", key.as_str()))?;

        debug!(key = key.as_str(), bytes = value.len(), "stored");
        Ok(())
    }

    pub async fn remove(&self, key: Key) -> Result<()> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("could not delete `{}`", key.as_str()))?;
        Ok(())
    }

    async fn load_list<T: Codec>(&self, key: Key) -> Result<Vec<T>> {
        Ok(match self.get_raw(key).await? {
            Some(raw) => codec::hydrate_list(&raw),
            None => Vec::new(),
        })
    }

    async fn save_list<T: Codec>(&self, key: Key, items: &[T]) -> Result<()> {
        let raw = codec::dehydrate_list(items)?;
        self.set_raw(key, &raw).await?;
        self.set_raw(Key::SchemaVersion, &SCHEMA_VERSION.to_string()).await
    }

    pub async fn load_library(&self) -> Result<Vec<LibraryExercise>> {
        self.load_list(Key::Library).await
    }

    pub async fn save_library(&self, library: &[LibraryExercise]) -> Result<()> {
        self.save_list(Key::Library, library).await
    }

    pub async fn load_programs(&self) -> Result<Vec<Program>> {
        self.load_list(Key::Programs).await
    }

    pub async fn save_programs(&self, programs: &[Program]) -> Result<()> {
        self.save_list(Key::Programs, programs).await
    }

    pub async fn load_history(&self) -> Result<Vec<WorkoutSession>> {
        self.load_list(Key::History).await
    }

    pub async fn save_history(&self, history: &[WorkoutSession]) -> Result<()> {
        self.save_list(Key::History, history).await
    }

    /// The session in progress, if any. Unreadable data counts as none.
    pub async fn load_current(&self) -> Result<Option<WorkoutSession>> {
        let Some(raw) = self.get_raw(Key::CurrentSession).await? else {
            return Ok(None);
        };
        let value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unreadable current session; ignoring it");
                return Ok(None);
            }
        };
        match codec::hydrate::<WorkoutSession>(value) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(error = %e, "unreadable current session; ignoring it");
                Ok(None)
            }
        }
    }

    pub async fn save_current(&self, current: Option<&WorkoutSession>) -> Result<()> {
        match current {
            Some(session) => {
                let value = codec::dehydrate(session)?;
                self.set_raw(Key::CurrentSession, &value.to_string()).await
            }
            None => self.remove(Key::CurrentSession).await,
        }
    }

    pub async fn theme(&self) -> Result<Option<String>> {
        self.get_raw(Key::Theme).await
    }

    pub async fn set_theme(&self, theme: &str) -> Result<()> {
        self.set_raw(Key::Theme, theme).await
    }

    pub async fn load_tracker(&self) -> Result<Tracker> {
        Ok(Tracker {
            library: self.load_library().await?,
            programs: self.load_programs().await?,
            history: self.load_history().await?,
            current: self.load_current().await?,
        })
    }

    pub async fn save_tracker(&self, tracker: &Tracker) -> Result<()> {
        self.save_library(&tracker.library).await?;
        self.save_programs(&tracker.programs).await?;
        self.save_history(&tracker.history).await?;
        self.save_current(tracker.current.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{ExerciseId, ExerciseInstance, SetRecord};
    use crate::types::ExerciseType;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    async fn store(dir: &TempDir) -> Store {
        let path = dir.path().join("test.db");
        let pool = db::open(path.to_str().unwrap()).await.unwrap();
        Store::new(pool)
    }

    fn sample() -> Tracker {
        Tracker {
            library: vec![LibraryExercise {
                id: ExerciseId::from(1),
                name: "Développé couché".into(),
                muscle: "Pectoraux".into(),
                equipment: "BB".into(),
                kind: ExerciseType::Polyarticulaire,
                ..Default::default()
            }],
            programs: vec![],
            history: vec![WorkoutSession {
                id: 10,
                start_time: 10,
                end_time: Some(20),
                exercises: vec![ExerciseInstance {
                    sets: vec![SetRecord {
                        done: true,
                        is_warmup: true,
                        completed_at: Some(15),
                        ..SetRecord::new("60", "8")
                    }],
                    ..ExerciseInstance::new(1)
                }],
                ..Default::default()
            }],
            current: Some(WorkoutSession {
                id: 30,
                start_time: 30,
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn empty_store_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        assert_eq!(store.load_tracker().await.unwrap(), Tracker::default());
        assert_eq!(store.theme().await.unwrap(), None);
    }

    #[tokio::test]
    async fn tracker_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let tracker = sample();
        store.save_tracker(&tracker).await.unwrap();
        assert_eq!(store.load_tracker().await.unwrap(), tracker);
        assert_eq!(
            store.get_raw(Key::SchemaVersion).await.unwrap().as_deref(),
            Some("2")
        );
    }

    #[tokio::test]
    async fn stored_form_is_compact() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store.save_tracker(&sample()).await.unwrap();
        let raw = store.get_raw(Key::Library).await.unwrap().unwrap();
        assert_eq!(raw, r#"[{"id":1,"n":"Développé couché","m":"PE","eq":"BB","t":"P"}]"#);
    }

    #[tokio::test]
    async fn clearing_current_session() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store.save_tracker(&sample()).await.unwrap();
        store.save_current(None).await.unwrap();
        assert_eq!(store.load_current().await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_collections_load_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store.set_raw(Key::History, "{not json").await.unwrap();
        store.set_raw(Key::CurrentSession, "[]").await.unwrap();
        store
            .set_raw(Key::Library, r#"[{"id": 4, "name": "Curl", "type": "Isolation"}]"#)
            .await
            .unwrap();

        let tracker = store.load_tracker().await.unwrap();
        assert!(tracker.history.is_empty());
        assert!(tracker.current.is_none());
        assert_eq!(tracker.library[0].name, "Curl");
    }

    #[tokio::test]
    async fn theme_is_plain_text() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store.set_theme("dark").await.unwrap();
        store.set_theme("light").await.unwrap();
        assert_eq!(store.theme().await.unwrap().as_deref(), Some("light"));
    }
}
