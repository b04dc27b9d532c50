//! Creator draft persistence
//!
//! The creator view's draft (file, transcript, options flag) has to survive
//! a restart. [`FileCreatorStore`] keeps it as JSON under the data
//! directory, keyed by the view's storage key.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::{Action, AppState, ObserverId, Store};
use crate::error::{Result, StorageError};
use crate::types::{CreatorState, View};

const FORMAT_VERSION: u32 = 1;

/// Storage for the creator draft
pub trait CreatorStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<CreatorState>>;

    fn save(&self, state: &CreatorState) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    saved_at: DateTime<Utc>,
    state: CreatorState,
}

/// JSON file at `<data_dir>/views/creator.json`
#[derive(Debug, Clone)]
pub struct FileCreatorStore {
    path: PathBuf,
}

impl FileCreatorStore {
    pub fn new(data_dir: &Path) -> Self {
        let path = data_dir
            .join("views")
            .join(format!("{}.json", View::Creator.storage_key()));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the stored draft was written, if there is one
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read_envelope()?.map(|envelope| envelope.saved_at))
    }

    fn read_envelope(&self) -> Result<Option<Envelope>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e).into()),
        };

        let envelope: Envelope = serde_json::from_str(&content).map_err(StorageError::from)?;
        if envelope.version != FORMAT_VERSION {
            return Err(StorageError::Version {
                found: envelope.version,
                expected: FORMAT_VERSION,
            }
            .into());
        }
        Ok(Some(envelope))
    }
}

impl CreatorStore for FileCreatorStore {
    fn load(&self) -> Result<Option<CreatorState>> {
        Ok(self.read_envelope()?.map(|envelope| envelope.state))
    }

    fn save(&self, state: &CreatorState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::from)?;
        }

        let envelope = Envelope {
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            state: state.clone(),
        };
        let json = serde_json::to_vec_pretty(&envelope).map_err(StorageError::from)?;

        // Write then rename so a crash never leaves a half-written draft
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(StorageError::from)?;
        std::fs::rename(&tmp, &self.path).map_err(StorageError::from)?;

        tracing::debug!(path = %self.path.display(), "saved creator draft");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }
}

/// In-memory store, mainly for tests
#[derive(Debug, Default, Clone)]
pub struct MemoryCreatorStore {
    slot: Arc<Mutex<Option<CreatorState>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryCreatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: CreatorState) -> Self {
        let store = Self::default();
        *store.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(state);
        store
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CreatorStore for MemoryCreatorStore {
    fn load(&self) -> Result<Option<CreatorState>> {
        Ok(self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, state: &CreatorState) -> Result<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(state.clone());
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Save `creatorState` whenever a dispatch changes it.
///
/// Save failures are logged and otherwise ignored so a full disk never
/// blocks the UI.
pub fn persist_creator_state(store: &mut Store, creator_store: Arc<dyn CreatorStore>) -> ObserverId {
    let mut last_saved = store.state().creator_state.clone();
    store.subscribe(Box::new(move |state: &AppState| {
        if state.creator_state == last_saved {
            return;
        }
        match creator_store.save(&state.creator_state) {
            Ok(()) => last_saved = state.creator_state.clone(),
            Err(e) => tracing::warn!(error = %e, "failed to persist creator draft"),
        }
    }))
}

/// Load a saved draft into the store.
///
/// Returns whether a draft was found.
pub fn restore_creator_state(store: &mut Store, creator_store: &dyn CreatorStore) -> Result<bool> {
    match creator_store.load()? {
        Some(draft) => {
            store.dispatch(Action::UpdateCreatorState(draft.into()))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetFile;
    use tempfile::TempDir;

    fn draft() -> CreatorState {
        CreatorState {
            file: Some(AssetFile::new("voice.m4a", "audio/mp4", vec![0, 1, 2, 255])),
            transcript: "sing along".to_string(),
            options_checked: true,
        }
    }

    #[test]
    fn test_file_store_path_is_keyed_by_creator_view() {
        let dir = TempDir::new().unwrap();
        let store = FileCreatorStore::new(dir.path());
        assert_eq!(store.path(), dir.path().join("views").join("creator.json"));
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileCreatorStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
        assert!(store.saved_at().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_restores_exactly() {
        let dir = TempDir::new().unwrap();
        let store = FileCreatorStore::new(dir.path());

        store.save(&draft()).unwrap();

        let reopened = FileCreatorStore::new(dir.path());
        assert_eq!(reopened.load().unwrap(), Some(draft()));
        assert!(reopened.saved_at().unwrap().is_some());
    }

    #[test]
    fn test_clear_removes_draft_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileCreatorStore::new(dir.path());
        store.save(&draft()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FileCreatorStore::new(dir.path());
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("Malformed stored state"));
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileCreatorStore::new(dir.path());
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            r#"{"version":7,"saved_at":"2026-01-01T00:00:00Z","state":{"file":null,"transcript":"","optionsChecked":false}}"#,
        )
        .unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("Unsupported stored state version 7"));
    }
}
