//! Draft persistence, the engine-side analog of the browser's localStorage:
//! per-player prompt drafts and the local display name, stored under fixed
//! key prefixes and optionally mirrored to a JSON file.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const PROMPT_DRAFT_PREFIX: &str = "imageparty:prompt-draft:";
pub const DISPLAY_NAME_KEY: &str = "imageparty:display-name";

pub type DraftResult<T> = Result<T, DraftError>;

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("draft file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("draft file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftEntry {
    pub value: String,
    pub updated_at: String,
}

#[derive(Debug)]
pub struct DraftStore {
    path: Option<PathBuf>,
    entries: Mutex<HashMap<String, DraftEntry>>,
}

impl DraftStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Open a file-backed store, loading existing entries if the file is
    /// present. Every mutation rewrites the file.
    pub fn open(path: impl AsRef<Path>) -> DraftResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    pub fn save_prompt_draft(&self, player_id: &str, text: &str) -> DraftResult<()> {
        self.put(format!("{PROMPT_DRAFT_PREFIX}{player_id}"), text)
    }

    pub fn prompt_draft(&self, player_id: &str) -> Option<String> {
        self.get(&format!("{PROMPT_DRAFT_PREFIX}{player_id}"))
    }

    /// Drop a player's draft, typically after their prompt is submitted.
    pub fn clear_prompt_draft(&self, player_id: &str) -> DraftResult<()> {
        self.entries
            .lock()
            .unwrap()
            .remove(&format!("{PROMPT_DRAFT_PREFIX}{player_id}"));
        self.persist()
    }

    pub fn set_display_name(&self, name: &str) -> DraftResult<()> {
        self.put(DISPLAY_NAME_KEY.to_string(), name)
    }

    pub fn display_name(&self) -> Option<String> {
        self.get(DISPLAY_NAME_KEY)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|entry| entry.value.clone())
    }

    fn put(&self, key: String, value: &str) -> DraftResult<()> {
        self.entries.lock().unwrap().insert(
            key,
            DraftEntry {
                value: value.to_string(),
                updated_at: Utc::now().to_rfc3339(),
            },
        );
        self.persist()
    }

    fn persist(&self) -> DraftResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let entries = self.entries.lock().unwrap();
        let json = serde_json::to_string_pretty(&*entries)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
