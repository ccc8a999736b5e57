use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sled::IVec;

use super::action::Action;
use super::dispatch::{Engine, Outcome};
use super::errors::StoreError;
use super::types::{SheetState, SHEET_SCHEMA_VERSION};

const TREE_SHEET: &str = "charsheet";
const TREE_JOURNAL: &str = "charsheet_journal";
const STATE_KEY: &[u8] = b"sheet:current";

/// One applied or rejected action, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    /// Action as JSON text
    pub action: String,
    /// `"ok"` or the rejection code
    pub outcome: String,
}

/// Sled-backed persistence for the character sheet and its action journal.
pub struct SheetStore {
    db: sled::Db,
    sheet: sled::Tree,
    journal: sled::Tree,
    write_lock: Mutex<()>,
}

impl SheetStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let sheet = db.open_tree(TREE_SHEET)?;
        let journal = db.open_tree(TREE_JOURNAL)?;
        Ok(Self {
            db,
            sheet,
            journal,
            write_lock: Mutex::new(()),
        })
    }

    fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, StoreError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    pub fn has_state(&self) -> Result<bool, StoreError> {
        Ok(self.sheet.contains_key(STATE_KEY)?)
    }

    /// Fetch the current sheet.
    pub fn load_state(&self) -> Result<SheetState, StoreError> {
        let Some(bytes) = self.sheet.get(STATE_KEY)? else {
            return Err(StoreError::NotFound("character sheet".to_string()));
        };
        let state: SheetState = Self::deserialize(bytes)?;
        if state.schema_version != SHEET_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                entity: "sheet",
                expected: SHEET_SCHEMA_VERSION,
                found: state.schema_version,
            });
        }
        Ok(state)
    }

    /// Replace the current sheet.
    pub fn put_state(&self, mut state: SheetState) -> Result<(), StoreError> {
        state.schema_version = SHEET_SCHEMA_VERSION;
        let bytes = Self::serialize(&state)?;
        self.sheet.insert(STATE_KEY, bytes)?;
        self.sheet.flush()?;
        Ok(())
    }

    /// Store `seed` unless a sheet already exists. Returns whether it was written.
    pub fn seed_if_empty(&self, seed: SheetState) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        if self.has_state()? {
            return Ok(false);
        }
        info!("seeding character sheet '{}'", seed.name);
        self.put_state(seed)?;
        Ok(true)
    }

    /// Load, dispatch, persist and journal one action. Callers are serialized, so
    /// two concurrent actions never read the same prior state.
    pub fn apply(&self, engine: &Engine, action: &Action) -> Result<Outcome, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let state = self.load_state()?;
        let (next, outcome) = engine.dispatch(state, action);
        if outcome.is_applied() {
            self.put_state(next)?;
        }
        self.append_journal(action, outcome.code())?;
        Ok(outcome)
    }

    fn append_journal(&self, action: &Action, outcome: &str) -> Result<(), StoreError> {
        let seq = self.db.generate_id()?;
        let entry = JournalEntry {
            seq,
            recorded_at: Utc::now(),
            action: serde_json::to_string(action)?,
            outcome: outcome.to_string(),
        };
        let bytes = Self::serialize(&entry)?;
        self.journal.insert(seq.to_be_bytes(), bytes)?;
        self.journal.flush()?;
        debug!("journal #{}: {} -> {}", seq, action.tag(), outcome);
        Ok(())
    }

    /// Most recent journal entries, newest first.
    pub fn journal(&self, limit: usize) -> Result<Vec<JournalEntry>, StoreError> {
        let mut entries = Vec::new();
        for row in self.journal.iter().rev().take(limit) {
            let (_, bytes) = row?;
            entries.push(Self::deserialize::<JournalEntry>(bytes)?);
        }
        Ok(entries)
    }

    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }
}
