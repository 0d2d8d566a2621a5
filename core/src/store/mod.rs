//! JSON document persistence layer.
//!
//! RULE: Only the store touches the ledger file.
//! Every mutation runs inside `mutate()`: one lock, one draft, one
//! full-file write. The lock is never held across an `.await`.

use crate::{
    document::LedgerDocument,
    error::{LedgerError, LedgerResult},
};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

mod audit;
mod cases;
mod guild;
mod payment;

pub use cases::MAX_REASON_CHARS;

pub struct LedgerStore {
    doc:  Mutex<LedgerDocument>,
    path: Option<PathBuf>, // None for in-memory stores
}

impl LedgerStore {
    /// Open (or start) the ledger at `path`.
    /// A missing file yields an empty ledger; an unparseable one is fatal.
    pub fn open(path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let path = path.into();
        let doc = Self::load(&path)?;
        log::info!(
            "Ledger opened from {} (counter={}, members={})",
            path.display(),
            doc.case_counter,
            doc.users.len()
        );
        Ok(Self {
            doc:  Mutex::new(doc),
            path: Some(path),
        })
    }

    /// A ledger that never touches disk (used in tests).
    pub fn in_memory() -> Self {
        Self::with_document(LedgerDocument::default())
    }

    pub fn with_document(doc: LedgerDocument) -> Self {
        Self {
            doc:  Mutex::new(doc),
            path: None,
        }
    }

    pub fn load(path: &Path) -> LedgerResult<LedgerDocument> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No ledger at {}; starting empty", path.display());
                return Ok(LedgerDocument::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&raw).map_err(|source| LedgerError::StoreCorrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Full-file overwrite through a temp file + rename, so a crash
    /// mid-write never leaves a truncated ledger behind.
    pub fn save(path: &Path, doc: &LedgerDocument) -> LedgerResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(doc)?;
        let temp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        fs::write(&temp, payload)?;
        if let Err(e) = fs::rename(&temp, path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Run a read-modify-write critical section.
    ///
    /// The closure works on a draft; the draft is persisted and only then
    /// published. If the closure or the write fails, nothing changes.
    /// A panic inside the closure leaves the published document intact,
    /// so a poisoned lock is taken over rather than reported.
    pub fn mutate<T, F>(&self, operation: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut LedgerDocument) -> LedgerResult<T>,
    {
        let mut doc = self.doc.lock().unwrap_or_else(|e| e.into_inner());
        let mut draft = doc.clone();
        let result = operation(&mut draft)?;
        if let Some(path) = &self.path {
            Self::save(path, &draft)?;
        }
        *doc = draft;
        Ok(result)
    }

    /// Read-only access under the same lock.
    pub fn read<T, F>(&self, view: F) -> LedgerResult<T>
    where
        F: FnOnce(&LedgerDocument) -> T,
    {
        let doc = self.doc.lock().unwrap_or_else(|e| e.into_inner());
        Ok(view(&doc))
    }

    /// Full copy of the current document.
    pub fn snapshot(&self) -> LedgerResult<LedgerDocument> {
        self.read(|doc| doc.clone())
    }
}
