use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::data::error::DataFormatError;
use crate::data::loader::load_file;
use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Session – one loaded, immutable table
// ---------------------------------------------------------------------------

/// A successfully loaded source. Immutable once opened.
#[derive(Debug, Clone)]
pub struct Session {
    pub source: PathBuf,
    table: Arc<Table>,
}

impl Session {
    /// Load `path` without consulting any cache.
    pub fn open(path: &Path) -> Result<Self, DataFormatError> {
        let table = load_file(path)?;
        log::info!(
            "Loaded {} records from {} ({} rows dropped)",
            table.len(),
            path.display(),
            table.dropped.total()
        );
        Ok(Session {
            source: path.to_path_buf(),
            table: Arc::new(table),
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Display name of the source file.
    pub fn name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

// ---------------------------------------------------------------------------
// SessionCache – memoized loads
// ---------------------------------------------------------------------------

/// Identity of a source file: same path, size and mtime means same content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SourceKey {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceKey {
    fn of(path: &Path) -> Result<Self, DataFormatError> {
        let path = path.canonicalize()?;
        let meta = std::fs::metadata(&path)?;
        Ok(SourceKey {
            path,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Remembers successfully loaded tables so reopening an unchanged file is free.
#[derive(Debug, Default)]
pub struct SessionCache {
    entries: HashMap<SourceKey, Arc<Table>>,
    loads: usize,
}

impl SessionCache {
    pub fn get_or_load(&mut self, path: &Path) -> Result<Session, DataFormatError> {
        let key = SourceKey::of(path)?;
        if let Some(table) = self.entries.get(&key) {
            log::debug!("Reusing cached table for {}", path.display());
            return Ok(Session {
                source: path.to_path_buf(),
                table: Arc::clone(table),
            });
        }

        let session = Session::open(path)?;
        self.loads += 1;
        // An edited file replaces its previous version.
        self.entries.retain(|cached, _| cached.path != key.path);
        self.entries.insert(key, Arc::clone(&session.table));
        log::debug!("{} cached tables after {} source reads", self.entries.len(), self.loads);
        Ok(session)
    }

    /// Number of loads that actually read the source.
    #[cfg(test)]
    pub fn load_count(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Order Date,Segment,State,Region,Category,Sub-Category,Sales,Profit
2024-01-15,Consumer,Ohio,East,Tech,Phones,100,20
2024-02-03,Corporate,Utah,West,Tech,Machines,200,-10
";

    #[test]
    fn identical_input_is_loaded_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = SessionCache::default();
        let a = cache.get_or_load(&path).unwrap();
        let b = cache.get_or_load(&path).unwrap();
        assert_eq!(cache.load_count(), 1);
        assert!(Arc::ptr_eq(&a.table, &b.table));
        assert_eq!(b.table().len(), 2);
        assert_eq!(b.name(), "sales.csv");
    }

    #[test]
    fn changed_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = SessionCache::default();
        cache.get_or_load(&path).unwrap();
        std::fs::write(&path, format!("{CSV}2024-03-01,Consumer,Ohio,East,Tech,Phones,1,1\n")).unwrap();
        let reloaded = cache.get_or_load(&path).unwrap();
        assert_eq!(cache.load_count(), 2);
        assert_eq!(reloaded.table().len(), 3);
        assert_eq!(cache.entries.len(), 1);
    }

    #[test]
    fn distinct_files_are_cached_side_by_side() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        std::fs::write(&first, CSV).unwrap();
        std::fs::write(&second, CSV).unwrap();

        let mut cache = SessionCache::default();
        cache.get_or_load(&first).unwrap();
        cache.get_or_load(&second).unwrap();
        cache.get_or_load(&first).unwrap();
        assert_eq!(cache.load_count(), 2);
        assert_eq!(cache.entries.len(), 2);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "Region,Sales\nEast,1\n").unwrap();

        let mut cache = SessionCache::default();
        assert!(cache.get_or_load(&path).is_err());
        assert!(cache.get_or_load(&path).is_err());
        assert_eq!(cache.load_count(), 0);
    }
}
