//! Durable storage of the full record collection.
//!
//! Saves always replace the whole backing file. Two writers racing each other
//! end with whichever save finished last.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::codec::{self, HEADER};
use crate::error::{AttendanceError, Result};
use crate::model::AttendanceRecord;

pub trait Persistence: Send + 'static {
    /// Reads every record, reporting failures.
    fn try_load(&self) -> Result<Vec<AttendanceRecord>>;

    /// Writes `records` as the complete new contents of the store.
    fn save(&self, records: &[AttendanceRecord]) -> Result<()>;

    /// Reads every record; a failed read is logged and comes back empty.
    fn load(&self) -> Vec<AttendanceRecord> {
        self.try_load().unwrap_or_else(|e| {
            error!(error = %e, "Error reading attendance data");
            Vec::new()
        })
    }
}

/// CSV file on local disk.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling of the target so the final rename stays on one filesystem.
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attendance.csv".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
    }

    fn read_err(&self, source: std::io::Error) -> AttendanceError {
        AttendanceError::PersistenceRead {
            path: self.path.clone(),
            source,
        }
    }

    fn write_err(&self, source: std::io::Error) -> AttendanceError {
        AttendanceError::PersistenceWrite {
            path: self.path.clone(),
            source,
        }
    }

    fn write_temp(temp: &Path, contents: &str) -> std::io::Result<()> {
        let mut file = File::create(temp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    }

    fn replace_target(&self, temp: &Path) -> std::io::Result<()> {
        match fs::rename(temp, &self.path) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Rename over attendance file failed, copying instead");
                fs::copy(temp, &self.path).map(|_| ())
            }
        }
    }

    fn remove_temp(temp: &Path) {
        if !temp.exists() {
            return;
        }
        if let Err(e) = fs::remove_file(temp) {
            warn!(error = %e, path = %temp.display(), "Could not delete temp file");
        }
    }
}

impl Persistence for CsvFileStore {
    fn try_load(&self) -> Result<Vec<AttendanceRecord>> {
        if !self.path.exists() {
            fs::write(&self.path, format!("{}\n", HEADER.join(",")))
                .map_err(|e| self.read_err(e))?;
            info!(path = %self.path.display(), "Created new CSV file");
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&self.path).map_err(|e| self.read_err(e))?;
        let records = codec::decode_records(&text);
        debug!(count = records.len(), "Loaded attendance records");
        Ok(records)
    }

    fn save(&self, records: &[AttendanceRecord]) -> Result<()> {
        let contents = codec::encode(records);
        let temp = self.temp_path();

        let result = Self::write_temp(&temp, &contents).and_then(|()| self.replace_target(&temp));
        Self::remove_temp(&temp);
        result.map_err(|e| self.write_err(e))?;

        info!(count = records.len(), path = %self.path.display(), "Saved student records");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryPersistence;

#[cfg(test)]
mod memory {
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::Persistence;
    use crate::error::{AttendanceError, Result};
    use crate::model::AttendanceRecord;

    /// In-process store that counts saves.
    #[derive(Debug, Default)]
    pub struct MemoryPersistence {
        records: Mutex<Vec<AttendanceRecord>>,
        saves: AtomicUsize,
        fail_writes: bool,
    }

    impl MemoryPersistence {
        pub fn new(records: Vec<AttendanceRecord>) -> Self {
            Self {
                records: Mutex::new(records),
                ..Self::default()
            }
        }

        /// Every save fails with a write error.
        pub fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        pub fn snapshot(&self) -> Vec<AttendanceRecord> {
            self.records.lock().map(|r| r.clone()).unwrap_or_default()
        }

        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }

        fn poisoned() -> std::io::Error {
            std::io::Error::other("memory store lock poisoned")
        }
    }

    impl Persistence for MemoryPersistence {
        fn try_load(&self) -> Result<Vec<AttendanceRecord>> {
            self.records
                .lock()
                .map(|r| r.clone())
                .map_err(|_| AttendanceError::PersistenceRead {
                    path: PathBuf::from(":memory:"),
                    source: Self::poisoned(),
                })
        }

        fn save(&self, records: &[AttendanceRecord]) -> Result<()> {
            let write_err = |source| AttendanceError::PersistenceWrite {
                path: PathBuf::from(":memory:"),
                source,
            };
            if self.fail_writes {
                return Err(write_err(std::io::Error::other("writes disabled")));
            }
            let mut stored = self.records.lock().map_err(|_| write_err(Self::poisoned()))?;
            *stored = records.to_vec();
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, Status};
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_created_with_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attendance.csv");
        let store = CsvFileStore::new(&path);

        assert!(store.try_load().unwrap().is_empty());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Student_Surname,Student_Name,Status,CheckInTime,CheckOutTime\n"
        );
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let store = CsvFileStore::new(dir.path().join("attendance.csv"));

        let mut record = AttendanceRecord::new("O\"Brien", "P");
        record.apply(Action::CheckIn, "1/2/2025, 9:00:00 AM").unwrap();
        store.save(&[record.clone()]).unwrap();

        assert_eq!(store.load(), vec![record]);
    }

    #[test]
    fn save_overwrites_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = CsvFileStore::new(dir.path().join("attendance.csv"));

        store
            .save(&[AttendanceRecord::new("Smith", "J"), AttendanceRecord::new("Lee", "K")])
            .unwrap();
        store.save(&[AttendanceRecord::new("Lee", "K")]).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].surname, "Lee");

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["attendance.csv"]);
    }

    #[test]
    fn unreadable_store_loads_empty() {
        let dir = tempdir().unwrap();
        // A directory where the file should be cannot be read as text.
        let path = dir.path().join("attendance.csv");
        fs::create_dir(&path).unwrap();
        let store = CsvFileStore::new(&path);

        assert!(matches!(
            store.try_load(),
            Err(AttendanceError::PersistenceRead { .. })
        ));
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let store = CsvFileStore::new(dir.path().join("nope").join("attendance.csv"));
        let err = store.save(&[AttendanceRecord::new("Lee", "K")]).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn legacy_file_is_upgraded_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attendance.csv");
        fs::write(
            &path,
            "Student_Surname,Student_Name,Status,Timestamp\n\"Lee\",\"K\",\"checked out\",\"5:00 PM\"\n",
        )
        .unwrap();

        let records = CsvFileStore::new(&path).load();
        assert_eq!(records[0].status, Status::CheckedOut);
        assert_eq!(records[0].check_in_time, None);
        assert_eq!(records[0].check_out_time.as_deref(), Some("5:00 PM"));
    }

    #[test]
    fn memory_store_counts_saves() {
        let store = MemoryPersistence::default();
        store.save(&[AttendanceRecord::new("Lee", "K")]).unwrap();
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.snapshot().len(), 1);
        assert!(MemoryPersistence::failing().save(&[]).is_err());
    }
}
