use crate::error::TransitionError;
use crate::model::{Action, AttendanceRecord};

/// The session's attendance records, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<AttendanceRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<AttendanceRecord>) -> Self {
        Self { records }
    }

    /// Roster shown by the kiosk when nothing could be loaded.
    pub fn default_roster() -> Self {
        Self::from_records(vec![
            AttendanceRecord::new("Smith", "J"),
            AttendanceRecord::new("Johnson", "A"),
        ])
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record matching both fields, ignoring case.
    pub fn find(&self, surname: &str, name_initial: &str) -> Option<&AttendanceRecord> {
        self.records
            .iter()
            .find(|r| r.is_same_student(surname, name_initial))
    }

    fn position_or_insert(&mut self, surname: &str, name_initial: &str) -> usize {
        match self
            .records
            .iter()
            .position(|r| r.is_same_student(surname, name_initial))
        {
            Some(idx) => idx,
            None => {
                tracing::info!(surname, name_initial, "New student added to roster");
                self.records
                    .push(AttendanceRecord::new(surname, name_initial));
                self.records.len() - 1
            }
        }
    }

    /// Finds or creates the student, then applies `action`.
    ///
    /// A student created here stays in the store even when the action is
    /// refused.
    pub fn upsert_and_transition(
        &mut self,
        surname: &str,
        name_initial: &str,
        action: Action,
        now: &str,
    ) -> Result<&AttendanceRecord, TransitionError> {
        let idx = self.position_or_insert(surname, name_initial);
        let record = &mut self.records[idx];
        record.apply(action, now)?;
        Ok(record)
    }

    /// Swaps in a whole new collection, as an upload does.
    pub fn replace_all(&mut self, records: Vec<AttendanceRecord>) {
        self.records = records;
    }

    /// Case-insensitive substring search over surname and name initial.
    /// A blank term matches everyone.
    pub fn search(&self, term: &str) -> Vec<&AttendanceRecord> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.records.iter().collect();
        }
        self.records
            .iter()
            .filter(|r| {
                r.surname.to_lowercase().contains(&term)
                    || r.name_initial.to_lowercase().contains(&term)
            })
            .collect()
    }
}
