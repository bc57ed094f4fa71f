//! Kiosk actions: validate the two inputs, apply the transition, save.

use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::{AttendanceError, Result};
use crate::model::{Action, AttendanceRecord};
use crate::persistence::Persistence;
use crate::store::RecordStore;
use crate::utils::clock::{self, Clock};

pub const BLANK_INPUT: &str = "Please enter both surname and first name initial.";

/// Outcome of an accepted action.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Submission {
    #[schema(example = "Successfully checked in!")]
    pub message: String,
    pub record: AttendanceRecord,
}

/// Owns one session's records together with where they are saved.
#[derive(Debug)]
pub struct AttendanceController<P> {
    store: RecordStore,
    persistence: P,
    clock: Clock,
}

impl<P: Persistence> AttendanceController<P> {
    pub fn new(store: RecordStore, persistence: P) -> Self {
        Self {
            store,
            persistence,
            clock: clock::local_now,
        }
    }

    /// Loads the session from `persistence`. An empty or unreadable store
    /// starts from the default roster when `seed_roster` is set.
    pub fn open(persistence: P, seed_roster: bool) -> Self {
        let records = persistence.load();
        let store = if records.is_empty() && seed_roster {
            info!("No data from store, using default roster");
            RecordStore::default_roster()
        } else {
            RecordStore::from_records(records)
        };
        Self::new(store, persistence)
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn submit(
        &mut self,
        surname: &str,
        name_initial: &str,
        action: Action,
    ) -> Result<Submission> {
        let surname = surname.trim();
        let name_initial = name_initial.trim();
        if surname.is_empty() || name_initial.is_empty() {
            return Err(AttendanceError::validation(BLANK_INPUT));
        }

        let now = (self.clock)();
        let record = self
            .store
            .upsert_and_transition(surname, name_initial, action, &now)
            .map_err(|e| {
                info!(surname, name_initial, %action, reason = %e, "Action refused");
                e
            })?
            .clone();

        // The change stays in memory even if the save fails; the caller
        // can retry the save by resubmitting or uploading.
        self.persistence.save(self.store.records()).map_err(|e| {
            warn!(error = %e, %action, "Saving attendance failed");
            e
        })?;

        let message = match action {
            Action::CheckIn => "Successfully checked in!",
            Action::CheckOut => "Successfully checked out!",
        };
        info!(surname, name_initial, %action, "Attendance recorded");
        Ok(Submission {
            message: message.to_string(),
            record,
        })
    }

    pub fn check_in(&mut self, surname: &str, name_initial: &str) -> Result<Submission> {
        self.submit(surname, name_initial, Action::CheckIn)
    }

    pub fn check_out(&mut self, surname: &str, name_initial: &str) -> Result<Submission> {
        self.submit(surname, name_initial, Action::CheckOut)
    }

    /// Replaces the session with `records` and overwrites the store.
    pub fn replace_all(&mut self, records: Vec<AttendanceRecord>) -> Result<usize> {
        info!(count = records.len(), "Saving student records");
        self.store.replace_all(records);
        self.persistence.save(self.store.records())?;
        Ok(self.store.len())
    }
}
