pub mod attendance;

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::controller::AttendanceController;
use crate::persistence::CsvFileStore;

pub type Controller = AttendanceController<CsvFileStore>;

/// Shared across workers through `web::Data`.
#[derive(Debug)]
pub struct AppState {
    /// Reads for `GET /attendance` go straight to the file.
    pub gateway: CsvFileStore,
    pub controller: Mutex<Controller>,
}

impl AppState {
    pub fn new(controller: Controller) -> Self {
        Self {
            gateway: controller.persistence().clone(),
            controller: Mutex::new(controller),
        }
    }

    /// A panic mid-action leaves at worst one half-applied record, so a
    /// poisoned lock is still usable.
    pub fn controller(&self) -> MutexGuard<'_, Controller> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
