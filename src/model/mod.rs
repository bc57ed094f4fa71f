pub mod attendance;

pub use attendance::{Action, AttendanceRecord, Status};
