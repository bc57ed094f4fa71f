//! One-way migration of rows written before check-in and check-out times
//! were tracked separately. Those rows carry a single `Timestamp` column.

use crate::codec::RawRecord;
use crate::model::{AttendanceRecord, Status};

fn non_blank(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Turns a stored row into a record, moving a legacy `Timestamp` into the
/// time slot its status implies. Anything but `checked out` keeps it as the
/// check-in time.
pub fn upgrade(raw: RawRecord) -> AttendanceRecord {
    let status = Status::from_stored(&raw.status);
    let mut check_in_time = non_blank(raw.check_in_time);
    let mut check_out_time = non_blank(raw.check_out_time);

    if check_in_time.is_none() && check_out_time.is_none() && !raw.timestamp.is_empty() {
        match status {
            Status::CheckedOut => check_out_time = Some(raw.timestamp),
            Status::CheckedIn | Status::None => check_in_time = Some(raw.timestamp),
        }
    }

    AttendanceRecord {
        surname: raw.surname,
        name_initial: raw.name_initial,
        status,
        check_in_time,
        check_out_time,
    }
}
