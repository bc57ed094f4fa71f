use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::error::TransitionError;

/// Attendance status as written to the CSV file and the JSON API.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Status {
    #[default]
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    None,
    #[serde(rename = "checked in")]
    #[strum(serialize = "checked in")]
    CheckedIn,
    #[serde(rename = "checked out")]
    #[strum(serialize = "checked out")]
    CheckedOut,
}

impl Status {
    /// Parses a stored status token. Blank means `none`; anything outside the
    /// three exact lowercase tokens is logged and treated as `none`.
    pub fn from_stored(value: &str) -> Self {
        if value.is_empty() {
            return Status::None;
        }
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(status = value, "Unknown attendance status, treating as none");
            Status::None
        })
    }

    /// Next status for `action`, or the reason the move is refused.
    pub fn after(self, action: Action) -> Result<Status, TransitionError> {
        match (self, action) {
            (Status::None, Action::CheckIn) => Ok(Status::CheckedIn),
            (Status::None, Action::CheckOut) => Err(TransitionError::NotCheckedIn),
            (Status::CheckedIn, Action::CheckIn) => Err(TransitionError::AlreadyCheckedIn),
            (Status::CheckedIn, Action::CheckOut) => Ok(Status::CheckedOut),
            // A checked-out student cannot check in again the same session.
            (Status::CheckedOut, Action::CheckIn) => Err(TransitionError::AlreadyCheckedIn),
            (Status::CheckedOut, Action::CheckOut) => Err(TransitionError::AlreadyCheckedOut),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
pub enum Action {
    #[strum(serialize = "check-in")]
    CheckIn,
    #[strum(serialize = "check-out")]
    CheckOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "Student_Surname": "Smith",
        "Student_Name": "J",
        "Status": "checked in",
        "CheckInTime": "3/14/2025, 8:02:11 AM",
        "CheckOutTime": ""
    })
)]
pub struct AttendanceRecord {
    #[serde(rename = "Student_Surname")]
    #[schema(example = "Smith")]
    pub surname: String,

    #[serde(rename = "Student_Name")]
    #[schema(example = "J")]
    pub name_initial: String,

    #[serde(rename = "Status")]
    pub status: Status,

    #[serde(rename = "CheckInTime", default, with = "blank_as_none")]
    #[schema(value_type = String, example = "3/14/2025, 8:02:11 AM")]
    pub check_in_time: Option<String>,

    #[serde(rename = "CheckOutTime", default, with = "blank_as_none")]
    #[schema(value_type = String, example = "")]
    pub check_out_time: Option<String>,
}

impl AttendanceRecord {
    pub fn new(surname: impl Into<String>, name_initial: impl Into<String>) -> Self {
        Self {
            surname: surname.into(),
            name_initial: name_initial.into(),
            status: Status::None,
            check_in_time: None,
            check_out_time: None,
        }
    }

    /// Case-insensitive identity match on surname and name initial.
    pub fn is_same_student(&self, surname: &str, name_initial: &str) -> bool {
        self.surname.to_lowercase() == surname.to_lowercase()
            && self.name_initial.to_lowercase() == name_initial.to_lowercase()
    }

    /// Applies `action` in place, stamping the matching time with `now`.
    /// A refused action leaves the record untouched.
    pub fn apply(&mut self, action: Action, now: &str) -> Result<(), TransitionError> {
        let next = self.status.after(action)?;
        match action {
            Action::CheckIn => self.check_in_time = Some(now.to_string()),
            Action::CheckOut => self.check_out_time = Some(now.to_string()),
        }
        self.status = next;
        Ok(())
    }
}

/// Missing timestamps travel as `""` on the wire.
mod blank_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(d)?;
        Ok(value.filter(|v| !v.is_empty()))
    }
}
