//! CSV text <-> attendance rows.
//!
//! Output is always the fixed five-column layout with every field quoted.
//! Input is read by header name, so reordered or extra columns (including the
//! legacy `Timestamp` column) are accepted.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::legacy;
use crate::model::AttendanceRecord;

pub const SURNAME: &str = "Student_Surname";
pub const NAME: &str = "Student_Name";
pub const STATUS: &str = "Status";
pub const CHECK_IN_TIME: &str = "CheckInTime";
pub const CHECK_OUT_TIME: &str = "CheckOutTime";
pub const LEGACY_TIMESTAMP: &str = "Timestamp";

pub const HEADER: [&str; 5] = [SURNAME, NAME, STATUS, CHECK_IN_TIME, CHECK_OUT_TIME];

/// A row as stored, before status parsing and the legacy upgrade.
///
/// Also the shape accepted from uploaded JSON, where every field is optional
/// and `null` reads as blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(rename = "Student_Surname", deserialize_with = "text")]
    pub surname: String,
    #[serde(rename = "Student_Name", deserialize_with = "text")]
    pub name_initial: String,
    #[serde(rename = "Status", deserialize_with = "text")]
    pub status: String,
    #[serde(rename = "CheckInTime", deserialize_with = "text")]
    pub check_in_time: String,
    #[serde(rename = "CheckOutTime", deserialize_with = "text")]
    pub check_out_time: String,
    #[serde(rename = "Timestamp", deserialize_with = "text")]
    pub timestamp: String,
}

/// `null` becomes `""`; numbers and booleans keep their JSON spelling.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        scalar @ (Value::Number(_) | Value::Bool(_)) => Ok(scalar.to_string()),
        other => Err(serde::de::Error::custom(format!("expected text, found {other}"))),
    }
}

impl RawRecord {
    fn set(&mut self, column: &str, value: String) {
        match column {
            SURNAME => self.surname = value,
            NAME => self.name_initial = value,
            STATUS => self.status = value,
            CHECK_IN_TIME => self.check_in_time = value,
            CHECK_OUT_TIME => self.check_out_time = value,
            LEGACY_TIMESTAMP => self.timestamp = value,
            _ => {}
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn encode(records: &[AttendanceRecord]) -> String {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(HEADER.join(","));

    for record in records {
        let fields = [
            record.surname.as_str(),
            record.name_initial.as_str(),
            record.status.as_ref(),
            record.check_in_time.as_deref().unwrap_or(""),
            record.check_out_time.as_deref().unwrap_or(""),
        ];
        rows.push(fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(","));
    }

    rows.join("\n")
}

/// One row cut from the front of the remaining text.
struct Row {
    fields: Vec<String>,
    /// Bytes of input the row used, line break included.
    consumed: usize,
    /// False when the input ran out inside a quoted field.
    closed: bool,
    blank: bool,
}

/// Reads the row at the start of `text`.
///
/// With `span_lines` a quoted field may run past a line break; without it
/// the row always ends at the first line break.
fn next_row(text: &str, span_lines: bool) -> Row {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_content = false;
    let mut chars = text.char_indices().peekable();

    let finish = |mut fields: Vec<String>, current: String, consumed: usize, closed: bool, has_content: bool| {
        fields.push(current);
        let blank = !has_content && fields.iter().all(|f| f.trim().is_empty());
        Row { fields, consumed, closed, blank }
    };

    while let Some((i, c)) = chars.next() {
        if in_quotes {
            match c {
                '"' if matches!(chars.peek(), Some((_, '"'))) => {
                    chars.next();
                    current.push('"');
                }
                '"' => in_quotes = false,
                '\r' if !span_lines && matches!(chars.peek(), Some((_, '\n'))) => {}
                '\n' if !span_lines => return finish(fields, current, i + 1, false, has_content),
                _ => current.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                has_content = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut current));
                has_content = true;
            }
            '\r' if matches!(chars.peek(), Some((_, '\n'))) => {}
            '\n' => return finish(fields, current, i + 1, true, has_content),
            _ => current.push(c),
        }
    }

    finish(fields, current, text.len(), !in_quotes, has_content)
}

/// Splits `text` into rows of unquoted fields.
///
/// Quote state carries across line breaks, so a quoted newline stays inside
/// its field. A row whose quote never closes is re-read on its own line so
/// it cannot swallow the rows after it. Lines with nothing on them are
/// dropped.
fn split_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let mut row = next_row(rest, true);
        if !row.closed {
            tracing::warn!("Unbalanced quote in attendance data, reading the row as a single line");
            row = next_row(rest, false);
        }
        rest = &rest[row.consumed..];
        if !row.blank {
            rows.push(row.fields);
        }
    }

    rows
}

/// Parses CSV text into raw rows. The first row is the header.
pub fn decode(text: &str) -> Vec<RawRecord> {
    let mut rows = split_rows(text).into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let columns: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    rows.map(|values| {
        let mut raw = RawRecord::default();
        let mut values = values.into_iter();
        for column in &columns {
            raw.set(column, values.next().unwrap_or_default());
        }
        raw
    })
    .collect()
}

/// [`decode`] followed by the explicit legacy upgrade.
pub fn decode_records(text: &str) -> Vec<AttendanceRecord> {
    decode(text).into_iter().map(legacy::upgrade).collect()
}
