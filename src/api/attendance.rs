use actix_web::{HttpRequest, HttpResponse, Responder, error::InternalError, web};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};

use crate::api::AppState;
use crate::codec::RawRecord;
use crate::controller::Submission;
use crate::error::AttendanceError;
use crate::legacy;
use crate::model::AttendanceRecord;
use crate::persistence::Persistence;

const INVALID_FORMAT: &str = "Invalid student data format";

/// Kiosk form input.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct KioskEntry {
    #[schema(example = "Lee")]
    pub surname: String,
    /// First name initial
    #[schema(example = "K")]
    pub name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Matched against surname and name initial, ignoring case
    pub q: Option<String>,
}

/// Rejects unparsable JSON bodies with the same shape as other 400s.
pub fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::error!(error = %err, "Invalid student data received");
    let resp = HttpResponse::BadRequest().json(json!({ "error": INVALID_FORMAT }));
    InternalError::from_response(err, resp).into()
}

/// Checks the upload is a non-empty array of record objects.
fn parse_upload(body: Value) -> Result<Vec<AttendanceRecord>, AttendanceError> {
    let Value::Array(items) = body else {
        return Err(AttendanceError::malformed(INVALID_FORMAT));
    };
    if items.is_empty() {
        return Err(AttendanceError::malformed(INVALID_FORMAT));
    }

    items
        .into_iter()
        .map(|item| {
            if !item.is_object() {
                return Err(AttendanceError::malformed(INVALID_FORMAT));
            }
            serde_json::from_value::<RawRecord>(item)
                .map(legacy::upgrade)
                .map_err(|e| AttendanceError::malformed(format!("{INVALID_FORMAT}: {e}")))
        })
        .collect()
}

/// Current attendance data as stored on disk
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "All attendance records", body = [AttendanceRecord]),
        (status = 500, description = "Backing file unreadable", body = Object, example = json!({
            "error": "Failed to read attendance data"
        }))
    ),
    tag = "Attendance"
)]
pub async fn list_records(state: web::Data<AppState>) -> actix_web::Result<impl Responder> {
    let gateway = state.gateway.clone();
    let records = web::block(move || gateway.try_load()).await?.map_err(|e| {
        tracing::error!(error = %e, "Error reading attendance data");
        e
    })?;

    Ok(HttpResponse::Ok().json(records))
}

/// Overwrite all attendance data
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body(
        content = [AttendanceRecord],
        description = "The complete record collection",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Saved", body = Object, example = json!({
            "success": true,
            "message": "Attendance data updated successfully"
        })),
        (status = 400, description = "Body missing, empty or not an array", body = Object, example = json!({
            "error": "Invalid student data format"
        })),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Write failed", body = Object, example = json!({
            "error": "Failed to update attendance data: ..."
        }))
    ),
    tag = "Attendance"
)]
pub async fn replace_records(
    state: web::Data<AppState>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let records = parse_upload(payload.into_inner()).map_err(|e| {
        tracing::error!(error = %e, "Invalid student data received");
        e
    })?;

    web::block(move || state.controller().replace_all(records)).await??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Attendance data updated successfully"
    })))
}

/// Check a student in
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = KioskEntry,
    responses(
        (status = 200, description = "Checked in", body = Submission, example = json!({
            "success": true,
            "message": "Successfully checked in!",
            "record": {
                "Student_Surname": "Lee",
                "Student_Name": "K",
                "Status": "checked in",
                "CheckInTime": "3/14/2025, 8:02:11 AM",
                "CheckOutTime": ""
            }
        })),
        (status = 400, description = "Surname or initial blank", body = Object, example = json!({
            "error": "Please enter both surname and first name initial."
        })),
        (status = 409, description = "Already checked in", body = Object, example = json!({
            "error": "You are already checked in!"
        })),
        (status = 500, description = "Save failed; retry")
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    state: web::Data<AppState>,
    payload: web::Json<KioskEntry>,
) -> actix_web::Result<impl Responder> {
    let entry = payload.into_inner();
    let done = web::block(move || state.controller().check_in(&entry.surname, &entry.name)).await??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": done.message,
        "record": done.record,
    })))
}

/// Check a student out
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    request_body = KioskEntry,
    responses(
        (status = 200, description = "Checked out", body = Submission),
        (status = 400, description = "Surname or initial blank"),
        (status = 409, description = "Not checked in, or already checked out", body = Object, example = json!({
            "error": "You haven't checked in yet!"
        })),
        (status = 500, description = "Save failed; retry")
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    state: web::Data<AppState>,
    payload: web::Json<KioskEntry>,
) -> actix_web::Result<impl Responder> {
    let entry = payload.into_inner();
    let done = web::block(move || state.controller().check_out(&entry.surname, &entry.name)).await??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": done.message,
        "record": done.record,
    })))
}

/// Search the session's students
#[utoipa::path(
    get,
    path = "/api/attendance/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching records; all when q is blank", body = [AttendanceRecord])
    ),
    tag = "Attendance"
)]
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> actix_web::Result<impl Responder> {
    let term = query.into_inner().q.unwrap_or_default();
    let hits = web::block(move || {
        state
            .controller()
            .store()
            .search(&term)
            .into_iter()
            .cloned()
            .collect::<Vec<AttendanceRecord>>()
    })
    .await?;

    Ok(HttpResponse::Ok().json(hits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_must_be_non_empty_array_of_objects() {
        assert!(parse_upload(json!({})).is_err());
        assert!(parse_upload(json!("x")).is_err());
        assert!(parse_upload(json!([])).is_err());
        assert!(parse_upload(json!([1, 2])).is_err());
        assert!(parse_upload(json!([{ "Student_Surname": [] }])).is_err());
    }

    #[test]
    fn upload_reads_null_as_blank_and_scalars_as_text() {
        let records = parse_upload(json!([
            {
                "Student_Surname": "Lee",
                "Student_Name": "K",
                "Status": "checked in",
                "CheckInTime": "9:00",
                "CheckOutTime": null
            },
            { "Student_Surname": 42, "Student_Name": true, "Status": null }
        ]))
        .unwrap();
        assert_eq!(records[0].check_in_time.as_deref(), Some("9:00"));
        assert_eq!(records[0].check_out_time, None);
        assert_eq!(records[1].surname, "42");
        assert_eq!(records[1].name_initial, "true");
        assert_eq!(records[1].status, crate::model::Status::None);
    }

    #[test]
    fn upload_fills_missing_fields_and_upgrades_legacy_rows() {
        let records = parse_upload(json!([
            { "Student_Surname": "Lee", "Student_Name": "K" },
            { "Student_Surname": "Smith", "Student_Name": "J", "Status": "checked in", "Timestamp": "9:00" }
        ]))
        .unwrap();
        assert_eq!(records[0], AttendanceRecord::new("Lee", "K"));
        assert_eq!(records[1].check_in_time.as_deref(), Some("9:00"));
    }
}
