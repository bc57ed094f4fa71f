use crate::api::attendance::KioskEntry;
use crate::controller::Submission;
use crate::model::{AttendanceRecord, Status};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Kiosk API",
        version = "0.1.0",
        description = r#"
## Attendance check-in / check-out kiosk

Students identify themselves by **surname** and **first name initial**
(compared case-insensitively) and check in or out. The full roster is kept
in a CSV file that is overwritten on every save.

### Status vocabulary
`none`, `checked in`, `checked out`

### Errors
Every failure responds with `{"error": "<message>"}`.
"#,
    ),
    paths(
        crate::api::attendance::list_records,
        crate::api::attendance::replace_records,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::search,
    ),
    components(
        schemas(
            AttendanceRecord,
            Status,
            KioskEntry,
            Submission
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance check-in and check-out APIs"),
    )
)]
pub struct ApiDoc;
