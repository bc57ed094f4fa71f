//! Attendance check-in/check-out kiosk backed by a CSV file.
//!
//! [`controller::AttendanceController`] owns one session's
//! [`store::RecordStore`] and saves it through a [`persistence::Persistence`]
//! after every accepted action. The `api` and `routes` modules expose it over
//! actix-web.

pub mod api;
pub mod codec;
pub mod config;
pub mod controller;
pub mod docs;
pub mod error;
pub mod legacy;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod routes;
pub mod store;
pub mod utils;

pub use error::{AttendanceError, Result};
