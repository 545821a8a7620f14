//! Errors raised by calls to the sport-plus API.

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::Endpoint;

/// A remote call that did not complete with an expected status.
///
/// Every variant aborts the current run; `main` prints it as one diagnostic line.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to authenticate {login} (status {status}): {body}")]
    Auth {
        login: String,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to get {endpoint} schedules (status {status}): {body}")]
    Fetch {
        endpoint: Endpoint,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to create schedule (status {status}): {body}")]
    Create { status: StatusCode, body: String },

    #[error("Failed to parse {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
