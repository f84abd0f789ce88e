use chrono::{NaiveDateTime, SecondsFormat, TimeZone, Utc};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::{json, Json, Value};
use serde::Serializer;

use crate::types::ApiError;

pub fn try_respond(req: &Request, json: Value, status: Status) -> response::Result<'static> {
    let resp = Json(json).respond_to(req)?;
    Response::build_from(resp).status(status).ok()
}

/// The envelope every failure is reported in.
pub fn error_body(msg: &str) -> Value {
    json!({ "error": { "msg": msg } })
}

/// Numeric path segments arrive as `Result<i32, &str>` so a bad one is
/// reported as malformed input instead of falling through to the 404 catcher.
pub fn path_id(param: Result<i32, &str>) -> Result<i32, ApiError> {
    param.map_err(|_| ApiError::malformed())
}

/// Store timestamps are UTC without a zone; they go out as RFC 3339 with a `Z`.
pub fn serialize_date<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = Utc
        .from_utc_datetime(date)
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    serializer.serialize_str(&s)
}
