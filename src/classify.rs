//! Turns a failed request into the `ErrorKind` reported to the caller.
//!
//! Discriminators are tried in order and the first one that recognises the
//! failure wins. Store codes come before domain rejections, and the fallback
//! is last so it never shadows a more specific classification. Requests that
//! match no route at all never get here; the 404 catcher answers them.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use log::{debug, error};
use rocket::http::Status;
use rocket::serde::json::{Json, Value};
use rocket::Request;

use crate::types::{ApiError, ErrorKind};
use crate::utils::error_body;

pub type Discriminator = fn(&ApiError) -> Option<ErrorKind>;

pub const DISCRIMINATORS: [Discriminator; 4] =
    [malformed_input, invalid_reference, domain_error, fallback];

pub const UNMATCHED_ROUTE: &str = "Sorry can't find that!";

/// Postgres reports bad literals (22P02) as "invalid input syntax for type …".
/// Diesel doesn't expose the SQLSTATE for that class, only the message.
const INVALID_INPUT_SYNTAX: &str = "invalid input syntax";

/// 22003, e.g. "integer out of range" when a vote increment overflows.
const OUT_OF_RANGE: &str = "out of range";

pub fn classify(err: &ApiError) -> ErrorKind {
    DISCRIMINATORS
        .iter()
        .find_map(|discriminate| discriminate(err))
        .unwrap_or(ErrorKind::Internal)
}

pub fn malformed_input(err: &ApiError) -> Option<ErrorKind> {
    match err {
        ApiError::Diesel(DieselError::DatabaseError(kind, info)) => match kind {
            DatabaseErrorKind::NotNullViolation | DatabaseErrorKind::CheckViolation => {
                debug!("malformed input rejected by the store: {}", info.message());
                Some(ErrorKind::Malformed)
            }
            DatabaseErrorKind::Unknown
                if info.message().starts_with(INVALID_INPUT_SYNTAX)
                    || info.message().contains(OUT_OF_RANGE) =>
            {
                debug!("malformed input rejected by the store: {}", info.message());
                Some(ErrorKind::Malformed)
            }
            _ => None,
        },
        _ => None,
    }
}

pub fn invalid_reference(err: &ApiError) -> Option<ErrorKind> {
    match err {
        ApiError::Diesel(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info)) => {
            debug!("foreign key violation: {}", info.message());
            Some(ErrorKind::InvalidReference)
        }
        _ => None,
    }
}

pub fn domain_error(err: &ApiError) -> Option<ErrorKind> {
    match err {
        ApiError::Rejected(kind) => Some(*kind),
        _ => None,
    }
}

pub fn fallback(err: &ApiError) -> Option<ErrorKind> {
    error!("unhandled failure: {:?}", err);
    Some(ErrorKind::Internal)
}

#[catch(404)]
pub fn unmatched_route(_req: &Request) -> Json<Value> {
    Json(error_body(UNMATCHED_ROUTE))
}

/// Anything else Rocket answers by itself, e.g. a missing pool.
#[catch(default)]
pub fn framework_failure(status: Status, _req: &Request) -> Json<Value> {
    let msg = match status.code {
        400..=499 => ErrorKind::Malformed.message(),
        _ => ErrorKind::Internal.message(),
    };
    Json(error_body(msg))
}
