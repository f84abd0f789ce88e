use diesel::result::Error as DieselError;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::tokio::task::JoinError;

use crate::classify::classify;
use crate::utils::{error_body, try_respond};

pub trait Validate
where
    Self: Sized,
{
    type Valid;
    fn validate(self) -> Result<Self::Valid, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Article,
    Comment,
}

/// Every way a request can fail, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Syntactically or type-invalid input.
    Malformed,
    /// The `topic` filter names a topic that doesn't exist.
    TopicNotFound,
    /// The resource identified by the path doesn't exist.
    NotFound(Resource),
    /// A write referenced an article or user that doesn't exist.
    InvalidReference,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> Status {
        match self {
            ErrorKind::Malformed => Status::BadRequest,
            ErrorKind::TopicNotFound | ErrorKind::NotFound(_) | ErrorKind::InvalidReference => {
                Status::NotFound
            }
            ErrorKind::Internal => Status::InternalServerError,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::Malformed => "Bad Request",
            ErrorKind::TopicNotFound => "Sorry, we could not find that topic.",
            ErrorKind::NotFound(Resource::Article) => {
                "Sorry, we could not find an article with that id."
            }
            ErrorKind::NotFound(Resource::Comment) => {
                "Sorry, we could not find a comment with that id."
            }
            ErrorKind::InvalidReference => "Invalid key provided.",
            ErrorKind::Internal => "Oops something went wrong, please try again later.",
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Diesel(DieselError),
    Pool(r2d2::Error),
    Join(JoinError),
    Rejected(ErrorKind),
}

impl ApiError {
    pub fn malformed() -> Self {
        ApiError::Rejected(ErrorKind::Malformed)
    }

    pub fn not_found(resource: Resource) -> Self {
        ApiError::Rejected(ErrorKind::NotFound(resource))
    }
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        ApiError::Diesel(err)
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> ApiError {
        ApiError::Pool(err)
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> ApiError {
        ApiError::Join(err)
    }
}

impl From<ErrorKind> for ApiError {
    fn from(kind: ErrorKind) -> ApiError {
        ApiError::Rejected(kind)
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let kind = classify(&self);
        try_respond(req, error_body(kind.message()), kind.status())
    }
}
