use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::JsonResponse;

pub const LOGIN_URL: &str = "/auth/login/";

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("not found")]
    NotFound,
    /// Anonymous access to a protected page; carries the path to come back to.
    #[error("login required to access {next}")]
    LoginRequired { next: String },
    #[error("not authorized: {0}")]
    NotAuthorized(&'static str),
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    RunTimeError(&'static str),
    #[error("internal server error")]
    ServerError,
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJsonWrapper {
    pub errors: RequestErrorJson,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJson {
    pub body: Vec<String>,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: RequestErrorJson {
                body: vec![error.to_string()],
            },
        }
    }
}

/// `<login-url>?next=<path>`, with the path percent-encoded except for `/`.
pub fn login_redirect_url(next: &str) -> String {
    let next = urlencoding::encode(next).replace("%2F", "/");
    format!("{}?next={}", LOGIN_URL, next)
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        if let RequestError::LoginRequired { next } = &self {
            return Redirect::to(&login_redirect_url(next)).into_response();
        }
        self.to_json_response().into_response()
    }
}

impl RequestError {
    pub fn to_json_response(&self) -> JsonResponse<RequestErrorJsonWrapper> {
        let (status_code, json) = match self {
            RequestError::NotFound => (
                StatusCode::NOT_FOUND,
                RequestErrorJsonWrapper::new("Not Found"),
            ),
            RequestError::LoginRequired { .. } => (
                StatusCode::UNAUTHORIZED,
                RequestErrorJsonWrapper::new("Login required"),
            ),
            RequestError::NotAuthorized(message) => (
                StatusCode::UNAUTHORIZED,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::Forbidden => (
                StatusCode::FORBIDDEN,
                RequestErrorJsonWrapper::new("Forbidden"),
            ),
            RequestError::RunTimeError(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                RequestErrorJsonWrapper::new("Internal Server Error"),
            ),
            RequestError::DatabaseError(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RequestErrorJsonWrapper::new("Internal Server Error"),
                )
            }
        };
        (status_code, Json(json))
    }

    /// True when the store rejected a write because of a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RequestError::DatabaseError(sqlx::Error::Database(e)) => {
                e.message().contains("UNIQUE constraint failed")
            }
            _ => false,
        }
    }
}
