use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::infra::error::InfraError;

/// Diagnostic record carried on response extensions from the failure site
/// to the terminal error renderer and the request logger.
///
/// `public_message` is safe to show to any client; `messages` holds the full
/// source chain and is only ever rendered in development mode.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub public_message: String,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<String>,
        error: &dyn StdError,
    ) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            public_message: public_message.into(),
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            public_message: public_message.into(),
            messages: vec![detail.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// A request-time failure: status plus a client-safe message, with the
/// diagnostic report riding along on the response for downstream layers.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: String,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let public_message = public_message.into();
        let report = ErrorReport::from_message(source, status, public_message.clone(), detail);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: impl Into<String>,
        error: &dyn StdError,
    ) -> Self {
        let public_message = public_message.into();
        let report = ErrorReport::from_error(source, status, public_message.clone(), error);
        Self {
            status,
            public_message,
            report,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Startup-time application errors surfaced by `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer failure")]
    struct Outer {
        #[source]
        inner: Inner,
    }

    #[derive(Debug, Error)]
    #[error("inner failure")]
    struct Inner;

    #[test]
    fn report_collects_full_source_chain() {
        let err = Outer { inner: Inner };
        let report = ErrorReport::from_error(
            "tests::report",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong",
            &err,
        );

        assert_eq!(report.messages, vec!["outer failure", "inner failure"]);
        assert_eq!(report.public_message, "Something went wrong");
    }

    #[test]
    fn http_error_response_carries_report() {
        let response = HttpError::new(
            "tests::http_error",
            StatusCode::BAD_REQUEST,
            "Request could not be processed",
            "field `x` missing",
        )
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let report = response
            .extensions()
            .get::<ErrorReport>()
            .expect("report attached");
        assert_eq!(report.status, StatusCode::BAD_REQUEST);
        assert_eq!(report.messages, vec!["field `x` missing"]);
    }
}
