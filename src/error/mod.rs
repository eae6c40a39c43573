//! Typed errors and HTTP mapping.
//!
//! Everything fallible returns [`AppError`]. Classification into an [`ErrorStruct`] happens once,
//! at the response boundary, so storage errors keep their full detail for the server log while
//! the client only ever sees the templated message and tag.

mod code;
mod naming;
mod storage;

pub use code::{ErrorClass, ErrorCode};
pub use naming::{ConstraintName, NamingConvention};
pub use storage::{translate_chain, translate_diagnostic, translate_sqlx, Diagnostic, SqlState};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::settings::SettingsError;

/// A classified error: `{type, msg, loc?, input?, ctx?}` plus an out-of-band status code and
/// logging flag.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorStruct {
    #[serde(rename = "type")]
    pub kind: String,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Map<String, Value>>,
    #[serde(skip)]
    pub status: StatusCode,
    #[serde(skip)]
    pub should_log: bool,
}

impl ErrorStruct {
    /// A framework-level HTTP failure (405, 413, ...) that keeps its status.
    /// Tagged `http_exception` under the class its status falls in.
    pub fn from_status(status: StatusCode) -> Self {
        let class = if status.is_server_error() {
            ErrorClass::Server
        } else {
            ErrorClass::Client
        };
        ErrorStruct {
            kind: format!("{}.http_exception", class.prefix()),
            msg: status
                .canonical_reason()
                .unwrap_or("HTTP error")
                .to_string(),
            loc: None,
            input: None,
            ctx: None,
            status,
            should_log: status.is_server_error(),
        }
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.kind == code.tag()
    }

    pub fn with_loc(mut self, loc: &[&str]) -> Self {
        self.loc = Some(loc.iter().map(|s| (*s).to_string()).collect());
        self
    }

    pub fn with_input(mut self, input: impl Into<Value>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_ctx(mut self, ctx: Map<String, Value>) -> Self {
        self.ctx = Some(ctx);
        self
    }

    /// Replace `{name}` placeholders in the message.
    pub fn format_msg(mut self, args: &[(&str, &str)]) -> Self {
        for (name, value) in args {
            self.msg = self.msg.replace(&format!("{{{}}}", name), value);
        }
        self
    }

    /// Response body: `{"detail": [ {...} ]}`.
    pub fn body(&self) -> Value {
        serde_json::json!({ "detail": [self] })
    }
}

impl std::fmt::Display for ErrorStruct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.status.as_u16(), self.msg)?;
        if let Some(loc) = &self.loc {
            write!(f, " (loc={:?})", loc)?;
        }
        Ok(())
    }
}

impl IntoResponse for ErrorStruct {
    fn into_response(self) -> Response {
        (self.status, Json(self.body())).into_response()
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Already classified (validation, not-found, hierarchy checks).
    #[error("{0}")]
    Structured(ErrorStruct),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    /// Anything else; classified by walking its source chain.
    #[error("internal: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ErrorStruct> for AppError {
    fn from(err: ErrorStruct) -> Self {
        AppError::Structured(err)
    }
}

impl From<ErrorCode> for AppError {
    fn from(code: ErrorCode) -> Self {
        AppError::Structured(code.error())
    }
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        AppError::Internal(Box::new(err))
    }
}

impl AppError {
    /// Classify into the structured error that crosses the API boundary.
    pub fn to_struct(&self) -> ErrorStruct {
        match self {
            AppError::Structured(s) => s.clone(),
            AppError::Db(e) => translate_sqlx(e),
            AppError::Internal(e) => translate_chain(e.as_ref()),
        }
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.to_struct().is(code)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let classified = self.to_struct();
        if classified.should_log {
            tracing::error!(
                error_type = %classified.kind,
                status = classified.status.as_u16(),
                internal = %self,
                "request failed"
            );
        } else {
            tracing::debug!(error_type = %classified.kind, "client error");
        }
        classified.into_response()
    }
}
