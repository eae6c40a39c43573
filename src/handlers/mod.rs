//! HTTP handlers for config nodes and devices, plus the request parsing they share.

pub mod config_node;
pub mod device;

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{ErrorCode, ErrorStruct};
use crate::model::strip_read_only;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

/// `(offset, limit)` with defaults applied and bounds enforced.
pub fn page_bounds(offset: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    (
        offset.unwrap_or(0).max(0),
        limit.unwrap_or(DEFAULT_LIMIT).clamp(0, MAX_LIMIT),
    )
}

/// An id that is not a UUID cannot name any row.
pub fn parse_id(raw: &str) -> Result<Uuid, ErrorStruct> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ErrorCode::ResourceNotFound.at(&["path", "id"]).with_input(raw))
}

/// Decode a JSON object body into `T`, ignoring server-owned keys.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ErrorStruct> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ErrorCode::RequestBodyEmpty.error());
    }
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        let mut ctx = Map::new();
        ctx.insert("line".into(), e.line().into());
        ctx.insert("column".into(), e.column().into());
        ctx.insert("msg".into(), e.to_string().into());
        ErrorCode::JsonDecodeError.error().with_ctx(ctx)
    })?;
    let mut obj = match value {
        Value::Object(obj) => obj,
        other => return Err(ErrorCode::RequestBodyInvalid.at(&["body"]).with_input(other)),
    };
    strip_read_only(&mut obj);
    serde_json::from_value(Value::Object(obj)).map_err(|e| body_error(&e.to_string()))
}

fn body_error(msg: &str) -> ErrorStruct {
    if let Some(field) = missing_field(msg) {
        return ErrorCode::RequestBodyLack.at(&["body", field]);
    }
    let mut ctx = Map::new();
    ctx.insert("msg".into(), msg.into());
    ErrorCode::RequestBodyInvalid.at(&["body"]).with_ctx(ctx)
}

/// Field name out of serde's "missing field `name`" message.
fn missing_field(msg: &str) -> Option<&str> {
    let rest = msg.strip_prefix("missing field `")?;
    rest.split('`').next()
}

/// Body could not be read (too large, broken stream). Keeps the framework's status.
pub fn body_rejection(rejection: BytesRejection) -> ErrorStruct {
    let mut ctx = Map::new();
    ctx.insert("msg".into(), rejection.body_text().into());
    ErrorStruct::from_status(rejection.status()).with_ctx(ctx)
}

pub fn query_error(rejection: QueryRejection) -> ErrorStruct {
    let mut ctx = Map::new();
    ctx.insert("msg".into(), rejection.body_text().into());
    ErrorCode::RequestBodyInvalid.at(&["query"]).with_ctx(ctx)
}
