//! Storage error translation.
//!
//! An ordered, statically declared pipeline of matchers turns a `sqlx::Error` into an
//! [`ErrorStruct`]. Database-reported failures are reduced to a [`Diagnostic`] first and
//! classified by SQLSTATE; generic integrity violations fall back to the constraint naming
//! convention.

use regex::Regex;
use sqlx::error::{DatabaseError, ErrorKind};
use sqlx::postgres::PgDatabaseError;
use std::sync::LazyLock;

use super::naming::NamingConvention;
use super::{ErrorCode, ErrorStruct};

/// SQLSTATE families the translator distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlState {
    Connection,
    Critical,
    DataException,
    IntegrityConstraint,
    Restrict,
    NotNull,
    ForeignKey,
    Unique,
    Check,
    Exclusion,
    Other,
}

impl SqlState {
    pub fn from_code(code: &str) -> Self {
        match code {
            "57P03" => SqlState::Connection,
            c if c.starts_with("08") => SqlState::Connection,
            // corruption, disk/memory exhaustion, limits, server config/auth, shutdowns, system I/O
            "XX001" | "XX002" | "53100" | "53200" | "54011" | "54023" | "F0000" | "28P01"
            | "57P01" | "57P02" | "57P04" | "58000" | "58030" | "58P01" | "58P02" => {
                SqlState::Critical
            }
            "23001" => SqlState::Restrict,
            "23502" => SqlState::NotNull,
            "23503" => SqlState::ForeignKey,
            "23505" => SqlState::Unique,
            "23514" => SqlState::Check,
            "23P01" => SqlState::Exclusion,
            c if c.starts_with("23") => SqlState::IntegrityConstraint,
            c if c.starts_with("22") => SqlState::DataException,
            _ => SqlState::Other,
        }
    }
}

/// What the driver told us about a database-reported failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: Option<String>,
    pub message: String,
    pub detail: Option<String>,
    pub constraint: Option<String>,
    pub table: Option<String>,
    pub column: Option<String>,
}

impl Diagnostic {
    pub fn from_database_error(err: &(dyn DatabaseError + 'static)) -> Self {
        let pg = err.try_downcast_ref::<PgDatabaseError>();
        let code = err.code().map(|c| c.into_owned()).or_else(|| {
            let fallback = match err.kind() {
                ErrorKind::UniqueViolation => "23505",
                ErrorKind::ForeignKeyViolation => "23503",
                ErrorKind::NotNullViolation => "23502",
                ErrorKind::CheckViolation => "23514",
                _ => return None,
            };
            Some(fallback.to_string())
        });
        Diagnostic {
            code,
            message: err.message().to_string(),
            detail: pg.and_then(|p| p.detail()).map(str::to_string),
            constraint: err.constraint().map(str::to_string),
            table: err.table().map(str::to_string),
            column: pg.and_then(|p| p.column()).map(str::to_string),
        }
    }

    pub fn sql_state(&self) -> SqlState {
        self.code.as_deref().map_or(SqlState::Other, SqlState::from_code)
    }

    /// Constraint name from the diagnostic, or parsed out of the primary message.
    fn constraint_name(&self) -> Option<String> {
        static QUOTED: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r#"constraint "(?P<name>[^"]+)""#).expect("constraint pattern"));
        self.constraint.clone().or_else(|| {
            QUOTED
                .captures(&self.message)
                .and_then(|c| c.name("name"))
                .map(|m| m.as_str().to_string())
        })
    }

    /// Column(s) and value from a `Key (col)=(value) ...` detail line.
    fn key_detail(&self) -> Option<(String, String)> {
        static KEY: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^Key \((?P<cols>[^)]+)\)=\((?P<vals>.*)\)").expect("key detail pattern")
        });
        let caps = KEY.captures(self.detail.as_deref()?)?;
        Some((caps["cols"].to_string(), caps["vals"].to_string()))
    }

    /// Referenced table from a `... is not present in table "t".` detail line.
    fn missing_in_table(&self) -> Option<String> {
        static NOT_PRESENT: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r#"is not present in table "(?P<table>[^"]+)""#).expect("fk detail pattern")
        });
        let caps = NOT_PRESENT.captures(self.detail.as_deref()?)?;
        Some(caps["table"].to_string())
    }

    fn still_referenced(&self) -> bool {
        self.detail.as_deref().is_some_and(|d| d.contains("is still referenced"))
    }
}

struct Matcher {
    name: &'static str,
    handle: fn(&sqlx::Error) -> Option<ErrorStruct>,
}

/// Tried in order; the first matcher returning `Some` wins.
const PIPELINE: &[Matcher] = &[
    Matcher { name: "row_not_found", handle: row_not_found },
    Matcher { name: "connection", handle: connection_failure },
    Matcher { name: "interface", handle: interface_failure },
    Matcher { name: "database", handle: database_failure },
];

fn row_not_found(err: &sqlx::Error) -> Option<ErrorStruct> {
    matches!(err, sqlx::Error::RowNotFound).then(|| ErrorCode::ResourceNotFound.error())
}

fn connection_failure(err: &sqlx::Error) -> Option<ErrorStruct> {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
    .then(|| ErrorCode::DbConnectionError.error())
}

fn interface_failure(err: &sqlx::Error) -> Option<ErrorStruct> {
    matches!(
        err,
        sqlx::Error::Protocol(_)
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. }
    )
    .then(|| ErrorCode::DbInterfaceError.error())
}

fn database_failure(err: &sqlx::Error) -> Option<ErrorStruct> {
    match err {
        sqlx::Error::Database(db) => Some(translate_diagnostic(&Diagnostic::from_database_error(db.as_ref()))),
        _ => None,
    }
}

/// Translate a driver error. Unrecognized errors become `db_unknown_error`.
pub fn translate_sqlx(err: &sqlx::Error) -> ErrorStruct {
    for matcher in PIPELINE {
        if let Some(out) = (matcher.handle)(err) {
            tracing::trace!(matcher = matcher.name, kind = %out.kind, "storage error matched");
            return out;
        }
    }
    ErrorCode::DbUnknownError.error()
}

/// Classify a database-reported failure.
pub fn translate_diagnostic(diag: &Diagnostic) -> ErrorStruct {
    match diag.sql_state() {
        SqlState::Connection => ErrorCode::DbConnectionError.error(),
        SqlState::Critical => ErrorCode::DbCriticalError.error(),
        SqlState::Unique => {
            let err = ErrorCode::DbUniqueConstraintError.error();
            match diag.key_detail() {
                Some((cols, value)) => err.with_loc(&[cols.as_str()]).with_input(value),
                None => err,
            }
        }
        SqlState::ForeignKey if diag.still_referenced() => ErrorCode::DbRestrictConstraintError.error(),
        SqlState::ForeignKey => foreign_key(diag),
        SqlState::NotNull => {
            let err = ErrorCode::DbNotNullConstraintError.error();
            match &diag.column {
                Some(col) => err.with_loc(&[col.as_str()]),
                None => err,
            }
        }
        SqlState::Check => ErrorCode::DbCheckConstraintError.error(),
        SqlState::Exclusion => ErrorCode::DbExclusionConstraintError.error(),
        SqlState::Restrict => ErrorCode::DbRestrictConstraintError.error(),
        SqlState::IntegrityConstraint => by_constraint_name(diag),
        SqlState::DataException => ErrorCode::DbDataError.error(),
        SqlState::Other => ErrorCode::DbUnknownError.error(),
    }
}

fn foreign_key(diag: &Diagnostic) -> ErrorStruct {
    let referred = diag
        .constraint_name()
        .and_then(|name| NamingConvention::parse(&name))
        .filter(|c| c.convention == NamingConvention::ForeignKey)
        .and_then(|c| c.referred_table_name)
        .or_else(|| diag.missing_in_table())
        .or_else(|| diag.table.clone())
        .unwrap_or_default();
    let err = ErrorCode::DbForeignKeyConstraintError
        .error()
        .format_msg(&[("referred_table_name", &referred)]);
    match diag.key_detail() {
        Some((cols, _)) => err.with_loc(&[cols.as_str()]),
        None => err,
    }
}

fn by_constraint_name(diag: &Diagnostic) -> ErrorStruct {
    let Some(parsed) = diag.constraint_name().and_then(|name| NamingConvention::parse(&name)) else {
        return ErrorCode::DbUnknownError.error();
    };
    match parsed.convention {
        NamingConvention::Index => ErrorCode::DbIntegrityConstraintError.error(),
        NamingConvention::Unique => ErrorCode::DbUniqueConstraintError.error(),
        NamingConvention::Check => ErrorCode::DbCheckConstraintError.error(),
        NamingConvention::PrimaryKey => ErrorCode::DbNotNullConstraintError.error(),
        NamingConvention::ForeignKey => ErrorCode::DbForeignKeyConstraintError
            .error()
            .format_msg(&[("referred_table_name", parsed.referred_table_name.as_deref().unwrap_or(""))]),
    }
}

/// Walk an error's source chain and translate the first driver error found.
/// Chains without one become `unknown_server_error`.
pub fn translate_chain(err: &(dyn std::error::Error + 'static)) -> ErrorStruct {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(sqlx_err) = e.downcast_ref::<sqlx::Error>() {
            return translate_sqlx(sqlx_err);
        }
        if let Some(pg) = e.downcast_ref::<PgDatabaseError>() {
            return translate_diagnostic(&Diagnostic::from_database_error(pg));
        }
        current = e.source();
    }
    ErrorCode::UnknownServerError.error()
}
