//! The closed set of error kinds, their type tags, message templates, and status codes.

use axum::http::StatusCode;
use serde_json::{Map, Value};

use super::ErrorStruct;

/// Error class. Determines the tag prefix and the default status / logging policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Caller-recoverable problems. Not logged.
    Client,
    /// Unexpected application states.
    Server,
    /// Storage failures that are not the caller's fault.
    DbServer,
    /// Storage rejected a value the caller supplied.
    DbValue,
}

impl ErrorClass {
    pub fn prefix(self) -> &'static str {
        match self {
            ErrorClass::Client => "client_error",
            ErrorClass::Server => "server_error",
            ErrorClass::DbServer => "db_server_error",
            ErrorClass::DbValue => "db_value_error",
        }
    }

    fn default_status(self) -> StatusCode {
        match self {
            ErrorClass::Client | ErrorClass::DbValue => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorClass::Server | ErrorClass::DbServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn should_log(self) -> bool {
        !matches!(self, ErrorClass::Client)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ApiNotFound,
    ResourceNotFound,
    JsonDecodeError,
    RequestBodyEmpty,
    RequestBodyLack,
    RequestBodyInvalid,
    RequestBodyContainsInvalidChar,
    CyclicParent,

    UnknownServerError,
    NotAllowedLogicCalled,
    MultipleResourcesFound,

    DbConnectionError,
    DbInterfaceError,
    DbUnknownError,
    DbCriticalError,
    DbIntegrityConstraintError,

    DbDataError,
    DbUniqueConstraintError,
    DbForeignKeyConstraintError,
    DbNotNullConstraintError,
    DbRestrictConstraintError,
    DbCheckConstraintError,
    DbExclusionConstraintError,
}

const RETRY_LATER: &str = "An unknown problem occurred, please try again in 5 minutes.";
const CONTACT_ADMIN_CRITICAL: &str =
    "A critical problem occurred on the server, please contact the administrator.";

impl ErrorCode {
    pub fn class(self) -> ErrorClass {
        use ErrorCode::*;
        match self {
            ApiNotFound | ResourceNotFound | JsonDecodeError | RequestBodyEmpty | RequestBodyLack
            | RequestBodyInvalid | RequestBodyContainsInvalidChar | CyclicParent => ErrorClass::Client,
            UnknownServerError | NotAllowedLogicCalled | MultipleResourcesFound => ErrorClass::Server,
            DbConnectionError | DbInterfaceError | DbUnknownError | DbCriticalError
            | DbIntegrityConstraintError => ErrorClass::DbServer,
            DbDataError | DbUniqueConstraintError | DbForeignKeyConstraintError
            | DbNotNullConstraintError | DbRestrictConstraintError | DbCheckConstraintError
            | DbExclusionConstraintError => ErrorClass::DbValue,
        }
    }

    pub fn name(self) -> &'static str {
        use ErrorCode::*;
        match self {
            ApiNotFound => "api_not_found",
            ResourceNotFound => "resource_not_found",
            JsonDecodeError => "json_decode_error",
            RequestBodyEmpty => "request_body_empty",
            RequestBodyLack => "request_body_lack",
            RequestBodyInvalid => "request_body_invalid",
            RequestBodyContainsInvalidChar => "request_body_contains_invalid_char",
            CyclicParent => "cyclic_parent",
            UnknownServerError => "unknown_server_error",
            NotAllowedLogicCalled => "not_allowed_logic_called",
            MultipleResourcesFound => "multiple_resources_found",
            DbConnectionError => "db_connection_error",
            DbInterfaceError => "db_interface_error",
            DbUnknownError => "db_unknown_error",
            DbCriticalError => "db_critical_error",
            DbIntegrityConstraintError => "db_integrity_constraint_error",
            DbDataError => "db_data_error",
            DbUniqueConstraintError => "db_unique_constraint_error",
            DbForeignKeyConstraintError => "db_foreign_key_constraint_error",
            DbNotNullConstraintError => "db_not_null_constraint_error",
            DbRestrictConstraintError => "db_restrict_constraint_error",
            DbCheckConstraintError => "db_check_constraint_error",
            DbExclusionConstraintError => "db_exclusion_constraint_error",
        }
    }

    /// Machine-readable tag, e.g. `client_error.resource_not_found`.
    pub fn tag(self) -> String {
        format!("{}.{}", self.class().prefix(), self.name())
    }

    /// User-facing message. May contain `{placeholder}` segments, see [`ErrorStruct::format_msg`].
    pub fn template(self) -> &'static str {
        use ErrorCode::*;
        match self {
            ApiNotFound => "The requested path could not be found, please refresh and try again.",
            ResourceNotFound => "The requested resource could not be found.",
            JsonDecodeError => "The request body could not be understood.",
            RequestBodyEmpty => "The request body was not received, please refresh and try again.",
            RequestBodyLack => "Some required information is missing, please check your input.",
            RequestBodyInvalid => "Some of the information entered is invalid, please check your input.",
            RequestBodyContainsInvalidChar => "The input contains characters that are not allowed, please check your input.",
            CyclicParent => "The selected parent would create a cycle in the hierarchy, please choose a different parent.",
            UnknownServerError => RETRY_LATER,
            NotAllowedLogicCalled => "An unexpected problem occurred, please contact the administrator.",
            MultipleResourcesFound => "Several records were found where exactly one was expected, please contact the administrator.",
            DbConnectionError | DbInterfaceError | DbUnknownError => RETRY_LATER,
            DbCriticalError => CONTACT_ADMIN_CRITICAL,
            DbIntegrityConstraintError => "Stored data is incomplete or inconsistent, please contact the administrator.",
            DbDataError => "The value is not valid, please enter a different value.",
            DbUniqueConstraintError => "This value is already registered, please enter a different value.",
            DbForeignKeyConstraintError => "No matching record exists in {referred_table_name}, please enter a different value.",
            DbNotNullConstraintError => "This value is required, please enter a value.",
            DbRestrictConstraintError => "This record is in use elsewhere and cannot be modified or deleted.",
            DbCheckConstraintError => "The value does not satisfy the required conditions, please enter a different value.",
            DbExclusionConstraintError => "This value conflicts with an existing registration, please enter a different value.",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ApiNotFound | ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::JsonDecodeError | ErrorCode::RequestBodyEmpty => StatusCode::BAD_REQUEST,
            other => other.class().default_status(),
        }
    }

    pub fn should_log(self) -> bool {
        self.class().should_log()
    }

    /// Build the structured error for this code with its default template.
    pub fn error(self) -> ErrorStruct {
        ErrorStruct {
            kind: self.tag(),
            msg: self.template().to_string(),
            loc: None,
            input: None,
            ctx: None,
            status: self.status(),
            should_log: self.should_log(),
        }
    }

    /// Shorthand for a located error: `code.at(&["parent_id"])`.
    pub fn at(self, loc: &[&str]) -> ErrorStruct {
        self.error().with_loc(loc)
    }

    /// Shorthand for an error with a single context entry.
    pub fn with_ctx(self, key: &str, value: impl Into<Value>) -> ErrorStruct {
        let mut ctx = Map::new();
        ctx.insert(key.to_string(), value.into());
        self.error().with_ctx(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_class_prefixed() {
        assert_eq!(ErrorCode::ResourceNotFound.tag(), "client_error.resource_not_found");
        assert_eq!(ErrorCode::MultipleResourcesFound.tag(), "server_error.multiple_resources_found");
        assert_eq!(ErrorCode::DbCriticalError.tag(), "db_server_error.db_critical_error");
        assert_eq!(
            ErrorCode::DbUniqueConstraintError.tag(),
            "db_value_error.db_unique_constraint_error"
        );
    }

    #[test]
    fn status_and_logging_follow_class() {
        assert_eq!(ErrorCode::ResourceNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::JsonDecodeError.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::CyclicParent.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!ErrorCode::CyclicParent.should_log());

        assert_eq!(ErrorCode::MultipleResourcesFound.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(ErrorCode::MultipleResourcesFound.should_log());

        assert_eq!(ErrorCode::DbCheckConstraintError.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(ErrorCode::DbCheckConstraintError.should_log());
        assert_eq!(ErrorCode::DbConnectionError.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_and_multiple_found_are_distinct() {
        let a = ErrorCode::ResourceNotFound.error();
        let b = ErrorCode::MultipleResourcesFound.error();
        assert_ne!(a.kind, b.kind);
        assert_ne!(a.status, b.status);
    }
}
