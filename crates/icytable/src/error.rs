use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every failure surfaced by the storage layer is one of these; callers
/// branch on `class`, never on message text.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a backend resolution error (no usable backend for this call).
    pub(crate) fn backend_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unavailable, ErrorOrigin::Backend, message)
    }

    /// Construct a codec-origin encoding error.
    pub(crate) fn codec_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Codec, message)
    }

    /// Construct a codec-origin corruption error.
    pub(crate) fn codec_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Codec, message)
    }

    /// Construct a codec-origin validation error (ill-formed range bounds).
    pub(crate) fn codec_validation(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Validation, ErrorOrigin::Codec, message)
    }

    /// Construct an index-origin corruption error.
    pub(crate) fn index_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Index, message)
    }

    /// Construct an index uniqueness violation conflict error.
    pub(crate) fn index_violation(table: &str, index_fields: &[&str]) -> Self {
        Self::new(
            ErrorClass::Conflict,
            ErrorOrigin::Index,
            format!(
                "index constraint violation: {table} ({})",
                index_fields.join(", ")
            ),
        )
    }

    /// Construct a store-origin invariant violation.
    pub(crate) fn store_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Store, message)
    }

    /// Construct a store-origin encoding error (entry exceeds store limits).
    pub(crate) fn store_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Store, message)
    }

    /// Construct a store-origin corruption error.
    pub(crate) fn store_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Store, message)
    }

    /// Construct a list-option validation error.
    pub(crate) fn list_validation(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Validation, ErrorOrigin::List, message)
    }

    /// Construct a table-origin conflict (insert over an existing record).
    pub(crate) fn table_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Conflict, ErrorOrigin::Table, message)
    }

    /// Construct a table-origin not-found error (update of a missing record).
    pub fn table_not_found(key: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Table,
            format!("record not found: {}", key.into()),
        )
    }

    /// Construct a hook-origin abort. Hook implementations use this to veto
    /// a mutation before any store is touched.
    pub fn hook_aborted(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Aborted, ErrorOrigin::Hook, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_resolution(&self) -> bool {
        matches!(self.class, ErrorClass::Unavailable)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Aborted,
    Conflict,
    Corruption,
    InvariantViolation,
    NotFound,
    Unavailable,
    Unsupported,
    Validation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Aborted => "aborted",
            Self::Conflict => "conflict",
            Self::Corruption => "corruption",
            Self::InvariantViolation => "invariant_violation",
            Self::NotFound => "not_found",
            Self::Unavailable => "unavailable",
            Self::Unsupported => "unsupported",
            Self::Validation => "validation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Backend,
    Codec,
    Config,
    Hook,
    Index,
    List,
    Model,
    Serialize,
    Store,
    Table,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Backend => "backend",
            Self::Codec => "codec",
            Self::Config => "config",
            Self::Hook => "hook",
            Self::Index => "index",
            Self::List => "list",
            Self::Model => "model",
            Self::Serialize => "serialize",
            Self::Store => "store",
            Self::Table => "table",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
