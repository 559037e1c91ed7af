//! Error classification shared by every service.

use std::fmt::{self, Display, Formatter};

use sqlx::error::{DatabaseError, ErrorKind};

/// SQLSTATE codes worth retrying: serialization failure, deadlock and lock timeout.
const TRANSIENT_SQLSTATES: [&str; 3] = ["40001", "40P01", "55P03"];

/// Coarse category of a failure, used to choose retries and response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed input.
    Validation,

    /// A referenced entity does not exist.
    NotFound,

    /// Well-formed input that business rules refuse.
    Policy,

    /// State changed underneath the caller; refresh and retry.
    Conflict,

    /// Temporary infrastructure failure; the same request may succeed later.
    Transient,

    /// A broken invariant or unexpected storage failure.
    Fatal,
}

impl ErrorClass {
    /// Whether an automatic retry may succeed.
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Transient)
    }
}

impl Display for ErrorClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Policy => "policy",
            Self::Conflict => "conflict",
            Self::Transient => "transient",
            Self::Fatal => "fatal",
        })
    }
}

/// Errors that can report their [`ErrorClass`].
pub trait Classify {
    /// The class of this error.
    fn class(&self) -> ErrorClass;
}

/// Whether a storage error is a temporary condition.
pub fn is_transient(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db) => db
            .code()
            .is_some_and(|code| TRANSIENT_SQLSTATES.contains(&&*code)),
        _ => false,
    }
}

/// Name of the unique constraint violated by `error`, if that is what it is.
pub fn unique_violation(error: &sqlx::Error) -> Option<&str> {
    let db = error.as_database_error()?;

    if db.kind() == ErrorKind::UniqueViolation {
        db.constraint()
    } else {
        None
    }
}

/// Classifies a storage error that a service did not map to something more specific.
pub fn classify_sqlx(error: &sqlx::Error) -> ErrorClass {
    if matches!(error, sqlx::Error::RowNotFound) {
        return ErrorClass::NotFound;
    }

    if is_transient(error) {
        return ErrorClass::Transient;
    }

    match error.as_database_error().map(DatabaseError::kind) {
        Some(ErrorKind::UniqueViolation) => ErrorClass::Conflict,
        Some(
            ErrorKind::ForeignKeyViolation | ErrorKind::NotNullViolation | ErrorKind::CheckViolation,
        ) => ErrorClass::Validation,
        Some(ErrorKind::Other | _) | None => ErrorClass::Fatal,
    }
}
