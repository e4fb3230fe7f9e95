use std::error;
use std::fmt;

/// Convenient result type for relay operations using [`RowsyncError`] as the error type.
///
/// This type alias reduces boilerplate when working with fallible relay operations.
/// Most functions in this crate return this type.
pub type RowsyncResult<T> = Result<T, RowsyncError>;

/// Main error type for relay operations.
///
/// [`RowsyncError`] can represent single errors, errors with additional detail, or
/// multiple aggregated errors (e.g. both workers failing during shutdown). The design
/// allows for rich error information while maintaining ergonomic usage patterns.
#[derive(Debug, Clone)]
pub struct RowsyncError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
///
/// This enum supports different error patterns while maintaining a unified interface.
/// Users should not interact with this type directly but use [`RowsyncError`] methods
/// instead.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Error with kind and static description
    WithDescription(ErrorKind, &'static str),
    /// Error with kind, static description, and dynamic detail
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
    /// Multiple aggregated errors
    Many(Vec<RowsyncError>),
}

/// Specific categories of errors that can occur while relaying changes.
///
/// Error kinds are organized by functional area and failure mode so callers can decide
/// whether a failure is fatal to the process, fatal to one worker, or droppable per event.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Transport errors, fatal to the consumer worker.
    SourceConnectionFailed,
    SourceStreamFailed,
    SourceStreamClosed,

    // Metadata and schema errors, recoverable per event.
    MetadataUnavailable,
    SchemaMismatch,
    UnsupportedValue,

    // Checkpoint errors, fatal to the checkpoint worker only.
    CheckpointIo,

    // Sink errors, recoverable per handler per record.
    HandlerFailed,

    // Configuration and validation errors.
    ConfigError,
    ValidationError,

    // IO & serialization errors.
    IoError,
    SerializationError,
    DeserializationError,

    // State & workflow errors.
    InvalidState,
    ConsumerWorkerPanic,
    CheckpointWorkerPanic,

    // Unknown / uncategorized.
    Unknown,
}

impl RowsyncError {
    /// Creates a [`RowsyncError`] containing multiple aggregated errors.
    ///
    /// This is useful when multiple operations fail and all failures should be
    /// reported rather than just the first one.
    pub fn many(errors: Vec<RowsyncError>) -> RowsyncError {
        RowsyncError {
            repr: ErrorRepr::Many(errors),
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For multiple errors, returns the kind of the first error or [`ErrorKind::Unknown`]
    /// if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => kind,
            ErrorRepr::Many(ref errors) => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    ///
    /// For single errors, returns a vector with one element. For multiple errors,
    /// returns a flattened vector of all error kinds.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => vec![kind],
            ErrorRepr::Many(ref errors) => errors
                .iter()
                .flat_map(|err| err.kinds())
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For multiple errors, returns the detail of the first error that has one.
    /// Returns [`None`] if no detailed information is available.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::WithDescriptionAndDetail(_, _, ref detail) => Some(detail.as_str()),
            ErrorRepr::Many(ref errors) => errors.iter().find_map(|e| e.detail()),
            _ => None,
        }
    }
}

impl PartialEq for RowsyncError {
    fn eq(&self, other: &RowsyncError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::WithDescription(kind_a, _), ErrorRepr::WithDescription(kind_b, _)) => {
                kind_a == kind_b
            }
            (
                ErrorRepr::WithDescriptionAndDetail(kind_a, _, _),
                ErrorRepr::WithDescriptionAndDetail(kind_b, _, _),
            ) => kind_a == kind_b,
            (ErrorRepr::Many(errors_a), ErrorRepr::Many(errors_b)) => {
                errors_a.len() == errors_b.len()
                    && errors_a.iter().zip(errors_b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for RowsyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;

                Ok(())
            }
            ErrorRepr::WithDescriptionAndDetail(kind, desc, ref detail) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;
                f.write_str(" -> ")?;
                detail.fmt(f)?;

                Ok(())
            }
            ErrorRepr::Many(ref errors) => {
                if errors.is_empty() {
                    write!(f, "Multiple errors occurred (empty)")?;
                } else if errors.len() == 1 {
                    errors[0].fmt(f)?;
                } else {
                    write!(f, "Multiple errors occurred ({} total):", errors.len())?;
                    for (i, error) in errors.iter().enumerate() {
                        write!(f, "\n  {}: {}", i + 1, error)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl error::Error for RowsyncError {}

/// Creates a [`RowsyncError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for RowsyncError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> RowsyncError {
        RowsyncError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

/// Creates a [`RowsyncError`] from an error kind, static description, and dynamic detail.
impl From<(ErrorKind, &'static str, String)> for RowsyncError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> RowsyncError {
        RowsyncError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

/// Creates a [`RowsyncError`] from a vector of errors for aggregation.
impl<E> From<Vec<E>> for RowsyncError
where
    E: Into<RowsyncError>,
{
    fn from(errors: Vec<E>) -> RowsyncError {
        RowsyncError {
            repr: ErrorRepr::Many(errors.into_iter().map(Into::into).collect()),
        }
    }
}

/// Converts [`std::io::Error`] to [`RowsyncError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for RowsyncError {
    fn from(err: std::io::Error) -> RowsyncError {
        RowsyncError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::IoError,
                "I/O error occurred",
                err.to_string(),
            ),
        }
    }
}

/// Converts [`serde_json::Error`] to [`RowsyncError`] with appropriate error kind.
///
/// Maps to [`ErrorKind::SerializationError`] or [`ErrorKind::DeserializationError`]
/// based on error classification.
impl From<serde_json::Error> for RowsyncError {
    fn from(err: serde_json::Error) -> RowsyncError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax | serde_json::error::Category::Data => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
            serde_json::error::Category::Eof => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
        };

        RowsyncError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, description, err.to_string()),
        }
    }
}

/// Converts [`mysql_async::Error`] to [`RowsyncError`] with appropriate error kind.
///
/// Server-reported errors map to [`ErrorKind::SourceStreamFailed`] since they surface
/// mid-stream, while driver, URL, and I/O errors map to [`ErrorKind::SourceConnectionFailed`].
#[cfg(feature = "mysql")]
impl From<mysql_async::Error> for RowsyncError {
    fn from(err: mysql_async::Error) -> RowsyncError {
        let (kind, description) = match &err {
            mysql_async::Error::Server(_) => {
                (ErrorKind::SourceStreamFailed, "MySQL server error")
            }
            mysql_async::Error::Io(_) => (
                ErrorKind::SourceConnectionFailed,
                "MySQL connection I/O error",
            ),
            mysql_async::Error::Driver(_) => {
                (ErrorKind::SourceConnectionFailed, "MySQL driver error")
            }
            mysql_async::Error::Url(_) => (
                ErrorKind::SourceConnectionFailed,
                "MySQL connection URL error",
            ),
            _ => (ErrorKind::SourceStreamFailed, "MySQL error"),
        };

        RowsyncError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, description, err.to_string()),
        }
    }
}
