use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Occurs when a format string contains a directive character outside the supported set.
    UnsupportedFormat(char),
    /// Format string hit a parsing limit, such as a repeat count that doesn't fit in memory.
    ParseLimit(String),
    /// Occurs when a value's type doesn't match the field it is packed into, or when a decoded
    /// value is extracted as the wrong type.
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// The number of values supplied doesn't match the number of fields in the format.
    FieldCount { expected: usize, actual: usize },
    /// A field couldn't be decoded from otherwise well-formed input, e.g. a null-terminated
    /// string with no terminator.
    MalformedField(&'static str),
    /// Input bytes that don't follow the packed integer encoding.
    MalformedInput(String),
    /// Input ended before an encoded field was complete.
    TruncatedInput {
        step: &'static str,
        actual: usize,
        expected: usize,
    },
    /// A key or value format supplied by a table schema failed to parse.
    BadSchema {
        part: &'static str,
        cause: Box<Error>,
    },
    /// A cursor operation needed a key or value that was never set.
    MissingField(&'static str),
    /// The cursor isn't positioned on a record.
    NoCurrentRecord,
    /// Failure reported by the storage engine behind a raw cursor.
    Engine(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UnsupportedFormat(c) => {
                write!(f, "'{}' is not a supported format directive", c.escape_debug())
            }
            Error::ParseLimit(ref err) => write!(f, "Hit parsing limit: {}", err),
            Error::TypeMismatch { expected, actual } => {
                write!(f, "Expected {}, got {}", expected, actual)
            }
            Error::FieldCount { expected, actual } => write!(
                f,
                "Format has {} fields, but {} values were supplied",
                expected, actual
            ),
            Error::MalformedField(ref err) => write!(f, "Malformed field: {}", err),
            Error::MalformedInput(ref err) => write!(f, "Malformed input: {}", err),
            Error::TruncatedInput {
                step,
                actual,
                expected,
            } => write!(
                f,
                "Expected {} bytes, but only {} remain on step [{}]",
                expected, actual, step
            ),
            Error::BadSchema { part, ref cause } => {
                write!(f, "Parse {} format: {}", part, cause)
            }
            Error::MissingField(part) => write!(f, "Cursor has no {} set", part),
            Error::NoCurrentRecord => f.write_str("Cursor is not positioned on a record"),
            Error::Engine(ref err) => write!(f, "Storage engine error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::BadSchema { ref cause, .. } => Some(cause.as_ref()),
            Error::Engine(ref err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl Error {
    /// Wrap a storage engine failure.
    pub fn engine<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Engine(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn unsupported_format_names_char() {
        let msg = Error::UnsupportedFormat('x').to_string();
        assert_eq!(msg, "'x' is not a supported format directive");
    }

    #[test]
    fn schema_error_has_source() {
        let err = Error::BadSchema {
            part: "key",
            cause: Box::new(Error::UnsupportedFormat('z')),
        };
        assert_eq!(err.to_string(), "Parse key format: 'z' is not a supported format directive");
        assert!(matches!(
            err.source().and_then(|e| e.downcast_ref::<Error>()),
            Some(Error::UnsupportedFormat('z'))
        ));
    }

    #[test]
    fn engine_error_wraps_strings() {
        let err = Error::engine("disk on fire");
        assert_eq!(err.to_string(), "Storage engine error: disk on fire");
        assert!(err.source().is_some());
    }
}
