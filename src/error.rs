use std::fmt;

/// Error type for data access operations.
#[derive(PartialEq, Eq)]
pub struct Error {
    repr: ErrorRepr,
}

/// Error kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// No row matched the given identifier.
    NotFound,
    /// The database rejected or failed the statement.
    Query,
}

impl ErrorKind {
    /// Returns the description of the error kind.
    pub fn as_str(&self) -> &str {
        match *self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Query => "query error",
        }
    }
}

#[derive(PartialEq, Eq)]
enum ErrorRepr {
    /// An error with a kind.
    Kind(ErrorKind),
    /// An error with a description.
    WithDescription(ErrorKind, String),
}

impl Error {
    pub fn new<S: Into<String>>(kind: ErrorKind, description: S) -> Error {
        Error {
            repr: ErrorRepr::WithDescription(kind, description.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::Kind(kind) => kind,
            ErrorRepr::WithDescription(kind, _) => kind,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            repr: ErrorRepr::Kind(kind),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Error {
        match err {
            sqlx::Error::RowNotFound => ErrorKind::NotFound.into(),
            other => Error::new(ErrorKind::Query, other.to_string()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.repr {
            ErrorRepr::Kind(ref kind) => {
                write!(f, "{}", kind.as_str())
            }
            ErrorRepr::WithDescription(ref kind, ref description) => match *kind {
                ErrorKind::Query => {
                    write!(f, "{}", description)
                }
                _ => {
                    write!(f, "{}: {}", kind.as_str(), description)
                }
            },
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
