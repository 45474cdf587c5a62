use thiserror::Error;

/// Why a connection to the store could not be established.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Access denied. Check your username or password.")]
    AccessDenied,

    #[error("Database does not exist.")]
    DatabaseMissing,

    #[error("Failed to connect to database: {0}")]
    Other(String),
}

/// A line of terminal input that could not be turned into the requested value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("'{0}' is not a whole number.")]
    NotANumber(String),

    #[error("{0} is negative; expected zero or more.")]
    Negative(i64),

    #[error("'{0}' is not a date in YYYY-MM-DD form.")]
    BadDate(String),

    #[error("A value is required.")]
    Required,

    #[error("'{0}' is not a column that can be sorted on.")]
    UnknownColumn(String),

    #[error("end of input")]
    EndOfInput,
}
