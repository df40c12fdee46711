// Database access error types

use thiserror::Error;

/// Errors raised by the data access layer
///
/// Transport details are kept as the error source for server-side logging;
/// the `Display` text never includes them.
#[derive(Debug, Error)]
pub enum DaoError {
    /// The caller supplied no lookup key
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A keyed call did not return exactly one row
    #[error("result count was not exactly one (received {received})")]
    IncorrectRowCount { received: usize },

    /// The store rejected a write because the key already exists
    #[error("record already exists")]
    DuplicateKey,

    /// A returned row does not match the procedure's declared layout
    #[error("malformed row: {0}")]
    MalformedRow(String),

    /// Connection, protocol or server failure while talking to the store
    #[error("store unavailable")]
    StoreUnavailable(#[source] sqlx::Error),
}

impl DaoError {
    /// Whether this error means the requested record is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, DaoError::IncorrectRowCount { .. })
    }
}

pub type DaoResult<T> = Result<T, DaoError>;

const ER_ACCESS_DENIED_ERROR: u16 = 1045;
const ER_BAD_DB_ERROR: u16 = 1049;
const ER_DUP_ENTRY: u16 = 1062;

/// Human-readable cause of a database failure, for server-side logs
pub fn describe_failure(error: &sqlx::Error) -> String {
    match error {
        sqlx::Error::Io(e) => format!("database server unreachable: {}", e),
        sqlx::Error::Tls(e) => format!("TLS negotiation with database failed: {}", e),
        sqlx::Error::PoolTimedOut => "timed out waiting for a connection".to_string(),
        sqlx::Error::PoolClosed => "connection pool is closed".to_string(),
        sqlx::Error::Database(db_err) => match mysql_error_number(db_err.as_ref()) {
            Some(ER_ACCESS_DENIED_ERROR) => "database credentials rejected".to_string(),
            Some(ER_BAD_DB_ERROR) => "database does not exist".to_string(),
            _ => format!("database error: {}", db_err),
        },
        other => other.to_string(),
    }
}

/// Whether the store refused a write on a unique key
pub fn is_duplicate_key(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation()
                || mysql_error_number(db_err.as_ref()) == Some(ER_DUP_ENTRY)
        }
        _ => false,
    }
}

fn mysql_error_number(error: &dyn sqlx::error::DatabaseError) -> Option<u16> {
    error
        .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
        .map(|e| e.number())
}
