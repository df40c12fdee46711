// Stored procedure calls with positional arguments and positional rows

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::Row;

/// A single positional value passed to or returned from a procedure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcValue {
    Null,
    Int(i64),
    Text(String),
}

impl ProcValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ProcValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ProcValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ProcValue::Null)
    }
}

impl From<&str> for ProcValue {
    fn from(value: &str) -> Self {
        ProcValue::Text(value.to_string())
    }
}

impl From<String> for ProcValue {
    fn from(value: String) -> Self {
        ProcValue::Text(value)
    }
}

impl From<i64> for ProcValue {
    fn from(value: i64) -> Self {
        ProcValue::Int(value)
    }
}

impl<T: Into<ProcValue>> From<Option<T>> for ProcValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ProcValue::Null)
    }
}

/// One result row, in the procedure's declared column order
pub type ProcRow = Vec<ProcValue>;

/// Executes named stored procedures against the store
///
/// Implementations borrow a connection for the duration of one call only.
#[async_trait]
pub trait ProcedureExecutor: Send + Sync {
    async fn call_procedure(&self, name: &str, args: &[ProcValue]) -> Result<Vec<ProcRow>, sqlx::Error>;
}

/// Procedure executor backed by the MySQL connection pool
#[derive(Clone)]
pub struct MySqlProcedures {
    pool: MySqlPool,
}

impl MySqlProcedures {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcedureExecutor for MySqlProcedures {
    async fn call_procedure(&self, name: &str, args: &[ProcValue]) -> Result<Vec<ProcRow>, sqlx::Error> {
        let statement = call_statement(name, args.len());

        let mut query = sqlx::query(&statement);
        for arg in args {
            query = match arg {
                ProcValue::Null => query.bind(Option::<String>::None),
                ProcValue::Int(value) => query.bind(*value),
                ProcValue::Text(value) => query.bind(value.as_str()),
            };
        }

        // The pooled connection is released when the fetch completes or fails
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(decode_row).collect()
    }
}

/// Build `CALL name(?, ?, ...)` for a procedure taking `arity` arguments
fn call_statement(name: &str, arity: usize) -> String {
    let placeholders = vec!["?"; arity].join(", ");
    format!("CALL {}({})", name, placeholders)
}

fn decode_row(row: &MySqlRow) -> Result<ProcRow, sqlx::Error> {
    (0..row.len()).map(|index| decode_column(row, index)).collect()
}

fn decode_column(row: &MySqlRow, index: usize) -> Result<ProcValue, sqlx::Error> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return Ok(value.into());
    }
    if let Ok(value) = row.try_get::<Option<u64>, _>(index) {
        return match value {
            Some(v) => i64::try_from(v)
                .map(ProcValue::Int)
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: index.to_string(),
                    source: Box::new(e),
                }),
            None => Ok(ProcValue::Null),
        };
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return Ok(value.into());
    }

    let bytes: Option<Vec<u8>> = row.try_get(index)?;
    Ok(bytes
        .map(|b| ProcValue::Text(String::from_utf8_lossy(&b).into_owned()))
        .unwrap_or(ProcValue::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_statement_placeholders() {
        assert_eq!(call_statement("getUserByGUID", 1), "CALL getUserByGUID(?)");
        assert_eq!(call_statement("createUser", 3), "CALL createUser(?, ?, ?)");
        assert_eq!(call_statement("ping", 0), "CALL ping()");
    }

    #[test]
    fn test_optional_values_map_to_null() {
        assert_eq!(ProcValue::from(None::<&str>), ProcValue::Null);
        assert_eq!(ProcValue::from(Some("b@x.com")), ProcValue::Text("b@x.com".to_string()));
        assert_eq!(ProcValue::from(7i64).as_int(), Some(7));
        assert_eq!(ProcValue::Null.as_text(), None);
    }
}
