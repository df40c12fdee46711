// User data access over the store's stored procedures

use crate::auth::models::User;
use crate::db::error::{describe_failure, is_duplicate_key};
use crate::db::{DaoError, DaoResult, ProcRow, ProcValue, ProcedureExecutor};
use std::sync::Arc;

pub const PROC_GET_USER_BY_USERNAME: &str = "getUserByUsername";
pub const PROC_GET_USER_BY_GUID: &str = "getUserByGUID";
pub const PROC_CREATE_USER: &str = "createUser";

// Column layout of the user lookup procedures
const COL_GUID: usize = 1;
const COL_USERNAME: usize = 2;
const COL_EMAIL: usize = 3;
const COL_HASHED_PASSWORD: usize = 4;
const COL_DISABLED: usize = 6;
const COL_ADMIN: usize = 7;
const USER_ROW_WIDTH: usize = 8;

/// Key for a single-user lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Username(String),
    Guid(String),
}

impl UserKey {
    /// Pick the lookup key; the username wins when both are given
    pub fn from_parts(username: Option<&str>, guid: Option<&str>) -> DaoResult<Self> {
        match (username, guid) {
            (Some(username), _) => Ok(UserKey::Username(username.to_string())),
            (None, Some(guid)) => Ok(UserKey::Guid(guid.to_string())),
            (None, None) => {
                tracing::error!("get_user called without a username or a guid");
                Err(DaoError::InvalidArgument(
                    "one of username or guid is required".to_string(),
                ))
            }
        }
    }

    fn procedure(&self) -> (&'static str, &str) {
        match self {
            UserKey::Username(username) => (PROC_GET_USER_BY_USERNAME, username),
            UserKey::Guid(guid) => (PROC_GET_USER_BY_GUID, guid),
        }
    }
}

/// Outcome of a user lookup
#[derive(Debug)]
pub enum UserLookup {
    Found(User),
    NotFound,
    /// The store could not answer, or answered in an unexpected shape
    Unavailable(DaoError),
}

impl From<DaoResult<User>> for UserLookup {
    fn from(result: DaoResult<User>) -> Self {
        match result {
            Ok(user) => UserLookup::Found(user),
            Err(e) if e.is_not_found() => UserLookup::NotFound,
            Err(e) => UserLookup::Unavailable(e),
        }
    }
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    procedures: Arc<dyn ProcedureExecutor>,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(procedures: Arc<dyn ProcedureExecutor>) -> Self {
        Self { procedures }
    }

    /// Fetch exactly one user by username, else by guid
    ///
    /// # Errors
    /// * `DaoError::InvalidArgument` - neither key was supplied
    /// * `DaoError::IncorrectRowCount` - zero or several rows came back
    /// * `DaoError::MalformedRow` - the row does not have the expected layout
    /// * `DaoError::StoreUnavailable` - transport or server failure
    pub async fn get_user(&self, username: Option<&str>, guid: Option<&str>) -> DaoResult<User> {
        let key = UserKey::from_parts(username, guid)?;
        self.fetch_user(&key).await
    }

    pub async fn fetch_user(&self, key: &UserKey) -> DaoResult<User> {
        let (procedure, value) = key.procedure();
        let rows = self.call(procedure, &[ProcValue::from(value)]).await?;
        let row = single_row(rows)?;
        map_user_row(&row)
    }

    /// Lookup with the three possible outcomes made explicit
    pub async fn find_user(&self, key: &UserKey) -> UserLookup {
        self.fetch_user(key).await.into()
    }

    /// Persist a new user and return it with the store-assigned guid
    pub async fn create_user(&self, user: User) -> DaoResult<User> {
        let args = [
            ProcValue::from(user.username.as_str()),
            ProcValue::from(user.email.as_deref()),
            ProcValue::from(user.hashed_password.as_str()),
        ];

        let rows = self.call(PROC_CREATE_USER, &args).await?;
        let row = single_row(rows)?;
        let guid = text_column(&row, 0)?;

        tracing::info!(guid = %guid, "Created user");
        Ok(User {
            guid: Some(guid),
            ..user
        })
    }

    async fn call(&self, procedure: &str, args: &[ProcValue]) -> DaoResult<Vec<ProcRow>> {
        tracing::debug!(procedure, arg_count = args.len(), "Calling stored procedure");

        let rows = self
            .procedures
            .call_procedure(procedure, args)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    tracing::debug!(procedure, "Store rejected duplicate key");
                    return DaoError::DuplicateKey;
                }
                tracing::error!(procedure, "Stored procedure call failed: {}", describe_failure(&e));
                DaoError::StoreUnavailable(e)
            })?;

        tracing::debug!(procedure, rows = rows.len(), "Stored procedure returned");
        Ok(rows)
    }
}

fn single_row(mut rows: Vec<ProcRow>) -> DaoResult<ProcRow> {
    if rows.len() != 1 {
        return Err(DaoError::IncorrectRowCount {
            received: rows.len(),
        });
    }
    Ok(rows.remove(0))
}

/// Decode a user lookup row into a [`User`]
pub fn map_user_row(row: &[ProcValue]) -> DaoResult<User> {
    if row.len() != USER_ROW_WIDTH {
        return Err(DaoError::MalformedRow(format!(
            "expected {} columns, received {}",
            USER_ROW_WIDTH,
            row.len()
        )));
    }

    let email = match &row[COL_EMAIL] {
        ProcValue::Null => None,
        _ => Some(text_column(row, COL_EMAIL)?),
    };

    Ok(User {
        guid: Some(text_column(row, COL_GUID)?),
        username: text_column(row, COL_USERNAME)?,
        email,
        hashed_password: text_column(row, COL_HASHED_PASSWORD)?,
        // Anything but an explicit 0 keeps the account disabled
        disabled: row[COL_DISABLED].as_int() != Some(0),
        admin: row[COL_ADMIN].as_int() == Some(1),
    })
}

fn text_column(row: &[ProcValue], index: usize) -> DaoResult<String> {
    match row.get(index) {
        Some(ProcValue::Text(value)) => Ok(value.clone()),
        Some(other) => Err(DaoError::MalformedRow(format!(
            "column {} should be text, found {:?}",
            index, other
        ))),
        None => Err(DaoError::MalformedRow(format!("column {} is missing", index))),
    }
}
