// Test doubles for the stored procedure layer

use crate::auth::repository::{PROC_CREATE_USER, PROC_GET_USER_BY_GUID, PROC_GET_USER_BY_USERNAME};
use crate::db::{ProcRow, ProcValue, ProcedureExecutor};
use async_trait::async_trait;
use sqlx::error::{DatabaseError, ErrorKind};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

fn connection_refused() -> sqlx::Error {
    sqlx::Error::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"))
}

/// Unique constraint violation as a driver would report it
#[derive(Debug, thiserror::Error)]
#[error("Duplicate entry for key 'username'")]
struct DuplicateEntry;

impl DatabaseError for DuplicateEntry {
    fn message(&self) -> &str {
        "Duplicate entry for key 'username'"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("23000"))
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

fn duplicate_entry() -> sqlx::Error {
    sqlx::Error::Database(Box::new(DuplicateEntry))
}

/// Returns the same rows (or the same error) for every call and records what was called
pub struct ScriptedProcedures {
    rows: Vec<ProcRow>,
    failure: Option<fn() -> sqlx::Error>,
    calls: Mutex<Vec<(String, Vec<ProcValue>)>>,
}

impl ScriptedProcedures {
    pub fn returning(rows: Vec<ProcRow>) -> Self {
        Self {
            rows,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as if the store were unreachable
    pub fn failing() -> Self {
        Self {
            rows: Vec::new(),
            failure: Some(connection_refused),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a unique key violation
    pub fn rejecting_duplicates() -> Self {
        Self {
            rows: Vec::new(),
            failure: Some(duplicate_entry),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<ProcValue>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcedureExecutor for ScriptedProcedures {
    async fn call_procedure(&self, name: &str, args: &[ProcValue]) -> Result<Vec<ProcRow>, sqlx::Error> {
        self.calls.lock().unwrap().push((name.to_string(), args.to_vec()));
        match self.failure {
            Some(failure) => Err(failure()),
            None => Ok(self.rows.clone()),
        }
    }
}

#[derive(Clone)]
struct StoredUser {
    id: i64,
    guid: String,
    username: String,
    email: Option<String>,
    hashed_password: String,
    disabled: bool,
    admin: bool,
}

impl StoredUser {
    fn to_row(&self) -> ProcRow {
        vec![
            ProcValue::Int(self.id),
            ProcValue::from(self.guid.as_str()),
            ProcValue::from(self.username.as_str()),
            ProcValue::from(self.email.as_deref()),
            ProcValue::from(self.hashed_password.as_str()),
            ProcValue::Null,
            ProcValue::Int(self.disabled as i64),
            ProcValue::Int(self.admin as i64),
        ]
    }
}

/// Behaves like the real user procedures over an in-memory table
#[derive(Default)]
pub struct InMemoryProcedures {
    users: Mutex<Vec<StoredUser>>,
    offline: AtomicBool,
}

impl InMemoryProcedures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly and return its guid
    pub fn seed(&self, username: &str, hashed_password: &str, disabled: bool, admin: bool) -> String {
        let mut users = self.users.lock().unwrap();
        let guid = uuid::Uuid::new_v4().to_string();
        let id = users.len() as i64 + 1;
        users.push(StoredUser {
            id,
            guid: guid.clone(),
            username: username.to_string(),
            email: Some(format!("{}@example.com", username)),
            hashed_password: hashed_password.to_string(),
            disabled,
            admin,
        });
        guid
    }

    pub fn set_disabled(&self, guid: &str, disabled: bool) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.guid == guid) {
            user.disabled = disabled;
        }
    }

    pub fn remove(&self, guid: &str) {
        self.users.lock().unwrap().retain(|u| u.guid != guid);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProcedureExecutor for InMemoryProcedures {
    async fn call_procedure(&self, name: &str, args: &[ProcValue]) -> Result<Vec<ProcRow>, sqlx::Error> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(connection_refused());
        }

        let mut users = self.users.lock().unwrap();
        let key = args.first().and_then(|a| a.as_text()).unwrap_or_default();

        match name {
            PROC_GET_USER_BY_USERNAME => Ok(users
                .iter()
                .filter(|u| u.username == key)
                .map(StoredUser::to_row)
                .collect()),
            PROC_GET_USER_BY_GUID => Ok(users
                .iter()
                .filter(|u| u.guid == key)
                .map(StoredUser::to_row)
                .collect()),
            PROC_CREATE_USER => {
                // Mirrors a procedure that selects nothing when the username is taken
                if users.iter().any(|u| u.username == key) {
                    return Ok(Vec::new());
                }
                let guid = uuid::Uuid::new_v4().to_string();
                let id = users.len() as i64 + 1;
                users.push(StoredUser {
                    id,
                    guid: guid.clone(),
                    username: key.to_string(),
                    email: args.get(1).and_then(|a| a.as_text()).map(str::to_string),
                    hashed_password: args
                        .get(2)
                        .and_then(|a| a.as_text())
                        .unwrap_or_default()
                        .to_string(),
                    disabled: false,
                    admin: false,
                });
                Ok(vec![vec![ProcValue::from(guid)]])
            }
            other => Err(sqlx::Error::Protocol(format!("unknown procedure {}", other))),
        }
    }
}
