//! Database access: connection pool lifecycle and stored procedure calls.

pub mod error;
pub mod pool;
pub mod procedures;

pub use error::{DaoError, DaoResult};
pub use pool::{DbPool, MySqlConnector, PoolConnector, PoolManager};
pub use procedures::{MySqlProcedures, ProcRow, ProcValue, ProcedureExecutor};
