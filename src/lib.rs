//! Credential issuance service.
//!
//! Authenticates users by username and password against a stored-procedure
//! backed user store, and mints and validates signed bearer tokens.

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;

#[cfg(test)]
mod test_support;
