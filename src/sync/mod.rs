//! The caller-facing connection and cursor API.

mod connection;
mod cursor;

pub use connection::{Connection, IsolationLevel, TransactionMode};
pub use cursor::{ColumnDescription, Cursor};
