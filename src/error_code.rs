//! Error numbers used in server exception payloads.
//!
//! The server identifies every error condition by a stable number; the
//! number selects both the concrete error category and the localized
//! message format (see [`error_message`](crate::error_message)).
//!
//! The catalog below covers every condition the client raises on its own
//! behalf plus the server conditions a driver commonly encounters. The
//! numbering groups codes by originating module.

/// Error category of a server-reported condition, following the usual
/// database-API taxonomy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum DbErrorKind {
    /// Problems with the processed data (range overflow, truncation, ...).
    Data,
    /// Problems related to the database's operation, not necessarily under
    /// the control of the programmer (connection loss, server shutdown, ...).
    Operational,
    /// The relational integrity of the database was violated.
    Integrity,
    /// The database encountered an internal error.
    Internal,
    /// Programming errors (SQL syntax, wrong parameter count, invalid state).
    Programming,
    /// A method or database feature that is not supported was used.
    NotSupported,
}

// connection module
pub const CONNECTION_NOT_EXIST: i32 = 1301;
pub const CLIENT_NOT_EXIST: i32 = 1302;
pub const CONNECTION_RAN_OUT: i32 = 1303;
pub const CONNECTION_CLOSED: i32 = 1304;
pub const SERVER_NOT_AVAILABLE: i32 = 1305;
pub const DATABASE_NOT_AVAILABLE: i32 = 1306;
pub const USER_NOT_FOUND: i32 = 1307;
pub const AUTHORIZATION_FAILED: i32 = 1308;

// session module
pub const SESSION_NOT_AVAILABLE: i32 = 1501;
pub const SESSION_BUSY: i32 = 1502;
pub const WORKER_CANCELED: i32 = 1503;

// statement module
pub const DYNAMIC_PARAMETER_NOT_MATCH: i32 = 1701;
pub const SQL_SYNTAX_ERROR: i32 = 1702;
pub const TABLE_NOT_FOUND: i32 = 1703;
pub const COLUMN_NOT_FOUND: i32 = 1704;
pub const PREPARE_FAILED: i32 = 1705;

// transaction module
pub const READ_ONLY_TRANSACTION: i32 = 1901;
pub const ALREADY_BEGIN_TRANSACTION: i32 = 1902;
pub const NOT_BEGIN_TRANSACTION: i32 = 1903;

// data module
pub const NUMERIC_VALUE_OUT_OF_RANGE: i32 = 2101;
pub const STRING_RIGHT_TRUNCATION: i32 = 2102;
pub const NULLABILITY_VIOLATION: i32 = 2103;
pub const INVALID_CHARACTER: i32 = 2104;
pub const DUPLICATE_KEY: i32 = 2105;

// system module
pub const UNEXPECTED: i32 = 2301;
pub const CLASS_NOT_FOUND: i32 = 2302;
pub const NOT_SUPPORTED: i32 = 2303;
pub const MEMORY_EXHAUST: i32 = 2304;

/// Maps an error number to its category.
///
/// Numbers outside the catalog are reported as [`DbErrorKind::Internal`];
/// an unknown number means the server is newer than this client, and the
/// safe assumption is a server-side condition.
pub fn kind_of(code: i32) -> DbErrorKind {
    match code {
        NUMERIC_VALUE_OUT_OF_RANGE | STRING_RIGHT_TRUNCATION | INVALID_CHARACTER => {
            DbErrorKind::Data
        }
        NULLABILITY_VIOLATION | DUPLICATE_KEY => DbErrorKind::Integrity,
        CONNECTION_NOT_EXIST | CLIENT_NOT_EXIST | CONNECTION_RAN_OUT | CONNECTION_CLOSED
        | SERVER_NOT_AVAILABLE | DATABASE_NOT_AVAILABLE | USER_NOT_FOUND
        | AUTHORIZATION_FAILED | SESSION_NOT_AVAILABLE | SESSION_BUSY | WORKER_CANCELED
        | READ_ONLY_TRANSACTION | MEMORY_EXHAUST => DbErrorKind::Operational,
        DYNAMIC_PARAMETER_NOT_MATCH | SQL_SYNTAX_ERROR | TABLE_NOT_FOUND | COLUMN_NOT_FOUND
        | PREPARE_FAILED | ALREADY_BEGIN_TRANSACTION | NOT_BEGIN_TRANSACTION => {
            DbErrorKind::Programming
        }
        NOT_SUPPORTED => DbErrorKind::NotSupported,
        _ => DbErrorKind::Internal,
    }
}

/// Maps an error number to its SQLSTATE, where one is defined.
pub fn sqlstate_of(code: i32) -> Option<&'static str> {
    match code {
        CONNECTION_NOT_EXIST | CLIENT_NOT_EXIST => Some("08003"),
        CONNECTION_RAN_OUT | CONNECTION_CLOSED => Some("08006"),
        AUTHORIZATION_FAILED => Some("28000"),
        SQL_SYNTAX_ERROR | TABLE_NOT_FOUND | COLUMN_NOT_FOUND => Some("42000"),
        DYNAMIC_PARAMETER_NOT_MATCH => Some("07001"),
        READ_ONLY_TRANSACTION => Some("25006"),
        ALREADY_BEGIN_TRANSACTION | NOT_BEGIN_TRANSACTION => Some("25000"),
        NUMERIC_VALUE_OUT_OF_RANGE => Some("22003"),
        STRING_RIGHT_TRUNCATION => Some("22001"),
        INVALID_CHARACTER => Some("22021"),
        NULLABILITY_VIOLATION => Some("23502"),
        DUPLICATE_KEY => Some("23505"),
        NOT_SUPPORTED => Some("0A000"),
        UNEXPECTED | CLASS_NOT_FOUND => Some("XX000"),
        _ => None,
    }
}
