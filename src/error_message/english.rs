use crate::error_code::*;

pub(super) static TABLE: &[(i32, &str)] = &[
    (
        CONNECTION_NOT_EXIST,
        "Connection exception - connection does not exist.",
    ),
    (
        CLIENT_NOT_EXIST,
        "Connection exception - client(ID=%1) does not exist.",
    ),
    (CONNECTION_RAN_OUT, "Connection ran out."),
    (CONNECTION_CLOSED, "Connection is already closed."),
    (SERVER_NOT_AVAILABLE, "Server is not available."),
    (DATABASE_NOT_AVAILABLE, "Database '%1' is not available."),
    (USER_NOT_FOUND, "User '%1' is not found."),
    (AUTHORIZATION_FAILED, "Authorization failed."),
    (SESSION_NOT_AVAILABLE, "Session is not available."),
    (SESSION_BUSY, "Session is processing another statement."),
    (WORKER_CANCELED, "The statement was canceled."),
    (
        DYNAMIC_PARAMETER_NOT_MATCH,
        "The number of parameter values(%1) does not match parameters(%2).",
    ),
    (SQL_SYNTAX_ERROR, "SQL syntax error '%1'."),
    (TABLE_NOT_FOUND, "Table '%1' does not exist in database '%2'."),
    (COLUMN_NOT_FOUND, "Column '%1' does not exist."),
    (PREPARE_FAILED, "Preparing the statement failed: %1."),
    (
        READ_ONLY_TRANSACTION,
        "Cannot update database in read only transaction.",
    ),
    (
        ALREADY_BEGIN_TRANSACTION,
        "A transaction is already in progress.",
    ),
    (NOT_BEGIN_TRANSACTION, "No transaction is in progress."),
    (NUMERIC_VALUE_OUT_OF_RANGE, "Numeric value '%1' is out of range."),
    (
        STRING_RIGHT_TRUNCATION,
        "String data would be right-truncated.",
    ),
    (NULLABILITY_VIOLATION, "Column '%1' does not allow null value."),
    (INVALID_CHARACTER, "Invalid character for '%1'."),
    (DUPLICATE_KEY, "Duplicate key value violates constraint '%1'."),
    (UNEXPECTED, "Unexpected error occurred."),
    (CLASS_NOT_FOUND, "Class(ID=%1) is not found."),
    (NOT_SUPPORTED, "Unsupported feature or function."),
    (MEMORY_EXHAUST, "Server ran short of memory."),
];
