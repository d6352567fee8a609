use super::{ErrorLevel, ExceptionData};
use crate::error_code::{self, DbErrorKind};
use crate::error_message;
use std::error::Error;

/// Describes an error that is reported from the database.
///
/// Carries the error number, its category, the localized message built
/// from the message catalog, and the SQLSTATE where one is defined.
#[derive(Clone, Eq, PartialEq)]
pub struct ServerError {
    code: i32,
    kind: DbErrorKind,
    level: ErrorLevel,
    text: String,
    sqlstate: Option<&'static str>,
    arguments: Vec<String>,
    module: String,
    line: i32,
}

impl ServerError {
    /// Returns the error number.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Returns the category of the error.
    pub fn kind(&self) -> DbErrorKind {
        self.kind
    }

    /// Returns the severity the server attached to the error.
    pub fn level(&self) -> ErrorLevel {
        self.level
    }

    /// Returns the localized description of the error.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the SQLSTATE of the error, where one is defined.
    pub fn sqlstate(&self) -> Option<&'static str> {
        self.sqlstate
    }

    /// Returns the raw message arguments.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Returns the server module that raised the error.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns the source line the server reported.
    pub fn line(&self) -> i32 {
        self.line
    }

    pub(crate) fn from_exception(exception: ExceptionData, level: ErrorLevel) -> Self {
        let code = exception.error_code();
        Self {
            code,
            kind: error_code::kind_of(code),
            level,
            text: error_message::make_error_message(code, exception.arguments()),
            sqlstate: error_code::sqlstate_of(code),
            arguments: exception.arguments().to_vec(),
            module: exception.module().to_string(),
            line: exception.line(),
        }
    }

    // For conditions the client raises on its own behalf (lost connection,
    // invalid session, ...); they use the same catalog as server errors.
    pub(crate) fn local(code: i32, arguments: Vec<String>) -> Self {
        Self {
            code,
            kind: error_code::kind_of(code),
            level: ErrorLevel::System,
            text: error_message::make_error_message(code, &arguments),
            sqlstate: error_code::sqlstate_of(code),
            arguments,
            module: String::new(),
            line: 0,
        }
    }
}

impl Error for ServerError {}

impl std::fmt::Display for ServerError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            fmt,
            r#"{:?}[code: {}, sql state: {}] "{}""#,
            self.kind,
            self.code,
            self.sqlstate.unwrap_or("-"),
            self.text,
        )
    }
}

impl std::fmt::Debug for ServerError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self}")
    }
}
