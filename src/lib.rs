//! A pure-rust driver for DoqueDB.
//!
//! The driver speaks the server's native length/tag-framed binary
//! protocol over a plain TCP stream: a handshake negotiates the protocol
//! version, control connections manage session and worker lifecycles, and
//! every executed statement streams its reply (metadata, rows, status)
//! over a dedicated worker port that afterwards returns to a pool.
//!
//! The usual way in is [`connect`]:
//!
//! ```rust,no_run
//! use dqconnect::{connect, ConnectParams, DqResult, DqValue};
//!
//! fn main() -> DqResult<()> {
//!     let connection = connect(
//!         ConnectParams::builder()
//!             .hostname("localhost")
//!             .dbname("TestDB")
//!             .dbuser("meier")
//!             .password("schLau")
//!             .autocommit(true)
//!             .build()?,
//!     )?;
//!     let mut cursor = connection.cursor(false)?;
//!     cursor.execute("SELECT * FROM T WHERE id = ?", &[DqValue::Int(1)])?;
//!     for row in cursor.fetchall()? {
//!         println!("{row:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The programming model is synchronous request/response: every request
//! sequence ends with one flush, after which the server's reply is read
//! from the same port, in order. Shared state (the port pool, the control
//! connections, the session registry) sits behind a single mutex per data
//! source, so handles can be moved across threads, while each port is
//! only ever driven by the one operation that owns it.

#![deny(missing_debug_implementations)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::non_ascii_literal)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
// the wire format is defined in terms of width-exact big-endian fields
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub mod conn;
mod dq_error;
pub mod error_code;
pub mod error_message;
pub mod protocol;
mod sync;

pub use crate::conn::{
    ConnectParams, ConnectParamsBuilder, DataSource, IntoConnectParams, PreparedStatement,
    ResultSet, RsStatus, Session, CONNECTION_THRESHOLD,
};
pub use crate::dq_error::{DqError, DqResult};
pub use crate::error_code::DbErrorKind;
pub use crate::protocol::parts::{
    ColumnMetadata, DataArray, Decimal, DqValue, ErrorLevel, LanguageSet, LanguageTag,
    ResultSetMetadata, ServerError, SqlType, Word, WordCategory,
};
pub use crate::protocol::ProtocolVersion;
pub use crate::sync::{ColumnDescription, Connection, Cursor, IsolationLevel, TransactionMode};

use std::collections::HashMap;
use std::sync::Mutex;

/// Placeholder style of SQL statements: positional `?`.
pub const PARAM_STYLE: &str = "qmark";

lazy_static! {
    // connect() deduplicates data sources across calls, keyed by
    // (host, port, protocol version)
    static ref DATASOURCE_MAP: Mutex<HashMap<(String, u16, i32), DataSource>> =
        Mutex::new(HashMap::new());
}

/// Connects to a database and returns a [`Connection`].
///
/// Data sources are shared process-wide: connecting twice to the same
/// (host, port, protocol version) reuses the existing port pool and its
/// control connections, only a new session is created.
pub fn connect<P: IntoConnectParams>(params: P) -> DqResult<Connection> {
    let params = params.into_connect_params()?;
    let key = (
        params.host().to_string(),
        params.port(),
        params.protocol_version(),
    );

    let datasource = {
        let mut map = DATASOURCE_MAP.lock()?;
        match map.get(&key) {
            Some(datasource) => datasource.clone(),
            None => {
                let datasource = DataSource::new(params.host(), params.port());
                if let Err(e) = datasource.open(params.protocol_version()) {
                    datasource.close();
                    return Err(e);
                }
                map.insert(key, datasource.clone());
                datasource
            }
        }
    };

    let session = if datasource.authorization()? == protocol::authorize_mode::NONE {
        datasource.create_session(params.dbname(), None, None)?
    } else {
        datasource.create_session(params.dbname(), params.user(), params.password())?
    };

    let master_id = datasource.master_id()?;
    Ok(Connection::new(&params, session, master_id))
}

/// Closes every data source this process opened through [`connect`].
pub fn close() {
    if let Ok(mut map) = DATASOURCE_MAP.lock() {
        for (_, datasource) in map.drain() {
            datasource.close();
        }
    }
}
