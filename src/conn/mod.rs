//! The client layer: ports, control connections, data sources, sessions
//! and result sets.

mod control_connection;
mod datasource;
pub mod params;
mod port;
mod prepared_statement;
mod result_set;
mod session;
mod tcp_client;

pub use datasource::{DataSource, CONNECTION_THRESHOLD};
pub use params::{ConnectParams, ConnectParamsBuilder, IntoConnectParams};
pub use port::Port;
pub use prepared_statement::PreparedStatement;
pub use result_set::{ResultSet, RsStatus};
pub use session::Session;
