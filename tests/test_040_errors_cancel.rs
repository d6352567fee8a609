mod test_utils;

use dqconnect::protocol::parts::{ColumnMetadataBuilder, ResultSetMetadata};
use dqconnect::{DataSource, DqResult, DqValue, ProtocolVersion, RsStatus, SqlType};
use log::info;
use test_utils::{result_set, MockServer, ReplyStep};

fn id_metadata() -> ResultSetMetadata {
    vec![ColumnMetadataBuilder::new()
        .sql_type(SqlType::Integer)
        .type_name("int")
        .column_name("id")
        .table_name("T")
        .build()]
    .into()
}

#[test] // cargo test --test test_040_errors_cancel -- --nocapture
pub fn test_040_errors_cancel() -> DqResult<()> {
    let _log_handle = test_utils::init_logger();
    let server = MockServer::start();

    cancel_releases_the_port(&server)?;
    Ok(())
}

fn cancel_releases_the_port(server: &MockServer) -> DqResult<()> {
    info!("canceling a long statement frees the port for the next execute");
    server.script(
        "SELECT * FROM huge",
        vec![
            ReplyStep::Metadata(id_metadata()),
            ReplyStep::Row(vec![DqValue::Int(1)]),
            ReplyStep::WaitForCancel,
        ],
    );
    server.script(
        "SELECT * FROM small",
        result_set(id_metadata(), vec![vec![DqValue::Int(7)]]),
    );

    let datasource = DataSource::new("127.0.0.1", server.port());
    datasource.open(ProtocolVersion::CURRENT.as_i32())?;
    let mut session = datasource.create_session("TestDB", None, None)?;
    let pooled_before = datasource.pooled_port_count();

    let mut resultset = session.execute("SELECT * FROM huge", None)?;
    assert!(resultset.next()?);

    // the cancellation travels on a control connection, not on the
    // result set's own port
    resultset.cancel()?;

    assert!(!resultset.next()?);
    assert_eq!(resultset.last_status(), RsStatus::Canceled);
    // protocol >= v3: the canceled port went back to the pool
    assert_eq!(datasource.pooled_port_count(), pooled_before);

    // the session is immediately usable again
    let mut resultset = session.execute("SELECT * FROM small", None)?;
    assert!(resultset.next()?);
    assert_eq!(resultset.current_row()?, vec![DqValue::Int(7)]);
    assert!(!resultset.next()?);

    session.close();
    datasource.close();
    Ok(())
}
