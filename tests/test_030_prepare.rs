mod test_utils;

use dqconnect::protocol::parts::{ColumnMetadataBuilder, ResultSetMetadata};
use dqconnect::{DataSource, DqError, DqResult, DqValue, ProtocolVersion, SqlType};
use log::info;
use test_utils::{result_set, MockServer};

const SELECT_BY_ID: &str = "SELECT name FROM T WHERE id = ?";

fn name_metadata() -> ResultSetMetadata {
    vec![ColumnMetadataBuilder::new()
        .sql_type(SqlType::CharacterVarying)
        .type_name("varchar")
        .column_name("name")
        .table_name("T")
        .build()]
    .into()
}

#[test] // cargo test --test test_030_prepare -- --nocapture
pub fn test_030_prepare() -> DqResult<()> {
    let _log_handle = test_utils::init_logger();
    let server = MockServer::start();

    prepare_execute_erase(&server)?;
    prepared_map_is_keyed_by_sql(&server)?;
    version_gating(&server)?;
    Ok(())
}

fn prepare_execute_erase(server: &MockServer) -> DqResult<()> {
    info!("prepare, execute the plan twice, erase");
    server.script(
        SELECT_BY_ID,
        result_set(name_metadata(), vec![vec![DqValue::from("a")]]),
    );

    let datasource = DataSource::new("127.0.0.1", server.port());
    datasource.open(ProtocolVersion::CURRENT.as_i32())?;
    let mut session = datasource.create_session("TestDB", None, None)?;

    let prepared = session.create_prepare_statement(SELECT_BY_ID)?;
    assert_ne!(prepared.prepare_id(), 0);

    for id in [1, 2] {
        let parameters = vec![DqValue::Int(id)].into();
        let mut resultset = session.execute_prepare(&prepared, Some(&parameters))?;
        assert!(resultset.next()?);
        assert_eq!(resultset.current_row()?, vec![DqValue::from("a")]);
        assert!(!resultset.next()?);
    }

    session.erase_prepare_statement(prepared.prepare_id())?;
    session.close();
    datasource.close();
    Ok(())
}

fn prepared_map_is_keyed_by_sql(server: &MockServer) -> DqResult<()> {
    info!("one cache entry per SQL text");
    let datasource = DataSource::new("127.0.0.1", server.port());
    datasource.open(ProtocolVersion::CURRENT.as_i32())?;
    let mut session = datasource.create_session("TestDB", None, None)?;

    let _first = session.create_prepare_statement(SELECT_BY_ID)?;
    let second = session.create_prepare_statement(SELECT_BY_ID)?;
    // re-preparing the same text replaces the cache entry
    assert_eq!(session.prepared_map().len(), 1);
    assert_eq!(session.prepared_map().get(SELECT_BY_ID), Some(&second));

    session.close();
    datasource.close();
    Ok(())
}

fn version_gating(server: &MockServer) -> DqResult<()> {
    info!("prepares are rejected below protocol v3, before any I/O");
    let datasource = DataSource::new("127.0.0.1", server.port());
    datasource.open(ProtocolVersion::Version2.as_i32())?;
    let mut session = datasource.create_session("TestDB", None, None)?;
    server.clear_executed();

    match session.create_prepare_statement(SELECT_BY_ID) {
        Err(DqError::NotSupported(_)) => {}
        other => panic!("expected NotSupported, got {other:?}"),
    }
    // nothing reached the server
    assert!(server.executed().is_empty());

    session.close();
    datasource.close();
    Ok(())
}
