mod test_utils;

use dqconnect::protocol::parts::{ColumnMetadataBuilder, ResultSetMetadata};
use dqconnect::{
    connect, ConnectParams, DbErrorKind, DqError, DqResult, DqValue, IsolationLevel, SqlType,
};
use log::info;
use test_utils::{result_set, MockServer, ReplyStep};

fn t_metadata() -> ResultSetMetadata {
    vec![
        ColumnMetadataBuilder::new()
            .sql_type(SqlType::Integer)
            .type_name("int")
            .column_name("id")
            .table_name("T")
            .not_nullable()
            .build(),
        ColumnMetadataBuilder::new()
            .sql_type(SqlType::CharacterVarying)
            .type_name("varchar")
            .column_name("name")
            .table_name("T")
            .display_size(100)
            .build(),
    ]
    .into()
}

fn connect_to(server: &MockServer, autocommit: bool) -> DqResult<dqconnect::Connection> {
    connect(
        ConnectParams::builder()
            .hostname("127.0.0.1")
            .port(server.port())
            .dbname("TestDB")
            .dbuser("meier")
            .password("schLau")
            .autocommit(autocommit)
            .build()?,
    )
}

#[test] // cargo test --test test_050_driver -- --nocapture
pub fn test_050_driver() -> DqResult<()> {
    let _log_handle = test_utils::init_logger();
    let server = MockServer::start();

    fetch_and_description(&server)?;
    implicit_transaction_and_rollback(&server)?;
    readonly_enforcement(&server)?;
    snapshot_isolation_forces_readonly(&server)?;
    one_cursor_per_connection(&server)?;
    prepared_cursor_uses_the_plan_cache(&server)?;

    dqconnect::close();
    Ok(())
}

fn fetch_and_description(server: &MockServer) -> DqResult<()> {
    info!("execute, fetch, description");
    server.script(
        "SELECT * FROM T ORDER BY id",
        result_set(
            t_metadata(),
            vec![
                vec![DqValue::Int(1), DqValue::from("a")],
                vec![DqValue::Int(2), DqValue::from("b")],
            ],
        ),
    );

    let connection = connect_to(server, true)?;
    let mut cursor = connection.cursor(false)?;

    cursor.execute("SELECT * FROM T ORDER BY id", &[])?;
    let rows = cursor.fetchall()?;
    assert_eq!(
        rows,
        vec![
            vec![DqValue::Int(1), DqValue::from("a")],
            vec![DqValue::Int(2), DqValue::from("b")],
        ]
    );
    assert_eq!(cursor.rowcount(), -1);

    let description = cursor.description();
    assert_eq!(description.len(), 2);
    assert_eq!(description[0].name, "id");
    assert_eq!(description[0].sql_type, SqlType::Integer);
    assert!(description[0].not_nullable);
    assert_eq!(description[1].name, "name");
    assert_eq!(description[1].display_size, 100);
    assert_eq!(description[1].internal_size, 0);

    // fetchmany respects the requested size
    cursor.execute("SELECT * FROM T ORDER BY id", &[])?;
    let rows = cursor.fetchmany(Some(1))?;
    assert_eq!(rows.len(), 1);
    let rows = cursor.fetchmany(None)?;
    assert_eq!(rows.len(), 1);

    cursor.close();
    connection.close();
    Ok(())
}

fn implicit_transaction_and_rollback(server: &MockServer) -> DqResult<()> {
    info!("autocommit off: first execute begins a transaction; rollback ends it");
    let connection = connect_to(server, false)?;
    let mut cursor = connection.cursor(false)?;
    server.clear_executed();

    cursor.execute("INSERT INTO T VALUES (2, 'b')", &[])?;
    assert!(connection.in_transaction()?);

    connection.rollback()?;
    assert!(!connection.in_transaction()?);

    let executed = server.executed();
    assert_eq!(
        executed,
        vec![
            "start transaction read write, isolation level read committed".to_string(),
            "INSERT INTO T VALUES (2, 'b')".to_string(),
            "rollback".to_string(),
        ]
    );

    // commit with nothing in flight is a no-op
    connection.commit()?;

    cursor.close();
    connection.close();
    Ok(())
}

fn readonly_enforcement(server: &MockServer) -> DqResult<()> {
    info!("read-only mode: updates fail, queries keep working");
    server.script(
        "INSERT INTO T VALUES (3, 'c')",
        vec![ReplyStep::Error {
            level: dqconnect::ErrorLevel::User,
            code: dqconnect::error_code::READ_ONLY_TRANSACTION,
            arguments: vec![],
        }],
    );
    server.script(
        "SELECT * FROM T",
        result_set(t_metadata(), vec![vec![DqValue::Int(1), DqValue::from("a")]]),
    );

    let connection = connect_to(server, true)?;
    connection.set_readonly(true)?;
    let mut cursor = connection.cursor(false)?;

    cursor.execute("INSERT INTO T VALUES (3, 'c')", &[])?;
    let err = cursor.fetchone().expect_err("read-only violation must surface");
    match &err {
        DqError::Db { source } => {
            assert_eq!(source.code(), dqconnect::error_code::READ_ONLY_TRANSACTION);
            assert_eq!(source.kind(), DbErrorKind::Operational);
        }
        other => panic!("unexpected error {other:?}"),
    }

    cursor.execute("SELECT * FROM T", &[])?;
    assert_eq!(cursor.fetchall()?.len(), 1);

    cursor.close();
    connection.close();
    Ok(())
}

fn snapshot_isolation_forces_readonly(server: &MockServer) -> DqResult<()> {
    info!("snapshot isolation implies read-only");
    let connection = connect_to(server, false)?;

    connection.set_transaction_isolation(IsolationLevel::UsingSnapshot)?;
    assert!(connection.is_readonly()?);
    // turning read-only off is incompatible with snapshot isolation
    assert!(matches!(
        connection.set_readonly(false),
        Err(DqError::Usage(_))
    ));
    // turning it "on" again is a no-op
    connection.set_readonly(true)?;

    connection.close();
    Ok(())
}

fn one_cursor_per_connection(server: &MockServer) -> DqResult<()> {
    info!("at most one live cursor per connection");
    let connection = connect_to(server, true)?;

    let mut cursor = connection.cursor(false)?;
    assert!(matches!(connection.cursor(false), Err(DqError::Usage(_))));

    cursor.close();
    let _second = connection.cursor(false)?;

    connection.close();
    Ok(())
}

fn prepared_cursor_uses_the_plan_cache(server: &MockServer) -> DqResult<()> {
    info!("a prepared cursor compiles each statement text once");
    const SQL: &str = "INSERT INTO T VALUES (?, ?)";

    let connection = connect_to(server, true)?;
    let mut cursor = connection.cursor(true)?;
    server.clear_executed();

    cursor.execute(SQL, &[DqValue::Int(1), DqValue::from("a")])?;
    cursor.execute(SQL, &[DqValue::Int(2), DqValue::from("b")])?;
    // both executions ran the same server-side plan
    assert_eq!(server.executed(), vec![SQL.to_string(), SQL.to_string()]);

    // closing the cursor keeps the session's plan cache populated
    cursor.close();

    let mut cursor = connection.cursor(true)?;
    cursor.executemany(
        SQL,
        &[
            vec![DqValue::Int(3), DqValue::from("c")],
            vec![DqValue::Int(4), DqValue::from("d")],
        ],
    )?;
    cursor.close();

    connection.close();
    Ok(())
}
