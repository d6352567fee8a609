mod test_utils;

use dqconnect::{DataSource, DqResult, ProtocolVersion, CONNECTION_THRESHOLD};
use log::info;
use test_utils::MockServer;

#[test] // cargo test --test test_010_connect -- --nocapture
pub fn test_010_connect() -> DqResult<()> {
    let _log_handle = test_utils::init_logger();
    let server = MockServer::start();

    open_and_create_session(&server)?;
    connection_growth(&server)?;
    reopen_after_close(&server)?;
    shutdown_request(&server)?;
    Ok(())
}

fn open_and_create_session(server: &MockServer) -> DqResult<()> {
    info!("open a data source, create and close a session");
    let datasource = DataSource::new("127.0.0.1", server.port());
    datasource.open(ProtocolVersion::CURRENT.as_i32())?;

    assert_eq!(
        datasource.master_id()? & 0xFFFF,
        ProtocolVersion::CURRENT.as_i32()
    );
    assert_eq!(datasource.connection_count(), 1);
    assert!(datasource.is_server_available()?);

    let mut session = datasource.create_session("TestDB", Some("meier"), Some("schLau"))?;
    assert!(session.is_valid());
    assert_ne!(session.session_id(), 0);
    assert_eq!(datasource.session_count(), 1);
    // the worker port used for BEGIN_SESSION went back to the pool
    assert_eq!(datasource.pooled_port_count(), 1);

    session.close();
    assert!(!session.is_valid());
    assert_eq!(datasource.session_count(), 0);
    // closing twice is a no-op
    session.close();

    datasource.close();
    assert_eq!(datasource.pooled_port_count(), 0);
    assert_eq!(datasource.connection_count(), 0);
    // closing twice is a no-op
    datasource.close();
    Ok(())
}

fn connection_growth(server: &MockServer) -> DqResult<()> {
    info!("the control connection list grows with the session count");
    let datasource = DataSource::new("127.0.0.1", server.port());
    datasource.open(ProtocolVersion::CURRENT.as_i32())?;

    let mut sessions = Vec::new();
    for i in 0..(CONNECTION_THRESHOLD + 5) {
        sessions.push(datasource.create_session("TestDB", None, None)?);
        let connections = datasource.connection_count();
        let bound = CONNECTION_THRESHOLD * connections + (CONNECTION_THRESHOLD - 1);
        assert!(
            datasource.session_count() <= bound,
            "session {i}: {} sessions exceed the bound {bound} for {connections} connections",
            datasource.session_count(),
        );
    }
    assert_eq!(datasource.session_count(), CONNECTION_THRESHOLD + 5);
    assert_eq!(datasource.connection_count(), 2);

    for mut session in sessions {
        session.close();
    }
    assert_eq!(datasource.session_count(), 0);
    datasource.close();
    Ok(())
}

fn shutdown_request(server: &MockServer) -> DqResult<()> {
    info!("shutdown with credentials rides SHUTDOWN2");
    let datasource = DataSource::new("127.0.0.1", server.port());
    datasource.open(ProtocolVersion::CURRENT.as_i32())?;
    datasource.shutdown(Some("admin"), Some("secret"))?;
    datasource.shutdown(None, None)?;
    datasource.close();
    Ok(())
}

fn reopen_after_close(server: &MockServer) -> DqResult<()> {
    info!("a closed data source reopens transparently on the next session");
    let datasource = DataSource::new("127.0.0.1", server.port());
    datasource.open(ProtocolVersion::CURRENT.as_i32())?;
    datasource.close();

    // create_session finds no usable control connection and reinitializes
    let session = datasource.create_session("TestDB", None, None)?;
    assert!(session.is_valid());
    assert_eq!(datasource.connection_count(), 1);
    datasource.close();
    Ok(())
}
