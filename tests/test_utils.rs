// advisable because not all test modules use all functions of this module:
#![allow(dead_code)]

use dqconnect::protocol::parts::{
    DataArray, DqValue, ErrorLevel, ExceptionData, ResultSetMetadata, Status, WireObject,
};
use dqconnect::protocol::{connection_slave_id, InputStream, OutputStream, RequestType};
use flexi_logger::{opt_format, Logger, LoggerHandle};
use std::collections::HashMap;
use std::io::{BufReader, BufWriter};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// Returns a logger that prints out all info, warn and error messages.
pub fn init_logger() -> LoggerHandle {
    Logger::try_with_env_or_str("info")
        .unwrap()
        .format(opt_format)
        .start()
        .unwrap_or_else(|e| panic!("Logger initialization failed with {e}"))
}

/// One element of a scripted statement reply.
#[derive(Clone, Debug)]
pub enum ReplyStep {
    Metadata(ResultSetMetadata),
    Row(Vec<DqValue>),
    Status(Status),
    /// The NONE class id (end of data).
    EndOfData,
    /// An error sequence: level, then the exception payload.
    Error {
        level: ErrorLevel,
        code: i32,
        arguments: Vec<String>,
    },
    /// Blocks until a CANCEL_WORKER arrived, then sends CANCELED.
    WaitForCancel,
}

/// A reply that acknowledges a statement without data.
pub fn ack() -> Vec<ReplyStep> {
    vec![ReplyStep::Status(Status::Success)]
}

/// A reply carrying a full result set.
pub fn result_set(metadata: ResultSetMetadata, rows: Vec<Vec<DqValue>>) -> Vec<ReplyStep> {
    let mut steps = vec![ReplyStep::Metadata(metadata)];
    for row in rows {
        steps.push(ReplyStep::Row(row));
    }
    steps.push(ReplyStep::Status(Status::Success));
    steps
}

#[derive(Debug, Default)]
struct MockState {
    scripts: Mutex<HashMap<String, Vec<ReplyStep>>>,
    executed: Mutex<Vec<String>>,
    prepared: Mutex<HashMap<i32, String>>,
    pending_connections: Mutex<Vec<i32>>,
    canceled: AtomicBool,
    next_slave_id: AtomicI32,
    next_worker_id: AtomicI32,
    next_session_id: AtomicI32,
    next_prepare_id: AtomicI32,
}

/// An in-process server speaking the wire protocol, scripted per SQL text.
///
/// Every statement that has no script registered is acknowledged with a
/// bare SUCCESS status; every executed statement text is recorded.
#[derive(Debug)]
pub struct MockServer {
    port: u16,
    state: Arc<MockState>,
}

impl MockServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(MockState {
            next_slave_id: AtomicI32::new(100),
            next_worker_id: AtomicI32::new(1000),
            next_session_id: AtomicI32::new(2000),
            next_prepare_id: AtomicI32::new(3000),
            ..MockState::default()
        });

        let accept_state = Arc::clone(&state);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let state = Arc::clone(&accept_state);
                std::thread::spawn(move || {
                    let _ = serve_connection(stream, &state);
                });
            }
        });

        Self { port, state }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Registers the scripted reply for a statement text.
    pub fn script(&self, sql: &str, steps: Vec<ReplyStep>) {
        self.state
            .scripts
            .lock()
            .unwrap()
            .insert(sql.to_string(), steps);
    }

    /// All statement texts the server received, in order.
    pub fn executed(&self) -> Vec<String> {
        self.state.executed.lock().unwrap().clone()
    }

    pub fn clear_executed(&self) {
        self.state.executed.lock().unwrap().clear();
    }
}

type Reader = InputStream<BufReader<TcpStream>>;
type Writer = OutputStream<BufWriter<TcpStream>>;

fn serve_connection(stream: TcpStream, state: &MockState) -> dqconnect::DqResult<()> {
    let mut reader = InputStream::new(BufReader::new(stream.try_clone()?));
    let mut writer = OutputStream::new(BufWriter::new(stream));

    // handshake: echo the master id, assign or echo the slave id
    let master_id = reader.read_i32()?;
    let requested_slave_id = reader.read_i32()?;
    let fresh = requested_slave_id == connection_slave_id::ANY;
    let slave_id = if fresh {
        state.next_slave_id.fetch_add(1, Ordering::SeqCst)
    } else {
        requested_slave_id
    };
    writer.write_i32(master_id)?;
    writer.write_i32(slave_id)?;
    writer.flush()?;

    // a port opened for a grown control connection reports a status first
    {
        let mut pending = state.pending_connections.lock().unwrap();
        if let Some(position) = pending.iter().position(|id| *id == slave_id) {
            pending.remove(position);
            drop(pending);
            writer.write_object(Some(&WireObject::Status(Status::Success)))?;
            writer.flush()?;
        }
    }

    let mut expect_hostname = fresh;
    loop {
        let request = match reader.read_object() {
            Ok(Some(WireObject::Request(request))) => request,
            Ok(other) => panic!("mock server expected a request, got {other:?}"),
            // client closed the socket
            Err(_) => return Ok(()),
        };
        let first_request = expect_hostname;
        expect_hostname = false;
        handle_request(request, first_request, &mut reader, &mut writer, state)?;
        if matches!(
            request,
            RequestType::EndConnection | RequestType::Shutdown | RequestType::Shutdown2
        ) {
            return Ok(());
        }
    }
}

fn handle_request(
    request: RequestType,
    first_request: bool,
    reader: &mut Reader,
    writer: &mut Writer,
    state: &MockState,
) -> dqconnect::DqResult<()> {
    match request {
        RequestType::BeginConnection => {
            if first_request {
                // initial connection: hostname, then status
                let _hostname = read_string(reader)?;
                write_status(writer, Status::Success)?;
            } else {
                // connection growth: hand out a slave id for the new port
                let slave_id = state.next_slave_id.fetch_add(1, Ordering::SeqCst);
                state.pending_connections.lock().unwrap().push(slave_id);
                write_int(writer, slave_id)?;
                write_status(writer, Status::Success)?;
            }
        }
        RequestType::EndConnection => {
            write_status(writer, Status::Success)?;
        }
        RequestType::BeginWorker => {
            let requested_slave_id = read_int(reader)?;
            let slave_id = if requested_slave_id == connection_slave_id::ANY {
                state.next_slave_id.fetch_add(1, Ordering::SeqCst)
            } else {
                requested_slave_id
            };
            let worker_id = state.next_worker_id.fetch_add(1, Ordering::SeqCst);
            write_int(writer, slave_id)?;
            write_int(writer, worker_id)?;
            write_status(writer, Status::Success)?;
        }
        RequestType::CancelWorker => {
            let _worker_id = read_int(reader)?;
            state.canceled.store(true, Ordering::SeqCst);
            write_status(writer, Status::Success)?;
        }
        RequestType::BeginSession => {
            let _dbname = read_string(reader)?;
            let session_id = state.next_session_id.fetch_add(1, Ordering::SeqCst);
            write_int(writer, session_id)?;
            write_status(writer, Status::Success)?;
        }
        RequestType::BeginSession2 => {
            let _dbname = read_string(reader)?;
            let _user = read_string(reader)?;
            let _password = read_string(reader)?;
            let session_id = state.next_session_id.fetch_add(1, Ordering::SeqCst);
            write_int(writer, session_id)?;
            write_status(writer, Status::Success)?;
        }
        RequestType::EndSession => {
            let _session_id = read_int(reader)?;
            write_status(writer, Status::Success)?;
        }
        RequestType::ExecuteStatement => {
            let _session_id = read_int(reader)?;
            let sql = read_string(reader)?;
            let _parameters = reader.read_object()?;
            play_script(&sql, writer, state)?;
        }
        RequestType::ExecutePrepareStatement => {
            let _session_id = read_int(reader)?;
            let prepare_id = read_int(reader)?;
            let _parameters = reader.read_object()?;
            let sql = state
                .prepared
                .lock()
                .unwrap()
                .get(&prepare_id)
                .cloned()
                .unwrap_or_else(|| panic!("unknown prepare id {prepare_id}"));
            play_script(&sql, writer, state)?;
        }
        RequestType::PrepareStatement2 => {
            let _session_id = read_int(reader)?;
            let sql = read_string(reader)?;
            let prepare_id = state.next_prepare_id.fetch_add(1, Ordering::SeqCst);
            state.prepared.lock().unwrap().insert(prepare_id, sql);
            write_int(writer, prepare_id)?;
            write_status(writer, Status::Success)?;
        }
        RequestType::ErasePrepareStatement2 => {
            let _session_id = read_int(reader)?;
            let prepare_id = read_int(reader)?;
            state.prepared.lock().unwrap().remove(&prepare_id);
            write_status(writer, Status::Success)?;
        }
        RequestType::CheckAvailability => {
            let _target = read_int(reader)?;
            write_int(writer, 1)?;
            write_status(writer, Status::Success)?;
        }
        RequestType::Shutdown => {
            write_status(writer, Status::Success)?;
        }
        RequestType::Shutdown2 => {
            let _user = read_string(reader)?;
            let _password = read_string(reader)?;
            write_status(writer, Status::Success)?;
        }
        RequestType::NoReuseConnection => {
            let _slave_ids = reader.read_object()?;
            write_status(writer, Status::Success)?;
        }
        other => panic!("mock server does not handle {other:?}"),
    }
    Ok(())
}

fn play_script(sql: &str, writer: &mut Writer, state: &MockState) -> dqconnect::DqResult<()> {
    state.executed.lock().unwrap().push(sql.to_string());
    let steps = state
        .scripts
        .lock()
        .unwrap()
        .get(sql)
        .cloned()
        .unwrap_or_else(ack);

    for step in steps {
        match step {
            ReplyStep::Metadata(metadata) => {
                writer.write_object(Some(&WireObject::ResultSetMetadata(metadata)))?;
            }
            ReplyStep::Row(row) => {
                let row: DataArray = row.into();
                writer.write_object(Some(&WireObject::Value(DqValue::Array(row))))?;
            }
            ReplyStep::Status(status) => {
                writer.write_object(Some(&WireObject::Status(status)))?;
            }
            ReplyStep::EndOfData => {
                writer.write_object(None)?;
            }
            ReplyStep::Error {
                level,
                code,
                arguments,
            } => {
                writer.write_object(Some(&WireObject::ErrorLevel(level)))?;
                writer.write_object(Some(&WireObject::ExceptionData(ExceptionData::new(
                    code,
                    arguments,
                    "Server".to_string(),
                    "Worker.cpp".to_string(),
                    0,
                ))))?;
            }
            ReplyStep::WaitForCancel => {
                writer.flush()?;
                let deadline = Instant::now() + Duration::from_secs(5);
                while !state.canceled.load(Ordering::SeqCst) {
                    assert!(Instant::now() < deadline, "cancel never arrived");
                    std::thread::sleep(Duration::from_millis(5));
                }
                writer.write_object(Some(&WireObject::Status(Status::Canceled)))?;
            }
        }
    }
    writer.flush()
}

fn read_int(reader: &mut Reader) -> dqconnect::DqResult<i32> {
    match reader.read_object()? {
        Some(WireObject::Value(DqValue::Int(v))) => Ok(v),
        other => panic!("mock server expected an integer, got {other:?}"),
    }
}

fn read_string(reader: &mut Reader) -> dqconnect::DqResult<String> {
    match reader.read_object()? {
        Some(WireObject::Value(DqValue::String(v))) => Ok(v),
        other => panic!("mock server expected a string, got {other:?}"),
    }
}

fn write_int(writer: &mut Writer, v: i32) -> dqconnect::DqResult<()> {
    writer.write_object(Some(&WireObject::Value(DqValue::Int(v))))?;
    writer.flush()
}

fn write_status(writer: &mut Writer, status: Status) -> dqconnect::DqResult<()> {
    writer.write_object(Some(&WireObject::Status(status)))?;
    writer.flush()
}
