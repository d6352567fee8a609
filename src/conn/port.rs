use super::tcp_client::PlainTcpClient;
use crate::protocol::parts::{
    DataArray, DqValue, ErrorLevel, ServerError, Status, WireObject,
};
use crate::protocol::{
    class_id, connection_slave_id, version_of, RequestType,
};
use crate::{DqError, DqResult};

/// One framed endpoint to the server, after handshake.
///
/// A port carries the negotiated master id, its server-assigned slave id,
/// and (while an operation is in flight) the worker id of that operation.
/// The `reuse` flag records whether the last server error left the port in
/// a poolable state.
#[derive(Debug)]
pub struct Port {
    tcp: PlainTcpClient,
    master_id: i32,
    slave_id: i32,
    worker_id: i32,
    reuse: bool,
}

/// What a single read from a port produced.
#[derive(Debug)]
pub(crate) enum ReadEvent {
    /// The NONE class id: end of data.
    None,
    /// A row, decoded into the caller's buffer.
    Row,
    /// Any other object.
    Object(WireObject),
}

impl Port {
    /// Connects and performs the handshake.
    ///
    /// The client sends its master id and the requested slave id (`ANY`
    /// for a fresh one); the server answers with the negotiated master id
    /// and the concrete slave id, which must lie in the normal range.
    pub(crate) fn open(
        hostname: &str,
        portnum: u16,
        master_id: i32,
        slave_id: i32,
    ) -> DqResult<Self> {
        trace!("Port::open({hostname}:{portnum}, slave_id={slave_id})");
        let mut tcp = PlainTcpClient::try_new((hostname, portnum))?;

        tcp.writer().write_i32(master_id)?;
        tcp.writer().write_i32(slave_id)?;
        tcp.writer().flush()?;

        let master_id = tcp.reader().read_i32()?;
        let slave_id = tcp.reader().read_i32()?;
        if !connection_slave_id::is_normal(slave_id) {
            return Err(DqError::Interface(
                "handshake failed, server did not hand out a usable slave id",
            ));
        }
        debug!("Port::open: negotiated master_id={master_id:#x}, slave_id={slave_id}");

        Ok(Self {
            tcp,
            master_id,
            slave_id,
            worker_id: connection_slave_id::UNDEFINED,
            reuse: false,
        })
    }

    pub fn master_id(&self) -> i32 {
        self.master_id
    }

    /// The protocol version of this port (masked from the master id).
    pub fn version(&self) -> i32 {
        version_of(self.master_id)
    }

    pub fn slave_id(&self) -> i32 {
        self.slave_id
    }

    pub fn worker_id(&self) -> i32 {
        self.worker_id
    }

    pub(crate) fn set_worker_id(&mut self, worker_id: i32) {
        self.worker_id = worker_id;
    }

    /// Whether the port survived its last server error in a poolable state.
    pub fn is_reuse(&self) -> bool {
        self.reuse
    }

    /// Clears the reuse flag so the port can go back to the pool.
    pub(crate) fn reset(&mut self) {
        self.reuse = false;
    }

    /// Closes the port. Never fails; the streams are simply dropped.
    pub(crate) fn close(self) {
        trace!("Port::close(slave_id={})", self.slave_id);
    }

    // One read with the server's error convention applied: an ErrorLevel
    // is followed by the exception payload and sets the reuse flag; a bare
    // ExceptionData is fatal for the port.
    fn read_checked(&mut self, row: Option<&mut DataArray>) -> DqResult<ReadEvent> {
        match self.read_raw(row)? {
            ReadEvent::Object(WireObject::ErrorLevel(level)) => {
                self.reuse = level.is_user_level();
                match self.read_raw(None)? {
                    ReadEvent::Object(WireObject::ExceptionData(exception)) => {
                        let server_error = ServerError::from_exception(exception, level);
                        warn!("server error: {server_error}");
                        Err(DqError::Db {
                            source: server_error,
                        })
                    }
                    _ => Err(DqError::Interface(
                        "exception payload must follow an error level",
                    )),
                }
            }
            ReadEvent::Object(WireObject::ExceptionData(exception)) => {
                self.reuse = false;
                let server_error = ServerError::from_exception(exception, ErrorLevel::System);
                warn!("server error: {server_error}");
                Err(DqError::Db {
                    source: server_error,
                })
            }
            event => Ok(event),
        }
    }

    fn read_raw(&mut self, row: Option<&mut DataArray>) -> DqResult<ReadEvent> {
        let class_id = self.tcp.reader().read_i32()?;
        if class_id == class_id::DATA_ARRAY_DATA {
            return match row {
                Some(row) => {
                    row.parse_into(self.tcp.reader())?;
                    Ok(ReadEvent::Row)
                }
                None => {
                    let mut scratch = DataArray::new();
                    scratch.parse_into(self.tcp.reader())?;
                    Ok(ReadEvent::Object(WireObject::Value(DqValue::Array(
                        scratch,
                    ))))
                }
            };
        }
        Ok(match WireObject::parse(class_id, self.tcp.reader())? {
            None => ReadEvent::None,
            Some(object) => ReadEvent::Object(object),
        })
    }

    /// Reads one object, raising server-reported errors as `DqError::Db`.
    pub(crate) fn read_object(&mut self) -> DqResult<Option<WireObject>> {
        match self.read_checked(None)? {
            ReadEvent::None => Ok(None),
            ReadEvent::Object(object) => Ok(Some(object)),
            ReadEvent::Row => unreachable!("read_raw returns rows as objects without a buffer"),
        }
    }

    /// Reads one reply element of a result set, reusing the caller's row
    /// buffer for tuple data.
    pub(crate) fn read_tuple(&mut self, row: Option<&mut DataArray>) -> DqResult<ReadEvent> {
        self.read_checked(row)
    }

    /// Reads an object and asserts it is a 32-bit integer value.
    pub fn read_integer(&mut self) -> DqResult<i32> {
        match self.read_object()? {
            Some(WireObject::Value(DqValue::Int(v))) => Ok(v),
            other => {
                warn!("expected IntegerData, got {other:?}");
                Err(DqError::Interface("expected IntegerData on the wire"))
            }
        }
    }

    /// Reads an object and asserts it is a string value.
    pub fn read_string_value(&mut self) -> DqResult<String> {
        match self.read_object()? {
            Some(WireObject::Value(DqValue::String(v))) => Ok(v),
            other => {
                warn!("expected StringData, got {other:?}");
                Err(DqError::Interface("expected StringData on the wire"))
            }
        }
    }

    /// Reads an object and asserts it is a status.
    pub fn read_status(&mut self) -> DqResult<Status> {
        match self.read_object()? {
            Some(WireObject::Status(status)) => Ok(status),
            other => {
                warn!("expected Status, got {other:?}");
                Err(DqError::Interface("expected Status on the wire"))
            }
        }
    }

    pub(crate) fn write_request(&mut self, request: RequestType) -> DqResult<()> {
        trace!("Port::write_request({request:?})");
        self.tcp.writer().write_i32(class_id::REQUEST)?;
        self.tcp.writer().write_i32(request.as_i32())
    }

    pub(crate) fn write_integer(&mut self, v: i32) -> DqResult<()> {
        self.tcp.writer().write_i32(class_id::INTEGER_DATA)?;
        self.tcp.writer().write_i32(v)
    }

    pub(crate) fn write_string_value(&mut self, v: &str) -> DqResult<()> {
        self.tcp.writer().write_i32(class_id::STRING_DATA)?;
        self.tcp.writer().write_string(v)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn write_integer_array(&mut self, v: &[i32]) -> DqResult<()> {
        self.tcp.writer().write_i32(class_id::INTEGER_ARRAY_DATA)?;
        self.tcp.writer().write_i32(v.len() as i32)?;
        for element in v {
            self.tcp.writer().write_i32(*element)?;
        }
        Ok(())
    }

    /// Writes a parameter array, or the NONE class id when absent.
    pub(crate) fn write_parameters(&mut self, parameters: Option<&DataArray>) -> DqResult<()> {
        match parameters {
            Some(parameters) => {
                self.tcp.writer().write_i32(class_id::DATA_ARRAY_DATA)?;
                parameters.emit(self.tcp.writer())
            }
            None => self.tcp.writer().write_i32(class_id::NONE),
        }
    }

    /// The commit point of a request sequence.
    pub(crate) fn flush(&mut self) -> DqResult<()> {
        self.tcp.writer().flush()
    }
}
