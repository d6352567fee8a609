use super::control_connection::ControlConnection;
use super::port::Port;
use super::session::Session;
use crate::protocol::{
    authorize_mode, connection_slave_id, version_of, ProtocolVersion, RequestType,
};
use crate::{DqError, DqResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One control connection manages at most this many sessions before the
/// data source opens another one.
pub const CONNECTION_THRESHOLD: usize = 20;

/// Shared handle to the mutable state of a data source.
pub(crate) type AmDsCore = Arc<Mutex<DataSourceCore>>;

#[derive(Debug)]
pub(crate) struct SessionRecord {
    pub dbname: String,
    pub username: Option<String>,
}

/// The state behind a [`DataSource`]: the endpoint configuration, the
/// control connections, the idle-port pool and the session registry.
#[derive(Debug)]
pub(crate) struct DataSourceCore {
    hostname: String,
    portnum: u16,
    /// Master id this client requests at handshake (version + auth mode).
    protocol: i32,
    /// Master id the server confirmed.
    master_id: i32,
    authorization: i32,
    connections: Vec<ControlConnection>,
    /// Round-robin cursor over `connections`.
    connection_element: usize,
    /// Idle ports keyed by slave id.
    portmap: HashMap<i32, Port>,
    /// Slave ids of ports this client dropped.
    expunged: Vec<i32>,
    session_map: HashMap<i32, SessionRecord>,
    is_closed: bool,
}

impl DataSourceCore {
    fn new(hostname: &str, portnum: u16) -> Self {
        Self {
            hostname: hostname.to_string(),
            portnum,
            protocol: 0,
            master_id: 0,
            authorization: 0,
            connections: Vec::new(),
            connection_element: 0,
            portmap: HashMap::new(),
            expunged: Vec::new(),
            session_map: HashMap::new(),
            is_closed: false,
        }
    }

    pub fn master_id(&self) -> i32 {
        self.master_id
    }

    pub fn master_version(&self) -> i32 {
        version_of(self.master_id)
    }

    pub fn authorization(&self) -> i32 {
        self.authorization
    }

    /// Opens the data source: one initial port, BEGIN_CONNECTION with the
    /// local hostname, and the first control connection.
    pub fn open(&mut self, protocol_version: i32) -> DqResult<()> {
        self.protocol = protocol_version;
        // default to password authorization when no mode is requested
        if self.protocol & authorize_mode::MASK_MODE == authorize_mode::NONE {
            self.protocol |= authorize_mode::PASSWORD;
        }

        let mut port = self.new_port(connection_slave_id::ANY)?;
        port.write_request(RequestType::BeginConnection)?;
        port.write_string_value(&local_hostname())?;
        port.flush()?;
        port.read_status()?;

        self.master_id = port.master_id();
        self.authorization = port.master_id() & authorize_mode::MASK_MODE;
        debug!(
            "DataSource::open: master_id={:#x}, authorization={:#x}",
            self.master_id, self.authorization
        );
        self.connections.push(ControlConnection::new(port));
        self.is_closed = false;
        Ok(())
    }

    pub fn new_port(&self, slave_id: i32) -> DqResult<Port> {
        Port::open(&self.hostname, self.portnum, self.protocol, slave_id)
    }

    /// Round-robin selection of a control connection.
    fn next_connection_index(&mut self) -> Option<usize> {
        if self.connections.is_empty() {
            return None;
        }
        if self.connection_element >= self.connections.len() {
            self.connection_element = 0;
        }
        let index = self.connection_element;
        self.connection_element += 1;
        Some(index)
    }

    /// Opens a new control connection once the session count crosses the
    /// threshold.
    ///
    /// The list never shrinks; a burst of sessions permanently raises the
    /// control-connection count. Shrinking is a future extension.
    pub fn new_client_connection(&mut self) -> DqResult<()> {
        if self.session_map.len() >= CONNECTION_THRESHOLD * self.connections.len() {
            let index = self
                .next_connection_index()
                .ok_or(DqError::Unexpected("no client connection available"))?;
            let slave_id = self.connections[index].begin_connection_request()?;
            let mut port = self.new_port(slave_id)?;
            self.connections[index].finish_begin_connection(&mut port)?;
            debug!(
                "grew to {} control connections for {} sessions",
                self.connections.len() + 1,
                self.session_map.len()
            );
            self.connections.push(ControlConnection::new(port));
        }
        Ok(())
    }

    /// Takes any idle port out of the pool.
    pub fn pop_port(&mut self) -> Option<Port> {
        let slave_id = *self.portmap.keys().next()?;
        self.portmap.remove(&slave_id)
    }

    /// Returns a port to the pool, clearing its reuse flag.
    pub fn push_port(&mut self, mut port: Port) {
        port.reset();
        self.portmap.insert(port.slave_id(), port);
    }

    /// Records a dropped port so the server can be told to forget it.
    pub fn expunge_port(&mut self, port: Port) {
        self.expunged.push(port.slave_id());
        port.close();
    }

    /// Disposes a port that carried a failed operation: pooled when its
    /// reuse flag allows it, expunged otherwise.
    pub fn reclaim_port(&mut self, port: Port) {
        if port.is_reuse() {
            self.push_port(port);
        } else {
            self.expunge_port(port);
        }
    }

    /// Starts a worker, reusing a pooled port when one exists.
    pub fn begin_worker(&mut self) -> DqResult<Port> {
        let index = self
            .next_connection_index()
            .ok_or(DqError::Unexpected("no client connection available"))?;

        let pooled = self.pop_port();
        let slave_id = pooled
            .as_ref()
            .map_or(connection_slave_id::ANY, Port::slave_id);
        if pooled.is_some() && slave_id == connection_slave_id::ANY {
            // a pooled port always has a server-assigned id
            if let Some(pooled) = pooled {
                pooled.close();
            }
            return Err(DqError::Unexpected(
                "pooled port without a server-assigned slave id",
            ));
        }

        match self.connections[index].begin_worker_request(slave_id) {
            Err(e) => {
                if let Some(pooled) = pooled {
                    self.push_port(pooled);
                }
                Err(e)
            }
            Ok((new_slave_id, worker_id)) => {
                let mut port = match pooled {
                    Some(pooled) => pooled,
                    None => self.new_port(new_slave_id)?,
                };
                port.set_worker_id(worker_id);
                trace!(
                    "begin_worker: slave_id={}, worker_id={}",
                    port.slave_id(),
                    worker_id
                );
                Ok(port)
            }
        }
    }

    pub fn cancel_worker(&mut self, worker_id: i32) -> DqResult<()> {
        let index = self
            .next_connection_index()
            .ok_or(DqError::Unexpected("no client connection available"))?;
        self.connections[index].cancel_worker(worker_id)
    }

    pub fn is_server_available(&mut self) -> DqResult<bool> {
        let index = self
            .next_connection_index()
            .ok_or(DqError::Unexpected("no client connection available"))?;
        self.connections[index].is_server_available()
    }

    pub fn register_session(&mut self, session_id: i32, record: SessionRecord) {
        self.session_map.insert(session_id, record);
    }

    pub fn remove_session(&mut self, session_id: i32) {
        self.session_map.remove(&session_id);
    }

    pub fn session_exists(&self) -> bool {
        !self.session_map.is_empty()
    }

    pub fn session_count(&self) -> usize {
        self.session_map.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn pooled_port_count(&self) -> usize {
        self.portmap.len()
    }

    /// Ends a session on the server. The worker port is reclaimed on
    /// success and on user-level errors.
    pub fn end_session(&mut self, session_id: i32) -> DqResult<()> {
        let mut port = self.begin_worker()?;
        let outcome: DqResult<()> = (|| {
            port.write_request(RequestType::EndSession)?;
            port.write_integer(session_id)?;
            port.flush()?;
            port.read_status()?;
            Ok(())
        })();
        match outcome {
            Ok(()) => {
                self.push_port(port);
                Ok(())
            }
            Err(e) => {
                self.reclaim_port(port);
                Err(e)
            }
        }
    }

    /// The session-creation protocol, with the reopen-and-retry behavior:
    /// when the worker cannot be started and no session exists yet, the
    /// whole data source is reinitialized once (the server may have been
    /// restarted in between).
    pub fn create_session(
        &mut self,
        dbname: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> DqResult<i32> {
        // servers below protocol v5 know no users
        let (username, password) = if self.master_version() < ProtocolVersion::Version5.as_i32() {
            (None, None)
        } else {
            (username, password)
        };

        let mut port = {
            let first_try = if self.connections.is_empty() {
                let protocol = self.protocol;
                self.open(protocol).and_then(|()| self.begin_worker())
            } else {
                self.begin_worker()
            };
            match first_try {
                Ok(port) => port,
                Err(e) => {
                    if self.session_exists() {
                        return Err(e);
                    }
                    debug!("worker start failed ({e}), reopening the data source");
                    self.close();
                    let protocol = self.protocol;
                    self.open(protocol)?;
                    self.begin_worker()?
                }
            }
        };

        let outcome: DqResult<i32> = (|| {
            match (username, password) {
                (Some(username), Some(password)) => {
                    port.write_request(RequestType::BeginSession2)?;
                    port.write_string_value(dbname)?;
                    port.write_string_value(username)?;
                    port.write_string_value(password)?;
                }
                _ => {
                    port.write_request(RequestType::BeginSession)?;
                    port.write_string_value(dbname)?;
                }
            }
            port.flush()?;
            let session_id = port.read_integer()?;
            port.read_status()?;
            Ok(session_id)
        })();

        let session_id = match outcome {
            Ok(session_id) => session_id,
            Err(e @ DqError::Db { .. }) => {
                self.reclaim_port(port);
                return Err(e);
            }
            Err(e) => {
                port.close();
                return Err(e);
            }
        };

        self.push_port(port);
        self.register_session(
            session_id,
            SessionRecord {
                dbname: dbname.to_string(),
                username: username.map(str::to_string),
            },
        );
        self.new_client_connection()?;
        Ok(session_id)
    }

    /// Asks the server to stop.
    ///
    /// With credentials, SHUTDOWN2 is tried first; a server that rejects
    /// it predates protocol v5 and gets the credential-less SHUTDOWN.
    pub fn shutdown(&mut self, username: Option<&str>, password: Option<&str>) -> DqResult<()> {
        if let (Some(username), Some(password)) = (username, password) {
            let mut port = self.new_port(connection_slave_id::ANY)?;
            let outcome: DqResult<()> = (|| {
                port.write_request(RequestType::Shutdown2)?;
                port.write_string_value(username)?;
                port.write_string_value(password)?;
                port.flush()?;
                port.read_status()?;
                Ok(())
            })();
            port.close();
            match outcome {
                Ok(()) => return Ok(()),
                // old server, fall back to the credential-less request
                Err(DqError::Db { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        let mut port = self.new_port(connection_slave_id::ANY)?;
        port.write_request(RequestType::Shutdown)?;
        port.flush()?;
        port.read_status()?;
        port.close();
        Ok(())
    }

    /// Cascaded teardown: sessions, control connections, pooled ports.
    /// Never fails; server-side errors are ignored.
    pub fn close(&mut self) {
        if self.is_closed {
            return;
        }

        let session_ids: Vec<i32> = self.session_map.keys().copied().collect();
        for session_id in session_ids {
            if let Some(record) = self.session_map.get(&session_id) {
                debug!(
                    "ending session {session_id} on {} (user: {:?})",
                    record.dbname, record.username
                );
            }
            if let Err(e) = self.end_session(session_id) {
                trace!("ignoring error while ending session {session_id}: {e}");
            }
        }
        self.session_map.clear();

        if !self.expunged.is_empty() {
            let expunged = std::mem::take(&mut self.expunged);
            if let Some(index) = self.next_connection_index() {
                if let Err(e) = self.connections[index].disconnect_ports(&expunged) {
                    trace!("ignoring error while expunging ports: {e}");
                }
            }
        }

        for mut connection in self.connections.drain(..) {
            connection.close();
        }
        self.connection_element = 0;

        for (_, port) in self.portmap.drain() {
            port.close();
        }

        self.is_closed = true;
    }
}

fn local_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string())
}

/// A client-side data source: the endpoint of one server, with its pool
/// of idle ports, its control connections and its sessions.
///
/// Cloning shares the underlying state; the handle is cheap to pass
/// around and is also held by every [`Session`] and result set created
/// from it.
#[derive(Clone, Debug)]
pub struct DataSource {
    core: AmDsCore,
}

impl DataSource {
    pub fn new(hostname: &str, portnum: u16) -> Self {
        Self {
            core: Arc::new(Mutex::new(DataSourceCore::new(hostname, portnum))),
        }
    }

    /// Opens the data source with the given protocol version (a
    /// [`ProtocolVersion`] value, optionally combined with an
    /// authorization mode; PASSWORD is assumed when none is given).
    pub fn open(&self, protocol_version: i32) -> DqResult<()> {
        self.core.lock()?.open(protocol_version)
    }

    /// Creates a logged-in session on the given database.
    pub fn create_session(
        &self,
        dbname: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> DqResult<Session> {
        let session_id = self
            .core
            .lock()?
            .create_session(dbname, username, password)?;
        Ok(Session::new(
            Arc::clone(&self.core),
            dbname,
            username,
            session_id,
        ))
    }

    /// The master id the server confirmed at handshake.
    pub fn master_id(&self) -> DqResult<i32> {
        Ok(self.core.lock()?.master_id())
    }

    /// The authorization mode negotiated at handshake.
    pub fn authorization(&self) -> DqResult<i32> {
        Ok(self.core.lock()?.authorization())
    }

    pub fn is_server_available(&self) -> DqResult<bool> {
        self.core.lock()?.is_server_available()
    }

    /// Asks the server process to stop.
    pub fn shutdown(&self, username: Option<&str>, password: Option<&str>) -> DqResult<()> {
        self.core.lock()?.shutdown(username, password)
    }

    pub fn session_count(&self) -> usize {
        self.core.lock().map(|c| c.session_count()).unwrap_or(0)
    }

    pub fn connection_count(&self) -> usize {
        self.core.lock().map(|c| c.connection_count()).unwrap_or(0)
    }

    pub fn pooled_port_count(&self) -> usize {
        self.core.lock().map(|c| c.pooled_port_count()).unwrap_or(0)
    }

    /// Closes everything: sessions, control connections, pooled ports.
    pub fn close(&self) {
        if let Ok(mut core) = self.core.lock() {
            core.close();
        }
    }
}
