use super::datasource::AmDsCore;
use super::port::{Port, ReadEvent};
use crate::protocol::parts::{DataArray, DqValue, ResultSetMetadata, Status, WireObject};
use crate::protocol::ProtocolVersion;
use crate::{DqError, DqResult};

/// State of the result-set machine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RsStatus {
    Undefined,
    /// Row data is being transferred (also the initial state).
    Data,
    EndOfData,
    Success,
    Canceled,
    Error,
    MetaData,
    HasMoreData,
}

/// Iterator over the reply stream of one executed statement.
///
/// The result set owns its worker's port until a terminal status arrives;
/// then the port goes back to the data source's pool (or is closed, see
/// the transition rules below) and the result set detaches.
#[derive(Debug)]
pub struct ResultSet {
    core: AmDsCore,
    port: Option<Port>,
    status: RsStatus,
    metadata: Option<ResultSetMetadata>,
    tuple_template: Option<DataArray>,
    row: Option<DataArray>,
    row_count: i64,
    is_closed: bool,
}

impl ResultSet {
    pub(crate) fn new(core: AmDsCore, port: Port) -> Self {
        Self {
            core,
            port: Some(port),
            status: RsStatus::Data,
            metadata: None,
            tuple_template: None,
            row: None,
            row_count: 0,
            is_closed: false,
        }
    }

    /// The metadata of the current result, once the server sent it.
    pub fn metadata(&self) -> Option<&ResultSetMetadata> {
        self.metadata.as_ref()
    }

    /// The most recent row.
    pub fn row(&self) -> Option<&DataArray> {
        self.row.as_ref()
    }

    /// The most recent row as an owned value list.
    pub fn current_row(&self) -> DqResult<Vec<DqValue>> {
        self.row
            .as_ref()
            .map(|row| row.values().to_vec())
            .ok_or(DqError::Usage("no row fetched yet"))
    }

    /// Number of rows fetched so far; -1 once the data is exhausted.
    pub fn row_count(&self) -> i64 {
        self.row_count
    }

    /// The last observed machine state.
    pub fn last_status(&self) -> RsStatus {
        self.status
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    // Returns the port to the pool or expunges it, depending on its reuse
    // flag. Used on the ERROR/UNDEFINED transitions.
    fn dispose_port(&mut self) {
        if let Some(port) = self.port.take() {
            match self.core.lock() {
                Ok(mut core) => core.reclaim_port(port),
                Err(_) => port.close(),
            }
        }
    }

    fn pool_port(&mut self) {
        if let Some(port) = self.port.take() {
            if let Ok(mut core) = self.core.lock() {
                core.push_port(port);
            }
        }
    }

    /// Reads one reply element and performs the corresponding state
    /// transition, including the port hand-back on terminal states.
    pub fn get_next_tuple(&mut self, want_row: bool) -> DqResult<RsStatus> {
        let Some(port) = self.port.as_mut() else {
            return Ok(self.status);
        };

        let event = {
            let read_result = if want_row {
                // seed a fresh row buffer from the metadata's template
                let template = &self.tuple_template;
                let row = self
                    .row
                    .get_or_insert_with(|| template.clone().unwrap_or_default());
                port.read_tuple(Some(row))
            } else {
                port.read_tuple(None)
            };
            match read_result {
                Ok(event) => event,
                Err(e) => {
                    self.status = RsStatus::Error;
                    self.dispose_port();
                    return Err(e);
                }
            }
        };

        let status = match event {
            ReadEvent::None => {
                self.metadata = None;
                self.tuple_template = None;
                RsStatus::EndOfData
            }
            ReadEvent::Object(WireObject::ResultSetMetadata(metadata)) => {
                self.tuple_template = Some(metadata.row_template());
                self.metadata = Some(metadata);
                RsStatus::MetaData
            }
            ReadEvent::Object(WireObject::Status(wire_status)) => match wire_status {
                Status::Success => RsStatus::Success,
                Status::Canceled => RsStatus::Canceled,
                Status::HasMoreData => RsStatus::HasMoreData,
                Status::Error | Status::Undefined(_) => RsStatus::Undefined,
            },
            ReadEvent::Row | ReadEvent::Object(WireObject::Value(DqValue::Array(_))) => {
                RsStatus::Data
            }
            ReadEvent::Object(other) => {
                trace!("unexpected reply object {other:?}");
                RsStatus::Undefined
            }
        };

        if status == RsStatus::Undefined {
            self.status = RsStatus::Error;
            self.dispose_port();
            return Err(DqError::Interface("undefined status in the reply stream"));
        }
        self.status = status;

        match status {
            RsStatus::Success => self.pool_port(),
            RsStatus::Canceled => {
                // v3 servers leave a canceled port in a reusable state
                if let Some(port) = self.port.take() {
                    if port.version() >= ProtocolVersion::Version3.as_i32() {
                        if let Ok(mut core) = self.core.lock() {
                            core.push_port(port);
                        }
                    } else {
                        port.close();
                    }
                }
            }
            _ => {}
        }

        Ok(status)
    }

    /// Advances to the next row.
    ///
    /// Returns `false` when the data is exhausted; the remaining reply
    /// stream is then drained so the port can be reused.
    pub fn next(&mut self) -> DqResult<bool> {
        if self.row_count == -1 {
            return Ok(false);
        }

        self.advance_row().map_err(|e| match e {
            DqError::Io { source } => {
                warn!("connection ran out: {source}");
                DqError::connection_ran_out()
            }
            e => e,
        })
    }

    fn advance_row(&mut self) -> DqResult<bool> {
        let mut status;
        loop {
            status = self.get_next_tuple(true)?;
            if status != RsStatus::MetaData {
                break;
            }
        }

        if status != RsStatus::Data {
            self.row = None;
            self.row_count = -1;
            let status = self.get_status(false)?;
            if status == RsStatus::HasMoreData {
                self.get_status(true)?;
            }
            return Ok(false);
        }

        self.row_count += 1;
        Ok(true)
    }

    /// Drives the machine to a status, discarding data.
    ///
    /// With `skip_all`, HAS_MORE_DATA boundaries of multi-statement
    /// replies are crossed as well, so the server's reply stream is fully
    /// consumed before the port is reused.
    pub fn get_status(&mut self, skip_all: bool) -> DqResult<RsStatus> {
        while matches!(
            self.status,
            RsStatus::MetaData | RsStatus::Data | RsStatus::EndOfData
        ) || (skip_all && self.status == RsStatus::HasMoreData)
        {
            self.get_next_tuple(false)?;
        }
        Ok(self.status)
    }

    /// Asks a control connection to cancel this result set's worker.
    ///
    /// The cancellation travels on a different port; this result set will
    /// observe `CANCELED` on its own port.
    pub fn cancel(&self) -> DqResult<()> {
        let worker_id = self
            .port
            .as_ref()
            .ok_or(DqError::Usage("result set has no active worker"))?
            .worker_id();
        self.core.lock()?.cancel_worker(worker_id)
    }

    /// Drains any remaining reply data and detaches. Idempotent, never
    /// fails.
    pub fn close(&mut self) {
        if self.port.is_some()
            && matches!(
                self.status,
                RsStatus::Data | RsStatus::EndOfData | RsStatus::MetaData | RsStatus::HasMoreData
            )
        {
            if let Err(e) = self.get_status(true) {
                trace!("ignoring error while draining a result set: {e}");
            }
        }

        self.status = RsStatus::Undefined;
        self.metadata = None;
        self.tuple_template = None;
        self.row = None;
        self.row_count = 0;
        self.is_closed = true;
    }
}
