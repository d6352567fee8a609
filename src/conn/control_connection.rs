use super::port::Port;
use crate::protocol::{AvailabilityTarget, RequestType};
use crate::{DqError, DqResult};

/// A connection reserved for session and worker lifecycle messages.
///
/// The server runs one dedicated thread per control connection; result-set
/// data never travels here, only on the worker ports it hands out.
#[derive(Debug)]
pub(crate) struct ControlConnection {
    port: Option<Port>,
}

impl ControlConnection {
    pub fn new(port: Port) -> Self {
        Self { port: Some(port) }
    }

    fn port_mut(&mut self) -> DqResult<&mut Port> {
        self.port
            .as_mut()
            .ok_or(DqError::Unexpected("control connection is closed"))
    }

    /// First half of BEGIN_CONNECTION: asks the server for a fresh slave
    /// id for a new control connection. The caller opens the new port and
    /// then calls [`finish_begin_connection`](Self::finish_begin_connection).
    pub fn begin_connection_request(&mut self) -> DqResult<i32> {
        let port = self.port_mut()?;
        port.write_request(RequestType::BeginConnection)?;
        port.flush()?;
        port.read_integer()
    }

    /// Second half of BEGIN_CONNECTION: both the old and the new port
    /// report a status.
    pub fn finish_begin_connection(&mut self, new_port: &mut Port) -> DqResult<()> {
        self.port_mut()?.read_status()?;
        new_port.read_status()?;
        Ok(())
    }

    /// BEGIN_WORKER with the given slave id (`ANY` to let the server
    /// allocate a port). Returns the server's (slave id, worker id).
    pub fn begin_worker_request(&mut self, slave_id: i32) -> DqResult<(i32, i32)> {
        let port = self.port_mut()?;
        port.write_request(RequestType::BeginWorker)?;
        port.write_integer(slave_id)?;
        port.flush()?;
        let slave_id = port.read_integer()?;
        let worker_id = port.read_integer()?;
        port.read_status()?;
        Ok((slave_id, worker_id))
    }

    /// Fire-and-forget cancellation of an in-flight worker.
    pub fn cancel_worker(&mut self, worker_id: i32) -> DqResult<()> {
        debug!("cancel_worker({worker_id})");
        let port = self.port_mut()?;
        port.write_request(RequestType::CancelWorker)?;
        port.write_integer(worker_id)?;
        port.flush()?;
        port.read_status()?;
        Ok(())
    }

    /// Tells the server to forget the given slave ids (NO_REUSE_CONNECTION).
    pub fn disconnect_ports(&mut self, slave_ids: &[i32]) -> DqResult<()> {
        debug!("disconnect_ports({slave_ids:?})");
        let port = self.port_mut()?;
        port.write_request(RequestType::NoReuseConnection)?;
        port.write_integer_array(slave_ids)?;
        port.flush()?;
        port.read_status()?;
        Ok(())
    }

    /// CHECK_AVAILABILITY against the server target.
    pub fn is_server_available(&mut self) -> DqResult<bool> {
        let port = self.port_mut()?;
        port.write_request(RequestType::CheckAvailability)?;
        port.write_integer(AvailabilityTarget::Server as i32)?;
        port.flush()?;
        let result = port.read_integer()?;
        port.read_status()?;
        Ok(result == 1)
    }

    /// Sends END_CONNECTION and closes the port. Never fails.
    pub fn close(&mut self) {
        let Some(mut port) = self.port.take() else {
            return;
        };
        let outcome: DqResult<()> = (|| {
            port.write_request(RequestType::EndConnection)?;
            port.flush()?;
            port.read_status()?;
            Ok(())
        })();
        if let Err(e) = outcome {
            trace!("ignoring error while ending a control connection: {e}");
        }
        port.close();
    }
}
