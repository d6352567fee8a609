use super::datasource::AmDsCore;
use super::prepared_statement::PreparedStatement;
use super::result_set::ResultSet;
use crate::error_code;
use crate::protocol::parts::{DataArray, ServerError};
use crate::protocol::{ProtocolVersion, RequestType};
use crate::{DqError, DqResult};
use std::collections::HashMap;
use std::sync::Arc;

/// A logged-in context on one database.
///
/// A session is valid while its id is non-zero; ending it (or closing the
/// data source) invalidates the handle. The session also caches prepared
/// statements by their SQL text, so repeated executions reuse the
/// server-side plan.
#[derive(Debug)]
pub struct Session {
    core: AmDsCore,
    dbname: String,
    username: Option<String>,
    session_id: i32,
    prepared_map: HashMap<String, PreparedStatement>,
}

impl Session {
    pub(crate) fn new(
        core: AmDsCore,
        dbname: &str,
        username: Option<&str>,
        session_id: i32,
    ) -> Self {
        Self {
            core,
            dbname: dbname.to_string(),
            username: username.map(str::to_string),
            session_id,
            prepared_map: HashMap::new(),
        }
    }

    pub fn dbname(&self) -> &str {
        &self.dbname
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn session_id(&self) -> i32 {
        self.session_id
    }

    /// A session is valid iff its id is non-zero.
    pub fn is_valid(&self) -> bool {
        self.session_id != 0
    }

    /// The prepared statements cached on this session, keyed by SQL text.
    pub fn prepared_map(&self) -> &HashMap<String, PreparedStatement> {
        &self.prepared_map
    }

    fn session_not_available() -> DqError {
        DqError::Db {
            source: ServerError::local(error_code::SESSION_NOT_AVAILABLE, vec![]),
        }
    }

    /// Executes a statement and returns the result set bound to the
    /// worker's port.
    pub fn execute(
        &mut self,
        statement: &str,
        parameters: Option<&DataArray>,
    ) -> DqResult<ResultSet> {
        if !self.is_valid() {
            return Err(Self::session_not_available());
        }
        debug!("execute: {statement}");
        let mut port = self.core.lock()?.begin_worker()?;

        let outcome: DqResult<()> = (|| {
            port.write_request(RequestType::ExecuteStatement)?;
            port.write_integer(self.session_id)?;
            port.write_string_value(statement)?;
            port.write_parameters(parameters)?;
            port.flush()
        })();
        if let Err(e) = outcome {
            port.close();
            return Err(e);
        }

        Ok(ResultSet::new(Arc::clone(&self.core), port))
    }

    /// Executes a previously prepared statement.
    pub fn execute_prepare(
        &mut self,
        prepared: &PreparedStatement,
        parameters: Option<&DataArray>,
    ) -> DqResult<ResultSet> {
        if !self.is_valid() {
            return Err(Self::session_not_available());
        }
        debug!("execute_prepare: id={}", prepared.prepare_id());
        let mut port = self.core.lock()?.begin_worker()?;

        let outcome: DqResult<()> = (|| {
            port.write_request(RequestType::ExecutePrepareStatement)?;
            port.write_integer(self.session_id)?;
            port.write_integer(prepared.prepare_id())?;
            port.write_parameters(parameters)?;
            port.flush()
        })();
        if let Err(e) = outcome {
            port.close();
            return Err(e);
        }

        Ok(ResultSet::new(Arc::clone(&self.core), port))
    }

    /// Compiles a statement into a server-side plan and caches the handle
    /// under its SQL text.
    ///
    /// Requires protocol v3; the check happens before anything is written
    /// to the wire.
    pub fn create_prepare_statement(&mut self, statement: &str) -> DqResult<PreparedStatement> {
        let mut core = self.core.lock()?;
        if core.master_version() < ProtocolVersion::Version3.as_i32() {
            return Err(DqError::NotSupported(
                "prepared statements need protocol version 3",
            ));
        }

        let mut port = core.begin_worker()?;
        let outcome: DqResult<i32> = (|| {
            port.write_request(RequestType::PrepareStatement2)?;
            port.write_integer(self.session_id)?;
            port.write_string_value(statement)?;
            port.flush()?;
            let prepare_id = port.read_integer()?;
            port.read_status()?;
            Ok(prepare_id)
        })();

        match outcome {
            Ok(prepare_id) => {
                core.push_port(port);
                drop(core);
                let prepared = PreparedStatement::new(prepare_id);
                self.prepared_map
                    .insert(statement.to_string(), prepared.clone());
                Ok(prepared)
            }
            Err(e @ DqError::Db { .. }) => {
                core.reclaim_port(port);
                Err(e)
            }
            Err(e) => {
                port.close();
                Err(e)
            }
        }
    }

    /// Drops a server-side plan.
    pub fn erase_prepare_statement(&mut self, prepare_id: i32) -> DqResult<()> {
        let mut core = self.core.lock()?;
        let mut port = core.begin_worker()?;
        let outcome: DqResult<()> = (|| {
            port.write_request(RequestType::ErasePrepareStatement2)?;
            port.write_integer(self.session_id)?;
            port.write_integer(prepare_id)?;
            port.flush()?;
            port.read_status()?;
            Ok(())
        })();

        match outcome {
            Ok(()) => {
                core.push_port(port);
                Ok(())
            }
            Err(e @ DqError::Db { .. }) => {
                core.reclaim_port(port);
                Err(e)
            }
            Err(e) => {
                port.close();
                Err(e)
            }
        }
    }

    /// Ends the session on the server without touching the data source's
    /// session registry. Never fails; returns the prior session id.
    pub(crate) fn close_internal(&mut self) -> i32 {
        if !self.prepared_map.is_empty() {
            self.close_prepared();
        }

        let session_id = self.session_id;
        if self.is_valid() {
            let outcome = self
                .core
                .lock()
                .map_err(DqError::from)
                .and_then(|mut core| core.end_session(session_id));
            if let Err(e) = outcome {
                trace!("ignoring error while ending session {session_id}: {e}");
            }
            self.session_id = 0;
        }
        session_id
    }

    /// Drops all cached prepared statements, swallowing errors.
    pub fn close_prepared(&mut self) {
        let prepare_ids: Vec<i32> = self
            .prepared_map
            .values()
            .map(PreparedStatement::prepare_id)
            .filter(|id| *id != 0)
            .collect();
        self.prepared_map.clear();
        for prepare_id in prepare_ids {
            if let Err(e) = self.erase_prepare_statement(prepare_id) {
                trace!("ignoring error while erasing prepared statement: {e}");
            }
        }
    }

    /// Ends the session and removes it from the data source.
    pub fn close(&mut self) {
        if self.session_id == 0 {
            return;
        }
        let session_id = self.close_internal();
        if let Ok(mut core) = self.core.lock() {
            core.remove_session(session_id);
        }
    }
}
