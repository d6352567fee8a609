use super::cursor::Cursor;
use crate::conn::{ConnectParams, ResultSet, RsStatus, Session};
use crate::protocol::version_of;
use crate::{DqError, DqResult};
use std::sync::{Arc, Mutex};

/// Transaction modes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransactionMode {
    ReadWrite,
    ReadOnly,
    ReadOnlyUsingSnapshot,
}

/// Transaction isolation levels.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IsolationLevel {
    ReadUncommitted = 0x1,
    /// The default.
    ReadCommitted = 0x2,
    RepeatableRead = 0x4,
    Serializable = 0x8,
    /// Snapshot isolation; implies a read-only transaction.
    UsingSnapshot = 0x100,
}

#[derive(Debug)]
pub(crate) struct ConnectionInner {
    pub(crate) session: Session,
    master_id: i32,
    host: String,
    portnum: u16,
    protocol_version: i32,
    charset: String,
    autocommit: bool,
    is_closed: bool,
    readonly: bool,
    set_readmode: bool,
    in_transaction: bool,
    isolation: IsolationLevel,
    pub(crate) cursor_live: bool,
    pub(crate) resultset: Option<ResultSet>,
}

impl ConnectionInner {
    pub(crate) fn master_version(&self) -> i32 {
        version_of(self.master_id)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.is_closed
    }

    pub(crate) fn is_autocommit(&self) -> bool {
        self.autocommit
    }

    pub(crate) fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    // Executes a statement whose result carries no rows of interest and
    // drains it completely.
    fn execute_and_drain(&mut self, statement: &str) -> DqResult<()> {
        let mut resultset = self.session.execute(statement, None)?;
        let status = resultset.get_status(true)?;
        if status == RsStatus::Error {
            return Err(DqError::Unexpected("status error returned from the server"));
        }
        Ok(())
    }

    pub(crate) fn begin_transaction(
        &mut self,
        transaction_mode: Option<TransactionMode>,
    ) -> DqResult<()> {
        if self.autocommit {
            return Err(DqError::Usage("autocommit is on"));
        }

        let transaction_mode = transaction_mode.unwrap_or(if self.readonly {
            if self.isolation == IsolationLevel::UsingSnapshot {
                TransactionMode::ReadOnlyUsingSnapshot
            } else {
                TransactionMode::ReadOnly
            }
        } else {
            TransactionMode::ReadWrite
        });

        let mut operation = String::from("start transaction ");
        operation.push_str(match transaction_mode {
            TransactionMode::ReadWrite => "read write",
            TransactionMode::ReadOnly => "read only",
            TransactionMode::ReadOnlyUsingSnapshot => "read only, using snapshot",
        });
        match self.isolation {
            IsolationLevel::ReadCommitted => {
                operation.push_str(", isolation level read committed");
            }
            IsolationLevel::ReadUncommitted => {
                operation.push_str(", isolation level read uncommitted");
            }
            IsolationLevel::RepeatableRead => {
                operation.push_str(", isolation level repeatable read");
            }
            IsolationLevel::Serializable => {
                operation.push_str(", isolation level serializable");
            }
            // snapshot is part of the mode, not of the isolation clause
            IsolationLevel::UsingSnapshot => {}
        }

        self.execute_and_drain(&operation)?;
        self.in_transaction = true;
        Ok(())
    }

    fn close_lingering_resultset(&mut self) {
        if let Some(mut resultset) = self.resultset.take() {
            resultset.close();
        }
    }
}

/// A connection to a database, as handed out by
/// [`connect`](crate::connect).
///
/// Statements run through a [`Cursor`]; at most one cursor is live per
/// connection at any time. Transaction control lives here: with
/// `autocommit` off, the first `execute` of a cursor implicitly begins a
/// transaction with the connection's current mode and isolation level.
#[derive(Clone, Debug)]
pub struct Connection {
    inner: Arc<Mutex<ConnectionInner>>,
}

impl Connection {
    pub(crate) fn new(params: &ConnectParams, session: Session, master_id: i32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ConnectionInner {
                session,
                master_id,
                host: params.host().to_string(),
                portnum: params.port(),
                protocol_version: params.protocol_version(),
                charset: params.charset().to_string(),
                autocommit: params.autocommit(),
                is_closed: false,
                readonly: false,
                set_readmode: false,
                in_transaction: false,
                isolation: IsolationLevel::ReadCommitted,
                cursor_live: false,
                resultset: None,
            })),
        }
    }

    /// (host, port, protocol version) of this connection.
    pub fn info(&self) -> DqResult<(String, u16, i32)> {
        let inner = self.inner.lock()?;
        Ok((inner.host.clone(), inner.portnum, inner.protocol_version))
    }

    /// The master id the server confirmed at handshake.
    pub fn master_id(&self) -> DqResult<i32> {
        Ok(self.inner.lock()?.master_id)
    }

    pub fn charset(&self) -> DqResult<String> {
        Ok(self.inner.lock()?.charset.clone())
    }

    pub fn is_autocommit(&self) -> DqResult<bool> {
        Ok(self.inner.lock()?.autocommit)
    }

    pub fn in_transaction(&self) -> DqResult<bool> {
        Ok(self.inner.lock()?.in_transaction)
    }

    pub fn is_readonly(&self) -> DqResult<bool> {
        Ok(self.inner.lock()?.readonly)
    }

    pub fn isolation_level(&self) -> DqResult<IsolationLevel> {
        Ok(self.inner.lock()?.isolation)
    }

    /// Creates a cursor; with `prepared`, statement texts are compiled
    /// once and re-executed through the session's prepared-statement
    /// cache.
    ///
    /// # Errors
    ///
    /// `DqError::Usage` while another cursor is live on this connection.
    pub fn cursor(&self, prepared: bool) -> DqResult<Cursor> {
        let mut inner = self.inner.lock()?;
        if inner.cursor_live {
            return Err(DqError::Usage(
                "cursor already exists, close it before creating a new one",
            ));
        }
        inner.cursor_live = true;
        Ok(Cursor::new(Arc::clone(&self.inner), prepared))
    }

    /// Begins a transaction explicitly.
    ///
    /// Only meaningful with `autocommit` off; without a mode, the mode is
    /// derived from the read-only flag and the isolation level.
    pub fn begin_transaction(
        &self,
        transaction_mode: Option<TransactionMode>,
    ) -> DqResult<()> {
        let mut inner = self.inner.lock()?;
        if inner.is_closed {
            return Err(DqError::Usage("connection is closed"));
        }
        inner.begin_transaction(transaction_mode)
    }

    /// Commits the current transaction.
    pub fn commit(&self) -> DqResult<()> {
        let mut inner = self.inner.lock()?;
        if inner.autocommit {
            return Err(DqError::Usage(
                "autocommit is on, create the connection with autocommit off to use this method",
            ));
        }
        if inner.is_closed {
            return Err(DqError::Usage("connection is closed"));
        }
        if inner.in_transaction {
            inner.close_lingering_resultset();
            inner.execute_and_drain("commit")?;
            inner.in_transaction = false;
        }
        Ok(())
    }

    /// Rolls back the current transaction.
    pub fn rollback(&self) -> DqResult<()> {
        let mut inner = self.inner.lock()?;
        if inner.autocommit {
            return Err(DqError::Usage("autocommit is on"));
        }
        if inner.is_closed {
            return Err(DqError::Usage("connection is closed"));
        }
        if inner.in_transaction {
            inner.close_lingering_resultset();
            inner.execute_and_drain("rollback")?;
            inner.in_transaction = false;
        }
        Ok(())
    }

    /// Switches the connection's read-only mode.
    ///
    /// Must not be called inside a transaction. With snapshot isolation,
    /// read-only is implied and cannot be turned off.
    pub fn set_readonly(&self, readonly: bool) -> DqResult<()> {
        let mut inner = self.inner.lock()?;
        if inner.is_closed {
            return Err(DqError::Usage("connection is closed"));
        }
        if inner.in_transaction {
            return Err(DqError::Usage("already in transaction"));
        }
        if inner.isolation == IsolationLevel::UsingSnapshot {
            if readonly {
                return Ok(());
            }
            return Err(DqError::Usage(
                "snapshot isolation implies a read only transaction",
            ));
        }

        if !inner.set_readmode || inner.readonly != readonly {
            inner.execute_and_drain(if readonly {
                "set transaction read only"
            } else {
                "set transaction read write"
            })?;
            inner.set_readmode = true;
        }
        inner.readonly = readonly;
        Ok(())
    }

    /// Switches the transaction isolation level.
    ///
    /// Must not be called inside a transaction. Setting
    /// [`IsolationLevel::UsingSnapshot`] implicitly forces read-only mode.
    pub fn set_transaction_isolation(&self, isolation: IsolationLevel) -> DqResult<()> {
        let mut inner = self.inner.lock()?;
        if inner.is_closed {
            return Err(DqError::Usage("connection is closed"));
        }
        if inner.in_transaction {
            return Err(DqError::Usage("already in transaction"));
        }

        let operation = match isolation {
            IsolationLevel::ReadCommitted => "set transaction isolation level read committed",
            IsolationLevel::ReadUncommitted => "set transaction isolation level read uncommitted",
            IsolationLevel::RepeatableRead => "set transaction isolation level repeatable read",
            IsolationLevel::Serializable => "set transaction isolation level serializable",
            IsolationLevel::UsingSnapshot => {
                // snapshot requires read-only mode first
                if !inner.set_readmode || !inner.readonly {
                    inner.execute_and_drain("set transaction read only")?;
                    inner.set_readmode = true;
                }
                inner.readonly = true;
                "set transaction read only, using snapshot"
            }
        };

        inner.execute_and_drain(operation)?;
        inner.isolation = isolation;
        Ok(())
    }

    /// Closes the cursor state and the session. Idempotent, never fails.
    pub fn close(&self) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if !inner.is_closed {
            inner.close_lingering_resultset();
            inner.cursor_live = false;
            inner.session.close();
            inner.is_closed = true;
        }
    }
}
