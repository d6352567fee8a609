use super::connection::ConnectionInner;
use crate::conn::{PreparedStatement, RsStatus};
use crate::protocol::parts::{DataArray, DqValue, SqlType};
use crate::protocol::ProtocolVersion;
use crate::{DqError, DqResult};
use std::sync::{Arc, Mutex};

/// Describes one column of a fetched result, in the classic
/// seven-element shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDescription {
    pub name: String,
    pub sql_type: SqlType,
    pub display_size: i32,
    /// Not transported by the protocol; always 0.
    pub internal_size: i32,
    pub precision: i32,
    pub scale: i32,
    pub not_nullable: bool,
}

/// Statement execution and row fetching on a connection.
///
/// Placeholders use the positional `?` style. With the `prepared` flag
/// (see [`Connection::cursor`](crate::Connection::cursor)), each distinct
/// statement text is compiled once on the server and re-executed through
/// the session's prepared-statement cache.
#[derive(Debug)]
pub struct Cursor {
    conn: Arc<Mutex<ConnectionInner>>,
    prepared: bool,
    arraysize: usize,
    description: Vec<ColumnDescription>,
    described: bool,
    is_closed: bool,
}

impl Cursor {
    pub(crate) fn new(conn: Arc<Mutex<ConnectionInner>>, prepared: bool) -> Self {
        Self {
            conn,
            prepared,
            arraysize: 1,
            description: Vec::new(),
            described: false,
            is_closed: false,
        }
    }

    /// Number of rows [`fetchmany`](Self::fetchmany) returns by default.
    pub fn arraysize(&self) -> usize {
        self.arraysize
    }

    pub fn set_arraysize(&mut self, arraysize: usize) -> DqResult<()> {
        if arraysize == 0 {
            return Err(DqError::Usage("arraysize must be at least 1"));
        }
        self.arraysize = arraysize;
        Ok(())
    }

    /// Column descriptions of the current result, available after the
    /// first fetched row.
    pub fn description(&self) -> &[ColumnDescription] {
        &self.description
    }

    /// Number of rows fetched from the current result; -1 when exhausted
    /// or before the first execute.
    pub fn rowcount(&self) -> i64 {
        self.conn
            .lock()
            .ok()
            .and_then(|inner| inner.resultset.as_ref().map(crate::conn::ResultSet::row_count))
            .unwrap_or(-1)
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    /// Executes a statement with positional parameters.
    pub fn execute(&mut self, operation: &str, parameters: &[DqValue]) -> DqResult<()> {
        if self.is_closed {
            return Err(DqError::Usage("cursor is closed"));
        }
        if operation.is_empty() {
            return Err(DqError::Usage("empty statement"));
        }

        let mut inner = self.conn.lock()?;
        if inner.is_closed() {
            return Err(DqError::Usage("connection is closed"));
        }
        // result sets of this client's generation require v4
        if inner.master_version() < ProtocolVersion::Version4.as_i32() {
            return Err(DqError::NotSupported(
                "statement execution needs protocol version 4",
            ));
        }

        // a previous result must be fully consumed before the session is
        // used again
        if let Some(mut resultset) = inner.resultset.take() {
            resultset.close();
        }
        self.description.clear();
        self.described = false;

        if !inner.is_autocommit() && !inner.in_transaction() {
            inner.begin_transaction(None)?;
        }

        let resultset = if self.prepared {
            let prepared = match inner.session.prepared_map().get(operation) {
                Some(prepared) => prepared.clone(),
                None => PreparedStatement::create(&mut inner.session, operation)?,
            };
            let parameters: DataArray = parameters.to_vec().into();
            inner.session.execute_prepare(&prepared, Some(&parameters))
        } else {
            let parameters: Option<DataArray> = if parameters.is_empty() {
                None
            } else {
                Some(parameters.to_vec().into())
            };
            inner.session.execute(operation, parameters.as_ref())
        };

        match resultset {
            Ok(resultset) => {
                inner.resultset = Some(resultset);
                Ok(())
            }
            Err(DqError::Io { source }) => {
                warn!("connection ran out: {source}");
                Err(DqError::connection_ran_out())
            }
            Err(e) => Err(e),
        }
    }

    /// Executes a statement once per parameter set.
    pub fn executemany(&mut self, operation: &str, param_sets: &[Vec<DqValue>]) -> DqResult<()> {
        if param_sets.is_empty() {
            return Err(DqError::Usage("executemany needs at least one parameter set"));
        }
        for parameters in param_sets {
            self.execute(operation, parameters)?;
        }
        Ok(())
    }

    /// Fetches the next row, or `None` when the result is exhausted.
    pub fn fetchone(&mut self) -> DqResult<Option<Vec<DqValue>>> {
        let mut inner = self.conn.lock()?;
        let resultset = inner
            .resultset
            .as_mut()
            .ok_or(DqError::Usage("no results to read"))?;

        if !resultset.next()? {
            return Ok(None);
        }

        if !self.described {
            if let Some(metadata) = resultset.metadata() {
                self.description = metadata
                    .iter()
                    .map(|column| ColumnDescription {
                        name: column.column_name().to_string(),
                        sql_type: column.sql_type(),
                        display_size: column.display_size(),
                        internal_size: 0,
                        precision: column.precision(),
                        scale: column.scale(),
                        not_nullable: column.is_not_nullable(),
                    })
                    .collect();
                self.described = true;
            }
        }

        resultset.current_row().map(Some)
    }

    /// Fetches up to `size` rows (default: [`arraysize`](Self::arraysize)).
    pub fn fetchmany(&mut self, size: Option<usize>) -> DqResult<Vec<Vec<DqValue>>> {
        if size == Some(0) {
            return Err(DqError::Usage("size must be at least 1"));
        }
        let count = size.unwrap_or(self.arraysize);
        let mut rows = Vec::new();
        for _ in 0..count {
            match self.fetchone()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    /// Fetches all remaining rows.
    pub fn fetchall(&mut self) -> DqResult<Vec<Vec<DqValue>>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetchone()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Drains the server's reply (if any) and detaches from the
    /// connection. Idempotent, never fails.
    pub fn close(&mut self) {
        if self.is_closed {
            return;
        }
        if let Ok(mut inner) = self.conn.lock() {
            if let Some(mut resultset) = inner.resultset.take() {
                if !resultset.is_closed() && resultset.last_status() != RsStatus::Undefined {
                    resultset.close();
                }
            }
            inner.cursor_live = false;
        }
        self.arraysize = 1;
        self.description.clear();
        self.described = false;
        self.is_closed = true;
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        self.close();
    }
}
