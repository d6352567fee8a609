use super::session::Session;
use crate::DqResult;

/// Handle of a server-side compiled execution plan.
///
/// The id is only meaningful within the session that created the plan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PreparedStatement {
    prepare_id: i32,
}

impl PreparedStatement {
    pub(crate) fn new(prepare_id: i32) -> Self {
        Self { prepare_id }
    }

    pub fn prepare_id(&self) -> i32 {
        self.prepare_id
    }

    /// Creates a prepared statement on the session (and caches it there).
    pub fn create(session: &mut Session, statement: &str) -> DqResult<Self> {
        session.create_prepare_statement(statement)
    }

    /// Drops the server-side plan. Errors are swallowed; the id is zeroed
    /// either way.
    pub fn close(&mut self, session: &mut Session) {
        if self.prepare_id != 0 {
            if let Err(e) = session.erase_prepare_statement(self.prepare_id) {
                trace!("ignoring error while erasing prepared statement: {e}");
            }
            self.prepare_id = 0;
        }
    }
}
