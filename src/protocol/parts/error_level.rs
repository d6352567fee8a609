use crate::protocol::io_stream::{InputStream, OutputStream};
use crate::DqResult;

/// Severity of a server-reported error.
///
/// A user-level error leaves the port in a usable state; a system-level
/// error makes the port unfit for reuse.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorLevel {
    User,
    System,
    Undefined(i32),
}

impl ErrorLevel {
    pub fn is_user_level(self) -> bool {
        self == Self::User
    }

    pub fn to_i32(self) -> i32 {
        match self {
            Self::User => 1,
            Self::System => 2,
            Self::Undefined(v) => v,
        }
    }

    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::User,
            2 => Self::System,
            v => Self::Undefined(v),
        }
    }

    pub(crate) fn parse<R: std::io::Read>(stream: &mut InputStream<R>) -> DqResult<Self> {
        Ok(Self::from_i32(stream.read_i32()?))
    }

    pub(crate) fn emit<W: std::io::Write>(self, stream: &mut OutputStream<W>) -> DqResult<()> {
        stream.write_i32(self.to_i32())
    }
}
