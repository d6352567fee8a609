use crate::protocol::io_stream::{InputStream, OutputStream};
use crate::DqResult;

/// Execution status reported by the server at the end of (a part of) a
/// reply stream.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    Success,
    Error,
    Canceled,
    /// More results of a multi-statement reply follow on the same port.
    HasMoreData,
    /// A status value this client does not know.
    Undefined(i32),
}

impl Status {
    pub fn to_i32(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Error => 1,
            Self::Canceled => 2,
            Self::HasMoreData => 3,
            Self::Undefined(v) => v,
        }
    }

    pub fn from_i32(v: i32) -> Self {
        match v {
            0 => Self::Success,
            1 => Self::Error,
            2 => Self::Canceled,
            3 => Self::HasMoreData,
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

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Error => write!(f, "ERROR"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::HasMoreData => write!(f, "HAS_MORE_DATA"),
            Self::Undefined(v) => write!(f, "UNDEFINED({v})"),
        }
    }
}
