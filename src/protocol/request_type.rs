use crate::{DqError, DqResult};

// The action requested from the database server. A request rides the wire
// as a framed 32-bit integer (class id REQUEST).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RequestType {
    BeginConnection = 1,
    EndConnection = 2,
    BeginSession = 3,
    EndSession = 4,
    BeginWorker = 5,
    CancelWorker = 6,
    Shutdown = 7,
    ExecuteStatement = 8,
    PrepareStatement = 9,
    ExecutePrepareStatement = 10,
    ErasePrepareStatement = 11,
    ReuseConnection = 12,
    NoReuseConnection = 13,
    CheckAvailability = 14,
    // prepares through the session worker, required from protocol v3 on
    PrepareStatement2 = 15,
    ErasePrepareStatement2 = 16,
    // session begin/end with credentials, protocol v5
    BeginSession2 = 17,
    EndSession2 = 18,
    CreateUser = 19,
    DropUser = 20,
    ChangeOwnPassword = 21,
    ChangePassword = 22,
    Shutdown2 = 23,
    Sync = 101,
    QueryProductVersion = 201,
}

impl RequestType {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn try_from_i32(code: i32) -> DqResult<Self> {
        Ok(match code {
            1 => Self::BeginConnection,
            2 => Self::EndConnection,
            3 => Self::BeginSession,
            4 => Self::EndSession,
            5 => Self::BeginWorker,
            6 => Self::CancelWorker,
            7 => Self::Shutdown,
            8 => Self::ExecuteStatement,
            9 => Self::PrepareStatement,
            10 => Self::ExecutePrepareStatement,
            11 => Self::ErasePrepareStatement,
            12 => Self::ReuseConnection,
            13 => Self::NoReuseConnection,
            14 => Self::CheckAvailability,
            15 => Self::PrepareStatement2,
            16 => Self::ErasePrepareStatement2,
            17 => Self::BeginSession2,
            18 => Self::EndSession2,
            19 => Self::CreateUser,
            20 => Self::DropUser,
            21 => Self::ChangeOwnPassword,
            22 => Self::ChangePassword,
            23 => Self::Shutdown2,
            101 => Self::Sync,
            201 => Self::QueryProductVersion,
            _ => {
                return Err(DqError::InterfaceDetailed(format!(
                    "unknown request code {code}"
                )))
            }
        })
    }
}

/// Target of a CHECK_AVAILABILITY request.
///
/// `Database` is defined by the protocol but not issued by this client.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AvailabilityTarget {
    Server = 0,
    Database = 1,
}

#[cfg(test)]
mod tests {
    use super::RequestType;

    #[test]
    fn codes_survive_the_integer_roundtrip() {
        for rt in [
            RequestType::BeginConnection,
            RequestType::BeginWorker,
            RequestType::ExecuteStatement,
            RequestType::PrepareStatement2,
            RequestType::Shutdown2,
            RequestType::Sync,
            RequestType::QueryProductVersion,
        ] {
            assert_eq!(RequestType::try_from_i32(rt.as_i32()).unwrap(), rt);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(RequestType::try_from_i32(99).is_err());
    }
}
