//! The payload objects of the wire protocol.

mod column_metadata;
mod decimal;
mod error_level;
mod exception_data;
mod language;
mod resultset_metadata;
mod server_error;
mod sql_type;
mod status;
mod value;
mod word;

pub use column_metadata::{ColumnMetadata, ColumnMetadataBuilder};
pub use decimal::Decimal;
pub use error_level::ErrorLevel;
pub use exception_data::ExceptionData;
pub use language::{country_code, language_code, LanguageSet, LanguageTag};
pub use resultset_metadata::ResultSetMetadata;
pub use server_error::ServerError;
pub use sql_type::SqlType;
pub use status::Status;
pub use value::{DataArray, DqValue};
pub use word::{Word, WordCategory};

use super::{
    class_id,
    io_stream::{InputStream, OutputStream},
    request_type::RequestType,
};
use crate::{DqError, DqResult};

/// Any object that can be framed on the wire.
///
/// Decoding is a closed match over the registered class ids; an id outside
/// the registry fails with [`DqError::ClassNotFound`](crate::DqError).
#[derive(Clone, Debug, PartialEq)]
pub enum WireObject {
    Value(DqValue),
    Status(Status),
    Request(RequestType),
    ErrorLevel(ErrorLevel),
    ExceptionData(ExceptionData),
    ColumnMetadata(ColumnMetadata),
    ResultSetMetadata(ResultSetMetadata),
}

impl WireObject {
    pub fn class_id(&self) -> i32 {
        match self {
            Self::Value(v) => v.class_id(),
            Self::Status(_) => class_id::STATUS,
            Self::Request(_) => class_id::REQUEST,
            Self::ErrorLevel(_) => class_id::ERROR_LEVEL,
            Self::ExceptionData(_) => class_id::EXCEPTION_DATA,
            Self::ColumnMetadata(_) => class_id::COLUMN_META_DATA,
            Self::ResultSetMetadata(_) => class_id::RESULTSET_META_DATA,
        }
    }

    pub(crate) fn parse<R: std::io::Read>(
        class_id: i32,
        stream: &mut InputStream<R>,
    ) -> DqResult<Option<Self>> {
        Ok(Some(match class_id {
            class_id::NONE => return Ok(None),
            class_id::STATUS => Self::Status(Status::parse(stream)?),
            class_id::REQUEST => Self::Request(RequestType::try_from_i32(stream.read_i32()?)?),
            class_id::ERROR_LEVEL => Self::ErrorLevel(ErrorLevel::parse(stream)?),
            class_id::EXCEPTION_DATA => Self::ExceptionData(ExceptionData::parse(stream)?),
            class_id::COLUMN_META_DATA => Self::ColumnMetadata(ColumnMetadata::parse(stream)?),
            class_id::RESULTSET_META_DATA => {
                Self::ResultSetMetadata(ResultSetMetadata::parse(stream)?)
            }
            id if DqValue::is_value_class(id) => Self::Value(DqValue::parse(id, stream)?),
            id => return Err(DqError::ClassNotFound(id)),
        }))
    }

    pub(crate) fn emit<W: std::io::Write>(&self, stream: &mut OutputStream<W>) -> DqResult<()> {
        match self {
            Self::Value(v) => v.emit(stream),
            Self::Status(v) => v.emit(stream),
            Self::Request(v) => stream.write_i32(v.as_i32()),
            Self::ErrorLevel(v) => v.emit(stream),
            Self::ExceptionData(v) => v.emit(stream),
            Self::ColumnMetadata(v) => v.emit(stream),
            Self::ResultSetMetadata(v) => v.emit(stream),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WireObject;
    use crate::protocol::io_stream::{InputStream, OutputStream};
    use crate::protocol::parts::{ExceptionData, Status};
    use crate::protocol::request_type::RequestType;
    use crate::DqError;

    fn roundtrip(object: &WireObject) -> Option<WireObject> {
        let mut buf = Vec::new();
        let mut out = OutputStream::new(&mut buf);
        out.write_object(Some(object)).unwrap();
        let mut input = InputStream::new(std::io::Cursor::new(buf));
        input.read_object().unwrap()
    }

    #[test]
    fn control_objects_roundtrip() {
        for object in [
            WireObject::Status(Status::Success),
            WireObject::Request(RequestType::BeginWorker),
            WireObject::ErrorLevel(super::ErrorLevel::User),
            WireObject::ExceptionData(ExceptionData::new(
                crate::error_code::CLIENT_NOT_EXIST,
                vec!["1".to_string()],
                "Server".to_string(),
                "Worker.cpp".to_string(),
                42,
            )),
        ] {
            assert_eq!(roundtrip(&object), Some(object));
        }
    }

    #[test]
    fn unregistered_class_id_fails() {
        let mut buf = Vec::new();
        let mut out = OutputStream::new(&mut buf);
        out.write_i32(23).unwrap(); // retired OBJECTID_DATA id
        let mut input = InputStream::new(std::io::Cursor::new(buf));
        assert!(matches!(
            input.read_object().unwrap_err(),
            DqError::ClassNotFound(23)
        ));
    }
}
