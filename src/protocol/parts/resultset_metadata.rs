use super::{ColumnMetadata, DataArray};
use crate::protocol::io_stream::{InputStream, OutputStream};
use crate::DqResult;
use std::ops::Deref;

/// List of metadata of the columns of a result set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSetMetadata(Vec<ColumnMetadata>);

impl Deref for ResultSetMetadata {
    type Target = Vec<ColumnMetadata>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ResultSetMetadata {
    /// Allocates a row with the right element variant for each column.
    pub fn row_template(&self) -> DataArray {
        self.0.iter().map(ColumnMetadata::row_element).collect()
    }

    pub(crate) fn parse<R: std::io::Read>(stream: &mut InputStream<R>) -> DqResult<Self> {
        let count = stream.read_i32()?;
        trace!("ResultSetMetadata::parse: got count = {count}");
        let mut columns = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            columns.push(ColumnMetadata::parse(stream)?);
        }
        Ok(Self(columns))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn emit<W: std::io::Write>(&self, stream: &mut OutputStream<W>) -> DqResult<()> {
        stream.write_i32(self.0.len() as i32)?;
        for column in &self.0 {
            column.emit(stream)?;
        }
        Ok(())
    }
}

impl From<Vec<ColumnMetadata>> for ResultSetMetadata {
    fn from(columns: Vec<ColumnMetadata>) -> Self {
        Self(columns)
    }
}

impl std::fmt::Display for ResultSetMetadata {
    // Writes the column aliases as a header line
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(fmt)?;
        for column_metadata in &self.0 {
            write!(fmt, "{}, ", column_metadata.column_alias())?;
        }
        writeln!(fmt)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ResultSetMetadata;
    use crate::protocol::io_stream::{InputStream, OutputStream};
    use crate::protocol::parts::{ColumnMetadataBuilder, DqValue, SqlType};

    #[test]
    fn roundtrip_and_row_template() {
        let metadata: ResultSetMetadata = vec![
            ColumnMetadataBuilder::new()
                .sql_type(SqlType::Integer)
                .column_name("id")
                .build(),
            ColumnMetadataBuilder::new()
                .sql_type(SqlType::CharacterVarying)
                .column_name("name")
                .build(),
            ColumnMetadataBuilder::new()
                .sql_type(SqlType::Integer)
                .column_name("tags")
                .cardinality(-1)
                .build(),
        ]
        .into();

        let mut buf = Vec::new();
        metadata.emit(&mut OutputStream::new(&mut buf)).unwrap();
        let mut input = InputStream::new(std::io::Cursor::new(buf));
        let back = ResultSetMetadata::parse(&mut input).unwrap();
        assert_eq!(back, metadata);

        let template = back.row_template();
        assert_eq!(template.len(), 3);
        assert_eq!(template[0], DqValue::Int(0));
        assert_eq!(template[1], DqValue::String(String::new()));
        assert!(matches!(template[2], DqValue::Array(_)));
    }
}
