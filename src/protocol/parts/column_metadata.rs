use super::{DataArray, Decimal, DqValue, LanguageSet, SqlType, Word};
use crate::protocol::io_stream::{InputStream, OutputStream};
use crate::DqResult;
use time::{Date, Month, PrimitiveDateTime, Time};

const AUTO_INCREMENT: i32 = 1 << 0;
const CASE_INSENSITIVE: i32 = 1 << 1;
const UNSIGNED: i32 = 1 << 2;
const NOT_SEARCHABLE: i32 = 1 << 3;
const READ_ONLY: i32 = 1 << 4;
const NOT_NULL: i32 = 1 << 5;
const UNIQUE: i32 = 1 << 6;

/// Metadata of one result column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnMetadata {
    sql_type: SqlType,
    type_name: String,
    column_name: String,
    table_name: String,
    database_name: String,
    column_alias: String,
    table_alias: String,
    display_size: i32,
    precision: i32,
    scale: i32,
    /// 0 for a scalar column, otherwise the array element count.
    cardinality: i32,
    flags: i32,
}

impl ColumnMetadata {
    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn column_alias(&self) -> &str {
        &self.column_alias
    }

    pub fn table_alias(&self) -> &str {
        &self.table_alias
    }

    pub fn display_size(&self) -> i32 {
        self.display_size
    }

    pub fn precision(&self) -> i32 {
        self.precision
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn cardinality(&self) -> i32 {
        self.cardinality
    }

    pub fn is_array(&self) -> bool {
        self.cardinality != 0
    }

    pub fn is_auto_increment(&self) -> bool {
        self.flags & AUTO_INCREMENT != 0
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.flags & CASE_INSENSITIVE != 0
    }

    pub fn is_unsigned(&self) -> bool {
        self.flags & UNSIGNED != 0
    }

    pub fn is_not_searchable(&self) -> bool {
        self.flags & NOT_SEARCHABLE != 0
    }

    pub fn is_read_only(&self) -> bool {
        self.flags & READ_ONLY != 0
    }

    pub fn is_not_nullable(&self) -> bool {
        self.flags & NOT_NULL != 0
    }

    pub fn is_unique(&self) -> bool {
        self.flags & UNIQUE != 0
    }

    /// The value variant a field of this column decodes into.
    ///
    /// Array columns always use the self-describing row format; SQL types
    /// this client has no value mapping for produce `Null` placeholders.
    pub fn row_element(&self) -> DqValue {
        if self.is_array() {
            return DqValue::Array(DataArray::new());
        }
        match self.sql_type {
            SqlType::Character
            | SqlType::CharacterVarying
            | SqlType::NationalCharacter
            | SqlType::NationalCharacterVarying => DqValue::String(String::new()),
            SqlType::Binary | SqlType::BinaryVarying => DqValue::Binary(Vec::new()),
            SqlType::Integer => DqValue::Int(0),
            SqlType::BigInt => DqValue::Long(0),
            SqlType::Decimal | SqlType::Numeric => DqValue::Decimal(Decimal::zero()),
            SqlType::DoublePrecision => DqValue::Double(0.0),
            SqlType::Date => DqValue::Date(default_date()),
            SqlType::Timestamp => {
                DqValue::DateTime(PrimitiveDateTime::new(default_date(), Time::MIDNIGHT))
            }
            SqlType::Language => DqValue::Language(LanguageSet::new()),
            SqlType::Word => DqValue::Word(Word::default()),
            _ => DqValue::Null,
        }
    }

    pub(crate) fn parse<R: std::io::Read>(stream: &mut InputStream<R>) -> DqResult<Self> {
        let sql_type = SqlType::from_i32(stream.read_i32()?);

        // the strings arrive as a counted block; servers always send six
        let mut strings = [(); 6].map(|()| String::new());
        let count = stream.read_i32()?;
        for (i, slot) in strings.iter_mut().enumerate() {
            if (i as i32) < count {
                *slot = stream.read_string()?;
            }
        }
        let [type_name, column_name, table_name, database_name, column_alias, table_alias] =
            strings;

        // followed by a counted block of ints, always four
        let mut ints = [0_i32; 4];
        let count = stream.read_i32()?;
        for (i, slot) in ints.iter_mut().enumerate() {
            if (i as i32) < count {
                *slot = stream.read_i32()?;
            }
        }
        let [display_size, precision, scale, cardinality] = ints;

        let flags = stream.read_i32()?;

        Ok(Self {
            sql_type,
            type_name,
            column_name,
            table_name,
            database_name,
            column_alias,
            table_alias,
            display_size,
            precision,
            scale,
            cardinality,
            flags,
        })
    }

    pub(crate) fn emit<W: std::io::Write>(&self, stream: &mut OutputStream<W>) -> DqResult<()> {
        stream.write_i32(self.sql_type.to_i32())?;

        stream.write_i32(6)?;
        stream.write_string(&self.type_name)?;
        stream.write_string(&self.column_name)?;
        stream.write_string(&self.table_name)?;
        stream.write_string(&self.database_name)?;
        stream.write_string(&self.column_alias)?;
        stream.write_string(&self.table_alias)?;

        stream.write_i32(4)?;
        stream.write_i32(self.display_size)?;
        stream.write_i32(self.precision)?;
        stream.write_i32(self.scale)?;
        stream.write_i32(self.cardinality)?;

        stream.write_i32(self.flags)
    }
}

fn default_date() -> Date {
    Date::from_calendar_date(1000, Month::January, 1).unwrap_or(Date::MIN)
}

impl std::fmt::Display for ColumnMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.column_alias)
    }
}

/// Builder for server-side use in tests and tools; columns received from
/// the wire are parsed, not built.
#[derive(Debug, Default)]
pub struct ColumnMetadataBuilder {
    inner: ColumnMetadata,
}

impl ColumnMetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sql_type(mut self, sql_type: SqlType) -> Self {
        self.inner.sql_type = sql_type;
        self
    }

    pub fn type_name(mut self, v: &str) -> Self {
        self.inner.type_name = v.to_string();
        self
    }

    pub fn column_name(mut self, v: &str) -> Self {
        self.inner.column_name = v.to_string();
        self.inner.column_alias = v.to_string();
        self
    }

    pub fn column_alias(mut self, v: &str) -> Self {
        self.inner.column_alias = v.to_string();
        self
    }

    pub fn table_name(mut self, v: &str) -> Self {
        self.inner.table_name = v.to_string();
        self
    }

    pub fn database_name(mut self, v: &str) -> Self {
        self.inner.database_name = v.to_string();
        self
    }

    pub fn display_size(mut self, v: i32) -> Self {
        self.inner.display_size = v;
        self
    }

    pub fn precision(mut self, v: i32) -> Self {
        self.inner.precision = v;
        self
    }

    pub fn scale(mut self, v: i32) -> Self {
        self.inner.scale = v;
        self
    }

    pub fn cardinality(mut self, v: i32) -> Self {
        self.inner.cardinality = v;
        self
    }

    pub fn not_nullable(mut self) -> Self {
        self.inner.flags |= NOT_NULL;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.inner.flags |= READ_ONLY;
        self
    }

    pub fn unique(mut self) -> Self {
        self.inner.flags |= UNIQUE;
        self
    }

    pub fn build(self) -> ColumnMetadata {
        self.inner
    }
}
