//! The typed value universe of the wire protocol.

use super::{Decimal, LanguageSet, Word};
use crate::protocol::{
    class_id,
    io_stream::{InputStream, OutputStream},
};
use crate::{DqError, DqResult};
use time::{Date, Month, PrimitiveDateTime, Time};

/// A single typed value, as it appears in rows and statement parameters.
///
/// Integer variants are signed; the unsigned wire class ids decode into
/// the same variants (value range is the contract, not the tag). The
/// 32/64-bit boundaries are enforced by the Rust types.
#[derive(Clone, Debug, PartialEq)]
pub enum DqValue {
    Null,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Binary(Vec<u8>),
    Date(Date),
    DateTime(PrimitiveDateTime),
    Language(LanguageSet),
    Word(Word),
    IntArray(Vec<i32>),
    StringArray(Vec<String>),
    Array(DataArray),
}

impl DqValue {
    pub fn class_id(&self) -> i32 {
        match self {
            Self::Null => class_id::NULL_DATA,
            Self::Int(_) => class_id::INTEGER_DATA,
            Self::Long(_) => class_id::INTEGER64_DATA,
            Self::Float(_) => class_id::FLOAT_DATA,
            Self::Double(_) => class_id::DOUBLE_DATA,
            Self::Decimal(_) => class_id::DECIMAL_DATA,
            Self::String(_) => class_id::STRING_DATA,
            Self::Binary(_) => class_id::BINARY_DATA,
            Self::Date(_) => class_id::DATE_DATA,
            Self::DateTime(_) => class_id::DATE_TIME_DATA,
            Self::Language(_) => class_id::LANGUAGE_DATA,
            Self::Word(_) => class_id::WORD_DATA,
            Self::IntArray(_) => class_id::INTEGER_ARRAY_DATA,
            Self::StringArray(_) => class_id::STRING_ARRAY_DATA,
            Self::Array(_) => class_id::DATA_ARRAY_DATA,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether a wire class id denotes a value (as opposed to a control
    /// object like a status or metadata).
    pub(crate) fn is_value_class(class_id: i32) -> bool {
        matches!(
            class_id,
            class_id::NULL_DATA
                | class_id::INTEGER_DATA
                | class_id::UNSIGNED_INTEGER_DATA
                | class_id::INTEGER64_DATA
                | class_id::UNSIGNED_INTEGER64_DATA
                | class_id::FLOAT_DATA
                | class_id::DOUBLE_DATA
                | class_id::DECIMAL_DATA
                | class_id::STRING_DATA
                | class_id::COMPRESSED_STRING_DATA
                | class_id::BINARY_DATA
                | class_id::DATE_DATA
                | class_id::DATE_TIME_DATA
                | class_id::LANGUAGE_DATA
                | class_id::WORD_DATA
                | class_id::INTEGER_ARRAY_DATA
                | class_id::UNSIGNED_INTEGER_ARRAY_DATA
                | class_id::STRING_ARRAY_DATA
                | class_id::DATA_ARRAY_DATA
        )
    }

    pub(crate) fn parse<R: std::io::Read>(
        class_id: i32,
        stream: &mut InputStream<R>,
    ) -> DqResult<Self> {
        Ok(match class_id {
            class_id::NULL_DATA => Self::Null,
            class_id::INTEGER_DATA | class_id::UNSIGNED_INTEGER_DATA => {
                Self::Int(stream.read_i32()?)
            }
            class_id::INTEGER64_DATA | class_id::UNSIGNED_INTEGER64_DATA => {
                Self::Long(stream.read_i64()?)
            }
            class_id::FLOAT_DATA => Self::Float(stream.read_f32()?),
            class_id::DOUBLE_DATA => Self::Double(stream.read_f64()?),
            class_id::DECIMAL_DATA => Self::Decimal(Decimal::parse(stream)?),
            class_id::STRING_DATA | class_id::COMPRESSED_STRING_DATA => {
                Self::String(stream.read_string()?)
            }
            class_id::BINARY_DATA => {
                let len = stream.read_i32()?;
                if len < 0 {
                    return Err(DqError::Interface("negative binary length on the wire"));
                }
                Self::Binary(stream.read_bytes(len as usize)?)
            }
            class_id::DATE_DATA => Self::Date(parse_date(stream)?),
            class_id::DATE_TIME_DATA => Self::DateTime(parse_datetime(stream)?),
            class_id::LANGUAGE_DATA => Self::Language(LanguageSet::parse(stream)?),
            class_id::WORD_DATA => Self::Word(Word::parse(stream)?),
            class_id::INTEGER_ARRAY_DATA | class_id::UNSIGNED_INTEGER_ARRAY_DATA => {
                let count = stream.read_i32()?;
                let mut elements = Vec::with_capacity(count.max(0) as usize);
                for _ in 0..count {
                    elements.push(stream.read_i32()?);
                }
                Self::IntArray(elements)
            }
            class_id::STRING_ARRAY_DATA => {
                let count = stream.read_i32()?;
                let mut elements = Vec::with_capacity(count.max(0) as usize);
                for _ in 0..count {
                    elements.push(stream.read_string()?);
                }
                Self::StringArray(elements)
            }
            class_id::DATA_ARRAY_DATA => {
                let mut array = DataArray::new();
                array.parse_into(stream)?;
                Self::Array(array)
            }
            id => return Err(DqError::ClassNotFound(id)),
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn emit<W: std::io::Write>(&self, stream: &mut OutputStream<W>) -> DqResult<()> {
        match self {
            Self::Null => Ok(()),
            Self::Int(v) => stream.write_i32(*v),
            Self::Long(v) => stream.write_i64(*v),
            Self::Float(v) => stream.write_f32(*v),
            Self::Double(v) => stream.write_f64(*v),
            Self::Decimal(v) => v.emit(stream),
            Self::String(v) => stream.write_string(v),
            Self::Binary(v) => {
                stream.write_i32(v.len() as i32)?;
                stream.write_bytes(v)
            }
            Self::Date(v) => emit_date(*v, stream),
            Self::DateTime(v) => emit_datetime(*v, stream),
            Self::Language(v) => v.emit(stream),
            Self::Word(v) => v.emit(stream),
            Self::IntArray(v) => {
                stream.write_i32(v.len() as i32)?;
                for element in v {
                    stream.write_i32(*element)?;
                }
                Ok(())
            }
            Self::StringArray(v) => {
                stream.write_i32(v.len() as i32)?;
                for element in v {
                    stream.write_string(element)?;
                }
                Ok(())
            }
            Self::Array(v) => v.emit(stream),
        }
    }
}

fn parse_date<R: std::io::Read>(stream: &mut InputStream<R>) -> DqResult<Date> {
    let year = stream.read_i32()?;
    let month = stream.read_i32()?;
    let day = stream.read_i32()?;
    let month = u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or(DqError::Interface("month out of range in date value"))?;
    let day =
        u8::try_from(day).map_err(|_| DqError::Interface("day out of range in date value"))?;
    Date::from_calendar_date(year, month, day)
        .map_err(|_| DqError::Interface("invalid calendar date on the wire"))
}

fn emit_date<W: std::io::Write>(date: Date, stream: &mut OutputStream<W>) -> DqResult<()> {
    stream.write_i32(date.year())?;
    stream.write_i32(i32::from(u8::from(date.month())))?;
    stream.write_i32(i32::from(date.day()))
}

fn parse_datetime<R: std::io::Read>(stream: &mut InputStream<R>) -> DqResult<PrimitiveDateTime> {
    let date = parse_date(stream)?;
    let hour = stream.read_i32()?;
    let minute = stream.read_i32()?;
    let second = stream.read_i32()?;
    let millisecond = stream.read_i32()?;
    stream.read_i32()?; // precision, always 3, discarded
    let time = Time::from_hms_milli(
        u8::try_from(hour).map_err(|_| DqError::Interface("hour out of range"))?,
        u8::try_from(minute).map_err(|_| DqError::Interface("minute out of range"))?,
        u8::try_from(second).map_err(|_| DqError::Interface("second out of range"))?,
        u16::try_from(millisecond).map_err(|_| DqError::Interface("millisecond out of range"))?,
    )
    .map_err(|_| DqError::Interface("invalid time of day on the wire"))?;
    Ok(PrimitiveDateTime::new(date, time))
}

fn emit_datetime<W: std::io::Write>(
    datetime: PrimitiveDateTime,
    stream: &mut OutputStream<W>,
) -> DqResult<()> {
    emit_date(datetime.date(), stream)?;
    stream.write_i32(i32::from(datetime.hour()))?;
    stream.write_i32(i32::from(datetime.minute()))?;
    stream.write_i32(i32::from(datetime.second()))?;
    stream.write_i32(i32::from(datetime.millisecond()))?;
    // precision is fixed at 3 (milliseconds)
    stream.write_i32(3)
}

impl std::fmt::Display for DqValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "(null)"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::Binary(v) => write!(f, "size={}", v.len()),
            Self::Date(v) => write!(f, "{:04}-{:02}-{:02}", v.year(), u8::from(v.month()), v.day()),
            Self::DateTime(v) => write!(
                f,
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
                v.year(),
                u8::from(v.month()),
                v.day(),
                v.hour(),
                v.minute(),
                v.second(),
                v.millisecond()
            ),
            Self::Language(v) => write!(f, "{v}"),
            Self::Word(v) => write!(f, "{v}"),
            Self::IntArray(v) => {
                write!(f, "[")?;
                for (i, e) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]")
            }
            Self::StringArray(v) => {
                write!(f, "[")?;
                for (i, e) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]")
            }
            Self::Array(v) => write!(f, "{v}"),
        }
    }
}

/// A heterogeneous, self-describing sequence of values.
///
/// This is both the row format of result sets and the parameter format of
/// statement execution. Each element carries its own class id on the wire;
/// the sequence starts with a 32-bit element count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataArray {
    elements: Vec<DqValue>,
}

impl DataArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: DqValue) {
        self.elements.push(value);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn values(&self) -> &[DqValue] {
        &self.elements
    }

    pub fn into_values(self) -> Vec<DqValue> {
        self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DqValue> {
        self.elements.iter()
    }

    // Decodes into self, reusing the element buffer of a previous row.
    pub(crate) fn parse_into<R: std::io::Read>(
        &mut self,
        stream: &mut InputStream<R>,
    ) -> DqResult<()> {
        self.elements.clear();
        let count = stream.read_i32()?;
        self.elements.reserve(count.max(0) as usize);
        for _ in 0..count {
            let class_id = stream.read_i32()?;
            if class_id == class_id::NONE {
                self.elements.push(DqValue::Null);
            } else if DqValue::is_value_class(class_id) {
                self.elements.push(DqValue::parse(class_id, stream)?);
            } else {
                return Err(DqError::InterfaceDetailed(format!(
                    "non-value class id {class_id} inside a data array"
                )));
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn emit<W: std::io::Write>(&self, stream: &mut OutputStream<W>) -> DqResult<()> {
        stream.write_i32(self.elements.len() as i32)?;
        for element in &self.elements {
            stream.write_i32(element.class_id())?;
            element.emit(stream)?;
        }
        Ok(())
    }
}

impl From<Vec<DqValue>> for DataArray {
    fn from(elements: Vec<DqValue>) -> Self {
        Self { elements }
    }
}

impl FromIterator<DqValue> for DataArray {
    fn from_iter<I: IntoIterator<Item = DqValue>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl std::ops::Index<usize> for DataArray {
    type Output = DqValue;
    fn index(&self, index: usize) -> &DqValue {
        &self.elements[index]
    }
}

impl<'a> IntoIterator for &'a DataArray {
    type Item = &'a DqValue;
    type IntoIter = std::slice::Iter<'a, DqValue>;
    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl std::fmt::Display for DataArray {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, e) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{e}")?;
        }
        write!(f, "]")
    }
}

// Parameter binding: the natural host types map onto the wire variants.
impl From<i32> for DqValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}
impl From<i64> for DqValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}
impl From<f32> for DqValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}
impl From<f64> for DqValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}
impl From<&str> for DqValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}
impl From<String> for DqValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}
impl From<Vec<u8>> for DqValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(v)
    }
}
impl From<&[u8]> for DqValue {
    fn from(v: &[u8]) -> Self {
        Self::Binary(v.to_vec())
    }
}
impl From<Date> for DqValue {
    fn from(v: Date) -> Self {
        Self::Date(v)
    }
}
impl From<PrimitiveDateTime> for DqValue {
    fn from(v: PrimitiveDateTime) -> Self {
        Self::DateTime(v)
    }
}
impl From<Decimal> for DqValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}
impl From<LanguageSet> for DqValue {
    fn from(v: LanguageSet) -> Self {
        Self::Language(v)
    }
}
impl From<Word> for DqValue {
    fn from(v: Word) -> Self {
        Self::Word(v)
    }
}
impl<T: Into<DqValue>> From<Option<T>> for DqValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}
