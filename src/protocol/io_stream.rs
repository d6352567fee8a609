//! Byte-level streams with the server's serialization conventions.
//!
//! Every numeric field on the wire is big-endian; strings are transported
//! as UTF-16 code units with a leading code-unit count. Objects are framed
//! with a 4-byte class id (see [`class_id`](crate::protocol::class_id)).

use crate::{DqError, DqResult};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::parts::WireObject;

/// Reading half of a connection, with the primitive decoders the wire
/// format is built from.
#[derive(Debug)]
pub struct InputStream<R> {
    inner: R,
}

impl<R: std::io::Read> InputStream<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_bytes(&mut self, len: usize) -> DqResult<Vec<u8>> {
        let mut vec = vec![0_u8; len];
        self.inner.read_exact(&mut vec)?;
        Ok(vec)
    }

    pub fn read_i16(&mut self) -> DqResult<i16> {
        Ok(self.inner.read_i16::<BigEndian>()?)
    }

    pub fn read_u16(&mut self) -> DqResult<u16> {
        Ok(self.inner.read_u16::<BigEndian>()?)
    }

    pub fn read_i32(&mut self) -> DqResult<i32> {
        Ok(self.inner.read_i32::<BigEndian>()?)
    }

    pub fn read_i64(&mut self) -> DqResult<i64> {
        Ok(self.inner.read_i64::<BigEndian>()?)
    }

    pub fn read_f32(&mut self) -> DqResult<f32> {
        Ok(self.inner.read_f32::<BigEndian>()?)
    }

    pub fn read_f64(&mut self) -> DqResult<f64> {
        Ok(self.inner.read_f64::<BigEndian>()?)
    }

    /// Reads one UTF-16 code unit.
    pub fn read_char(&mut self) -> DqResult<u16> {
        self.read_u16()
    }

    /// Reads a count-prefixed UTF-16 string.
    ///
    /// The prefix counts code units, not bytes. Surrogate pairs are kept
    /// intact; an unpaired surrogate is a framing error.
    pub fn read_string(&mut self) -> DqResult<String> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(DqError::Interface("negative string length on the wire"));
        }
        let mut units = Vec::with_capacity(len as usize);
        for _ in 0..len {
            units.push(self.read_u16()?);
        }
        String::from_utf16(&units)
            .map_err(|_| DqError::Interface("string on the wire is not valid UTF-16"))
    }

    /// Reads one framed object.
    ///
    /// Returns `None` when the wire carries the NONE class id. An id
    /// without a registered decoder fails with
    /// [`DqError::ClassNotFound`](crate::DqError::ClassNotFound).
    pub fn read_object(&mut self) -> DqResult<Option<WireObject>> {
        let class_id = self.read_i32()?;
        WireObject::parse(class_id, self)
    }
}

/// Writing half of a connection.
///
/// Writes are buffered by the underlying writer; `flush` is the single
/// commit point after which the server is expected to respond.
#[derive(Debug)]
pub struct OutputStream<W> {
    inner: W,
}

impl<W: std::io::Write> OutputStream<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_bytes(&mut self, b: &[u8]) -> DqResult<()> {
        self.inner.write_all(b)?;
        Ok(())
    }

    pub fn write_i16(&mut self, v: i16) -> DqResult<()> {
        Ok(self.inner.write_i16::<BigEndian>(v)?)
    }

    pub fn write_u16(&mut self, v: u16) -> DqResult<()> {
        Ok(self.inner.write_u16::<BigEndian>(v)?)
    }

    pub fn write_i32(&mut self, v: i32) -> DqResult<()> {
        Ok(self.inner.write_i32::<BigEndian>(v)?)
    }

    pub fn write_i64(&mut self, v: i64) -> DqResult<()> {
        Ok(self.inner.write_i64::<BigEndian>(v)?)
    }

    pub fn write_f32(&mut self, v: f32) -> DqResult<()> {
        Ok(self.inner.write_f32::<BigEndian>(v)?)
    }

    pub fn write_f64(&mut self, v: f64) -> DqResult<()> {
        Ok(self.inner.write_f64::<BigEndian>(v)?)
    }

    /// Writes one UTF-16 code unit.
    pub fn write_char(&mut self, v: u16) -> DqResult<()> {
        self.write_u16(v)
    }

    /// Writes a count-prefixed UTF-16 string.
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn write_string(&mut self, s: &str) -> DqResult<()> {
        let count = s.encode_utf16().count();
        self.write_i32(count as i32)?;
        for unit in s.encode_utf16() {
            self.write_u16(unit)?;
        }
        Ok(())
    }

    /// Writes one framed object, or the NONE class id for `None`.
    pub fn write_object(&mut self, object: Option<&WireObject>) -> DqResult<()> {
        match object {
            Some(object) => {
                self.write_i32(object.class_id())?;
                object.emit(self)
            }
            None => self.write_i32(super::class_id::NONE),
        }
    }

    pub fn flush(&mut self) -> DqResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{InputStream, OutputStream};

    fn roundtrip(write: impl FnOnce(&mut OutputStream<&mut Vec<u8>>)) -> InputStream<std::io::Cursor<Vec<u8>>> {
        let mut buf = Vec::new();
        let mut out = OutputStream::new(&mut buf);
        write(&mut out);
        InputStream::new(std::io::Cursor::new(buf))
    }

    #[test]
    fn primitives_are_big_endian() {
        let mut buf = Vec::new();
        let mut out = OutputStream::new(&mut buf);
        out.write_i32(0x0102_0304).unwrap();
        out.write_i64(0x0102_0304_0506_0708).unwrap();
        assert_eq!(&buf[..4], &[1, 2, 3, 4]);
        assert_eq!(&buf[4..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn string_prefix_counts_code_units() {
        let mut input = roundtrip(|out| out.write_string("a𝄞").unwrap());
        // 'a' is one unit, the clef is a surrogate pair.
        assert_eq!(input.read_i32().unwrap(), 3);
        let mut input = roundtrip(|out| out.write_string("a𝄞").unwrap());
        assert_eq!(input.read_string().unwrap(), "a𝄞");
    }

    #[test]
    fn empty_string_writes_only_the_length() {
        let mut buf = Vec::new();
        let mut out = OutputStream::new(&mut buf);
        out.write_string("").unwrap();
        assert_eq!(buf, vec![0, 0, 0, 0]);
    }

    #[test]
    fn none_object_is_the_none_class_id() {
        let mut input = roundtrip(|out| out.write_object(None).unwrap());
        assert!(input.read_object().unwrap().is_none());
    }

    #[test]
    fn short_read_is_an_io_error() {
        let mut input = InputStream::new(std::io::Cursor::new(vec![0_u8, 1]));
        assert!(matches!(
            input.read_i32().unwrap_err(),
            crate::DqError::Io { .. }
        ));
    }
}
