use crate::protocol::io_stream::{InputStream, OutputStream};
use crate::DqResult;

/// Structured exception payload as the server transmits it.
///
/// Arguments are raw strings that get substituted into the localized
/// message format selected by the error number.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExceptionData {
    error_code: i32,
    arguments: Vec<String>,
    module: String,
    file: String,
    line: i32,
}

impl ExceptionData {
    pub fn new(
        error_code: i32,
        arguments: Vec<String>,
        module: String,
        file: String,
        line: i32,
    ) -> Self {
        Self {
            error_code,
            arguments,
            module,
            file,
            line,
        }
    }

    pub fn error_code(&self) -> i32 {
        self.error_code
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> i32 {
        self.line
    }

    pub(crate) fn parse<R: std::io::Read>(stream: &mut InputStream<R>) -> DqResult<Self> {
        let error_code = stream.read_i32()?;
        let argc = stream.read_i32()?;
        let mut arguments = Vec::with_capacity(argc.max(0) as usize);
        for _ in 0..argc {
            arguments.push(read_char_string(stream)?);
        }
        let module = read_char_string(stream)?;
        let file = read_char_string(stream)?;
        let line = stream.read_i32()?;
        Ok(Self {
            error_code,
            arguments,
            module,
            file,
            line,
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn emit<W: std::io::Write>(&self, stream: &mut OutputStream<W>) -> DqResult<()> {
        stream.write_i32(self.error_code)?;
        stream.write_i32(self.arguments.len() as i32)?;
        for argument in &self.arguments {
            write_char_string(stream, argument)?;
        }
        write_char_string(stream, &self.module)?;
        write_char_string(stream, &self.file)?;
        stream.write_i32(self.line)
    }
}

// Exception strings are transported like UnicodeString, but historically
// read unit by unit; layout is identical (u32 count + u16 units).
fn read_char_string<R: std::io::Read>(stream: &mut InputStream<R>) -> DqResult<String> {
    stream.read_string()
}

fn write_char_string<W: std::io::Write>(
    stream: &mut OutputStream<W>,
    s: &str,
) -> DqResult<()> {
    stream.write_string(s)
}
