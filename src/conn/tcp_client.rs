use crate::protocol::{InputStream, OutputStream};
use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

/// A plain TCP transport with independently buffered reading and writing
/// halves.
#[derive(Debug)]
pub(crate) struct PlainTcpClient {
    reader: InputStream<BufReader<TcpStream>>,
    writer: OutputStream<BufWriter<TcpStream>>,
}

impl PlainTcpClient {
    // Returns an initialized plain tcp connection
    pub fn try_new(addr: (&str, u16)) -> std::io::Result<Self> {
        let tcpstream = TcpStream::connect(addr)?;
        Ok(Self {
            writer: OutputStream::new(BufWriter::new(tcpstream.try_clone()?)),
            reader: InputStream::new(BufReader::new(tcpstream)),
        })
    }

    pub fn writer(&mut self) -> &mut OutputStream<BufWriter<TcpStream>> {
        &mut self.writer
    }

    pub fn reader(&mut self) -> &mut InputStream<BufReader<TcpStream>> {
        &mut self.reader
    }
}
