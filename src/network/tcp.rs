//! TCP transport over `std::net` for hosted targets.

use super::error::Error;
use super::{Close, Connect, Connection, Read, Write};
use std::io::{ErrorKind, Read as StdRead, Write as StdWrite};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// How long a single `read` may wait on the socket before reporting `Ok(0)`.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Opens [`TcpConnection`]s with `std::net::TcpStream`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl Connect for TcpConnector {
    type Connection = TcpConnection;
    type Error = Error;

    fn connect(&mut self, host: &str, port: u16) -> Result<Self::Connection, Self::Error> {
        let stream = TcpStream::connect((host, port)).map_err(|e| match e.kind() {
            ErrorKind::ConnectionRefused => Error::ConnectionRefused,
            ErrorKind::TimedOut => Error::Timeout,
            _ => Error::InvalidAddress,
        })?;
        stream
            .set_read_timeout(Some(POLL_INTERVAL))
            .map_err(|_| Error::NotOpen)?;
        stream.set_nodelay(true).map_err(|_| Error::NotOpen)?;
        Ok(TcpConnection { stream, open: true })
    }
}

/// A TCP byte stream to the broker.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    open: bool,
}

impl Read for TcpConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        match self.stream.read(buf) {
            Ok(0) if !buf.is_empty() => {
                self.open = false;
                Err(Error::ConnectionClosed)
            }
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(0),
            Err(_) => {
                self.open = false;
                Err(Error::ReadError)
            }
        }
    }
}

impl Write for TcpConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        self.stream.write_all(buf).map_err(|_| {
            self.open = false;
            Error::WriteError
        })?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream.flush().map_err(|_| Error::WriteError)
    }
}

impl Close for TcpConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        self.stream
            .shutdown(Shutdown::Both)
            .map_err(|_| Error::NotOpen)
    }
}

impl Connection for TcpConnection {
    fn is_open(&self) -> bool {
        self.open
    }
}
