//! Transport primitives for the shipper.

use std::{
    io::{self, Write},
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    time::{Duration, Instant},
};

/// Opens connections to the collector.
///
/// The worker owns its dialer and calls it only from the worker thread, so
/// implementations need no synchronisation. Tests substitute their own
/// dialer to simulate outages.
pub trait Dialer: Send + 'static {
    /// Connection handle produced by a successful dial.
    type Conn: Write + Send;

    /// Attempt one connection to `address`, bounded by `timeout`.
    fn dial(&mut self, address: &str, timeout: Duration) -> io::Result<Self::Conn>;
}

/// Plain TCP dialer.
#[derive(Clone, Debug)]
pub struct TcpDialer {
    write_timeout: Duration,
}

impl TcpDialer {
    /// Create a dialer applying `write_timeout` to every connection.
    pub fn new(write_timeout: Duration) -> Self {
        Self { write_timeout }
    }
}

impl TcpDialer {
    fn connect_any(
        &self,
        address: &str,
        addrs: impl IntoIterator<Item = SocketAddr>,
        timeout: Duration,
    ) -> io::Result<TcpStream> {
        let deadline = Instant::now() + timeout;
        let mut last_err = None;
        for addr in addrs {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                last_err = Some(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connecting to {address} timed out"),
                ));
                break;
            }
            match TcpStream::connect_timeout(&addr, remaining) {
                Ok(stream) => {
                    stream.set_nonblocking(false)?;
                    stream.set_write_timeout(Some(self.write_timeout))?;
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{address} did not resolve to any address"),
            )
        }))
    }
}

impl Dialer for TcpDialer {
    type Conn = TcpStream;

    /// Try each resolved address in turn until one connects.
    ///
    /// `timeout` bounds the connect phase as a whole, not each address. Name
    /// resolution goes through the system resolver and is not covered by it.
    fn dial(&mut self, address: &str, timeout: Duration) -> io::Result<TcpStream> {
        let addrs = address.to_socket_addrs()?;
        self.connect_any(address, addrs, timeout)
    }
}
