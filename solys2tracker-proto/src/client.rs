//! Authenticated Solys2 session over a line transport.

use std::io::{BufReader, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, info, warn};
use solys2tracker_core::{ConnectionParams, Offset, Position};

use crate::command::{Command, Motor};
use crate::reply::{parse_f64, parse_reply};
use crate::{Error, Result};

/// Connect and reply timeout used when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest reply line accepted before the stream is considered garbage.
const MAX_LINE: usize = 1024;

/// Line-oriented byte transport.
pub trait Transport {
    /// Writes one request line, appending the terminator.
    fn send_line(&mut self, line: &str) -> Result<()>;

    /// Reads the next non-empty reply line without its terminator.
    fn recv_line(&mut self) -> Result<String>;
}

/// TCP transport to a Solys2.
pub struct TcpTransport {
    reader: BufReader<TcpStream>,
}

impl TcpTransport {
    /// Opens a TCP connection with `timeout` for connect, reads and writes.
    pub fn connect(ip: &str, port: u16, timeout: Duration) -> Result<Self> {
        let addr = (ip, port)
            .to_socket_addrs()
            .map_err(|e| Error::InvalidAddress(format!("{ip}:{port}: {e}")))?
            .next()
            .ok_or_else(|| Error::InvalidAddress(format!("{ip}:{port}")))?;

        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(map_io)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        Ok(Self {
            reader: BufReader::new(stream),
        })
    }

    /// Wraps an already connected stream.
    #[must_use]
    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            reader: BufReader::new(stream),
        }
    }
}

impl Transport for TcpTransport {
    fn send_line(&mut self, line: &str) -> Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(line.as_bytes()).map_err(map_io)?;
        stream.write_all(b"\r").map_err(map_io)?;
        stream.flush().map_err(map_io)
    }

    fn recv_line(&mut self) -> Result<String> {
        read_line(&mut self.reader)
    }
}

/// Reads bytes up to `\r` or `\n`, skipping empty lines so that `\r\n`
/// terminators are accepted.
fn read_line<R: Read>(reader: &mut R) -> Result<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Err(Error::Closed),
            Ok(_) => match byte[0] {
                b'\r' | b'\n' if line.is_empty() => {}
                b'\r' | b'\n' => break,
                b => {
                    if line.len() >= MAX_LINE {
                        return Err(Error::Parse("reply line too long".into()));
                    }
                    line.push(b);
                }
            },
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(map_io(e)),
        }
    }
    String::from_utf8(line).map_err(|_| Error::Parse("reply is not valid UTF-8".into()))
}

fn map_io(e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => Error::Timeout,
        _ => Error::Io(e),
    }
}

/// Motion seam between the tracking logic and the instrument.
pub trait Positioner {
    /// Measured position.
    fn current_position(&mut self) -> Result<Position>;

    /// Commands both motors, azimuth first.
    fn set_position(&mut self, target: Position) -> Result<()>;
}

/// Authenticated request/response session with a Solys2.
///
/// Requests are strictly sequential: each one waits for its reply line before
/// the next is sent. A transport failure (timeout, I/O error, closed peer or
/// an unreadable line) leaves the stream position unknown, so the client is
/// then broken and every later request fails with [`Error::Closed`] without
/// touching the wire. Reconnect to continue.
pub struct Solys2Client<T: Transport = TcpTransport> {
    transport: T,
    broken: bool,
}

impl Solys2Client<TcpTransport> {
    /// Connects over TCP and authenticates with the configured password.
    pub fn connect(params: &ConnectionParams, timeout: Duration) -> Result<Self> {
        info!("Connecting to Solys2 at {}", params.address());
        let transport = TcpTransport::connect(&params.ip, params.port, timeout)?;
        Self::with_transport(transport, &params.password)
    }
}

impl<T: Transport> Solys2Client<T> {
    /// Authenticates over an existing transport.
    pub fn with_transport(transport: T, password: &str) -> Result<Self> {
        let mut client = Self {
            transport,
            broken: false,
        };
        client.request(&Command::Password(password.to_string()))?;
        debug!("Solys2 session authenticated");
        Ok(client)
    }

    /// Sends `command` and returns the reply values.
    pub fn request(&mut self, command: &Command) -> Result<Vec<String>> {
        if self.broken {
            return Err(Error::Closed);
        }
        debug!("-> {}", command.redacted());
        let exchange = self
            .transport
            .send_line(&command.encode())
            .and_then(|()| self.transport.recv_line());
        let line = match exchange {
            Ok(line) => line,
            Err(e) => {
                warn!("Solys2 session unusable after {}: {e}", command.code());
                self.broken = true;
                return Err(e);
            }
        };
        debug!("<- {line}");
        parse_reply(command, &line)
    }

    /// Whether requests can still be sent on this session.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.broken
    }

    /// Firmware version string.
    pub fn version(&mut self) -> Result<String> {
        Ok(self.request(&Command::Version)?.join(" "))
    }

    /// Planned (target) position.
    pub fn planned_position(&mut self) -> Result<Position> {
        let values = self.request(&Command::PlannedPosition)?;
        Ok(Position::new(parse_f64(&values, 0)?, parse_f64(&values, 1)?))
    }

    /// Moves the azimuth motor.
    pub fn set_azimuth(&mut self, degrees: f64) -> Result<()> {
        self.request(&Command::SetPosition(Motor::Azimuth, degrees))
            .map(drop)
    }

    /// Moves the zenith motor.
    pub fn set_zenith(&mut self, degrees: f64) -> Result<()> {
        self.request(&Command::SetPosition(Motor::Zenith, degrees))
            .map(drop)
    }

    /// Current motor adjustment.
    pub fn adjustment(&mut self) -> Result<Offset> {
        let values = self.request(&Command::Adjustment)?;
        Ok(Offset::new(parse_f64(&values, 0)?, parse_f64(&values, 1)?))
    }

    /// Sets the azimuth adjustment.
    pub fn set_azimuth_adjustment(&mut self, degrees: f64) -> Result<()> {
        self.request(&Command::SetAdjustment(Motor::Azimuth, degrees))
            .map(drop)
    }

    /// Sets the zenith adjustment.
    pub fn set_zenith_adjustment(&mut self, degrees: f64) -> Result<()> {
        self.request(&Command::SetAdjustment(Motor::Zenith, degrees))
            .map(drop)
    }

    /// Sends both motors home.
    pub fn home(&mut self) -> Result<()> {
        self.request(&Command::Home).map(drop)
    }

    /// Latitude and longitude configured in the instrument, in degrees.
    pub fn location(&mut self) -> Result<(f64, f64)> {
        let values = self.request(&Command::Location)?;
        Ok((parse_f64(&values, 0)?, parse_f64(&values, 1)?))
    }

    /// Consumes the client, returning the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl<T: Transport> Positioner for Solys2Client<T> {
    fn current_position(&mut self) -> Result<Position> {
        let values = self.request(&Command::CurrentPosition)?;
        Ok(Position::new(parse_f64(&values, 0)?, parse_f64(&values, 1)?))
    }

    fn set_position(&mut self, target: Position) -> Result<()> {
        self.set_azimuth(target.azimuth)?;
        self.set_zenith(target.zenith)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Transport that answers from a canned list and records requests.
    struct Scripted {
        sent: Vec<String>,
        replies: VecDeque<String>,
    }

    impl Scripted {
        fn new(replies: &[&str]) -> Self {
            Self {
                sent: Vec::new(),
                replies: replies.iter().map(|s| (*s).to_string()).collect(),
            }
        }
    }

    impl Transport for Scripted {
        fn send_line(&mut self, line: &str) -> Result<()> {
            self.sent.push(line.to_string());
            Ok(())
        }

        fn recv_line(&mut self) -> Result<String> {
            self.replies.pop_front().ok_or(Error::Closed)
        }
    }

    #[test]
    fn test_read_line_terminators() {
        let mut input: &[u8] = b"CP 1 2\r\nAD 0 0\rLL 3 4\n";
        assert_eq!(read_line(&mut input).unwrap(), "CP 1 2");
        assert_eq!(read_line(&mut input).unwrap(), "AD 0 0");
        assert_eq!(read_line(&mut input).unwrap(), "LL 3 4");
        assert!(matches!(read_line(&mut input), Err(Error::Closed)));
    }

    #[test]
    fn test_authentication_rejected() {
        let result = Solys2Client::with_transport(Scripted::new(&["NO 3"]), "wrong");
        assert!(result.err().is_some_and(|e| e.is_auth_failure()));
    }

    #[test]
    fn test_set_position_order() {
        let mut client =
            Solys2Client::with_transport(Scripted::new(&["PW", "PO", "PO"]), "solys").unwrap();
        client.set_position(Position::new(180.0, 45.5)).unwrap();
        let sent = client.into_transport().sent;
        assert_eq!(sent, vec!["PW solys", "PO 0 180.0000", "PO 1 45.5000"]);
    }

    /// Transport whose first reply times out halfway through a line.
    struct StalledOnce {
        sent: usize,
        stalled: bool,
    }

    impl Transport for StalledOnce {
        fn send_line(&mut self, _line: &str) -> Result<()> {
            self.sent += 1;
            Ok(())
        }

        fn recv_line(&mut self) -> Result<String> {
            if self.sent == 1 {
                return Ok("PW".to_string());
            }
            if self.stalled {
                // the rest of the stalled reply arrives late
                Ok("1.0 2.0".to_string())
            } else {
                self.stalled = true;
                Err(Error::Timeout)
            }
        }
    }

    #[test]
    fn test_timeout_breaks_session() {
        let transport = StalledOnce {
            sent: 0,
            stalled: false,
        };
        let mut client = Solys2Client::with_transport(transport, "solys").unwrap();
        assert!(client.is_usable());
        assert!(matches!(client.current_position(), Err(Error::Timeout)));
        assert!(!client.is_usable());
        // nothing more is sent, so the late bytes are never taken as a reply
        assert!(matches!(client.version(), Err(Error::Closed)));
        assert_eq!(client.into_transport().sent, 2);
    }

    #[test]
    fn test_device_error_keeps_session() {
        let mut client =
            Solys2Client::with_transport(Scripted::new(&["PW", "NO 2", "VE 2.14"]), "solys")
                .unwrap();
        assert!(client.set_zenith(200.0).is_err());
        assert!(client.is_usable());
        assert_eq!(client.version().unwrap(), "2.14");
    }

    #[test]
    fn test_adjustment_and_location() {
        let mut client = Solys2Client::with_transport(
            Scripted::new(&["PW", "AD 0.25 -0.1", "LL 41.6628 -4.7055"]),
            "solys",
        )
        .unwrap();
        let adj = client.adjustment().unwrap();
        assert!((adj.azimuth - 0.25).abs() < 1e-12);
        assert!((adj.zenith + 0.1).abs() < 1e-12);
        let (lat, lon) = client.location().unwrap();
        assert!((lat - 41.6628).abs() < 1e-12);
        assert!((lon + 4.7055).abs() < 1e-12);
    }
}
