//! Client tests against a simulated Solys2 on a loopback socket.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use approx::assert_relative_eq;
use solys2tracker_core::{ConnectionParams, Position};
use solys2tracker_proto::{DeviceError, Error, Positioner, Solys2Client};

const PASSWORD: &str = "solys";

/// Minimal instrument model: accepts one client and answers until it hangs up.
fn spawn_instrument() -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        serve(stream)
    });
    (port, handle)
}

fn serve(stream: TcpStream) -> Vec<String> {
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);
    let mut received = Vec::new();
    let mut authed = false;
    let mut position = [10.0_f64, 80.0_f64];
    let mut adjust = [0.0_f64, 0.0_f64];

    loop {
        let mut buf = Vec::new();
        if reader.read_until(b'\r', &mut buf).unwrap_or(0) == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf).trim().to_string();
        received.push(line.clone());
        let parts: Vec<&str> = line.split_whitespace().collect();

        let reply = match parts.as_slice() {
            ["PW", pw] if *pw == PASSWORD => {
                authed = true;
                "PW".to_string()
            }
            ["PW", ..] => "NO 3".to_string(),
            _ if !authed => "NO 3".to_string(),
            ["VE"] => "VE 2.14".to_string(),
            ["CP"] => format!("CP {:.4} {:.4}", position[0], position[1]),
            ["PO"] => format!("PO {:.4} {:.4}", position[0], position[1]),
            ["PO", motor, value] => match (motor.parse::<usize>(), value.parse::<f64>()) {
                (Ok(0), Ok(v)) => {
                    position[0] = v;
                    "PO".to_string()
                }
                (Ok(1), Ok(v)) if (0.0..=90.0).contains(&v) => {
                    position[1] = v;
                    "PO".to_string()
                }
                _ => "NO 2".to_string(),
            },
            ["AD"] => format!("AD {:.4} {:.4}", adjust[0], adjust[1]),
            ["AD", motor, value] => match (motor.parse::<usize>(), value.parse::<f64>()) {
                (Ok(m @ 0..=1), Ok(v)) => {
                    adjust[m] += v;
                    "AD".to_string()
                }
                _ => "NO 2".to_string(),
            },
            ["HO"] => {
                position = [0.0, 0.0];
                "HO".to_string()
            }
            ["LL"] => "LL 41.6628 -4.7055".to_string(),
            _ => "NO 1".to_string(),
        };
        if writer.write_all(format!("{reply}\r\n").as_bytes()).is_err() {
            break;
        }
    }
    received
}

fn params(port: u16, password: &str) -> ConnectionParams {
    ConnectionParams::new("127.0.0.1", port, password)
}

#[test]
fn test_full_session() {
    let (port, server) = spawn_instrument();
    let mut client =
        Solys2Client::connect(&params(port, PASSWORD), Duration::from_secs(2)).unwrap();

    assert_eq!(client.version().unwrap(), "2.14");

    let start = client.current_position().unwrap();
    assert_relative_eq!(start.azimuth, 10.0);
    assert_relative_eq!(start.zenith, 80.0);

    client.set_position(Position::new(200.5, 35.25)).unwrap();
    let now = client.current_position().unwrap();
    assert_relative_eq!(now.azimuth, 200.5, epsilon = 1e-4);
    assert_relative_eq!(now.zenith, 35.25, epsilon = 1e-4);
    let planned = client.planned_position().unwrap();
    assert_relative_eq!(planned.azimuth, now.azimuth);

    client.set_azimuth_adjustment(0.12).unwrap();
    client.set_zenith_adjustment(-0.03).unwrap();
    let adj = client.adjustment().unwrap();
    assert_relative_eq!(adj.azimuth, 0.12, epsilon = 1e-4);
    assert_relative_eq!(adj.zenith, -0.03, epsilon = 1e-4);

    let (lat, lon) = client.location().unwrap();
    assert_relative_eq!(lat, 41.6628);
    assert_relative_eq!(lon, -4.7055);

    client.home().unwrap();
    drop(client);

    let received = server.join().unwrap();
    assert_eq!(received.first().map(String::as_str), Some("PW solys"));
    assert!(received.iter().any(|l| l == "PO 0 200.5000"));
    assert_eq!(received.last().map(String::as_str), Some("HO"));
}

#[test]
fn test_wrong_password() {
    let (port, server) = spawn_instrument();
    let err = Solys2Client::connect(&params(port, "nope"), Duration::from_secs(2))
        .err()
        .unwrap();
    assert!(err.is_auth_failure());
    server.join().unwrap();
}

#[test]
fn test_rejected_motion() {
    let (port, server) = spawn_instrument();
    let mut client =
        Solys2Client::connect(&params(port, PASSWORD), Duration::from_secs(2)).unwrap();
    let err = client.set_zenith(120.0).unwrap_err();
    assert!(matches!(
        err,
        Error::Device {
            command: "PO",
            error: DeviceError::InvalidParameter
        }
    ));
    // Session stays usable after a rejected command
    assert!(client.current_position().is_ok());
    drop(client);
    server.join().unwrap();
}

#[test]
fn test_connection_refused() {
    // Bind then drop to obtain a port with nothing listening
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let result = Solys2Client::connect(&params(port, PASSWORD), Duration::from_millis(500));
    assert!(matches!(result, Err(Error::Io(_) | Error::Timeout)));
}

#[test]
fn test_reply_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    // Accept but never answer
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_millis(600));
        drop(stream);
    });
    let result = Solys2Client::connect(&params(port, PASSWORD), Duration::from_millis(200));
    assert!(matches!(result, Err(Error::Timeout)));
    server.join().unwrap();
}
