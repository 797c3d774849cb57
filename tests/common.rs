// Common test utilities to reduce code duplication

use std::io::{ErrorKind, Read};
use std::net::{Ipv4Addr, TcpStream};
use std::thread;
use std::time::Duration;

use tickcast::application::config::models::Config;
use tickcast::application::server::BroadcastServer;

/// Long enough that no tick fires during a test that isn't about ticks
#[allow(dead_code)]
pub const QUIET_TICK_PERIOD_MS: u64 = 60_000;

/// Loopback config on an ephemeral port
pub fn create_test_config(max_connections: usize, tick_period_ms: u64) -> Config {
    Config {
        bind_address: Ipv4Addr::LOCALHOST,
        port: 0,
        max_connections,
        tick_period_ms,
        ..Config::default()
    }
}

pub fn start_server(config: &Config) -> BroadcastServer {
    BroadcastServer::new(config).expect("Failed to start server")
}

/// Connect a blocking client with a read timeout so a missing message fails the test
pub fn connect(server: &BroadcastServer) -> TcpStream {
    let stream = TcpStream::connect(server.local_addr()).expect("Failed to connect to server");
    stream
        .set_read_timeout(Some(Duration::from_secs(3)))
        .unwrap();
    stream
}

/// Read until the accumulated bytes contain `needle`
#[allow(dead_code)]
pub fn read_until(stream: &mut TcpStream, needle: &[u8]) -> Vec<u8> {
    let mut received = Vec::new();
    let mut buf = [0u8; 4096];
    while !contains(&received, needle) {
        match stream.read(&mut buf) {
            Ok(0) => panic!(
                "connection closed before {:?} arrived, got {:?}",
                String::from_utf8_lossy(needle),
                String::from_utf8_lossy(&received)
            ),
            Ok(n) => received.extend_from_slice(&buf[..n]),
            Err(e) => panic!(
                "read failed waiting for {:?} ({}), got {:?}",
                String::from_utf8_lossy(needle),
                e,
                String::from_utf8_lossy(&received)
            ),
        }
    }
    received
}

/// The server closed this connection without sending anything
#[allow(dead_code)]
pub fn assert_closed_by_server(stream: &mut TcpStream) {
    let mut buf = [0u8; 64];
    match stream.read(&mut buf) {
        Ok(0) => {}
        Err(e) if e.kind() == ErrorKind::ConnectionReset => {}
        Ok(n) => panic!(
            "expected closed connection, got data {:?}",
            String::from_utf8_lossy(&buf[..n])
        ),
        Err(e) => panic!("expected closed connection, got error {}", e),
    }
}

/// Nothing arrives within a short grace period
#[allow(dead_code)]
pub fn assert_nothing_to_read(stream: &mut TcpStream) {
    stream
        .set_read_timeout(Some(Duration::from_millis(150)))
        .unwrap();
    let mut buf = [0u8; 64];
    match stream.read(&mut buf) {
        Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {}
        Ok(n) => panic!(
            "expected no data, got {:?}",
            String::from_utf8_lossy(&buf[..n])
        ),
        Err(e) => panic!("unexpected read error {}", e),
    }
    stream
        .set_read_timeout(Some(Duration::from_secs(3)))
        .unwrap();
}

/// Run the server loop on a background thread
#[allow(dead_code)]
pub fn spawn_server(mut server: BroadcastServer) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = server.run();
    })
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
