// Periodic tick broadcast

use std::time::{Duration, Instant};

mod common;
use common::{connect, create_test_config, read_until, spawn_server, start_server};

#[test]
fn test_ticks_are_numbered_from_one() {
    let config = create_test_config(4, 200);
    let mut server = start_server(&config);

    let mut client = connect(&server);
    server.run_once().unwrap();
    assert_eq!(server.connection_count(), 1);

    // With no traffic each turn sleeps until the deadline and fires one tick
    server.run_once().unwrap();
    server.run_once().unwrap();

    let got = read_until(&mut client, b"Tick 2\n");
    assert!(got.starts_with(b"Tick 1\nTick 2\n"));
}

#[test]
fn test_tick_waits_for_period() {
    let started = Instant::now();
    let config = create_test_config(4, 300);
    let mut server = start_server(&config);

    let mut client = connect(&server);
    server.run_once().unwrap();
    for _ in 0..3 {
        server.run_once().unwrap();
    }

    let got = read_until(&mut client, b"Tick 3\n");
    assert!(got.starts_with(b"Tick 1\nTick 2\nTick 3\n"));
    // Third tick is due 900ms after the server was created
    assert!(started.elapsed() >= Duration::from_millis(900));
}

#[test]
fn test_ticks_from_background_loop() {
    let mut config = create_test_config(4, 200);
    config.first_tick_delay_ms = Some(500);
    let server = start_server(&config);
    let addr = server.local_addr();
    let _handle = spawn_server(server);

    let mut client = std::net::TcpStream::connect(addr).unwrap();
    client
        .set_read_timeout(Some(Duration::from_secs(3)))
        .unwrap();

    let started = Instant::now();
    let got = read_until(&mut client, b"Tick 2\n");
    assert!(got.starts_with(b"Tick 1\nTick 2\n"));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn test_ticks_advance_without_clients() {
    let config = create_test_config(4, 100);
    let mut server = start_server(&config);

    // Two empty turns burn ticks 1 and 2
    server.run_once().unwrap();
    server.run_once().unwrap();

    let mut client = connect(&server);
    server.run_once().unwrap();
    server.run_once().unwrap();

    let got = read_until(&mut client, b"\n");
    assert!(
        got.starts_with(b"Tick 3\n") || got.starts_with(b"Tick 4\n"),
        "unexpected first tick {:?}",
        String::from_utf8_lossy(&got)
    );
}
