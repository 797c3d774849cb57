// Signal delivery during the readiness wait. Kept in its own test binary
// because it installs a process-wide SIGUSR1 handler.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

mod common;
use common::{connect, create_test_config, read_until, start_server, QUIET_TICK_PERIOD_MS};

extern "C" fn ignore_signal(_: libc::c_int) {}

/// Handler without SA_RESTART so a blocked wait returns EINTR
fn install_sigusr1_handler() {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = ignore_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        libc::sigemptyset(&mut action.sa_mask);
        action.sa_flags = 0;
        assert_eq!(
            libc::sigaction(libc::SIGUSR1, &action, std::ptr::null_mut()),
            0
        );
    }
}

#[test]
fn test_interrupted_wait_is_not_fatal() {
    install_sigusr1_handler();

    let config = create_test_config(4, QUIET_TICK_PERIOD_MS);
    let mut server = start_server(&config);

    let mut client = connect(&server);
    server.run_once().unwrap();
    assert_eq!(server.connection_count(), 1);

    // Interrupt this thread while it sits in the wait with nothing to do
    let target = unsafe { libc::pthread_self() } as usize;
    let (done_tx, done_rx) = mpsc::channel::<()>();
    let signaller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        while done_rx.try_recv().is_err() {
            unsafe {
                libc::pthread_kill(target as libc::pthread_t, libc::SIGUSR1);
            }
            thread::sleep(Duration::from_millis(100));
        }
    });

    let started = Instant::now();
    let result = server.run_once();
    done_tx.send(()).unwrap();
    signaller.join().unwrap();

    assert!(result.is_ok(), "interrupted wait was fatal: {:?}", result.err());
    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(server.connection_count(), 1);

    // The loop carries on serving after the interruption
    use std::io::Write;
    client.write_all(b"still serving").unwrap();
    server.run_once().unwrap();
    read_until(&mut client, b"still serving\n");
}
