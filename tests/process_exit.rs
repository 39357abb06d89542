//! Process-level exit codes of the `auth-service` binary.
//!
//! Signals are delivered with the system `kill` command.
#![cfg(unix)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn spawn_service(port: u16) -> Child {
    spawn_service_with_stdout(port, Stdio::null())
}

fn spawn_service_with_stdout(port: u16, stdout: Stdio) -> Child {
    Command::new(env!("CARGO_BIN_EXE_auth-service"))
        .env("PORT", port.to_string())
        .env("GIN_MODE", "test")
        .env_remove("RUST_LOG")
        .stdout(stdout)
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start auth-service binary")
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("0.0.0.0:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn wait_until_listening(port: u16) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if TcpStream::connect(("127.0.0.1", port)).is_ok() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("auth-service did not start listening on port {port}");
}

fn wait_for_exit(child: &mut Child, limit: Duration) -> ExitStatus {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("auth-service did not exit within {limit:?}");
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn send_signal(child: &Child, signal: &str) {
    let status = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg(child.id().to_string())
        .status()
        .expect("failed to run kill");
    assert!(status.success());
}

#[test]
fn sigterm_exits_zero() {
    let port = free_port();
    let mut child = spawn_service(port);
    wait_until_listening(port);

    send_signal(&child, "TERM");
    let status = wait_for_exit(&mut child, Duration::from_secs(10));
    assert!(status.success(), "exit status: {status}");
}

#[test]
fn sigint_exits_zero() {
    let port = free_port();
    let mut child = spawn_service(port);
    wait_until_listening(port);

    send_signal(&child, "INT");
    let status = wait_for_exit(&mut child, Duration::from_secs(10));
    assert!(status.success(), "exit status: {status}");
}

#[test]
fn sigterm_as_soon_as_listening_exits_zero() {
    for attempt in 0..10 {
        let port = free_port();
        let mut child = spawn_service(port);
        wait_until_listening(port);

        send_signal(&child, "TERM");
        let status = wait_for_exit(&mut child, Duration::from_secs(10));
        assert!(status.success(), "attempt {attempt}, exit status: {status}");
    }
}

#[test]
fn occupied_port_exits_non_zero() {
    let occupied = TcpListener::bind("0.0.0.0:0").unwrap();
    let port = occupied.local_addr().unwrap().port();

    let mut child = spawn_service(port);
    let status = wait_for_exit(&mut child, Duration::from_secs(10));
    assert!(!status.success(), "exit status: {status}");
    assert_eq!(status.code(), Some(1));

    drop(occupied);
}

#[test]
fn test_mode_logs_start_request_and_shutdown_once() {
    let port = free_port();
    let mut child = spawn_service_with_stdout(port, Stdio::piped());
    wait_until_listening(port);

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    assert!(response.starts_with("HTTP/1.1 200"), "response: {response}");

    send_signal(&child, "TERM");
    let status = wait_for_exit(&mut child, Duration::from_secs(10));
    assert!(status.success(), "exit status: {status}");

    let mut output = String::new();
    child
        .stdout
        .take()
        .unwrap()
        .read_to_string(&mut output)
        .unwrap();
    let count = |needle: &str| output.lines().filter(|line| line.contains(needle)).count();
    assert_eq!(count("starting"), 1, "output:\n{output}");
    assert_eq!(count("Request completed"), 1, "output:\n{output}");
    assert_eq!(count("Shutting down server"), 1, "output:\n{output}");
    assert_eq!(count("Server exited gracefully"), 1, "output:\n{output}");
}
