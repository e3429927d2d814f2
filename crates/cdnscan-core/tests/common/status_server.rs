//! Minimal HTTP/1.1 server for probe tests.
//!
//! Each server answers every request the same way, chosen by [`Behavior`].

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Behavior {
    /// Fixed status with a short body.
    Status(u16),
    /// Status with no body at all.
    Empty(u16),
    /// Read the request, then never answer.
    Hang,
    /// 200 followed by a body that keeps coming (like a live stream).
    Stream,
    /// 302 to the given absolute URL.
    Redirect(String),
}

/// Starts a server in a background thread. Returns the base URL
/// (e.g. "http://127.0.0.1:12345/"). The server runs until the process exits.
pub fn start(behavior: Behavior) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let behavior = behavior.clone();
            thread::spawn(move || handle(stream, &behavior));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

/// A URL on a port nothing listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn reason(code: u16) -> &'static str {
    match code {
        200 => "OK",
        204 => "No Content",
        302 => "Found",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn handle(mut stream: TcpStream, behavior: &Behavior) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }

    match behavior {
        Behavior::Status(code) => {
            let body = reason(*code);
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                code,
                reason(*code),
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
        Behavior::Empty(code) => {
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                code,
                reason(*code)
            );
            let _ = stream.write_all(response.as_bytes());
        }
        Behavior::Hang => {
            thread::sleep(Duration::from_secs(30));
        }
        Behavior::Stream => {
            let head = "HTTP/1.1 200 OK\r\nContent-Type: video/mp2t\r\nConnection: close\r\n\r\n";
            if stream.write_all(head.as_bytes()).is_err() {
                return;
            }
            for _ in 0..600 {
                if stream.write_all(&[0x47; 188]).is_err() {
                    return;
                }
                thread::sleep(Duration::from_millis(50));
            }
        }
        Behavior::Redirect(location) => {
            let response = format!(
                "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                location
            );
            let _ = stream.write_all(response.as_bytes());
        }
    }
}
