//! Loopback HTTP fixture for fetch and poll tests.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::client::Client;
use crate::config::ClientConfig;

pub(crate) const TEST_KEY: &str = "TESTKEY123";

pub(crate) const FULL_PAYLOAD: &str = r#"{
    "current_observations": {
        "temp_c": 18.5,
        "temp_f": 65.3,
        "weather": "Overcast",
        "wind_kph": 14.4,
        "wind_degrees": 225,
        "pressure_mb": "1008",
        "relative_humidity": "87%"
    }
}"#;

pub(crate) struct TestServer {
    pub(crate) url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Answers the n-th connection with `responses[n]`; the last one repeats.
    pub(crate) fn start(responses: Vec<(u16, &'static str)>) -> Self {
        assert!(!responses.is_empty());
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for (n, stream) in listener.incoming().enumerate() {
                let Ok(stream) = stream else { continue };
                let (status, body) = responses[n.min(responses.len() - 1)];
                respond(stream, status, body, &seen);
            }
        });

        Self { url, requests }
    }

    /// Accepts connections and never answers.
    pub(crate) fn silent() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming().flatten() {
                held.push(stream);
            }
        });

        Self {
            url,
            requests: Arc::default(),
        }
    }

    /// Writes an HTTP response as soon as a connection is accepted, without
    /// reading the request, and keeps the connection open.
    pub(crate) fn eager(body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        thread::spawn(move || {
            let mut held = Vec::new();
            for mut stream in listener.incoming().flatten() {
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
                held.push(stream);
            }
        });

        Self {
            url,
            requests: Arc::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn client(&self) -> Client {
        Client::from_config(
            ClientConfig::new(TEST_KEY)
                .with_url(&self.url)
                .with_system_proxy(false)
                .with_timeout(Duration::from_secs(5)),
        )
        .unwrap()
    }
}

fn respond(stream: TcpStream, status: u16, body: &str, seen: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header == "\r\n" => break,
            Ok(_) => {}
        }
    }
    seen.lock().unwrap().push(request_line.trim_end().to_string());

    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Polls `condition` until it holds or five seconds pass.
pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
