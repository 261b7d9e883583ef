//! Loopback HTTP fixture for exercising the reqwest-backed clients.
//!
//! Every connection gets one reply and is closed. Requests are recorded so
//! tests can assert on the target, headers and body that reached the wire.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request as received by the fixture.
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    /// Request line target, path plus query.
    pub target: String,
    /// Raw request head, lowercased.
    pub head: String,
    pub body: String,
}

/// What the fixture sends back.
pub(crate) enum Reply {
    Body {
        status: u16,
        body: Vec<u8>,
        /// Content-Length sent in the head; larger than the body truncates.
        declared_len: usize,
        /// Number of pieces the body is written in.
        pieces: usize,
        /// Pause after each piece.
        delay: Duration,
    },
    /// Accept the request and never answer.
    Hang,
}

impl Reply {
    pub fn status(status: u16, body: &str) -> Self {
        let body = body.as_bytes().to_vec();
        Reply::Body {
            status,
            declared_len: body.len(),
            body,
            pieces: 1,
            delay: Duration::ZERO,
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    /// Full body written in `pieces` parts, `delay` apart.
    pub fn dribble(body: &[u8], pieces: usize, delay: Duration) -> Self {
        Reply::Body {
            status: 200,
            declared_len: body.len(),
            body: body.to_vec(),
            pieces,
            delay,
        }
    }

    /// Announces `declared_len` bytes, sends `body`, then closes.
    pub fn truncated(body: &[u8], declared_len: usize) -> Self {
        Reply::Body {
            status: 200,
            declared_len,
            body: body.to_vec(),
            pieces: 1,
            delay: Duration::ZERO,
        }
    }

    async fn write_to(self, socket: &mut TcpStream) {
        let (status, body, declared_len, pieces, delay) = match self {
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                return;
            }
            Reply::Body {
                status,
                body,
                declared_len,
                pieces,
                delay,
            } => (status, body, declared_len, pieces, delay),
        };

        let reason = match status {
            200 => "OK",
            401 => "Unauthorized",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Status",
        };
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status, reason, declared_len
        );
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }

        let piece_len = body.len().div_ceil(pieces.max(1)).max(1);
        for piece in body.chunks(piece_len) {
            if socket.write_all(piece).await.is_err() || socket.flush().await.is_err() {
                return;
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        let _ = socket.shutdown().await;
    }
}

/// Running fixture. Lives until the test's runtime shuts down.
pub(crate) struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl TestServer {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Starts a fixture that answers each request with `handler(target)`.
pub(crate) async fn serve<F>(handler: F) -> TestServer
where
    F: Fn(&str) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(handler);

    let log = Arc::clone(&requests);
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let reply = handler(&request.target);
                log.lock().unwrap().push(request);
                reply.write_to(&mut socket).await;
            });
        }
    });

    TestServer {
        base_url: format!("http://{}", addr),
        requests,
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    // Target keeps its original case; the head copy is lowercased.
    let raw_head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let target = raw_head.lines().next()?.split_whitespace().nth(1)?.to_string();
    let body = String::from_utf8_lossy(&buf[head_end..]).to_string();

    Some(Recorded { target, head, body })
}
