//! In-process HTTP/1.1 fixture server for tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct MockResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// Advertise more bytes than are sent, then hang up.
    pub declared_len: Option<usize>,
}

impl MockResponse {
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::text(status, "application/json", &body.to_string())
    }

    pub fn text(status: u16, content_type: &str, body: &str) -> Self {
        Self::bytes(status, Some(content_type), body.as_bytes().to_vec())
    }

    pub fn bytes(status: u16, content_type: Option<&str>, body: Vec<u8>) -> Self {
        Self { status, content_type: content_type.map(Into::into), body, declared_len: None }
    }
}

/// Serves exactly one request. Returns the base URL and a handle resolving to the
/// raw request head.
pub async fn serve_once(response: MockResponse) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut head = Vec::new();
        let mut buf = [0u8; 4096];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }

        let reason = reqwest::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown");
        let mut out = format!("HTTP/1.1 {} {}\r\n", response.status, reason);
        if let Some(ct) = &response.content_type {
            out.push_str(&format!("Content-Type: {ct}\r\n"));
        }
        if !matches!(response.status, 204 | 205 | 304) {
            let len = response.declared_len.unwrap_or(response.body.len());
            out.push_str(&format!("Content-Length: {len}\r\n"));
        }
        out.push_str("Connection: close\r\n\r\n");

        // The client may hang up early after rejecting the headers.
        let _ = stream.write_all(out.as_bytes()).await;
        let _ = stream.write_all(&response.body).await;
        let _ = stream.flush().await;
        let _ = stream.shutdown().await;

        String::from_utf8_lossy(&head).into_owned()
    });

    (format!("http://127.0.0.1:{port}"), handle)
}
