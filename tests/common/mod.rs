//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use opentelemetry::Value;
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::TracerProvider;
use pokecards::Telemetry;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A backend that answers every request with the same status and body and
/// hands the raw request head back to the test.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: flume::Receiver<String>,
}

impl MockBackend {
    pub async fn start(status: u16, body: impl Into<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body: String = body.into();
        let (tx, rx) = flume::unbounded();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let tx = tx.clone();
                let body = body.clone();
                tokio::spawn(async move {
                    let head = read_head(&mut socket).await;
                    let _ = tx.send_async(head).await;

                    let reason = reqwest::StatusCode::from_u16(status)
                        .ok()
                        .and_then(|s| s.canonical_reason())
                        .unwrap_or("Unknown");
                    let response = format!(
                        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len(),
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, requests: rx }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/v2/cards", self.addr)
    }

    /// The head (request line and headers) of the next request received.
    pub async fn next_request(&self) -> String {
        self.requests.recv_async().await.unwrap()
    }
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// An address nothing is listening on.
pub async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v2/cards")
}

/// `n` minimal upstream card objects in a `data` envelope.
pub fn cards_body(n: usize) -> String {
    let cards: Vec<_> = (0..n)
        .map(|i| {
            serde_json::json!({
                "id": format!("sv1-{i}"),
                "name": format!("Card {i}"),
                "types": ["Fire"],
                "hp": "60",
                "rarity": "Rare",
            })
        })
        .collect();
    serde_json::json!({ "data": cards, "page": 1, "pageSize": n, "count": n, "totalCount": 99 })
        .to_string()
}

/// Telemetry that exports synchronously into memory.
pub fn memory_telemetry() -> (Telemetry, InMemorySpanExporter) {
    let exporter = InMemorySpanExporter::default();
    let provider = TracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    (Telemetry::from_provider(provider), exporter)
}

pub fn span<'a>(spans: &'a [SpanData], name: &str) -> &'a SpanData {
    spans
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no span named {name}"))
}

pub fn attribute<'a>(span: &'a SpanData, key: &str) -> Option<&'a Value> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

/// A log file path unique to this test binary and `name`.
pub fn log_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pokecards-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("logs").join("pokecards.log")
}
