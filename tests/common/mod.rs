//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use storefront_facade::facade::{LatencyModel, NoFaults};
use storefront_facade::observability::{MemorySink, SinkEvent, Telemetry};
use storefront_facade::Api;

/// An Api with no delay and no faults, reporting to `sink`.
#[allow(dead_code)]
pub fn quiet_api(sink: Arc<MemorySink>) -> Api {
    Api::builder()
        .latency(LatencyModel::none())
        .fault_policy(NoFaults)
        .telemetry(Arc::new(Telemetry::with_sink(sink)))
        .build()
}

/// Group sink events by request id, keeping arrival order.
#[allow(dead_code)]
pub fn events_by_request(events: &[SinkEvent]) -> HashMap<String, Vec<SinkEvent>> {
    let mut grouped: HashMap<String, Vec<SinkEvent>> = HashMap::new();
    for event in events {
        let id = event
            .request_id()
            .expect("facade events carry a request id")
            .to_string();
        grouped.entry(id).or_default().push(event.clone());
    }
    grouped
}

/// Start a mock telemetry collector. Every POSTed JSON body is forwarded on the channel.
#[allow(dead_code)]
pub async fn start_mock_collector() -> (SocketAddr, mpsc::UnboundedReceiver<serde_json::Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        if let Some(body) = read_request_body(&mut socket).await {
                            if let Ok(json) = serde_json::from_slice(&body) {
                                let _ = tx.send(json);
                            }
                        }
                        let _ = socket
                            .write_all(b"HTTP/1.1 202 Accepted\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                            .await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

async fn read_request_body(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(buf[header_end..header_end + content_length].to_vec())
}
