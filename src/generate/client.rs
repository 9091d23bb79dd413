//! Async client for the model generation endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::generate::protocol::{GenerateRequest, GenerateResponse};
use crate::primitives::{ShapeKind, UnknownShapeError};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed HTTP response")]
    Http,
    #[error("server returned status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownShape(#[from] UnknownShapeError),
}

/// Owns a small tokio runtime; requests run in the background and finished
/// shapes are drained on the UI thread via [`GeneratorClient::poll`].
/// Failures are logged and produce nothing — no retry, no cancellation.
pub struct GeneratorClient {
    runtime: tokio::runtime::Runtime,
    endpoint: String,
    tx: Sender<ShapeKind>,
    rx: Receiver<ShapeKind>,
    in_flight: Arc<AtomicUsize>,
}

impl GeneratorClient {
    pub fn new(endpoint: String) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        let (tx, rx) = std::sync::mpsc::channel();

        Ok(Self {
            runtime,
            endpoint,
            tx,
            rx,
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Fire a generation request. The parsed shape, if any, arrives through
    /// [`GeneratorClient::poll`].
    pub fn request(&self, input: String) {
        let endpoint = self.endpoint.clone();
        let tx = self.tx.clone();
        let in_flight = self.in_flight.clone();
        in_flight.fetch_add(1, Ordering::SeqCst);

        log::info!("Requesting model generation for {:?}", input);

        self.runtime.spawn(async move {
            match post_generate(&endpoint, &input).await {
                Ok(kind) => {
                    log::info!("Prompt {:?} resolved to {}", input, kind);
                    let _ = tx.send(kind);
                }
                Err(err) => {
                    log::error!("Model generation failed: {}", err);
                }
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Next finished shape, if one is waiting.
    pub fn poll(&self) -> Option<ShapeKind> {
        self.rx.try_recv().ok()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// One-shot `POST /generate_model` over a fresh connection.
pub async fn post_generate(endpoint: &str, input: &str) -> Result<ShapeKind, GenerateError> {
    let body = serde_json::to_string(&GenerateRequest {
        input: input.to_string(),
    })?;

    let mut stream = TcpStream::connect(endpoint).await?;

    let request = format!(
        "POST /generate_model HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        endpoint,
        body.len(),
        body
    );
    stream.write_all(request.as_bytes()).await?;

    // Connection: close, so EOF delimits the response.
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;

    let (status, response_body) = parse_response(&response).ok_or(GenerateError::Http)?;
    if status != 200 {
        return Err(GenerateError::Status(status));
    }

    let parsed: GenerateResponse = serde_json::from_slice(response_body)?;
    Ok(parsed.shape.parse()?)
}

/// Splits a raw HTTP response into status code and body.
fn parse_response(raw: &[u8]) -> Option<(u16, &[u8])> {
    let head_end = raw.windows(4).position(|window| window == b"\r\n\r\n")?;
    let head = std::str::from_utf8(&raw[..head_end]).ok()?;

    let status_line = head.lines().next()?;
    let status = status_line.split_whitespace().nth(1)?.parse().ok()?;

    Some((status, &raw[head_end + 4..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::server;
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_response_splits_status_and_body() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi";
        let (status, body) = parse_response(raw).unwrap();
        assert_eq!(status, 200);
        assert_eq!(body, b"hi");
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        assert!(parse_response(b"not http at all").is_none());
    }

    #[tokio::test]
    async fn test_post_generate_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(server::serve(listener));

        let kind = post_generate(&addr, "a big box").await.unwrap();
        assert_eq!(kind, ShapeKind::Cube);
    }

    #[tokio::test]
    async fn test_missing_shape_field_is_an_error() {
        // Fake endpoint that answers with the wrong field name.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut scratch = [0u8; 1024];
            let _ = stream.read(&mut scratch).await;
            let body = r#"{"model":"cube"}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        let result = post_generate(&addr, "anything").await;
        assert!(matches!(result, Err(GenerateError::Json(_))));
    }

    #[tokio::test]
    async fn test_unknown_shape_name_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut scratch = [0u8; 1024];
            let _ = stream.read(&mut scratch).await;
            let body = r#"{"shape":"dodecahedron"}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        let result = post_generate(&addr, "anything").await;
        assert!(matches!(result, Err(GenerateError::UnknownShape(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_io_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = post_generate(&addr, "anything").await;
        assert!(matches!(result, Err(GenerateError::Io(_))));
    }
}
