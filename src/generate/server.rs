//! The model generation service: maps a free-text prompt to a shape name.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::generate::protocol::{GenerateRequest, GenerateResponse};
use crate::primitives::ShapeKind;

const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Keyword heuristics over the lowercased prompt. Unmatched prompts fall
/// back to a cube.
pub fn shape_for_prompt(input: &str) -> ShapeKind {
    let input = input.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|word| input.contains(word));

    if contains_any(&["sphere", "ball", "round"]) {
        ShapeKind::Sphere
    } else if contains_any(&["cube", "box", "square"]) {
        ShapeKind::Cube
    } else if contains_any(&["cone", "pyramid"]) {
        ShapeKind::Cone
    } else if contains_any(&["cylinder", "tube"]) {
        ShapeKind::Cylinder
    } else {
        ShapeKind::Cube
    }
}

/// Bind and serve forever.
pub async fn run(addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Model generation service listening on {}", addr);
    serve(listener).await
}

/// Accept loop; one task per connection.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                log::debug!("Client connected from {}", peer);
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream).await {
                        log::error!("Request from {} failed: {}", peer, err);
                    }
                });
            }
            Err(err) => {
                log::error!("Accept error: {}", err);
            }
        }
    }
}

async fn handle_connection(mut stream: TcpStream) -> std::io::Result<()> {
    let request = match read_request(&mut stream).await? {
        Some(request) => request,
        None => {
            return write_response(&mut stream, "400 Bad Request", r#"{"error":"bad request"}"#)
                .await;
        }
    };

    if request.method != "POST" || request.path != "/generate_model" {
        log::warn!("Unhandled route: {} {}", request.method, request.path);
        return write_response(&mut stream, "404 Not Found", r#"{"error":"not found"}"#).await;
    }

    let parsed: GenerateRequest = match serde_json::from_slice(&request.body) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::warn!("Rejected request body: {}", err);
            return write_response(
                &mut stream,
                "400 Bad Request",
                r#"{"error":"invalid request body"}"#,
            )
            .await;
        }
    };

    let shape = shape_for_prompt(&parsed.input);
    log::info!("Prompt {:?} resolved to {}", parsed.input, shape);

    let body = serde_json::to_string(&GenerateResponse {
        shape: shape.to_string(),
    })
    .expect("response serialization is infallible");

    write_response(&mut stream, "200 OK", &body).await
}

struct HttpRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

/// Minimal HTTP/1.1 request reader: header block, then a Content-Length body.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<HttpRequest>> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = find_blank_line(&buffer) {
            break pos;
        }
        if buffer.len() > MAX_REQUEST_BYTES {
            return Ok(None);
        }

        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Ok(None);
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head = match std::str::from_utf8(&buffer[..head_end]) {
        Ok(head) => head,
        Err(_) => return Ok(None),
    };

    let mut lines = head.lines();
    let request_line = match lines.next() {
        Some(line) => line,
        None => return Ok(None),
    };
    let mut parts = request_line.split_whitespace();
    let (method, path) = match (parts.next(), parts.next()) {
        (Some(method), Some(path)) => (method.to_string(), path.to_string()),
        _ => return Ok(None),
    };

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    if content_length > MAX_REQUEST_BYTES {
        return Ok(None);
    }

    let mut body = buffer.split_off(head_end + 4);
    while body.len() < content_length {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Ok(None);
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(Some(HttpRequest { method, path, body }))
}

fn find_blank_line(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

async fn write_response(
    stream: &mut TcpStream,
    status: &str,
    body: &str,
) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_keywords_map_to_shapes() {
        assert_eq!(shape_for_prompt("a bouncy BALL"), ShapeKind::Sphere);
        assert_eq!(shape_for_prompt("something round"), ShapeKind::Sphere);
        assert_eq!(shape_for_prompt("wooden box"), ShapeKind::Cube);
        assert_eq!(shape_for_prompt("a square tile"), ShapeKind::Cube);
        assert_eq!(shape_for_prompt("ice cream cone"), ShapeKind::Cone);
        assert_eq!(shape_for_prompt("the great pyramid"), ShapeKind::Cone);
        assert_eq!(shape_for_prompt("a steel tube"), ShapeKind::Cylinder);
    }

    #[test]
    fn test_unmatched_prompts_default_to_cube() {
        assert_eq!(shape_for_prompt("banana"), ShapeKind::Cube);
        assert_eq!(shape_for_prompt(""), ShapeKind::Cube);
    }

    #[test]
    fn test_sphere_keywords_win_over_later_matches() {
        // Same precedence as the keyword table: sphere is checked first.
        assert_eq!(shape_for_prompt("a round box"), ShapeKind::Sphere);
    }

    async fn send_raw(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8(response).unwrap()
    }

    #[tokio::test]
    async fn test_post_generate_model_returns_a_shape() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener));

        let body = r#"{"input":"a steel tube"}"#;
        let request = format!(
            "POST /generate_model HTTP/1.1\r\nHost: test\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );

        let response = send_raw(addr, &request).await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with(r#"{"shape":"cylinder"}"#));
    }

    #[tokio::test]
    async fn test_unknown_route_is_a_404() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener));

        let response = send_raw(addr, "GET /health HTTP/1.1\r\nHost: test\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 404"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_400() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener));

        let request =
            "POST /generate_model HTTP/1.1\r\nHost: test\r\nContent-Length: 9\r\n\r\nnot json!";
        let response = send_raw(addr, request).await;
        assert!(response.starts_with("HTTP/1.1 400"));
    }
}
