use appointment_checklist::PatientProfile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

#[allow(dead_code)]
pub const SAMPLE_CHECKLIST: &str = r#"{"introduction": "Hi", "pre_appointment": ["Q1?"], "during_appointment": ["Q2?"], "post_appointment": ["Q3?"], "emotional_support": "You got this."}"#;

#[allow(dead_code)]
pub const SAMPLE_CHECKLIST_PRETTY: &str = r#"{
  "introduction": "Hi",
  "pre_appointment": [
    "Q1?"
  ],
  "during_appointment": [
    "Q2?"
  ],
  "post_appointment": [
    "Q3?"
  ],
  "emotional_support": "You got this."
}"#;

#[allow(dead_code)]
pub fn full_profile() -> PatientProfile {
    PatientProfile::new()
        .height("5'4\"")
        .weight("140 lbs")
        .age("72")
        .location("Phoenix, Arizona")
        .ethnicity("Hispanic")
        .conditions("osteoarthritis, high cholesterol")
        .concerns("knee pain on stairs")
        .medications("atorvastatin 20mg, fish oil")
}

/// One request as the local server saw it.
#[derive(Debug)]
#[allow(dead_code)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[allow(dead_code)]
impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

/// Wrap a Gemini stream payload as one SSE event.
#[allow(dead_code)]
pub fn sse_text_event(text: &str) -> String {
    let payload = serde_json::json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    });
    format!("data: {}\r\n\r\n", payload)
}

/// An HTTP client that ignores proxy settings from the environment.
#[cfg(feature = "gemini")]
#[allow(dead_code)]
pub fn direct_http_client(timeout: Option<std::time::Duration>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder().no_proxy();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().expect("Failed to build HTTP client")
}

/// Serve exactly one HTTP request on a local port.
///
/// Replies with `status` and writes `pieces` one at a time, then closes the
/// connection. Returns the base URL and the captured request.
#[allow(dead_code)]
pub async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    pieces: Vec<Vec<u8>>,
) -> (String, oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind local test server");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let request = read_request(&mut socket).await;
        let _ = tx.send(request);

        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
            status, content_type
        );
        socket.write_all(head.as_bytes()).await.expect("write head");
        for piece in pieces {
            socket.write_all(&piece).await.expect("write piece");
            socket.flush().await.expect("flush");
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        let _ = socket.shutdown().await;
    });

    (format!("http://{}", addr), rx)
}

/// Accept one request and never answer it.
#[allow(dead_code)]
pub async fn serve_silently() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind local test server");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let _request = read_request(&mut socket).await;
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    });

    format!("http://{}", addr)
}

async fn read_request(socket: &mut TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut tmp).await.expect("read request");
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut tmp).await.expect("read body");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
    }
    let end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..end]).to_string();

    CapturedRequest {
        request_line,
        headers,
        body,
    }
}
