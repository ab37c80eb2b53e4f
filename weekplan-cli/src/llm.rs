//! OpenAI-compatible chat completion client for a local model server.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/v1/chat/completions";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const PROMPT_SUFFIX: &str = ". Make short response in a continuous and short block of text";
const MAX_TOKENS: u32 = 150;
const MAX_ATTEMPTS: usize = 5;
const RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

/// Something that answers a free-text prompt. Failures come back as text
/// so they end up visible in the written plan.
pub trait AiBackend {
    fn complete(&self, prompt: &str) -> impl Future<Output = String> + Send;
}

#[derive(Debug, Clone)]
pub struct LocalAi {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    messages: Vec<Msg<'a>>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: Option<String>,
}

impl LocalAi {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn request(&self, prompt: &str) -> Result<Option<String>> {
        let content = format!("{prompt}{PROMPT_SUFFIX}");
        let body = Req {
            messages: vec![Msg {
                role: "user",
                content: &content,
            }],
            max_tokens: MAX_TOKENS,
        };

        for attempt in 1..=MAX_ATTEMPTS {
            let resp = self
                .client
                .post(&self.endpoint)
                .json(&body)
                .send()
                .await
                .context("local ai request")?;

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!(attempt, "rate limit hit, retrying after delay");
                tokio::time::sleep(RATE_LIMIT_DELAY).await;
                continue;
            }
            if !status.is_success() {
                return Ok(Some(format!("Error: {status}")));
            }

            let out: Resp = resp.json().await.context("parse local ai response")?;
            let text = out
                .choices
                .first()
                .and_then(|c| c.message.content.clone())
                .unwrap_or_default();
            debug!(attempt, chars = text.len(), "local ai answered");
            return Ok(Some(text.trim().to_string()));
        }
        Ok(None)
    }
}

impl AiBackend for LocalAi {
    async fn complete(&self, prompt: &str) -> String {
        match self.request(prompt).await {
            Ok(Some(text)) => text,
            Ok(None) => "Failed to get a response after multiple attempts.".to_string(),
            Err(e) => format!("Exception: {e:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc;

    async fn read_request(sock: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serves the canned `(status, body)` responses one connection each.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut sock, _) = listener.accept().await.unwrap();
                tx.send(read_request(&mut sock).await).ok();
                let resp = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                sock.write_all(resp.as_bytes()).await.unwrap();
                sock.shutdown().await.ok();
            }
        });
        (format!("http://{addr}/v1/chat/completions"), rx)
    }

    const ANSWER: &str = r#"{"choices":[{"message":{"role":"assistant","content":"  Stretch hips and shoulders.  "}}]}"#;

    #[tokio::test]
    async fn test_retries_after_rate_limit() {
        let (endpoint, mut requests) = serve(vec![(429, "{}"), (200, ANSWER)]).await;
        let ai = LocalAi::new(endpoint, Duration::from_secs(10)).unwrap();

        let text = ai.complete("suggest a mobility routine").await;
        assert_eq!(text, "Stretch hips and shoulders.");

        let first = requests.recv().await.unwrap();
        assert!(first.contains("suggest a mobility routine. Make short response"));
        assert!(first.contains("\"max_tokens\":150"));
        assert!(requests.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_server_error_becomes_text() {
        let (endpoint, _requests) = serve(vec![(500, "{}")]).await;
        let ai = LocalAi::new(endpoint, Duration::from_secs(10)).unwrap();
        assert_eq!(ai.complete("hello").await, "Error: 500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_unreachable_server_becomes_text() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let ai = LocalAi::new(format!("http://{addr}/v1/chat/completions"), Duration::from_secs(5)).unwrap();
        assert!(ai.complete("hello").await.starts_with("Exception: local ai request"));
    }
}
