use super::ListingSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: &str, request_timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_timeout_ms))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.trim().to_string(),
        })
    }
}

#[async_trait]
impl ListingSource for HttpSource {
    async fn fetch(&self) -> Result<String> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            anyhow::bail!("listings download failed ({}): {}", status, snippet);
        }

        let text = resp
            .text()
            .await
            .context("failed to read listings response body")?;
        tracing::debug!(url = %self.url, bytes = text.len(), "downloaded listings");
        Ok(text)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response on a local port and return its URL.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}/listings.csv", addr)
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 11\r\nConnection: close\r\n\r\nname,price\n",
        )
        .await;
        let source = HttpSource::new(&url, 5_000).unwrap();
        assert_eq!(source.fetch().await.unwrap(), "name,price\n");
    }

    #[tokio::test]
    async fn test_non_success_status_reports_status_and_body() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 14\r\nConnection: close\r\n\r\nno such bucket",
        )
        .await;
        let source = HttpSource::new(&url, 5_000).unwrap();
        let err = source.fetch().await.unwrap_err().to_string();
        assert!(err.contains("404"), "{err}");
        assert!(err.contains("no such bucket"), "{err}");
    }

    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });
        let source = HttpSource::new(&format!("http://{}/listings.csv", addr), 50).unwrap();
        assert!(source.fetch().await.is_err());
    }

    #[test]
    fn test_describe_trims_url() {
        let source = HttpSource::new("  https://example.com/listings.csv ", 1_000).unwrap();
        assert_eq!(source.describe(), "https://example.com/listings.csv");
    }
}
