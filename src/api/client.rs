use async_trait::async_trait;
use governor::{Quota, RateLimiter, state::{InMemoryState, NotKeyed}, clock::DefaultClock};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

use super::endpoints::{CHAMPIONS_ENDPOINT, USER_AGENT};
use super::html::{parse_champion_names, parse_counter_rows};
use super::models::CounterRow;
use super::{PageFetcher, PatchSource};
use crate::error::AppError;
use crate::patch::parse_latest_patch;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking ureq agent driven from the async pipeline through `spawn_blocking`.
/// A request already in flight always runs to completion or timeout.
pub struct OpggClient {
    agent: ureq::Agent,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl OpggClient {
    pub fn new(requests_per_second: u32) -> Self {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();

        OpggClient {
            agent,
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        }
    }

    async fn get_and_parse<T, F>(&self, url: &str, parse: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&str) -> Result<T, AppError> + Send + 'static,
    {
        let agent = self.agent.clone();
        let url = url.to_string();

        tokio::task::spawn_blocking(move || {
            let body = execute_request(&agent, &url)?;
            parse(&body)
        })
        .await
        .map_err(|e| AppError::FetchError(format!("Request task failed: {}", e)))?
    }
}

fn execute_request(agent: &ureq::Agent, url: &str) -> Result<String, AppError> {
    debug!(url, "GET");

    match agent.get(url).call() {
        Ok(resp) if resp.status() == 200 => resp
            .into_string()
            .map_err(|e| AppError::FetchError(format!("Failed to read body from {}: {}", url, e))),
        Ok(resp) => Err(AppError::FetchError(format!(
            "{} returned status {}",
            url,
            resp.status()
        ))),
        Err(ureq::Error::Status(code, _)) => Err(AppError::FetchError(format!(
            "{} returned status {}",
            url, code
        ))),
        Err(e) => Err(AppError::FetchError(format!("Request to {} failed: {}", url, e))),
    }
}

#[async_trait]
impl PageFetcher for OpggClient {
    async fn fetch_rows(&self, url: &str) -> Result<Vec<CounterRow>, AppError> {
        self.rate_limiter.until_ready().await;
        self.get_and_parse(url, parse_counter_rows).await
    }

    async fn fetch_champion_names(&self) -> Result<Vec<String>, AppError> {
        self.rate_limiter.until_ready().await;
        self.get_and_parse(CHAMPIONS_ENDPOINT, parse_champion_names).await
    }
}

#[async_trait]
impl PatchSource for OpggClient {
    // Data Dragon is not the scraped site, so it skips the politeness limiter.
    async fn latest_patch(&self, api_url: &str) -> Result<String, AppError> {
        self.get_and_parse(api_url, parse_latest_patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    // Answers a single request with `status_line` and `body`, handing back the raw request.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/versions.json", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            tx.send(String::from_utf8_lossy(&request).into_owned()).unwrap();

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        (url, rx)
    }

    #[tokio::test]
    async fn latest_patch_reads_first_version_on_ok() {
        let (url, _request) = serve_once("200 OK", r#"["15.8.1","15.7.1"]"#);

        let patch = OpggClient::new(10).latest_patch(&url).await.unwrap();

        assert_eq!(patch, "15.8");
    }

    #[tokio::test]
    async fn server_error_is_a_fetch_error() {
        let (url, _request) = serve_once("500 Internal Server Error", "oops");

        match OpggClient::new(10).latest_patch(&url).await {
            Err(AppError::FetchError(msg)) => assert!(msg.contains("returned status 500"), "{}", msg),
            other => panic!("expected FetchError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn success_status_other_than_200_is_a_fetch_error() {
        let (url, _request) = serve_once("203 Non-Authoritative Information", r#"["15.8.1"]"#);

        match OpggClient::new(10).latest_patch(&url).await {
            Err(AppError::FetchError(msg)) => assert!(msg.contains("returned status 203"), "{}", msg),
            other => panic!("expected FetchError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn refused_connection_is_a_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/versions.json", listener.local_addr().unwrap());
        drop(listener);

        let result = OpggClient::new(10).latest_patch(&url).await;

        assert!(matches!(result, Err(AppError::FetchError(_))), "{:?}", result);
    }

    #[tokio::test]
    async fn requests_carry_browser_user_agent() {
        let (url, request) = serve_once(
            "200 OK",
            "<ul><li><div></div><div><span>Jinx</span></div><div><strong>52.3%</strong></div><div><span>1,204</span></div></li></ul>",
        );

        let rows = OpggClient::new(10).fetch_rows(&url).await.unwrap();

        assert_eq!(rows, vec![CounterRow::new("Jinx", "52.3%", "1,204")]);
        let request = request.recv().unwrap().to_ascii_lowercase();
        let expected = format!("user-agent: {}", USER_AGENT.to_ascii_lowercase());
        assert!(request.contains(&expected), "{}", request);
    }
}
