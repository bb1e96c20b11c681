//! Transport boundary for all HTTP I/O.
//!
//! The SCIM and GitHub clients only ever talk to an [`HttpTransport`], which
//! keeps them testable against the in-memory `MockTransport`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Per-call timeout used when the configuration does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The methods the two REST APIs are driven with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header pairs. Lookups through [`header_get`] ignore case.
pub type HttpHeaders = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Request body decoded as JSON, if there is one.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("{method} {url} timed out")]
    Timeout { method: HttpMethod, url: String },

    #[error("no mock response registered for {method} {url}")]
    NoMockResponse { method: HttpMethod, url: String },
}

/// Send a request, receive status, headers and body.
///
/// Non-success statuses are returned as responses, not errors; only a call
/// that never produced a response fails here.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// First header value matching `name`, ignoring case.
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

pub mod reqwest_transport {
    use super::*;

    /// Transport backed by a shared `reqwest::Client`.
    #[derive(Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(client: reqwest::Client) -> Self {
            Self { client }
        }

        /// Build a client whose every call gives up after `timeout`.
        pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
            reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map(Self::new)
                .map_err(|e| HttpError::Transport(e.to_string()))
        }
    }

    fn classify(method: HttpMethod, url: &str, err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout {
                method,
                url: url.to_string(),
            }
        } else {
            HttpError::Transport(err.to_string())
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let reqwest_method = match method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Patch => reqwest::Method::PATCH,
                HttpMethod::Delete => reqwest::Method::DELETE,
            };

            let mut builder = headers
                .iter()
                .fold(self.client.request(reqwest_method, &url), |b, (k, v)| {
                    b.header(k.as_str(), v.as_str())
                });
            if !body.is_empty() {
                builder = builder.body(body);
            }

            tracing::trace!(%method, %url, "HTTP request");
            let resp = builder
                .send()
                .await
                .map_err(|e| classify(method, &url, e))?;

            let status = resp.status().as_u16();
            let headers: HttpHeaders = resp
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();
            let body = resp
                .bytes()
                .await
                .map_err(|e| classify(method, &url, e))?
                .to_vec();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

#[cfg(test)]
pub use mock::MockTransport;


#[cfg(test)]
mod tests {
    use super::reqwest_transport::ReqwestTransport;
    use super::*;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    #[test]
    fn test_header_lookup_ignores_case_and_keeps_first() {
        let headers: HttpHeaders = vec![
            ("Link".to_string(), "<a>; rel=\"next\"".to_string()),
            ("link".to_string(), "<b>; rel=\"next\"".to_string()),
        ];
        assert_eq!(header_get(&headers, "LINK"), Some("<a>; rel=\"next\""));
        assert_eq!(header_get(&headers, "x-missing"), None);
    }

    #[test]
    fn test_method_display() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_response_success_range_and_text() {
        let mut resp = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: br#"{"message":"Validation Failed"}"#.to_vec(),
        };
        assert!(resp.is_success());
        for status in [199, 404, 422] {
            resp.status = status;
            assert!(!resp.is_success());
        }
        assert_eq!(resp.text(), r#"{"message":"Validation Failed"}"#);
    }

    #[test]
    fn test_request_json_body() {
        let mut req = get("https://gh.test");
        assert_eq!(req.json_body(), None);
        req.body = br#"{"group_id":7}"#.to_vec();
        assert_eq!(req.json_body(), Some(serde_json::json!({"group_id": 7})));
    }

    #[tokio::test]
    async fn test_mock_answers_in_order_and_records() {
        let transport = MockTransport::new();
        let url = "https://gh.test/orgs/acme/teams";
        transport.push_json(HttpMethod::Get, url, 200, serde_json::json!([]));
        transport.push_json(HttpMethod::Get, url, 502, serde_json::json!({}));

        let first = transport.send(get(url)).await.unwrap();
        let second = transport.send(get(url)).await.unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(first.header("content-type"), Some("application/json"));
        assert_eq!(second.status, 502);
        assert_eq!(transport.count(HttpMethod::Get, url), 2);
        assert_eq!(transport.count_method(HttpMethod::Post), 0);
    }

    #[tokio::test]
    async fn test_mock_unscripted_route_errors() {
        let transport = MockTransport::new();
        let err = transport
            .send(get("https://gh.test/unscripted"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HttpError::NoMockResponse { method: HttpMethod::Get, ref url } if url == "https://gh.test/unscripted"
        ));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_reqwest_transport_reports_timeout() {
        use std::net::TcpListener;

        // Accepts the connection but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_millis(500));
            drop(stream);
        });

        let transport = ReqwestTransport::with_timeout(Duration::from_millis(100)).unwrap();
        let err = transport
            .send(get(&format!("http://{addr}/orgs/acme/teams")))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Timeout { method: HttpMethod::Get, .. }));

        server.join().unwrap();
    }

    #[tokio::test]
    async fn test_reqwest_transport_rejects_invalid_url() {
        let transport = ReqwestTransport::with_timeout(DEFAULT_TIMEOUT).unwrap();
        let err = transport.send(get("not a url")).await.unwrap_err();
        assert!(matches!(err, HttpError::Transport(_)));
    }
}
