use crate::candidate::{Candidate, Category, parse_candidates};
use crate::config::LookupConfig;
use crate::error::LookupError;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CACHE_CONTROL, PRAGMA};

pub type LookupResult = Result<Vec<Candidate>, LookupError>;

/// Something that can answer "which airports/airlines match this text?"
pub trait LookupService: Send + Sync {
    fn lookup(&self, category: Category, query: &str) -> LookupResult;
}

impl<F> LookupService for F
where
    F: Fn(Category, &str) -> LookupResult + Send + Sync,
{
    fn lookup(&self, category: Category, query: &str) -> LookupResult {
        self(category, query)
    }
}

/// Lookup service backed by the remote HTTP API
pub struct HttpLookupClient {
    config: LookupConfig,
    client: Client,
}

impl HttpLookupClient {
    pub fn new(config: LookupConfig) -> Result<Self, LookupError> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("flightdesk/", env!("CARGO_PKG_VERSION")));

        // Local dev servers are never reachable through a system proxy
        let base = url::Url::parse(&config.base_url)?;
        if matches!(base.host_str(), Some("localhost" | "127.0.0.1" | "[::1]")) {
            builder = builder.no_proxy();
        }

        let client = builder.build()?;

        Ok(Self { config, client })
    }
}

impl LookupService for HttpLookupClient {
    fn lookup(&self, category: Category, query: &str) -> LookupResult {
        let endpoint = self.config.endpoint_url(category);
        let url = url::Url::parse_with_params(&endpoint, &[("query", query.trim())])?;

        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .header(ACCEPT, "application/json")
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(LookupError::Status { status, body });
        }

        let bytes = response.bytes()?;
        parse_candidates(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve exactly one HTTP response and hand back the raw request head
    fn serve_once(status_line: &str, body: &str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(head);
        });

        (base_url, rx)
    }

    fn client_for(base_url: &str) -> HttpLookupClient {
        let mut config = LookupConfig::default();
        config.set_base_url(base_url).unwrap();
        HttpLookupClient::new(config).unwrap()
    }

    #[test]
    fn test_lookup_sends_no_cache_get() {
        let (base_url, head_rx) = serve_once(
            "200 OK",
            r#"[{"code":"PAR","name":"Paris Charles de Gaulle","city":"Paris"}]"#,
        );

        let candidates = client_for(&base_url)
            .lookup(Category::Airport, "  par ")
            .unwrap();
        assert_eq!(
            candidates,
            vec![Candidate::new("PAR", "Paris Charles de Gaulle").with_city("Paris")]
        );

        let head = head_rx.recv().unwrap();
        let request_line = head.lines().next().unwrap();
        assert_eq!(request_line, "GET /airports?query=par HTTP/1.1");
        let lower = head.to_ascii_lowercase();
        assert!(lower.contains("cache-control: no-cache"));
        assert!(lower.contains("pragma: no-cache"));
    }

    #[test]
    fn test_lookup_encodes_query_for_airlines() {
        let (base_url, head_rx) = serve_once("200 OK", "[]");

        let candidates = client_for(&base_url)
            .lookup(Category::Airline, "air fr&nce")
            .unwrap();
        assert!(candidates.is_empty());

        let head = head_rx.recv().unwrap();
        assert!(head.starts_with("GET /airlines?query=air+fr%26nce HTTP/1.1"));
    }

    #[test]
    fn test_lookup_non_success_status() {
        let (base_url, _head_rx) = serve_once("503 Service Unavailable", "maintenance");

        let err = client_for(&base_url)
            .lookup(Category::Airport, "lon")
            .unwrap_err();
        match err {
            LookupError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lookup_non_array_payload() {
        let (base_url, _head_rx) = serve_once("200 OK", r#"{"results": []}"#);

        let err = client_for(&base_url)
            .lookup(Category::Airport, "lon")
            .unwrap_err();
        assert_eq!(err.kind(), crate::FailureKind::Malformed);
    }

    #[test]
    fn test_lookup_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let err = client_for(&format!("http://127.0.0.1:{port}"))
            .lookup(Category::Airport, "lon")
            .unwrap_err();
        assert_eq!(err.kind(), crate::FailureKind::Transport);
    }
}
