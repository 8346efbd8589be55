/*
 * fetch_integration.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * Integration tests for the fetch core. Each test spins up a throwaway TCP
 * listener on localhost and drives HttpClient against it, so the whole
 * request/response cycle is exercised without touching the real network.
 *
 * Run with:
 *   cargo test -p finestra_core --test fetch_integration
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use finestra_core::{Clock, FetchError, HttpClient, ResponseCache};

/// Clock whose "now" only moves when a test says so.
struct ManualClock(Mutex<Instant>);

impl ManualClock {
    fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(Instant::now())))
    }

    fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.0.lock().unwrap()
    }
}

/// Serve `response` verbatim for every connection, then close it. Returns
/// the bound port and a counter of accepted connections.
async fn serve_fixed(response: String) -> (u16, Arc<AtomicUsize>) {
    serve_script(vec![response]).await
}

/// Serve one canned response per connection, in order; connections past the
/// end of the script get the last response again.
async fn serve_script(responses: Vec<String>) -> (u16, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let response = responses[n.min(responses.len() - 1)].clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = sock.read(&mut buf).await;
                let _ = sock.write_all(response.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });
    (port, hits)
}

/// Serve `response` once and hand back the request head the client sent.
async fn serve_capture(response: String) -> (u16, Arc<Mutex<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let captured = Arc::new(Mutex::new(String::new()));
    let slot = captured.clone();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let n = sock.read(&mut buf).await.unwrap();
        *slot.lock().unwrap() = String::from_utf8_lossy(&buf[..n]).into_owned();
        let _ = sock.write_all(response.as_bytes()).await;
        let _ = sock.shutdown().await;
    });
    (port, captured)
}

#[tokio::test]
async fn body_is_returned_verbatim() {
    let body = "<html><body><p>hello & welcome</p></body></html>";
    let (port, hits) = serve_fixed(format!("HTTP/1.1 200 OK\r\n\r\n{body}")).await;
    let client = HttpClient::new();
    let got = client
        .fetch(&format!("http://127.0.0.1:{port}/index.html"), &[])
        .await
        .unwrap();
    // No HTML interpretation: tags come back untouched.
    assert_eq!(got, body);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn request_carries_baseline_and_override_headers() {
    let (port, captured) = serve_capture("HTTP/1.1 200 OK\r\n\r\nok".to_string()).await;
    let client = HttpClient::new();
    let headers = vec![("user-agent".to_string(), "tester/1.0".to_string())];
    client
        .fetch(&format!("http://127.0.0.1:{port}/page"), &headers)
        .await
        .unwrap();

    let head = captured.lock().unwrap().clone();
    assert!(head.starts_with("GET /page HTTP/1.1\r\nHost: 127.0.0.1\r\n"));
    assert!(head.contains("Connection: close\r\n"));
    assert!(head.contains("User-Agent: tester/1.0\r\n"));
    assert!(!head.contains("CustomBrowser"));
    assert!(head.ends_with("\r\n\r\n"));
}

#[tokio::test]
async fn redirect_loop_gives_up_after_eleven_attempts() {
    let (port, hits) =
        serve_fixed("HTTP/1.1 301 Moved Permanently\r\nLocation: /loop\r\n\r\n".to_string()).await;
    let client = HttpClient::new();
    let err = client
        .fetch(&format!("http://127.0.0.1:{port}/start"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::RedirectLoop));
    // Initial attempt plus ten allowed redirects; the would-be twelfth
    // connection never happens.
    assert_eq!(hits.load(Ordering::SeqCst), 11);
}

#[tokio::test]
async fn path_absolute_redirect_stays_on_the_same_server() {
    let (port, hits) = serve_script(vec![
        "HTTP/1.1 302 Found\r\nLocation: /new\r\n\r\n".to_string(),
        "HTTP/1.1 200 OK\r\n\r\narrived".to_string(),
    ])
    .await;
    let client = HttpClient::new();
    let body = client
        .fetch(&format!("http://127.0.0.1:{port}/old"), &[])
        .await
        .unwrap();
    assert_eq!(body, "arrived");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn absolute_redirect_moves_to_another_server() {
    let (final_port, _) = serve_fixed("HTTP/1.1 200 OK\r\n\r\nfinal stop".to_string()).await;
    let (port, _) = serve_fixed(format!(
        "HTTP/1.1 302 Found\r\nLocation: http://127.0.0.1:{final_port}/final\r\n\r\n"
    ))
    .await;
    let client = HttpClient::new();
    let body = client
        .fetch(&format!("http://127.0.0.1:{port}/old"), &[])
        .await
        .unwrap();
    assert_eq!(body, "final stop");
}

#[tokio::test]
async fn redirect_without_location_is_terminal() {
    let (port, hits) =
        serve_fixed("HTTP/1.1 301 Moved Permanently\r\n\r\nwent nowhere".to_string()).await;
    let client = HttpClient::new();
    let body = client
        .fetch(&format!("http://127.0.0.1:{port}/x"), &[])
        .await
        .unwrap();
    assert_eq!(body, "went nowhere");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn bare_relative_redirect_location_is_malformed() {
    let (port, _) =
        serve_fixed("HTTP/1.1 302 Found\r\nLocation: next.html\r\n\r\n".to_string()).await;
    let client = HttpClient::new();
    let err = client
        .fetch(&format!("http://127.0.0.1:{port}/dir/old"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::MalformedUrl(_)));
}

#[tokio::test]
async fn cacheable_response_skips_the_network_until_expiry() {
    let (port, hits) = serve_fixed(
        "HTTP/1.1 200 OK\r\nCache-Control: max-age=60\r\n\r\ncached body".to_string(),
    )
    .await;
    let clock = ManualClock::new();
    let client = HttpClient::new().with_cache(ResponseCache::with_clock(clock.clone()));
    let url = format!("http://127.0.0.1:{port}/page");

    assert_eq!(client.fetch(&url, &[]).await.unwrap(), "cached body");
    assert_eq!(client.fetch(&url, &[]).await.unwrap(), "cached body");
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_secs(61));
    assert_eq!(client.fetch(&url, &[]).await.unwrap(), "cached body");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn extra_directives_disable_caching() {
    let (port, hits) = serve_fixed(
        "HTTP/1.1 200 OK\r\nCache-Control: max-age=60, must-revalidate\r\n\r\nbody".to_string(),
    )
    .await;
    let client = HttpClient::new();
    let url = format!("http://127.0.0.1:{port}/page");
    client.fetch(&url, &[]).await.unwrap();
    client.fetch(&url, &[]).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn non_200_is_never_cached() {
    let (port, hits) = serve_fixed(
        "HTTP/1.1 404 Not Found\r\nCache-Control: max-age=60\r\n\r\nmissing".to_string(),
    )
    .await;
    let client = HttpClient::new();
    let url = format!("http://127.0.0.1:{port}/page");
    assert_eq!(client.fetch(&url, &[]).await.unwrap(), "missing");
    assert_eq!(client.fetch(&url, &[]).await.unwrap(), "missing");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn chunked_responses_are_rejected() {
    let (port, _) = serve_fixed(
        "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nok\r\n0\r\n\r\n".to_string(),
    )
    .await;
    let client = HttpClient::new();
    let err = client
        .fetch(&format!("http://127.0.0.1:{port}/x"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Protocol(_)));
}

#[tokio::test]
async fn compressed_responses_are_rejected() {
    let (port, _) = serve_fixed(
        "HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\n\r\n\u{1f}\u{8b}".to_string(),
    )
    .await;
    let client = HttpClient::new();
    let err = client
        .fetch(&format!("http://127.0.0.1:{port}/x"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Protocol(_)));
}

#[tokio::test]
async fn malformed_status_line_is_a_protocol_error() {
    let (port, _) = serve_fixed("HTTP/1.1 200\r\n\r\n".to_string()).await;
    let client = HttpClient::new();
    let err = client
        .fetch(&format!("http://127.0.0.1:{port}/x"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Protocol(_)));
}

#[tokio::test]
async fn header_without_colon_is_a_protocol_error() {
    let (port, _) = serve_fixed("HTTP/1.1 200 OK\r\nBadHeader\r\n\r\nbody".to_string()).await;
    let client = HttpClient::new();
    let err = client
        .fetch(&format!("http://127.0.0.1:{port}/x"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Protocol(_)));
}

#[tokio::test]
async fn status_line_with_empty_explanation_is_accepted() {
    // "HTTP/1.1 200 " still splits into three parts; the explanation is empty.
    let (port, _) = serve_fixed("HTTP/1.1 200 \r\n\r\nbody".to_string()).await;
    let client = HttpClient::new();
    let body = client
        .fetch(&format!("http://127.0.0.1:{port}/x"), &[])
        .await
        .unwrap();
    assert_eq!(body, "body");
}

#[tokio::test]
async fn connection_refused_is_a_connection_error() {
    // Bind then drop the listener so the port is very likely closed.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = HttpClient::new();
    let err = client
        .fetch(&format!("http://127.0.0.1:{port}/x"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Connection(_)));
}

#[tokio::test]
async fn malformed_urls_never_touch_the_network() {
    let client = HttpClient::new();
    for raw in ["notaurl", "ftp://example.com/x", "http://a.com:bad/x"] {
        let err = client.fetch(raw, &[]).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedUrl(_)), "{raw}");
    }
}

#[tokio::test]
async fn file_scheme_returns_exact_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.html");
    std::fs::write(&path, "<p>local file</p>\n").unwrap();

    let client = HttpClient::new();
    let body = client
        .fetch(&format!("file://{}", path.display()), &[])
        .await
        .unwrap();
    assert_eq!(body, "<p>local file</p>\n");

    let err = client
        .fetch(&format!("file://{}", dir.path().join("absent").display()), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Io(_)));
}
