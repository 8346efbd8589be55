/*
 * net.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Finestra, a minimal text-mode web browser.
 *
 * Finestra is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Finestra is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Finestra.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Transport: TCP connect, optional rustls TLS upgrade with SNI, and a
//! buffered line-oriented reader over the resulting stream. One connection
//! per hop; the stream is dropped (closed) when the hop's reader is dropped.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::client::ClientConfig;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::RootCertStore;
use tokio_rustls::TlsConnector;

/// Build a root certificate store: platform native certs first, then webpki-roots as fallback.
fn build_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    if let Ok(certs) = rustls_native_certs::load_native_certs() {
        for cert in certs {
            let _ = root_store.add(cert);
        }
    }
    if root_store.is_empty() {
        root_store.roots = webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
    }
    root_store
}

/// TLS client config for HTTP/1.1 (native + Mozilla roots, no client auth).
/// No ALPN: this client only ever speaks HTTP/1.1.
fn client_config() -> Arc<ClientConfig> {
    let config = ClientConfig::builder()
        .with_root_certificates(build_root_store())
        .with_no_client_auth();
    Arc::new(config)
}

static CONNECTOR: std::sync::OnceLock<TlsConnector> = std::sync::OnceLock::new();

fn connector() -> &'static TlsConnector {
    CONNECTOR.get_or_init(|| TlsConnector::from(client_config()))
}

/// One hop's stream: plain TCP or TLS over TCP. Implements AsyncRead + AsyncWrite.
pub enum HttpStream {
    Plain(TcpStream),
    Tls(TlsStream<TcpStream>),
}

impl AsyncRead for HttpStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            HttpStream::Tls(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for HttpStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            HttpStream::Tls(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_flush(cx),
            HttpStream::Tls(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            HttpStream::Tls(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// Connect to host:port, upgrading to TLS with SNI set to `host` when
/// `use_tls`. `connect_timeout` bounds TCP connect and TLS handshake
/// together; `None` blocks until the platform itself gives up.
pub async fn connect(
    host: &str,
    port: u16,
    use_tls: bool,
    connect_timeout: Option<Duration>,
) -> io::Result<HttpStream> {
    match connect_timeout {
        Some(limit) => timeout(limit, connect_inner(host, port, use_tls))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))?,
        None => connect_inner(host, port, use_tls).await,
    }
}

async fn connect_inner(host: &str, port: u16, use_tls: bool) -> io::Result<HttpStream> {
    let addr = format!("{}:{}", host, port);
    let tcp = TcpStream::connect(&addr).await?;
    if use_tls {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid host name"))?;
        let tls = connector()
            .connect(server_name, tcp)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
        Ok(HttpStream::Tls(tls))
    } else {
        Ok(HttpStream::Plain(tcp))
    }
}

/// Buffered reader over an [`HttpStream`]: CRLF-delimited lines for the
/// status line and headers, then a single drain for the close-delimited
/// body. Dropping the reader closes the connection.
pub struct StreamReader {
    stream: HttpStream,
    buf: BytesMut,
}

impl StreamReader {
    pub fn new(stream: HttpStream) -> Self {
        Self {
            stream,
            buf: BytesMut::with_capacity(8192),
        }
    }

    /// Write the whole request and flush it.
    pub async fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data).await?;
        self.stream.flush().await
    }

    /// Find CRLF in buf; return number of bytes to the start of CRLF, or None if not found.
    fn find_crlf(buf: &[u8]) -> Option<usize> {
        let mut i = 0;
        while i + 1 < buf.len() {
            if buf[i] == b'\r' && buf[i + 1] == b'\n' {
                return Some(i);
            }
            i += 1;
        }
        None
    }

    /// Next CRLF-terminated line, without the terminator. EOF before a CRLF
    /// is an error: the head of a response is never close-delimited.
    pub async fn read_line(&mut self) -> io::Result<String> {
        loop {
            if let Some(n) = Self::find_crlf(&self.buf) {
                let line = self.buf.split_to(n + 2);
                let text = std::str::from_utf8(&line[..n]).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidData, "response line is not UTF-8")
                })?;
                return Ok(text.to_string());
            }
            let mut tmp = [0u8; 8192];
            let n = self.stream.read(&mut tmp).await?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before end of line",
                ));
            }
            self.buf.extend_from_slice(&tmp[..n]);
        }
    }

    /// Everything that remains: buffered bytes plus the stream until the
    /// peer closes. Connection-close framing is the only body framing this
    /// client supports; there is no Content-Length or chunked handling.
    pub async fn read_to_end(mut self) -> io::Result<Vec<u8>> {
        let mut out = self.buf.to_vec();
        let mut tmp = [0u8; 8192];
        loop {
            let n = self.stream.read(&mut tmp).await?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&tmp[..n]);
        }
        Ok(out)
    }
}
