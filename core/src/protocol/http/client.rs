/*
 * client.rs
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

//! Fetch driver: cache consultation, one connection per hop, redirect
//! resolution with a hop bound.

use std::time::Duration;

use log::{debug, warn};

use crate::cache::ResponseCache;
use crate::error::FetchError;
use crate::net::{self, StreamReader};
use crate::url::{Scheme, Url};

use super::request::encode_request;
use super::response::{read_response, Response};

/// Redirect hops allowed in one resolution before giving up.
const MAX_REDIRECTS: u32 = 10;

/// Client knobs. `connect_timeout` bounds TCP connect plus TLS handshake;
/// the default (`None`) blocks until the platform itself gives up, which
/// matches the protocol's own lack of deadlines.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub connect_timeout: Option<Duration>,
}

/// Resolver state: still chasing redirects, or landed on a terminal body.
enum Resolution {
    Resolving(Url),
    Done(String),
}

/// HTTP(S) fetch client: one GET per call, redirects followed up to the hop
/// bound, cacheable 200 responses kept in the owned [`ResponseCache`].
/// File-scheme URLs bypass the network, the cache, and redirects entirely.
pub struct HttpClient {
    cache: ResponseCache,
    options: FetchOptions,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::with_options(FetchOptions::default())
    }

    pub fn with_options(options: FetchOptions) -> Self {
        Self {
            cache: ResponseCache::new(),
            options,
        }
    }

    /// Replace the cache, e.g. with one built around a test clock.
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetch the body for `url`. Extra headers override the baseline set
    /// case-insensitively. Each hop of a redirect chain checks, and may
    /// populate, the cache under its own identity.
    pub async fn fetch(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<String, FetchError> {
        let url = Url::parse(url)?;
        if url.scheme() == Scheme::File {
            // Just the file's text; no request, no headers, no cache.
            return Ok(tokio::fs::read_to_string(url.path()).await?);
        }
        self.resolve(url, headers).await
    }

    async fn resolve(
        &self,
        url: Url,
        headers: &[(String, String)],
    ) -> Result<String, FetchError> {
        let mut state = Resolution::Resolving(url);
        let mut hops: u32 = 0;
        loop {
            match state {
                Resolution::Done(body) => return Ok(body),
                Resolution::Resolving(current) => {
                    let key = current.cache_key();
                    if let Some(body) = self.cache.lookup(&key) {
                        debug!("cache hit for {}", current);
                        state = Resolution::Done(body);
                        continue;
                    }

                    let response = self.request_one(&current, headers).await?;

                    if (300..400).contains(&response.status) {
                        if let Some(location) = response.headers.get("location") {
                            hops += 1;
                            if hops > MAX_REDIRECTS {
                                warn!("giving up after {} redirects at {}", hops - 1, current);
                                return Err(FetchError::RedirectLoop);
                            }
                            let next = current.resolve_redirect(location)?;
                            debug!("redirect {} -> {}", current, next);
                            state = Resolution::Resolving(next);
                            continue;
                        }
                        // 3xx without a location is terminal like any other status.
                    }

                    self.cache
                        .maybe_store(&key, response.status, &response.headers, &response.body);
                    state = Resolution::Done(response.body);
                }
            }
        }
    }

    /// One hop: connect, send the request, decode the response. The socket
    /// never outlives the hop; `read_response` consumes the reader, and the
    /// connection drops with it on success and error paths alike.
    async fn request_one(
        &self,
        url: &Url,
        headers: &[(String, String)],
    ) -> Result<Response, FetchError> {
        let (host, port) = url
            .authority()
            .ok_or_else(|| FetchError::MalformedUrl(format!("no authority in {url}")))?;
        let stream = net::connect(
            host,
            port,
            url.scheme() == Scheme::Https,
            self.options.connect_timeout,
        )
        .await
        .map_err(FetchError::Connection)?;
        let mut reader = StreamReader::new(stream);
        reader.send(encode_request(url, headers).as_bytes()).await?;
        read_response(reader).await
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
