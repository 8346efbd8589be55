/*
 * url.rs
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

//! URL parsing for the three schemes the browser speaks: http, https, file.
//! Splits are deliberately simple (first `://`, first `/`, first `:`), with
//! every split point validated instead of panicking on malformed input.

use std::fmt;

use crate::error::FetchError;

/// URL scheme. Only the three the fetch core supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    File,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            "file" => Some(Scheme::File),
            _ => None,
        }
    }

    /// Default port for network schemes; file URLs have none.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Scheme::Http => Some(80),
            Scheme::Https => Some(443),
            Scheme::File => None,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed absolute URL. Immutable after parse; every redirect hop constructs
/// a new value. For network schemes host and port are always set and the
/// path always starts with `/`; for file URLs host and port are `None` and
/// the path is the remainder verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url {
    scheme: Scheme,
    host: Option<String>,
    port: Option<u16>,
    path: String,
}

/// Identity of one request attempt for cache purposes: the (scheme, host,
/// port, path) of the URL actually fetched, so each hop of a redirect chain
/// caches independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    scheme: Scheme,
    host: Option<String>,
    port: Option<u16>,
    path: String,
}

impl Url {
    /// Parse `scheme://rest`. The host/path split is at the first `/` (a
    /// missing path becomes `/`, so `http://example.com` equals
    /// `http://example.com/`); a `:port` suffix in the host segment
    /// overrides the scheme default. No further host validation is done.
    pub fn parse(raw: &str) -> Result<Url, FetchError> {
        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| FetchError::MalformedUrl(format!("missing :// in {raw:?}")))?;
        let scheme = Scheme::from_str(scheme)
            .ok_or_else(|| FetchError::MalformedUrl(format!("unsupported scheme {scheme:?}")))?;

        if scheme == Scheme::File {
            // Remainder is the filesystem path verbatim; no authority.
            return Ok(Url {
                scheme,
                host: None,
                port: None,
                path: rest.to_string(),
            });
        }

        // A remainder with no slash gets one appended, so a bare host means
        // the root path.
        let (authority, path_rest) = rest.split_once('/').unwrap_or((rest, ""));
        let path = format!("/{path_rest}");

        let mut port = scheme.default_port();
        let host = match authority.split_once(':') {
            Some((host, suffix)) => {
                port = Some(suffix.parse::<u16>().map_err(|_| {
                    FetchError::MalformedUrl(format!("bad port {suffix:?} in {raw:?}"))
                })?);
                host.to_string()
            }
            None => authority.to_string(),
        };

        Ok(Url {
            scheme,
            host: Some(host),
            port,
            path,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Host and port together; `None` for file URLs.
    pub fn authority(&self) -> Option<(&str, u16)> {
        match (self.host.as_deref(), self.port) {
            (Some(host), Some(port)) => Some((host, port)),
            _ => None,
        }
    }

    /// Resolve a `location` header against this hop. A value starting with
    /// `/` is path-absolute and inherits this URL's scheme, host, and port;
    /// anything else must itself be an absolute URL. A bare relative path
    /// like `next.html` is therefore rejected as malformed rather than
    /// resolved against the current path.
    pub fn resolve_redirect(&self, location: &str) -> Result<Url, FetchError> {
        if location.starts_with('/') {
            let (host, port) = self.authority().ok_or_else(|| {
                FetchError::MalformedUrl(format!("no authority to resolve {location:?} against"))
            })?;
            Url::parse(&format!("{}://{}:{}{}", self.scheme, host, port, location))
        } else {
            Url::parse(location)
        }
    }

    /// Cache identity of this URL.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            scheme: self.scheme,
            host: self.host.clone(),
            port: self.port,
            path: self.path.clone(),
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.host.as_deref(), self.port) {
            (Some(host), Some(port)) => {
                write!(f, "{}://{}:{}{}", self.scheme, host, port, self.path)
            }
            _ => write!(f, "{}://{}", self.scheme, self.path),
        }
    }
}
