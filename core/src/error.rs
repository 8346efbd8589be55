/*
 * error.rs
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

//! Fetch errors. No variant is recovered internally; every failure
//! propagates to the caller as-is.

use std::io;

use thiserror::Error;

/// Everything a fetch can fail with.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No `://` separator, an unsupported scheme, a bad port, or a redirect
    /// location that cannot be resolved to an absolute URL.
    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    /// DNS, TCP connect, TLS handshake, or connect-timeout failure.
    #[error("connection failed: {0}")]
    Connection(#[source] io::Error),

    /// Unparsable status line or header, or a response declaring a transfer
    /// or content encoding this client refuses to decode.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// More than 10 redirects in one resolution.
    #[error("redirect loop: more than 10 redirects")]
    RedirectLoop,

    /// File-scheme read or mid-stream I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}
