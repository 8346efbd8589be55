/*
 * lib.rs
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

//! Fetch core for finestra, a minimal text-mode web browser.
//!
//! The crate speaks HTTP/1.1 only, GET only, with `Connection: close`
//! framing: requests are encoded and responses parsed by hand over a TCP or
//! rustls TLS stream. Redirects are followed with a hop bound, and cacheable
//! 200 responses are kept in an in-memory cache with an injectable clock.
//! Rendering, layout, and windowing live outside this crate; callers get the
//! entity body (or file contents, for `file://` URLs) back verbatim.

pub mod cache;
pub mod error;
pub mod net;
pub mod protocol;
pub mod url;

pub use cache::{Clock, ResponseCache, SystemClock};
pub use error::FetchError;
pub use protocol::http::{FetchOptions, HttpClient, Response};
pub use url::{CacheKey, Scheme, Url};
