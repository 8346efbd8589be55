/*
 * mod.rs
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

//! HTTP/1.1 fetch pipeline: request encoding, response decoding, and the
//! redirect-following client.
//!
//! Design:
//! - GET only, `Connection: close` on every request; the body is framed by
//!   the peer closing the connection, never by Content-Length or chunked.
//! - Responses declaring `transfer-encoding` or `content-encoding` are
//!   rejected outright: there is no decoder for them here.
//! - One connection per hop; redirects open a fresh connection.

mod request;
mod response;

pub mod client;

pub use client::{FetchOptions, HttpClient};
pub use request::encode_request;
pub use response::Response;
