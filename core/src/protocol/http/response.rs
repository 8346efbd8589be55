/*
 * response.rs
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

//! HTTP/1.1 response decoding: status line, headers, close-delimited body.

use std::collections::HashMap;

use crate::error::FetchError;
use crate::net::StreamReader;

/// Headers that would require a decoder this client does not have. Their
/// presence in a response is a hard protocol error, not something to work
/// around.
const FORBIDDEN_HEADERS: [&str; 2] = ["transfer-encoding", "content-encoding"];

/// Decoded response: numeric status, lower-cased header names with trimmed
/// values, body text.
#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Read a complete response from `reader`. Consumes the reader: the body is
/// framed by connection close, so nothing can follow it on this stream.
pub async fn read_response(mut reader: StreamReader) -> Result<Response, FetchError> {
    let status_line = reader.read_line().await?;
    // Split on the first two spaces only; the explanation may contain spaces.
    let mut parts = status_line.splitn(3, ' ');
    let (Some(_version), Some(status), Some(_explanation)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(FetchError::Protocol(format!(
            "malformed status line {status_line:?}"
        )));
    };
    let status = status.parse::<u16>().map_err(|_| {
        FetchError::Protocol(format!("non-numeric status in {status_line:?}"))
    })?;

    let mut headers = HashMap::new();
    loop {
        let line = reader.read_line().await?;
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(FetchError::Protocol(format!("header without colon {line:?}")));
        };
        headers.insert(name.to_ascii_lowercase(), value.trim().to_string());
    }

    for name in FORBIDDEN_HEADERS {
        if headers.contains_key(name) {
            return Err(FetchError::Protocol(format!(
                "response declares {name}, which this client does not decode"
            )));
        }
    }

    let body = reader.read_to_end().await?;
    let body = String::from_utf8_lossy(&body).into_owned();

    Ok(Response {
        status,
        headers,
        body,
    })
}
