/*
 * request.rs
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

//! GET request encoding: request line plus normalized headers, no body.

use crate::url::Url;

const USER_AGENT: &str = "CustomBrowser";

/// Title-case a header name the way HTTP conventionally spells them:
/// uppercase first letter of each `-`-separated segment, rest lowercased.
fn title_case(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Serialize a GET request for `url`: request line, then headers in
/// insertion order. The baseline set (`Host`, `Connection: close`,
/// `User-Agent`) comes first; caller headers override a baseline entry in
/// place when the title-cased name matches, and append otherwise. A blank
/// line terminates the request.
pub fn encode_request(url: &Url, extra_headers: &[(String, String)]) -> String {
    let mut headers: Vec<(String, String)> = vec![
        (
            "Host".to_string(),
            url.host().unwrap_or_default().to_string(),
        ),
        ("Connection".to_string(), "close".to_string()),
        ("User-Agent".to_string(), USER_AGENT.to_string()),
    ];
    for (name, value) in extra_headers {
        let normalized = title_case(name);
        match headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&normalized))
        {
            Some((_, existing_value)) => *existing_value = value.clone(),
            None => headers.push((normalized, value.clone())),
        }
    }

    let mut out = format!("GET {} HTTP/1.1\r\n", url.path());
    for (name, value) in &headers {
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push_str("\r\n");
    }
    out.push_str("\r\n");
    out
}
