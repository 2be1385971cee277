//! Cross-origin headers.
//!
//! Browsers send an `OPTIONS` preflight before a cross-origin `POST` with a JSON
//! body. Preflights are answered directly; every other response is decorated
//! with the same headers and otherwise left alone.

use crate::http::{HttpRequest, HttpResponse, Status};

/// Headers attached to every response.
pub const HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Max-Age", "86400"),
];

pub fn is_preflight(request: &HttpRequest) -> bool {
    request.method == "OPTIONS"
}

/// The answer to a preflight: 204 with no body.
pub fn preflight() -> HttpResponse {
    let mut response = HttpResponse::empty(Status::NoContent);
    decorate(&mut response);
    response
}

/// Adds [`HEADERS`] to `response`.
pub fn decorate(response: &mut HttpResponse) {
    for (name, value) in HEADERS {
        response.set_header(name, value);
    }
}
