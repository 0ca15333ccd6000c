// src/serve/inject.rs

//! Live-reload client injection for served HTML.

use std::sync::LazyLock;

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use regex::Regex;
use tracing::warn;

/// Path of the websocket endpoint the client connects to.
pub const LIVERELOAD_PATH: &str = "/__livereload";

/// Browser side of the reload channel: reload on `"reload"`, re-fetch
/// stylesheets on `"css"`.
pub const CLIENT_SCRIPT: &str = r#"<script>(function () {
  var proto = location.protocol === "https:" ? "wss://" : "ws://";
  var ws = new WebSocket(proto + location.host + "/__livereload");
  ws.onmessage = function (e) {
    if (e.data === "css") {
      document.querySelectorAll('link[rel="stylesheet"]').forEach(function (link) {
        var url = new URL(link.href);
        url.searchParams.set("livereload", Date.now());
        link.href = url.toString();
      });
    } else {
      location.reload();
    }
  };
})();</script>
"#;

static BODY_CLOSE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)</body\s*>").ok());

/// Insert [`CLIENT_SCRIPT`] before the last `</body>`, or append it when the
/// document has none.
pub fn inject_client(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + CLIENT_SCRIPT.len());
    let close = BODY_CLOSE
        .as_ref()
        .and_then(|re| re.find_iter(html).last());
    match close {
        Some(m) => {
            out.push_str(&html[..m.start()]);
            out.push_str(CLIENT_SCRIPT);
            out.push_str(&html[m.start()..]);
        }
        None => {
            out.push_str(html);
            out.push_str(CLIENT_SCRIPT);
        }
    }
    out
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

/// Middleware rewriting HTML responses to include the reload client.
pub async fn inject_reload_client(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if !is_html(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "failed to buffer HTML response");
            return axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = String::from_utf8_lossy(&bytes);
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(inject_client(&html)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_goes_before_closing_body() {
        let out = inject_client("<html><body><p>x</p></body></html>");
        assert_eq!(out, format!("<html><body><p>x</p>{CLIENT_SCRIPT}</body></html>"));
    }

    #[test]
    fn closing_tag_match_is_case_insensitive_and_uses_last() {
        let html = "<BODY><pre></body></pre></BODY >";
        let out = inject_client(html);
        assert!(out.ends_with(&format!("{CLIENT_SCRIPT}</BODY >")));
        assert!(out.starts_with("<BODY><pre></body></pre>"));
    }

    #[test]
    fn fragment_without_body_gets_script_appended() {
        let out = inject_client("<p>fragment</p>");
        assert_eq!(out, format!("<p>fragment</p>{CLIENT_SCRIPT}"));
    }

    #[test]
    fn client_connects_to_endpoint() {
        assert!(CLIENT_SCRIPT.contains(LIVERELOAD_PATH));
    }
}
