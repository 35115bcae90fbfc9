//! Response body rewriting.

use crate::embed::reload_script_tag;

/// Inject the reload client into HTML bodies.
pub fn maybe_inject_reload(body: Vec<u8>, content_type: &str) -> Vec<u8> {
    if content_type.starts_with("text/html") {
        inject_reload_script(&body)
    } else {
        body
    }
}

/// Insert the reload `<script>` before the last `</body>`, or append it.
fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let script = reload_script_tag();
    let script = script.as_bytes();
    let mut result = Vec::with_capacity(content.len() + script.len());

    match content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        Some(pos) => {
            result.extend_from_slice(&content[..pos]);
            result.extend_from_slice(script);
            result.extend_from_slice(&content[pos..]);
        }
        None => {
            result.extend_from_slice(content);
            result.extend_from_slice(script);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types::{CSS, HTML};

    #[test]
    fn test_injected_before_body_close() {
        let body = b"<html><body><p>hi</p></BODY></html>".to_vec();
        let out = String::from_utf8(maybe_inject_reload(body, HTML)).unwrap();
        let tag = reload_script_tag();
        assert_eq!(out, format!("<html><body><p>hi</p>{tag}</BODY></html>"));
    }

    #[test]
    fn test_appended_without_body() {
        let out = String::from_utf8(maybe_inject_reload(b"<p>x</p>".to_vec(), HTML)).unwrap();
        assert!(out.ends_with(&reload_script_tag()));
    }

    #[test]
    fn test_non_html_untouched() {
        let body = b"body{}</body>".to_vec();
        assert_eq!(maybe_inject_reload(body.clone(), CSS), body);
    }
}
