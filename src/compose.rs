//! Builds the absolute, print-flagged URL for a root-relative page path.

use url::Url;

use crate::{PrinterError, Result};

/// Query marker the application layouts use to switch into print mode.
pub const PRINT_MARKER: (&str, &str) = ("print", "true");

/// Composes `http(s)://[subdomain.]base_host/<relative_path>` with the print marker.
///
/// The marker is set once through the query pairs (replacing any caller
/// supplied `print` value) and then appended again as a literal
/// `&print=true`. Downstream print-mode detection matches on that exact
/// string, so the duplicate is kept.
pub fn compose_url(
    relative_path: &str,
    secure: bool,
    subdomain: Option<&str>,
    base_host: &str,
) -> Result<Url> {
    let scheme = if secure { "https" } else { "http" };
    let host = match subdomain.map(str::trim).filter(|s| !s.is_empty()) {
        Some(sub) => format!("{sub}.{base_host}"),
        None => base_host.to_string(),
    };

    let origin = Url::parse(&format!("{scheme}://{host}/"))?;
    let path = if relative_path.starts_with('/') {
        relative_path.to_string()
    } else {
        format!("/{relative_path}")
    };
    let mut url = origin.join(&path)?;

    // "//other.host/x" joins onto a different origin.
    if url.host_str() != origin.host_str() || url.port() != origin.port() {
        return Err(PrinterError::ForeignPath(relative_path.to_string()));
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != PRINT_MARKER.0)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair(PRINT_MARKER.0, PRINT_MARKER.1);

    let query = format!(
        "{}&{}={}",
        url.query().unwrap_or_default(),
        PRINT_MARKER.0,
        PRINT_MARKER.1
    );
    url.set_query(Some(&query));

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_request_uses_http_and_base_host() {
        let url = compose_url("/report?id=5", false, None, "app.example.com").unwrap();
        assert_eq!(
            url.as_str(),
            "http://app.example.com/report?id=5&print=true&print=true"
        );
    }

    #[test]
    fn secure_request_uses_https() {
        let url = compose_url("/report", true, None, "app.example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(
            url.as_str(),
            "https://app.example.com/report?print=true&print=true"
        );
    }

    #[test]
    fn subdomain_is_prepended() {
        let url = compose_url("/x", false, Some("acme"), "app.example.com").unwrap();
        assert_eq!(url.host_str(), Some("acme.app.example.com"));
    }

    #[test]
    fn empty_subdomain_is_ignored() {
        let url = compose_url("/x", false, Some(""), "app.example.com").unwrap();
        assert_eq!(url.host_str(), Some("app.example.com"));
    }

    #[test]
    fn base_host_may_carry_a_port() {
        let url = compose_url("/x", false, None, "localhost:3000").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/x?print=true&print=true");
    }

    #[test]
    fn caller_print_value_is_replaced() {
        let url = compose_url("/x?print=false&a=1", false, None, "localhost").unwrap();
        assert_eq!(url.query(), Some("a=1&print=true&print=true"));
        assert!(url
            .query_pairs()
            .all(|(k, v)| k != "print" || v == "true"));
    }

    #[test]
    fn fragment_stays_after_the_marker() {
        let url = compose_url("/doc?id=1#section", false, None, "localhost").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost/doc?id=1&print=true&print=true#section"
        );
    }

    #[test]
    fn path_without_leading_slash_is_rooted() {
        let url = compose_url("report", false, None, "localhost").unwrap();
        assert_eq!(url.path(), "/report");
    }

    #[test]
    fn protocol_relative_path_is_rejected() {
        let err = compose_url("//evil.example/x", false, None, "localhost").unwrap_err();
        assert!(
            matches!(err, PrinterError::ForeignPath(ref p) if p == "//evil.example/x"),
            "got {err:?}"
        );
        assert!(err.to_string().contains("//evil.example/x"));
    }

    #[test]
    fn malformed_host_is_rejected() {
        assert!(compose_url("/x", false, Some("bad host"), "localhost").is_err());
    }
}
