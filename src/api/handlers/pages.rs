use axum::{
    http::{HeaderMap, header},
    response::{Html, IntoResponse},
};

const INDEX_HTML: &str = include_str!("../../../templates/index.html");
const API_DOCS_HTML: &str = include_str!("../../../templates/api_docs.html");
const BASE_URL_PLACEHOLDER: &str = "{{ base_url }}";

pub async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

/// API documentation with examples pointing at the host the client reached us on
pub async fn api_docs(headers: HeaderMap) -> impl IntoResponse {
    let base_url = base_url(&headers);
    Html(API_DOCS_HTML.replace(BASE_URL_PLACEHOLDER, &base_url))
}

/// Scheme from `X-Forwarded-Proto` when behind a proxy, host from `Host`
pub fn base_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| *v == "http" || *v == "https")
        .unwrap_or("http");

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.chars().all(is_host_char))
        .unwrap_or("localhost");

    format!("{}://{}", scheme, host)
}

/// Hostnames, IPv4/IPv6 literals and ports; anything else could break out of the HTML
fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']')
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn base_url_defaults_to_http_localhost() {
        assert_eq!(base_url(&HeaderMap::new()), "http://localhost");
    }

    #[test]
    fn base_url_honours_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("stt.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        assert_eq!(base_url(&headers), "https://stt.example.com");
    }

    #[test]
    fn base_url_ignores_unknown_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("127.0.0.1:5000"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("javascript"));
        assert_eq!(base_url(&headers), "http://127.0.0.1:5000");
    }

    #[test]
    fn base_url_rejects_markup_in_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("<script>x</script>"));
        assert_eq!(base_url(&headers), "http://localhost");
    }

    #[test]
    fn templates_carry_placeholder() {
        assert!(API_DOCS_HTML.contains(BASE_URL_PLACEHOLDER));
        assert!(!INDEX_HTML.contains(BASE_URL_PLACEHOLDER));
    }
}
