use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use shelf_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether a URL belongs to the allowed domain
///
/// The host matches when it equals `allowed` or is a subdomain of it.
/// With no allowed domain configured every URL with a host is accepted.
pub fn is_allowed_domain(url: &Url, allowed: Option<&str>) -> bool {
    let Some(host) = extract_domain(url) else {
        return false;
    };

    match allowed {
        None => true,
        Some(allowed) => {
            let allowed = allowed.trim().to_lowercase();
            host == allowed || host.ends_with(&format!(".{}", allowed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("http://127.0.0.1:8080/page-1.html").unwrap();
        assert_eq!(extract_domain(&url), Some("127.0.0.1".to_string()));
    }

    #[test]
    fn test_extract_mixed_case() {
        let url = Url::parse("https://Books.ToScrape.COM/").unwrap();
        assert_eq!(extract_domain(&url), Some("books.toscrape.com".to_string()));
    }

    #[test]
    fn test_allowed_exact_host() {
        let url = Url::parse("http://books.toscrape.com/catalogue/page-2.html").unwrap();
        assert!(is_allowed_domain(&url, Some("books.toscrape.com")));
    }

    #[test]
    fn test_allowed_subdomain() {
        let url = Url::parse("https://shop.example.com/").unwrap();
        assert!(is_allowed_domain(&url, Some("example.com")));
    }

    #[test]
    fn test_rejects_lookalike_suffix() {
        let url = Url::parse("https://badexample.com/").unwrap();
        assert!(!is_allowed_domain(&url, Some("example.com")));
    }

    #[test]
    fn test_rejects_other_host() {
        let url = Url::parse("https://elsewhere.org/").unwrap();
        assert!(!is_allowed_domain(&url, Some("books.toscrape.com")));
    }

    #[test]
    fn test_no_restriction() {
        let url = Url::parse("https://elsewhere.org/").unwrap();
        assert!(is_allowed_domain(&url, None));
    }
}
