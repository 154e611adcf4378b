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
/// use bitdegree_scraper::url::extract_domain;
///
/// let url = Url::parse("https://WWW.BitDegree.org/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.bitdegree.org".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether a URL's host is `allowed` or one of its subdomains
///
/// This is the offsite filter: `www.bitdegree.org` is within `bitdegree.org`,
/// `evilbitdegree.org` is not.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use bitdegree_scraper::url::is_within_domain;
///
/// let url = Url::parse("https://www.bitdegree.org/top-crypto-exchanges").unwrap();
/// assert!(is_within_domain(&url, "bitdegree.org"));
/// assert!(!is_within_domain(&url, "example.com"));
/// ```
pub fn is_within_domain(url: &Url, allowed: &str) -> bool {
    let Some(host) = extract_domain(url) else {
        return false;
    };
    let allowed = allowed.trim_start_matches('.').to_lowercase();

    host == allowed || host.ends_with(&format!(".{}", allowed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_ip_host() {
        let url = Url::parse("http://127.0.0.1:4321/page").unwrap();
        assert_eq!(extract_domain(&url), Some("127.0.0.1".to_string()));
    }

    #[test]
    fn test_within_exact_domain() {
        let url = Url::parse("https://bitdegree.org/").unwrap();
        assert!(is_within_domain(&url, "bitdegree.org"));
    }

    #[test]
    fn test_within_subdomain() {
        let url = Url::parse("https://www.bitdegree.org/top-crypto-exchanges/paribu").unwrap();
        assert!(is_within_domain(&url, "bitdegree.org"));
        assert!(is_within_domain(&url, "BitDegree.org"));
    }

    #[test]
    fn test_suffix_lookalike_is_offsite() {
        let url = Url::parse("https://evilbitdegree.org/").unwrap();
        assert!(!is_within_domain(&url, "bitdegree.org"));
    }

    #[test]
    fn test_parent_domain_is_offsite() {
        let url = Url::parse("https://bitdegree.org/").unwrap();
        assert!(!is_within_domain(&url, "www.bitdegree.org"));
    }
}
