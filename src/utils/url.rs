//! URL utilities for consistent endpoint construction.

/// Normalize a base URL by removing trailing slashes.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path without producing double slashes.
///
/// # Examples
///
/// ```
/// use sera::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:5000", "api/chat"),
///     "http://localhost:5000/api/chat"
/// );
/// assert_eq!(
///     construct_api_url("http://localhost:5000/", "/api/chat"),
///     "http://localhost:5000/api/chat"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}
