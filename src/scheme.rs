//! URL scheme sniffing.
//!
//! Distinguishes `scheme://...` resource references from bare filesystem paths
//! so path-like values can be routed to local-file or remote-resource checks.
//! Purely syntactic: the scheme is not checked against any registry.

/// Characters allowed in a scheme name besides ASCII alphanumerics
fn is_scheme_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.')
}

/// Find the colon that ends a URL scheme
///
/// **Public** - main entry point for scheme detection
///
/// # Returns
/// Byte index of the `:` when `text` starts with at least two scheme
/// characters followed by exactly `://`, otherwise `None`.
///
/// # Example
/// ```
/// use rasp_diag::scheme::scheme_end;
/// assert_eq!(scheme_end("http://x"), Some(4));
/// assert_eq!(scheme_end("/var/www"), None);
/// ```
pub fn scheme_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let end = bytes.iter().take_while(|&&b| is_scheme_char(b)).count();

    if end > 1 && bytes[end..].starts_with(b"://") {
        Some(end)
    } else {
        None
    }
}

/// The scheme name of `text`, if it has one
pub fn url_scheme(text: &str) -> Option<&str> {
    scheme_end(text).map(|end| &text[..end])
}

/// Whether `text` looks like a remote resource reference rather than a local path
pub fn is_remote(text: &str) -> bool {
    scheme_end(text).is_some()
}
