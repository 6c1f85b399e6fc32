use crate::{UrlError, UrlResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A normalized, validated URL.
///
/// This is the only URL type admitted into the frontier, the seen registry
/// or any outcome set. Construction goes through [`normalize`], which is the
/// single gate guaranteeing every stored URL is structurally valid and in
/// consistent casing, so set-membership deduplication collapses case and
/// whitespace variants of the same address to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalUrl {
    url: String,
    host: String,
}

impl CanonicalUrl {
    /// Returns the canonical URL string.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Returns the (lowercase) host of the URL.
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl TryFrom<String> for CanonicalUrl {
    type Error = UrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        normalize(&value)
    }
}

impl From<CanonicalUrl> for String {
    fn from(value: CanonicalUrl) -> Self {
        value.url
    }
}

/// Normalizes a raw URL string into a [`CanonicalUrl`].
///
/// # Normalization steps
///
/// 1. Strip leading/trailing whitespace
/// 2. Lowercase the entire string
/// 3. Parse; reject anything without a scheme and a non-empty host
/// 4. Lowercase the serialized form and re-parse
///
/// Step 4 exists because serialization percent-encodes non-ASCII input with
/// uppercase hex digits; the canonical form must be all-lowercase so that a
/// raw `/ä` and a pre-encoded `/%c3%a4` collapse to one seen-registry entry.
/// Re-parsing an already-lowercase ASCII string changes nothing, which makes
/// the result a fixpoint.
///
/// Idempotent: normalizing an already-canonical string yields the same
/// value.
///
/// # Examples
///
/// ```
/// use webtrawl::url::normalize;
///
/// let url = normalize(" HTTP://Example.com/A ").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/a");
/// assert_eq!(url.host(), "example.com");
///
/// assert!(normalize("not a url").is_err());
/// assert!(normalize("mailto:someone@example.com").is_err());
/// ```
pub fn normalize(raw: &str) -> UrlResult<CanonicalUrl> {
    let cleaned = raw.trim().to_lowercase();

    let parsed = Url::parse(&cleaned).map_err(|e| UrlError::Parse(format!("{raw}: {e}")))?;

    // Serialization may have introduced uppercase percent-encoding hex
    let canonical = String::from(parsed).to_lowercase();
    let parsed = Url::parse(&canonical).map_err(|e| UrlError::Parse(format!("{raw}: {e}")))?;

    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h.to_string(),
        _ => return Err(UrlError::MissingHost(raw.trim().to_string())),
    };

    Ok(CanonicalUrl {
        url: parsed.into(),
        host,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_whitespace() {
        let url = normalize("  http://example.com/page  ").unwrap();
        assert_eq!(url.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_lowercases_entire_string() {
        let url = normalize("HTTP://EXAMPLE.COM/Page?Q=V").unwrap();
        assert_eq!(url.as_str(), "http://example.com/page?q=v");
    }

    #[test]
    fn test_variants_collapse_to_one_entry() {
        let a = normalize(" HTTP://Example.com/A ").unwrap();
        let b = normalize("http://example.com/a").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_idempotent() {
        let once = normalize("  HTTPS://Example.COM/Path/To/Page  ").unwrap();
        let twice = normalize(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_idempotent_with_non_ascii() {
        // Percent-encoding must come out lowercase or the second pass
        // would produce a different string than the first
        let once = normalize("http://example.com/ä").unwrap();
        assert_eq!(once.as_str(), "http://example.com/%c3%a4");

        let twice = normalize(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_raw_and_preencoded_collapse_to_one_entry() {
        let raw = normalize("http://example.com/ä").unwrap();
        let encoded = normalize("http://example.com/%C3%A4").unwrap();
        assert_eq!(raw, encoded);
    }

    #[test]
    fn test_host_extracted() {
        let url = normalize("https://sub.example.com/x").unwrap();
        assert_eq!(url.host(), "sub.example.com");
    }

    #[test]
    fn test_host_excludes_port() {
        let url = normalize("http://127.0.0.1:8080/").unwrap();
        assert_eq!(url.host(), "127.0.0.1");
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_rejects_relative_url() {
        assert!(matches!(normalize("/just/a/path"), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(normalize("not a url").is_err());
        assert!(normalize("").is_err());
        assert!(normalize("   ").is_err());
    }

    #[test]
    fn test_rejects_hostless_schemes() {
        assert!(matches!(
            normalize("mailto:admin@example.com"),
            Err(UrlError::MissingHost(_))
        ));
        assert!(normalize("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_display_matches_as_str() {
        let url = normalize("http://example.com/a").unwrap();
        assert_eq!(url.to_string(), url.as_str());
    }

    #[test]
    fn test_serde_round_trip() {
        let url = normalize("http://example.com/a").unwrap();
        let json = serde_json::to_string(&url).unwrap();
        assert_eq!(json, "\"http://example.com/a\"");
        let back: CanonicalUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(back, url);
    }

    #[test]
    fn test_serde_rejects_invalid_record() {
        let result: Result<CanonicalUrl, _> = serde_json::from_str("\"no-host:\"");
        assert!(result.is_err());
    }
}
