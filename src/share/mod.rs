//! Share links: source text carried in a `#code=` URL fragment.
//!
//! The payload is standard base64 of the UTF-8 source, so a link produced by
//! the web playground opens here unchanged and vice versa.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::catalog;
use crate::error::ShareError;

pub const FRAGMENT_PREFIX: &str = "#code=";

pub fn encode_fragment(source: &str) -> String {
    format!("{}{}", FRAGMENT_PREFIX, STANDARD.encode(source.as_bytes()))
}

/// `base` followed by the fragment. An empty base yields the bare fragment.
pub fn share_url(base: &str, source: &str) -> String {
    let base = base.split('#').next().unwrap_or_default();
    format!("{}{}", base, encode_fragment(source))
}

/// Accepts a bare fragment (`#code=...`) or a full URL that ends in one.
pub fn decode_fragment(link: &str) -> Result<String, ShareError> {
    let link = link.trim();
    let fragment = link.find('#').map(|i| &link[i..]).ok_or(ShareError::MissingFragment)?;
    let payload = fragment.strip_prefix(FRAGMENT_PREFIX).ok_or(ShareError::MissingFragment)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ShareError::Base64(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| ShareError::Utf8)
}

/// Source to show at startup: the shared program if the link decodes,
/// otherwise the default example.
pub fn initial_source(link: Option<&str>) -> String {
    link.and_then(|l| decode_fragment(l).ok())
        .unwrap_or_else(|| catalog::default_example().code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_web_format() {
        // btoa(unescape(encodeURIComponent('nya("hi")')))
        assert_eq!(encode_fragment("nya(\"hi\")"), "#code=bnlhKCJoaSIp");
    }

    #[test]
    fn test_decode_full_url() {
        let src = decode_fragment("https://example.invalid/playground/#code=bnlhKCJoaSIp").unwrap();
        assert_eq!(src, "nya(\"hi\")");
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode_fragment("https://example.invalid/"), Err(ShareError::MissingFragment));
        assert_eq!(decode_fragment("#lang=meow"), Err(ShareError::MissingFragment));
        assert!(matches!(decode_fragment("#code=***"), Err(ShareError::Base64(_))));
        // 0xff 0xfe is not UTF-8
        assert_eq!(decode_fragment("#code=//4="), Err(ShareError::Utf8));
    }

    #[test]
    fn test_share_url_replaces_existing_fragment() {
        assert_eq!(share_url("", "x"), "#code=eA==");
        assert_eq!(
            share_url("https://example.invalid/play#code=old", "x"),
            "https://example.invalid/play#code=eA=="
        );
    }

    #[test]
    fn test_initial_source_falls_back_silently() {
        let default = catalog::default_example().code;
        assert_eq!(initial_source(None), default);
        assert_eq!(initial_source(Some("#code=%%%")), default);
        assert_eq!(initial_source(Some("#code=eA==")), "x");
    }
}
