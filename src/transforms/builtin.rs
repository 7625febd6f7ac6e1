//! Built-in string transforms.
//!
//! All of them are total: input that cannot be decoded is returned as-is.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub fn upper(input: &str) -> String {
    input.to_uppercase()
}

pub fn lower(input: &str) -> String {
    input.to_lowercase()
}

pub fn url_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

pub fn url_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

pub fn base64_encode(input: &str) -> String {
    STANDARD.encode(input.as_bytes())
}

pub fn base64_decode(input: &str) -> String {
    STANDARD
        .decode(input.as_bytes())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_transforms() {
        assert_eq!(upper("Hello"), "HELLO");
        assert_eq!(lower("Hello"), "hello");
    }

    #[test]
    fn test_url_encoding() {
        assert_eq!(url_encode("a b&c"), "a%20b%26c");
        assert_eq!(url_decode("a%20b%26c"), "a b&c");
        // Invalid UTF-8 after decoding passes through.
        assert_eq!(url_decode("%FF"), "%FF");
    }

    #[test]
    fn test_base64() {
        assert_eq!(base64_encode("rewrite"), "cmV3cml0ZQ==");
        assert_eq!(base64_decode("cmV3cml0ZQ=="), "rewrite");
        assert_eq!(base64_decode("not base64!"), "not base64!");
    }
}
