use std::borrow::Cow;

/// UTF-8 first, then Windows-1252 (a superset of latin-1) which never fails.
pub fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _): (Cow<'_, str>, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_passes_through() {
        assert_eq!(decode("Price: \u{20a6}50,000".as_bytes()), "Price: \u{20a6}50,000");
    }

    #[test]
    fn byte_order_mark_is_dropped() {
        assert_eq!(decode(b"\xEF\xBB\xBFhello"), "hello");
    }

    #[test]
    fn latin1_falls_back() {
        assert_eq!(decode(b"caf\xe9"), "caf\u{e9}");
    }
}
