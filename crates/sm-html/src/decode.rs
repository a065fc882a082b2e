//! Byte-to-text decoding for HTML documents.

use encoding_rs::Encoding;
use encoding_rs::UTF_8;

const META_PREFIX_BYTES: usize = 1024;

/// Decodes an HTML payload. Precedence: byte-order mark, `<meta charset>`
/// within the first kilobyte, `charset` of `content_type`, then UTF-8.
/// Undecodable sequences become U+FFFD.
pub fn decode_html_bytes(bytes: &[u8], content_type: &str) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return decoded.into_owned();
    }

    let encoding = charset_from_meta(bytes)
        .or_else(|| charset_from_content_type(content_type))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|part| {
        let (name, value) = part.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let label = value.trim().trim_matches('"').trim_matches('\'');
        (!label.is_empty()).then(|| label.to_owned())
    })
}

fn charset_from_meta(bytes: &[u8]) -> Option<String> {
    let prefix_len = bytes.len().min(META_PREFIX_BYTES);
    let prefix = String::from_utf8_lossy(&bytes[..prefix_len]);
    let lower = prefix.to_ascii_lowercase();
    let mut search_start = 0_usize;

    while let Some(relative) = lower[search_start..].find("charset=") {
        let charset_start = search_start + relative + "charset=".len();
        if let Some(label) = charset_label(&prefix[charset_start..]) {
            return Some(label);
        }
        search_start = charset_start;
    }

    None
}

fn charset_label(input: &str) -> Option<String> {
    let trimmed = input.trim_start();
    let first = trimmed.chars().next()?;

    let label = if first == '"' || first == '\'' {
        let rest = &trimmed[first.len_utf8()..];
        rest[..rest.find(first)?].trim()
    } else {
        let end = trimmed
            .find(|ch: char| ch.is_whitespace() || matches!(ch, '"' | '\'' | ';' | '>' | '/'))
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };

    (!label.is_empty()).then(|| label.to_owned())
}

#[cfg(test)]
mod tests {
    use super::decode_html_bytes;

    #[test]
    fn prefers_meta_charset_over_header() {
        let html = b"<html><head><meta charset=\"UTF-8\"></head><body>\xE2\x82\xAC</body></html>";
        let decoded = decode_html_bytes(html, "text/html; charset=ISO-8859-1");
        assert!(decoded.contains('\u{20AC}'));
    }

    #[test]
    fn falls_back_to_content_type_charset() {
        let decoded = decode_html_bytes(b"<p>\xE0</p>", "text/html; charset=windows-1252");
        assert_eq!(decoded, "<p>\u{e0}</p>");
    }

    #[test]
    fn defaults_to_utf8_and_strips_bom() {
        let decoded = decode_html_bytes(b"\xEF\xBB\xBF<p>\xC4\x97</p>", "");
        assert_eq!(decoded, "<p>\u{117}</p>");
    }
}
