use encoding_rs::{UTF_8, WINDOWS_1252};

/// Decode CSV bytes from the climate service or an inventory export.
///
/// UTF-8 (BOM stripped) is tried first; older inventory exports are
/// Windows-1252, which is what we fall back to when UTF-8 decoding is lossy.
pub fn decode_csv_bytes(bytes: &[u8]) -> String {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }

    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}

/// Slice off the first `count` lines (descriptive preamble above a CSV header).
pub fn skip_lines(text: &str, count: usize) -> &str {
    let mut rest = text;
    for _ in 0..count {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}
