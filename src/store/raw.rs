//! Raw record extraction from segment bytes.
//!
//! Segment files are not byte-aligned to record boundaries: a table holds
//! block-packed key/value data and a log can be truncated mid-write. No
//! schema-aware parser can be trusted here. What survives in the byte soup
//! is the serialized record shape itself: a quoted 36-character identifier,
//! a colon, and a quoted JSON string holding the script text. The scanner
//! walks the text one byte at a time, tracks string/escape state so an
//! embedded `\"` never ends a value early, and only accepts candidates that
//! carry the userscript header marker.

use uuid::Uuid;

use super::source::ScriptMap;

/// Marker substring identifying a value as a userscript
pub const SCRIPT_MARKER: &str = "==UserScript==";

/// Length of a hyphenated identifier token
const ID_LEN: usize = 36;

/// Scanner state while walking a quoted value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// At the opening quote
    Start,
    /// Inside the string literal
    InString,
    /// A backslash was seen; the next unit is consumed without inspection
    EscapePending,
}

/// Extracts every `"<id>":"<value>"` record found in one segment's text.
///
/// Candidates whose identifier is not a well-formed hyphenated UUID, whose
/// value never closes (truncation), whose escapes fail to decode, or whose
/// content lacks the userscript marker are skipped without aborting the
/// scan. A later occurrence of an identifier replaces an earlier one, so a
/// log segment's most recent write wins.
pub fn extract_scripts(text: &str) -> ScriptMap {
    let mut found = ScriptMap::new();
    let bytes = text.as_bytes();
    let mut idx = 0;

    while idx < bytes.len() {
        let Some(offset) = bytes[idx..].iter().position(|&b| b == b'"') else {
            break;
        };
        let quote = idx + offset;
        match match_record(text, quote) {
            Some((id, script, end)) => {
                found.insert(id, script);
                idx = end;
            }
            None => idx = quote + 1,
        }
    }

    found
}

/// Attempts to match one record whose opening quote sits at `start`.
///
/// Returns the identifier, the decoded script text, and the index just past
/// the value's closing quote.
fn match_record(text: &str, start: usize) -> Option<(String, String, usize)> {
    let bytes = text.as_bytes();

    let id_start = start + 1;
    let id_end = id_start + ID_LEN;
    // Need the identifier's closing quote, the colon, and the value's
    // opening quote before any value bytes.
    if id_end + 2 >= bytes.len() {
        return None;
    }
    if bytes[id_end] != b'"' || bytes[id_end + 1] != b':' || bytes[id_end + 2] != b'"' {
        return None;
    }

    // Both slice ends sit on ASCII quote bytes, so this cannot split a
    // UTF-8 sequence.
    let id = &text[id_start..id_end];
    if Uuid::parse_str(id).is_err() {
        return None;
    }

    let (raw, end) = scan_string(text, id_end + 2)?;
    let decoded = decode_escapes(raw)?;
    if !raw.contains(SCRIPT_MARKER) && !decoded.contains(SCRIPT_MARKER) {
        return None;
    }

    Some((id.to_string(), decoded, end))
}

/// Walks a quoted string starting at `open`, which must index the opening
/// `"` byte. Returns the raw slice between the quotes and the index just
/// past the closing quote, or `None` when the text ends before the string
/// closes.
fn scan_string(text: &str, open: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    let body = open + 1;
    let mut state = ScanState::Start;
    let mut idx = open;

    while idx < bytes.len() {
        state = match state {
            ScanState::Start => ScanState::InString,
            ScanState::InString => match bytes[idx] {
                b'"' => return Some((&text[body..idx], idx + 1)),
                b'\\' => ScanState::EscapePending,
                _ => ScanState::InString,
            },
            ScanState::EscapePending => ScanState::InString,
        };
        idx += 1;
    }

    None
}

/// Resolves the escape sequences of a raw string body exactly once.
///
/// Recognizes the JSON escapes (`\n`, `\r`, `\t`, `\b`, `\f`, `\"`, `\\`,
/// `\/`) and `\uXXXX` code units, combining UTF-16 surrogate pairs into
/// their code point. Returns `None` on any malformed escape, which causes
/// the candidate to be skipped.
pub fn decode_escapes(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            '/' => out.push('/'),
            'u' => out.push(decode_code_point(&mut chars)?),
            _ => return None,
        }
    }

    Some(out)
}

/// Decodes the `XXXX` following a `\u` escape, consuming a second `\uXXXX`
/// when the first unit is a high surrogate.
fn decode_code_point(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let unit = read_hex4(chars)?;
    match unit {
        0xD800..=0xDBFF => {
            if chars.next()? != '\\' || chars.next()? != 'u' {
                return None;
            }
            let low = read_hex4(chars)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return None;
            }
            let combined =
                0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
            char::from_u32(combined)
        }
        // A low surrogate with no preceding high half is malformed
        0xDC00..=0xDFFF => None,
        _ => char::from_u32(u32::from(unit)),
    }
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u16> {
    let mut value: u16 = 0;
    for _ in 0..4 {
        let digit = chars.next()?.to_digit(16)?;
        value = (value << 4) | digit as u16;
    }
    Some(value)
}
