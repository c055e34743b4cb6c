//! String literal decoding with PHP quoting semantics.
//!
//! [`decode`] turns a raw quoted literal token (quote characters included)
//! into its runtime string value. The function is total: malformed input
//! degrades to the best-effort literal body, it never fails.
//!
//! The two quote styles differ sharply. Single quotes recognize exactly two
//! escapes (`\\` and `\'`) and leave every other backslash untouched.
//! Double quotes recognize a fixed escape grammar (named escapes, hex,
//! unicode, octal); a backslash sequence outside that grammar is kept
//! verbatim, backslash included, so no character is ever silently lost.

/// Decode a raw quoted literal token into its runtime string value.
pub fn decode(raw: &str) -> String {
    if !raw.contains('\\') {
        return strip_quotes(raw).to_string();
    }

    let body = strip_quotes(raw);
    if raw.starts_with('\'') {
        decode_single_quoted(body)
    } else {
        decode_double_quoted(body)
    }
}

/// Interior of the token, between the opening and closing quote characters.
fn strip_quotes(raw: &str) -> &str {
    raw.get(1..raw.len().saturating_sub(1)).unwrap_or("")
}

/// Single-quote rules: only `\\` and `\'` are escapes. `'a\nb'` stays
/// backslash-n, it does not become a newline.
fn decode_single_quoted(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let bytes = body.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match find_backslash(body, i) {
            Some(pos) => {
                out.push_str(&body[i..pos]);
                match bytes.get(pos + 1) {
                    Some(b'\\') => {
                        out.push('\\');
                        i = pos + 2;
                    }
                    Some(b'\'') => {
                        out.push('\'');
                        i = pos + 2;
                    }
                    _ => {
                        out.push('\\');
                        i = pos + 1;
                    }
                }
            }
            None => {
                out.push_str(&body[i..]);
                break;
            }
        }
    }
    out
}

/// Double-quote rules: named escapes, `\xHH`, `\u{H..H}` and `\ooo`.
fn decode_double_quoted(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let bytes = body.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let pos = match find_backslash(body, i) {
            Some(pos) => pos,
            None => {
                out.push_str(&body[i..]);
                break;
            }
        };
        out.push_str(&body[i..pos]);
        i = pos + decode_escape(&bytes[pos..], &mut out);
    }
    out
}

fn find_backslash(body: &str, from: usize) -> Option<usize> {
    body[from..].find('\\').map(|p| from + p)
}

/// Decode one escape sequence starting at the backslash in `bytes[0]`.
///
/// Returns the number of input bytes consumed (always at least 1). A
/// sequence outside the grammar consumes only the backslash and emits it
/// verbatim; the following characters are then copied as ordinary text.
fn decode_escape(bytes: &[u8], out: &mut String) -> usize {
    match bytes.get(1).copied() {
        Some(b'n') => {
            out.push('\n');
            2
        }
        Some(b'r') => {
            out.push('\r');
            2
        }
        Some(b't') => {
            out.push('\t');
            2
        }
        Some(b'v') => {
            out.push('\u{0B}');
            2
        }
        Some(b'e') => {
            out.push('\u{1B}');
            2
        }
        Some(b'f') => {
            out.push('\u{0C}');
            2
        }
        Some(b'$') => {
            out.push('$');
            2
        }
        Some(b'"') => {
            out.push('"');
            2
        }
        Some(b'\\') => {
            out.push('\\');
            2
        }
        Some(b'x') => {
            let digits = count_digits(&bytes[2..], 2, |b| b.is_ascii_hexdigit());
            if digits == 0 {
                out.push('\\');
                return 1;
            }
            let value = parse_u32(&bytes[2..2 + digits], 16);
            // PHP's chr() yields one byte; values past ASCII promote to the
            // U+0080..U+00FF code points rather than raw bytes.
            out.push(char::from(value as u8));
            2 + digits
        }
        Some(b'u') if bytes.get(2) == Some(&b'{') => {
            let digits = count_digits(&bytes[3..], 6, |b| b.is_ascii_hexdigit());
            if digits == 0 || bytes.get(3 + digits) != Some(&b'}') {
                out.push('\\');
                return 1;
            }
            push_code_point(parse_u32(&bytes[3..3 + digits], 16), out);
            3 + digits + 1
        }
        Some(b'0'..=b'7') => {
            let digits = count_digits(&bytes[1..], 3, |b| (b'0'..=b'7').contains(&b));
            let value = parse_u32(&bytes[1..1 + digits], 8);
            // chr() reduces modulo 256
            out.push(char::from((value & 0xFF) as u8));
            1 + digits
        }
        _ => {
            out.push('\\');
            1
        }
    }
}

fn count_digits(bytes: &[u8], max: usize, is_digit: impl Fn(u8) -> bool) -> usize {
    bytes.iter().take(max).take_while(|&&b| is_digit(b)).count()
}

fn parse_u32(digits: &[u8], radix: u32) -> u32 {
    digits.iter().fold(0u32, |acc, &b| {
        acc * radix + (b as char).to_digit(radix).unwrap_or(0)
    })
}

/// UTF-8-encode a code point by hand, with the historical 4-byte ceiling.
///
/// Code points at or above 0x200000 contribute nothing. Sequences the
/// encoding produces that are not valid UTF-8 (surrogate halves, code
/// points past U+10FFFF) likewise contribute nothing, since a Rust string
/// cannot carry them.
fn push_code_point(cp: u32, out: &mut String) {
    let mut buf = [0u8; 4];
    let len = if cp < 0x80 {
        buf[0] = cp as u8;
        1
    } else if cp < 0x800 {
        buf[0] = 0xC0 | (cp >> 6) as u8;
        buf[1] = 0x80 | (cp & 0x3F) as u8;
        2
    } else if cp < 0x10000 {
        buf[0] = 0xE0 | (cp >> 12) as u8;
        buf[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        buf[2] = 0x80 | (cp & 0x3F) as u8;
        3
    } else if cp < 0x200000 {
        buf[0] = 0xF0 | (cp >> 18) as u8;
        buf[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
        buf[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        buf[3] = 0x80 | (cp & 0x3F) as u8;
        4
    } else {
        return;
    };

    if let Ok(s) = std::str::from_utf8(&buf[..len]) {
        out.push_str(s);
    }
}
