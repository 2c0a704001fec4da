use memchr::memchr;

/// Decode a property or string token as it appears in source into its
/// semantic value. Quoted tokens have their delimiters stripped and escape
/// sequences interpreted; anything else (identifier and number keys) passes
/// through unchanged. Unlike the parser's own normalisation this never
/// fails: malformed escapes degrade to literal text and escapes naming an
/// invalid scalar decode to U+FFFD.
pub(crate) fn decode_string_token(raw: &str) -> String {
  let bytes = raw.as_bytes();
  if bytes.len() >= 2 {
    let first = bytes[0];
    if (first == b'"' || first == b'\'') && first == bytes[bytes.len() - 1] {
      return decode_escapes(&bytes[1..bytes.len() - 1]);
    }
  }
  raw.to_string()
}

// None for a non-hex byte. Braced escapes have no digit limit, so the
// accumulator saturates to u32::MAX on overflow; that is never a valid
// scalar and decodes to U+FFFD downstream.
fn hex_digits(digits: &[u8]) -> Option<u32> {
  digits.iter().try_fold(0u32, |acc, &b| {
    let digit = (b as char).to_digit(16)?;
    Some(
      acc
        .checked_mul(16)
        .and_then(|acc| acc.checked_add(digit))
        .unwrap_or(u32::MAX),
    )
  })
}

fn scalar(value: u32, tmp: &mut [u8; 4]) -> &[u8] {
  let c = char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER);
  c.encode_utf8(tmp).as_bytes()
}

// `raw` is the text between the quotes. Escapes are decoded one at a time;
// bytes between escapes are copied through untouched, which keeps multibyte
// characters intact since `\` never occurs inside a UTF-8 continuation.
fn decode_escapes(mut raw: &[u8]) -> String {
  let mut norm = Vec::new();
  while !raw.is_empty() {
    let Some(escape_pos) = memchr(b'\\', raw) else {
      norm.extend_from_slice(raw);
      break;
    };
    norm.extend_from_slice(&raw[..escape_pos]);
    raw = &raw[escape_pos + 1..];
    if raw.is_empty() {
      norm.push(b'\\');
      break;
    }
    let mut tmp = [0u8; 4];
    let (skip, add): (usize, &[u8]) = match raw[0] {
      b'b' => (1, b"\x08"),
      b'f' => (1, b"\x0c"),
      b'n' => (1, b"\n"),
      b'r' => (1, b"\r"),
      b't' => (1, b"\t"),
      b'v' => (1, b"\x0b"),
      b'0'..=b'7' => {
        // Up to three octal digits; the value cannot exceed 0o777 so it is
        // always a valid scalar.
        let mut len = 0;
        let mut value = 0u32;
        while len < 3 {
          match raw.get(len) {
            Some(c @ b'0'..=b'7') => {
              value = value * 8 + u32::from(c - b'0');
              len += 1;
            }
            _ => break,
          }
        }
        (len, scalar(value, &mut tmp))
      }
      b'x' => match raw.get(1..3).and_then(hex_digits) {
        Some(value) => (3, scalar(value, &mut tmp)),
        None => (1, b"x"),
      },
      b'u' => match raw.get(1) {
        Some(b'{') => match memchr(b'}', raw) {
          // At least one digit; no upper bound on length.
          Some(end) if end >= 3 => match hex_digits(&raw[2..end]) {
            Some(value) => (end + 1, scalar(value, &mut tmp)),
            None => (1, b"u"),
          },
          _ => (1, b"u"),
        },
        Some(_) => match raw.get(1..5).and_then(hex_digits) {
          Some(value) => (5, scalar(value, &mut tmp)),
          None => (1, b"u"),
        },
        None => (1, b"u"),
      },
      c => (1, {
        tmp[0] = c;
        &tmp[..1]
      }),
    };
    norm.extend_from_slice(add);
    raw = &raw[skip..];
  }
  String::from_utf8_lossy(&norm).into_owned()
}
