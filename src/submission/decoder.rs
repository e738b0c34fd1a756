use crate::error::DecodeError;
use crate::models::Submission;

/// Decode a flat `application/x-www-form-urlencoded` body.
///
/// Every `&`-separated assignment must contain exactly one `=`, otherwise the
/// whole body is rejected. An empty body is a single empty assignment and is
/// rejected the same way. Names and values are unescaped after splitting, so
/// an encoded `%26` or `%3D` stays inside its field.
pub fn decode(raw: &[u8]) -> Result<Submission, DecodeError> {
    let text = std::str::from_utf8(raw).map_err(|_| DecodeError::Utf8)?;

    let mut submission = Submission::new();
    let mut offset = 0;

    for (index, assignment) in text.split('&').enumerate() {
        let separators = assignment.matches('=').count();
        if separators != 1 {
            return Err(DecodeError::Assignment { index, separators });
        }

        let Some((raw_name, raw_value)) = assignment.split_once('=') else {
            return Err(DecodeError::Assignment { index, separators });
        };

        let name = unescape(raw_name, offset)?;
        let value = unescape(raw_value, offset + raw_name.len() + 1)?;
        submission.insert(name, value);

        offset += assignment.len() + 1;
    }

    Ok(submission)
}

/// `+` becomes a space and `%XX` becomes the byte `0xXX`. `base` is the
/// position of `component` within the whole body, for error reporting.
fn unescape(component: &str, base: usize) -> Result<String, DecodeError> {
    let bytes = component.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let high = bytes.get(i + 1).copied().and_then(hex_value);
                let low = bytes.get(i + 2).copied().and_then(hex_value);
                match (high, low) {
                    (Some(h), Some(l)) => out.push((h << 4) | l),
                    _ => return Err(DecodeError::Escape { offset: base + i }),
                }
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).map_err(|_| DecodeError::Utf8)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
