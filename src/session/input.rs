//! Encoding of configured text (task prompts, bootstrap commands) into the
//! bytes typed into a session.
//!
//! Recognized escapes: `\n`, `\r`, `\t`, `\e` (ESC), `\0`, `\\` and `\xHH`.
//! Any other backslash sequence is kept literally. Newlines in every form
//! (`\n`, `\r\n`, `\r`) are sent as CR, which is what the Enter key produces.

/// Turn configured text into keystrokes.
///
/// With `submit`, a trailing CR is added unless the text already ends in one.
/// Returns `None` when there is nothing to type.
pub fn encode_input(raw: &str, submit: bool) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(raw.len() + 1);
    let mut bytes = raw.bytes().peekable();

    while let Some(b) = bytes.next() {
        let decoded = if b == b'\\' {
            match bytes.peek().copied() {
                Some(b'n') => Some(b'\n'),
                Some(b'r') => Some(b'\r'),
                Some(b't') => Some(b'\t'),
                Some(b'e' | b'E') => Some(0x1b),
                Some(b'0') => Some(0),
                Some(b'\\') => Some(b'\\'),
                Some(b'x' | b'X') => None,
                _ => {
                    out.push(b);
                    continue;
                }
            }
        } else {
            push_normalized(&mut out, b);
            continue;
        };

        // Consume the escape letter
        bytes.next();
        match decoded {
            Some(value) => push_normalized(&mut out, value),
            None => {
                let hi = bytes.next_if(u8::is_ascii_hexdigit);
                let lo = hi.and_then(|_| bytes.next_if(u8::is_ascii_hexdigit));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => push_normalized(&mut out, hex_pair(hi, lo)),
                    _ => {
                        out.extend_from_slice(b"\\x");
                        out.extend(hi);
                    }
                }
            }
        }
    }

    if out.is_empty() {
        return None;
    }
    if submit && out.last() != Some(&b'\r') {
        out.push(b'\r');
    }
    Some(out)
}

/// Push a byte, folding `\n` and `\r\n` into a single CR
fn push_normalized(out: &mut Vec<u8>, b: u8) {
    match b {
        b'\n' if out.last() == Some(&b'\r') => {}
        b'\n' => out.push(b'\r'),
        _ => out.push(b),
    }
}

fn hex_pair(hi: u8, lo: u8) -> u8 {
    let digit = |c: u8| match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    };
    (digit(hi) << 4) | digit(lo)
}
