//! Streaming UTF-8 decoding of PTY output.

/// Longest UTF-8 encoded scalar
const MAX_SEQUENCE: usize = 4;

/// Decodes a byte stream chunk by chunk.
///
/// A multi-byte sequence split across two chunks is held back until the rest
/// arrives. Bytes that can never form valid UTF-8 become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of an incomplete sequence carried to the next chunk
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this prefix is UTF-8
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            debug_assert!(after.len() < MAX_SEQUENCE);
                            self.pending.extend_from_slice(after);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is held back, replacing it if incomplete
    pub fn finish(&mut self) -> String {
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_multibyte_is_reassembled() {
        let text = "spinner ✻ done";
        let bytes = text.as_bytes();
        let cut = text.find('✻').unwrap() + 1;

        let mut decoder = Utf8StreamDecoder::new();
        let first = decoder.decode(&bytes[..cut]);
        assert_eq!(first, "spinner ");
        assert_eq!(decoder.pending_len(), 1);
        let second = decoder.decode(&bytes[cut..]);
        assert_eq!(format!("{first}{second}"), text);
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_byte_at_a_time() {
        let text = "héllo → 世界";
        let mut decoder = Utf8StreamDecoder::new();
        let out: String = text.bytes().map(|b| decoder.decode(&[b])).collect();
        assert_eq!(out, text);
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{fffd}b");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_finish_flushes_truncated_sequence() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(&[b'x', 0xe4, 0xb8]), "x");
        assert_eq!(decoder.finish(), "\u{fffd}");
        assert_eq!(decoder.pending_len(), 0);
    }
}
