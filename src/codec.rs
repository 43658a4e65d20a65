//! Wire obfuscation used by the bulb's local protocol.
//!
//! Every payload is passed through a running-key XOR: the first byte is
//! combined with a fixed seed, and every following byte with the previous
//! *ciphertext* byte. This only hides the JSON from casual inspection; it is
//! not encryption.

/// Seed key the bulb firmware expects at the start of every message.
pub const SEED_KEY: u8 = 0xAB;

/// Obfuscate a complete message.
///
/// # Examples
///
/// ```
/// use tplight_rs::codec;
///
/// assert_eq!(codec::encode(b"{}"), vec![0xD0, 0xAD]);
/// ```
pub fn encode(plaintext: &[u8]) -> Vec<u8> {
    let mut key = SEED_KEY;
    plaintext
        .iter()
        .map(|byte| {
            key ^= byte;
            key
        })
        .collect()
}

/// Recover a complete message obfuscated with [`encode`].
///
/// # Examples
///
/// ```
/// use tplight_rs::codec;
///
/// let wire = codec::encode(br#"{"system":{"get_sysinfo":{}}}"#);
/// assert_eq!(codec::decode(&wire), br#"{"system":{"get_sysinfo":{}}}"#);
/// ```
pub fn decode(ciphertext: &[u8]) -> Vec<u8> {
    let mut decoder = Decoder::new();
    decoder.feed(ciphertext)
}

/// Incremental decoder for a message that arrives in several chunks.
///
/// The running key carries over between calls to [`Decoder::feed`], so feeding
/// a message piecewise yields the same bytes as decoding it whole. Create a
/// new decoder for every message.
#[derive(Debug, Clone)]
pub struct Decoder {
    key: u8,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Decoder { key: SEED_KEY }
    }

    /// Decode the next chunk of the current message.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<u8> {
        chunk
            .iter()
            .map(|&byte| {
                let plain = byte ^ self.key;
                self.key = byte;
                plain
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_message() {
        assert!(encode(b"").is_empty());
        assert!(decode(b"").is_empty());
    }

    #[test]
    fn test_key_resets_between_messages() {
        let first = encode(b"ab");
        let second = encode(b"ab");
        assert_eq!(first, second);
        assert_eq!(first[0], b'a' ^ SEED_KEY);
        assert_eq!(first[1], b'b' ^ first[0]);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(decode(&encode(&bytes)), bytes);
        }

        #[test]
        fn chunked_decode_matches_whole(
            bytes in proptest::collection::vec(any::<u8>(), 0..512),
            split in any::<prop::sample::Index>(),
        ) {
            let wire = encode(&bytes);
            let at = split.index(wire.len() + 1);
            let mut decoder = Decoder::new();
            let mut out = decoder.feed(&wire[..at]);
            out.extend(decoder.feed(&wire[at..]));
            prop_assert_eq!(out, bytes);
        }
    }
}
