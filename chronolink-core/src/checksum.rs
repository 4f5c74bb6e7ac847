//! Checksum algorithms for the text and binary dialects
//!
//! Two algorithms are required:
//! 1. XOR-8: XOR of every byte strictly between the leading `$` and the
//!    trailing `*` of an NMEA/PUBX sentence, rendered as two uppercase hex
//!    digits.
//! 2. Dual-accumulator (Fletcher-like): over the `class, id, len, payload`
//!    span of a binary frame, `a = a + byte; b = b + a`, both mod 256,
//!    appended as `(a, b)`.

use tracing::trace;

/// Calculate the XOR-8 checksum of a sentence body
///
/// The input is the span between `$` and `*`, both exclusive. The order of
/// bytes matters; the result is always in `[0, 255]`.
///
/// # Examples
///
/// ```
/// use chronolink_core::checksum;
///
/// // Known vector from the u-blox receiver manual
/// assert_eq!(checksum::xor8(b"PUBX,40,GLL,1,0,0,0,0,0"), 0x5D);
/// ```
pub fn xor8(body: &[u8]) -> u8 {
    body.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Render an XOR-8 checksum as the two uppercase hex digits that terminate
/// a sentence
pub fn xor8_hex(body: &[u8]) -> String {
    hex::encode_upper([xor8(body)])
}

/// Verify the checksum of a complete received sentence (`$...*XX`)
///
/// Returns `false` when the sentence has no `*` separator or the trailing
/// digits do not match the recomputed value. Sentences without a leading `$`
/// never verify.
pub fn verify_sentence(sentence: &str) -> bool {
    let Some(rest) = sentence.strip_prefix('$') else {
        return false;
    };
    let Some((body, tail)) = rest.rsplit_once('*') else {
        return false;
    };
    let digits = tail.trim_end();
    u8::from_str_radix(digits, 16).is_ok_and(|received| received == xor8(body.as_bytes()))
}

/// Calculate the dual-accumulator checksum of a binary frame
///
/// # Algorithm
///
/// ```text
/// for byte in span:       // class, id, len_lo, len_hi, payload
///     a = (a + byte) mod 256
///     b = (b + a)    mod 256
/// ```
///
/// The span excludes the two sync characters; the result `(a, b)` is
/// appended to the frame in that order.
pub fn fletcher(span: &[u8]) -> (u8, u8) {
    let mut a = 0u8;
    let mut b = 0u8;

    for &byte in span {
        a = a.wrapping_add(byte);
        b = b.wrapping_add(a);
    }

    trace!(len = span.len(), ck_a = a, ck_b = b, "calculated frame checksum");

    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn xor8_deterministic() {
        let body = b"PUBX,40,RMC,1,1,1,1,0,0";
        assert_eq!(xor8(body), xor8(body));
    }

    #[test]
    fn xor8_known_vectors() {
        // u-blox manual example
        assert_eq!(xor8_hex(b"PUBX,40,GLL,1,0,0,0,0,0"), "5D");
        assert_eq!(xor8_hex(b"PUBX,40,RMC,1,1,1,1,0,0"), "47");
    }

    #[test]
    fn xor8_empty_is_zero() {
        assert_eq!(xor8(b""), 0);
    }

    #[test]
    fn xor8_two_uppercase_digits() {
        for body in [&b"PUBX"[..], b"", b"\xFF\x00", b"GPGGA,123519,4807.038,N"] {
            let digits = xor8_hex(body);
            assert_eq!(digits.len(), 2);
            assert!(digits.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn verify_sentence_accepts_valid() {
        assert!(verify_sentence("$PUBX,40,GLL,1,0,0,0,0,0*5D"));
        assert!(verify_sentence("$PUBX,40,RMC,1,1,1,1,0,0*47"));
    }

    #[test]
    fn verify_sentence_rejects_corrupt() {
        assert!(!verify_sentence("$PUBX,40,GLL,1,0,0,0,0,1*5D"));
        assert!(!verify_sentence("$PUBX,40,GLL,1,0,0,0,0,0*5C"));
        assert!(!verify_sentence("PUBX,40,GLL,1,0,0,0,0,0*5D"));
        assert!(!verify_sentence("$PUBX,40,GLL"));
    }

    #[test]
    fn fletcher_mon_ver_poll() {
        // UBX-MON-VER poll: class 0x0A, id 0x04, zero-length payload
        assert_eq!(fletcher(&[0x0A, 0x04, 0x00, 0x00]), (0x0E, 0x34));
    }

    #[test]
    fn fletcher_mon_hw_poll() {
        assert_eq!(fletcher(&[0x0A, 0x09, 0x00, 0x00]), (0x13, 0x43));
    }

    #[test]
    fn fletcher_wraps_mod_256() {
        let span = vec![0xFF; 600];
        let (a, b) = fletcher(&span);
        // Both accumulators stay in u8 range by construction; spot-check
        // against a straightforward reference computation.
        let mut ra = 0u32;
        let mut rb = 0u32;
        for &byte in &span {
            ra = (ra + byte as u32) % 256;
            rb = (rb + ra) % 256;
        }
        assert_eq!((a as u32, b as u32), (ra, rb));
    }
}
