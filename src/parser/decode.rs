//! Per-section body decoding: base64, quoted-printable detection, and
//! charset handling.
//!
//! Decoding never aborts the archive conversion. A malformed section body
//! degrades to its raw buffered text while the rest of the archive still
//! converts.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Outcome of attempting to decode one section body.
///
/// Expected, common paths are values here rather than errors: the caller
/// decides what to do with an unsupported or failed decode (in practice,
/// keep the raw text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The declared transfer encoding was applied and the body decoded.
    Decoded(String),

    /// The declared transfer encoding is known but deliberately not
    /// decoded (quoted-printable). A declared limitation, not a bug.
    Unsupported,

    /// The body passes through unchanged: image data kept as base64 for
    /// later embedding, or no/unknown transfer encoding.
    Passthrough,

    /// Decoding was attempted and failed (malformed base64).
    Failed(String),
}

/// Decode a buffered section body according to its declared headers.
///
/// Policy, checked in order:
/// 1. image content with `decode_images` off → passthrough (the base64
///    text is exactly what `data:` URI embedding needs);
/// 2. `base64` → decode to bytes, then to text via the declared charset;
/// 3. `quoted-printable` → unsupported;
/// 4. anything else → passthrough.
pub fn decode_body(
    buffered: &str,
    transfer_encoding: &str,
    charset: &str,
    content_type: &str,
    decode_images: bool,
) -> DecodeOutcome {
    if content_type.contains("image") && !decode_images {
        return DecodeOutcome::Passthrough;
    }

    match transfer_encoding.to_lowercase().as_str() {
        "base64" => {
            // Bodies are buffered line by line, so the base64 text carries
            // newlines that the strict engine would reject.
            let cleaned: String = buffered
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            match STANDARD.decode(cleaned.as_bytes()) {
                Ok(bytes) => DecodeOutcome::Decoded(bytes_to_text(&bytes, charset)),
                Err(e) => DecodeOutcome::Failed(e.to_string()),
            }
        }
        "quoted-printable" => DecodeOutcome::Unsupported,
        _ => DecodeOutcome::Passthrough,
    }
}

/// Decode with the fallback already applied: every non-decoded outcome
/// returns the input unchanged. Never fails.
pub fn decode_to_string(
    buffered: &str,
    transfer_encoding: &str,
    charset: &str,
    content_type: &str,
    decode_images: bool,
) -> String {
    match decode_body(
        buffered,
        transfer_encoding,
        charset,
        content_type,
        decode_images,
    ) {
        DecodeOutcome::Decoded(text) => text,
        _ => buffered.to_string(),
    }
}

/// Turn decoded bytes into text using the declared charset.
///
/// UTF-8 is tried for the default label, and any other label is resolved
/// through `encoding_rs`. When neither applies cleanly, each byte maps to
/// the Latin-1 char of the same code point so binary payloads survive a
/// later re-encode unaltered.
fn bytes_to_text(bytes: &[u8], charset: &str) -> String {
    let label = charset.trim().to_lowercase();

    if label == "utf-8" || label == "utf8" || label.is_empty() {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return text.to_string();
        }
    } else if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return text.into_owned();
        }
    }

    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_utf8_text() {
        // "Hola mundo"
        let outcome = decode_body("SG9sYSBtdW5kbw==", "base64", "utf-8", "text/plain", false);
        assert_eq!(outcome, DecodeOutcome::Decoded("Hola mundo".into()));
    }

    #[test]
    fn test_base64_is_case_insensitive() {
        let outcome = decode_body("QUJD", "Base64", "utf-8", "text/plain", false);
        assert_eq!(outcome, DecodeOutcome::Decoded("ABC".into()));
    }

    #[test]
    fn test_base64_with_line_breaks() {
        let outcome = decode_body("SG9s\nYSBt\r\ndW5kbw==\n", "base64", "utf-8", "text/plain", false);
        assert_eq!(outcome, DecodeOutcome::Decoded("Hola mundo".into()));
    }

    #[test]
    fn test_base64_round_trip_binary() {
        // Invalid UTF-8, so the Latin-1 fallback carries the bytes through.
        let original: Vec<u8> = (0u8..=255).collect();
        let encoded = STANDARD.encode(&original);

        let outcome = decode_body(&encoded, "base64", "utf-8", "application/octet-stream", true);
        let DecodeOutcome::Decoded(text) = outcome else {
            panic!("expected Decoded, got {outcome:?}");
        };

        let round_tripped: Vec<u8> = text.chars().map(|c| c as u32 as u8).collect();
        assert_eq!(round_tripped, original);
    }

    #[test]
    fn test_base64_iso_8859_charset() {
        // "café" in ISO-8859-1 is 63 61 66 E9 → base64 "Y2Fm6Q=="
        let outcome = decode_body("Y2Fm6Q==", "base64", "iso-8859-1", "text/plain", false);
        assert_eq!(outcome, DecodeOutcome::Decoded("café".into()));
    }

    #[test]
    fn test_malformed_base64_falls_back() {
        let raw = "!!!not base64!!!";
        let outcome = decode_body(raw, "base64", "utf-8", "text/plain", false);
        assert!(matches!(outcome, DecodeOutcome::Failed(_)));
        assert_eq!(
            decode_to_string(raw, "base64", "utf-8", "text/plain", false),
            raw
        );
    }

    #[test]
    fn test_quoted_printable_is_idempotent_passthrough() {
        let raw = "Caf=C3=A9 con le=C3=B1a";
        let first = decode_to_string(raw, "quoted-printable", "utf-8", "text/plain", false);
        let second = decode_to_string(&first, "quoted-printable", "utf-8", "text/plain", false);
        assert_eq!(first, raw);
        assert_eq!(second, raw);
        assert_eq!(
            decode_body(raw, "quoted-printable", "utf-8", "text/plain", false),
            DecodeOutcome::Unsupported
        );
    }

    #[test]
    fn test_image_kept_as_base64_when_not_decoding() {
        let raw = "QUJD\n";
        assert_eq!(
            decode_body(raw, "base64", "utf-8", "image/png", false),
            DecodeOutcome::Passthrough
        );
        assert_eq!(
            decode_to_string(raw, "base64", "utf-8", "image/png", false),
            raw
        );
    }

    #[test]
    fn test_image_decoded_when_requested() {
        let outcome = decode_body("QUJD", "base64", "utf-8", "image/png", true);
        assert_eq!(outcome, DecodeOutcome::Decoded("ABC".into()));
    }

    #[test]
    fn test_unknown_encoding_passthrough() {
        let raw = "plain body\n";
        assert_eq!(
            decode_body(raw, "7bit", "utf-8", "text/plain", false),
            DecodeOutcome::Passthrough
        );
        assert_eq!(
            decode_body(raw, "", "utf-8", "text/plain", false),
            DecodeOutcome::Passthrough
        );
    }
}
