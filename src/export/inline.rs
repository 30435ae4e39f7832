//! Reassemble parts into one standalone HTML document.
//!
//! Image parts keep their base64 text through decompression, so embedding
//! is a matter of rewriting each `cid:<name>` reference into a
//! `data:<type>;base64,<content>` URI.

use tracing::debug;

use crate::error::{MhtError, Result};
use crate::model::part::Part;

/// Build a single HTML string from the ordered part list, with image
/// references replaced by `data:` URIs.
///
/// Fails with [`MhtError::IncompatibleMode`] when the parts were produced
/// with image decoding enabled: raw image bytes cannot be re-embedded as
/// base64 by this pipeline.
pub fn reassemble(parts: &[Part], decode_images: bool) -> Result<String> {
    if decode_images {
        return Err(MhtError::IncompatibleMode);
    }

    // The substitutions need the complete document, so HTML parts are
    // concatenated before any image is touched.
    let mut body = String::new();
    for part in parts.iter().filter(|p| p.is_html()) {
        body.push_str(&part.content);
    }

    let substitutions: Vec<(String, String)> = parts
        .iter()
        .filter(|p| p.is_image() && !p.name.is_empty())
        .map(|p| {
            (
                format!("cid:{}", p.name),
                format!("data:{};base64,{}", p.content_type, p.content),
            )
        })
        .collect();

    debug!(
        html_len = body.len(),
        images = substitutions.len(),
        "reassembling inline document"
    );

    Ok(apply_substitutions(&body, &substitutions))
}

/// Replace every occurrence of each needle in a single pass over the body.
///
/// All needles share the `cid:` prefix, so the scan jumps between `cid:`
/// occurrences; when several names share a prefix the longest match wins.
fn apply_substitutions(body: &str, substitutions: &[(String, String)]) -> String {
    if substitutions.is_empty() {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(pos) = rest.find("cid:") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let hit = substitutions
            .iter()
            .filter(|(needle, _)| rest.starts_with(needle.as_str()))
            .max_by_key(|(needle, _)| needle.len());

        match hit {
            Some((needle, replacement)) => {
                out.push_str(replacement);
                rest = &rest[needle.len()..];
            }
            None => {
                out.push_str("cid:");
                rest = &rest["cid:".len()..];
            }
        }
    }

    out.push_str(rest);
    out
}
