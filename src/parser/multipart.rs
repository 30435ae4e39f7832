//! Line-oriented MHTML multipart scanner.
//!
//! Splits a `.mht` archive into its MIME sections without implementing a
//! general MIME parser: no nested multipart, no RFC 2045 header grammar, no
//! line folding. Header lines are matched by prefix, the way archives
//! produced by "save page as .mht" tools lay them out, and anything that
//! does not look like a recognized header is tolerated as body content.

use tracing::{debug, warn};

use crate::error::{MhtError, Result};
use crate::model::part::Part;
use crate::parser::decode::{self, DecodeOutcome};
use crate::trace::{Trace, TraceEvent};

const BOUNDARY: &str = "boundary";
const CONTENT_TYPE: &str = "Content-Type";
const CHARSET: &str = "charset";
const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";
const CONTENT_LOCATION: &str = "Content-Location";
const FILE_NAME: &str = "filename=";

const DEFAULT_CHARSET: &str = "utf-8";

/// MHTML archive parser.
///
/// One sequential pass over the archive lines: find the boundary token,
/// then classify each line as a section break, a header, noise, or body
/// content, finalizing a [`Part`] every time a boundary closes a section.
#[derive(Debug, Clone, Copy, Default)]
pub struct MhtmlParser {
    decode_images: bool,
}

impl MhtmlParser {
    /// Parser that keeps image bodies as base64 text (what inline
    /// reassembly needs).
    pub fn new() -> Self {
        Self {
            decode_images: false,
        }
    }

    /// Parser that decodes image bodies to their raw byte content.
    ///
    /// Parts produced this way cannot be fed to inline reassembly.
    pub fn with_decode_images(decode_images: bool) -> Self {
        Self { decode_images }
    }

    pub fn decode_images(&self) -> bool {
        self.decode_images
    }

    /// Decompress an archive into its ordered parts.
    pub fn decompress(&self, archive: &str) -> Result<Vec<Part>> {
        let mut trace = Trace::new();
        self.decompress_traced(archive, &mut trace)
    }

    /// Decompress an archive, recording each step into `trace`.
    ///
    /// Fails with [`MhtError::MissingBoundary`] when no boundary
    /// declaration line exists; no partial part list is returned.
    pub fn decompress_traced(&self, archive: &str, trace: &mut Trace) -> Result<Vec<Part>> {
        let mut lines = archive.lines();

        let boundary = find_boundary(&mut lines).ok_or(MhtError::MissingBoundary)?;
        trace.record(TraceEvent::BoundaryFound {
            token: boundary.clone(),
        });
        debug!(boundary = %boundary, "found multipart boundary");

        let mut parts: Vec<Part> = Vec::new();
        let mut section = SectionState::new();
        // The buffer opens on the first boundary hit; lines before that are
        // preamble and are dropped.
        let mut buffer: Option<String> = None;

        for line in lines {
            let trimmed = line.trim();

            if trimmed.contains(boundary.as_str()) {
                if let Some(buffered) = buffer.take() {
                    parts.push(self.finalize(&section, buffered, parts.len(), trace));
                }
                buffer = Some(String::new());
                section = SectionState::new();
            } else if let Some(value) = header_value(trimmed, CONTENT_TYPE) {
                section.content_type = value;
            } else if trimmed.starts_with(CHARSET) {
                if let Some(value) = charset_value(trimmed) {
                    section.charset = value;
                }
            } else if let Some(value) = header_value(trimmed, CONTENT_TRANSFER_ENCODING) {
                trace.record(TraceEvent::EncodingRecognized {
                    encoding: value.clone(),
                });
                section.encoding = value;
            } else if trimmed.starts_with(CONTENT_LOCATION) {
                if let Some((_, rest)) = trimmed.split_once(':') {
                    section.location = rest.trim().to_string();
                }
            } else if trimmed.starts_with(FILE_NAME) {
                if let Some(name) = between_quotes(trimmed) {
                    section.filename = name.to_string();
                }
            } else if trimmed.starts_with("Content-ID")
                || trimmed.starts_with("Content-Disposition")
                || trimmed.starts_with("name=")
                || trimmed.chars().count() == 1
            {
                // Metadata we have no use for.
            } else if let Some(buffered) = buffer.as_mut() {
                buffered.push_str(line);
                buffered.push('\n');
            }
        }

        // A truncated archive may end without a final boundary line; flush
        // the open section so it is not lost. The empty buffer opened by a
        // well-formed trailing `--boundary--` stays unflushed.
        if let Some(buffered) = buffer.take() {
            if !buffered.trim().is_empty() || !section.content_type.is_empty() {
                warn!("archive ended without a closing boundary, flushing last section");
                parts.push(self.finalize(&section, buffered, parts.len(), trace));
            }
        }

        Ok(parts)
    }

    /// Close an accumulated section into a [`Part`], decoding its body.
    ///
    /// Decode failures degrade to the raw buffered text; only the boundary
    /// search can fail the conversion as a whole.
    fn finalize(
        &self,
        section: &SectionState,
        buffered: String,
        index: usize,
        trace: &mut Trace,
    ) -> Part {
        let raw_len = buffered.len();

        let content = match decode::decode_body(
            &buffered,
            &section.encoding,
            &section.charset,
            &section.content_type,
            self.decode_images,
        ) {
            DecodeOutcome::Decoded(text) => {
                trace.record(TraceEvent::BodyDecoded {
                    encoding: section.encoding.clone(),
                });
                text
            }
            DecodeOutcome::Unsupported => {
                trace.record(TraceEvent::DecodeUnsupported {
                    encoding: section.encoding.clone(),
                });
                warn!(
                    encoding = %section.encoding,
                    "transfer encoding not supported, keeping raw body"
                );
                buffered
            }
            DecodeOutcome::Failed(reason) => {
                trace.record(TraceEvent::DecodeFailed {
                    reason: reason.clone(),
                });
                warn!(
                    content_type = %section.content_type,
                    reason = %reason,
                    "body decode failed, keeping raw body"
                );
                buffered
            }
            DecodeOutcome::Passthrough => buffered,
        };

        let part = Part {
            content_type: section.content_type.clone(),
            name: section.name().to_string(),
            content,
        };

        trace.record(TraceEvent::PartFinalized {
            index,
            content_type: part.content_type.clone(),
            name: part.name.clone(),
            raw_len,
        });
        debug!(
            index,
            content_type = %part.content_type,
            name = %part.name,
            "finalized part"
        );

        part
    }
}

/// Headers accumulated for the section currently being scanned.
///
/// Reset whenever a boundary opens a new buffer, so values never leak from
/// one section into the next.
#[derive(Debug)]
struct SectionState {
    content_type: String,
    encoding: String,
    location: String,
    filename: String,
    charset: String,
}

impl SectionState {
    fn new() -> Self {
        Self {
            content_type: String::new(),
            encoding: String::new(),
            location: String::new(),
            filename: String::new(),
            charset: DEFAULT_CHARSET.to_string(),
        }
    }

    /// Name resolution: filename wins, else location, else empty.
    fn name(&self) -> &str {
        if !self.filename.is_empty() {
            &self.filename
        } else {
            &self.location
        }
    }
}

/// Scan lines for the boundary declaration and extract its quoted token.
///
/// Consumes lines from the iterator up to and including the declaration, so
/// the caller's scan resumes right after it. A `boundary` line lacking a
/// usable quoted token does not yield a boundary; the scan keeps going.
fn find_boundary<'a, I>(lines: &mut I) -> Option<String>
where
    I: Iterator<Item = &'a str>,
{
    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with(BOUNDARY) {
            if let Some(token) = between_quotes(trimmed) {
                return Some(token.to_string());
            }
        }
    }
    None
}

/// The substring strictly between the first and last `"` on a line.
fn between_quotes(line: &str) -> Option<&str> {
    let first = line.find('"')?;
    let last = line.rfind('"')?;
    if last <= first {
        return None;
    }
    Some(&line[first + 1..last])
}

/// Extract a header attribute value: the text after `": "` with `;`
/// stripped. Returns `None` when the line does not carry this header or
/// lacks the separator (the caller then falls through to the next
/// classification).
fn header_value(line: &str, key: &str) -> Option<String> {
    if !line.starts_with(key) {
        return None;
    }
    let idx = line.find(": ")?;
    Some(line[idx + 2..].replace(';', "").trim().to_string())
}

/// Extract the charset from a `charset=` line, stripping one leading and
/// one trailing quote.
fn charset_value(line: &str) -> Option<String> {
    let (_, value) = line.split_once('=')?;
    let value = value.trim();
    let value = value.strip_prefix('"').unwrap_or(value);
    let value = value.strip_suffix('"').unwrap_or(value);
    Some(value.to_string())
}
