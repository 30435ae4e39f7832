//! Structured diagnostic trace of a decompression run.
//!
//! Collects discrete event records instead of a growing log string. Callers
//! that want a post-hoc account of what the parser did pass a [`Trace`] into
//! [`crate::parser::multipart::MhtmlParser::decompress_traced`] and inspect
//! or print the events afterwards. Correctness never depends on the trace.

use std::fmt;

/// One step taken while decompressing an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// The multipart boundary token was located.
    BoundaryFound { token: String },

    /// A `Content-Transfer-Encoding` header was recognized for a section.
    EncodingRecognized { encoding: String },

    /// A section body was decoded with the given transfer encoding.
    BodyDecoded { encoding: String },

    /// The declared transfer encoding is a known but unsupported scheme
    /// (quoted-printable); the body was kept as-is.
    DecodeUnsupported { encoding: String },

    /// Decoding was attempted and failed; the raw buffered text was kept.
    DecodeFailed { reason: String },

    /// A section was finalized into a part.
    PartFinalized {
        index: usize,
        content_type: String,
        name: String,
        raw_len: usize,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoundaryFound { token } => write!(f, "boundary found: \"{token}\""),
            Self::EncodingRecognized { encoding } => {
                write!(f, "transfer encoding recognized: {encoding}")
            }
            Self::BodyDecoded { encoding } => write!(f, "body decoded ({encoding})"),
            Self::DecodeUnsupported { encoding } => {
                write!(f, "encoding {encoding} not supported, body kept as-is")
            }
            Self::DecodeFailed { reason } => {
                write!(f, "decode failed ({reason}), body kept as-is")
            }
            Self::PartFinalized {
                index,
                content_type,
                name,
                raw_len,
            } => write!(
                f,
                "part {index} finalized: type='{content_type}' name='{name}' ({raw_len} raw bytes)"
            ),
        }
    }
}

/// An append-only sequence of [`TraceEvent`]s.
#[derive(Debug, Default)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the trace.
    pub fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// All events recorded so far, in order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
