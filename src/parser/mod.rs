//! Archive parsing: multipart section scanning and per-section body decoding.

pub mod decode;
pub mod multipart;
