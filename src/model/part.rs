//! One decoded section of an MHTML archive.

/// A single multipart section after decoding.
///
/// Parts are produced in archive order. By convention the first part with
/// content type `text/html` is the document body; this is not enforced and
/// multiple HTML parts may exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// MIME type declared in the section's `Content-Type` header
    /// (e.g. `text/html`, `image/jpeg`). Empty if never declared.
    pub content_type: String,

    /// Identifying name: the declared `filename` if present, otherwise the
    /// `Content-Location`. Empty if neither was declared.
    pub name: String,

    /// The decoded body. Image parts keep their base64 text unless image
    /// decoding was requested; bodies with unknown or unsupported transfer
    /// encodings are the raw buffered text unchanged.
    pub content: String,
}

impl Part {
    /// Whether this part is an HTML document body.
    pub fn is_html(&self) -> bool {
        self.content_type == "text/html"
    }

    /// Whether this part is an image resource.
    pub fn is_image(&self) -> bool {
        self.content_type.contains("image")
    }
}
