//! Write parts to disk: the HTML document plus an `images/` directory of
//! extracted resources, with in-document references rewritten.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::warn;

use crate::model::part::Part;

/// Result of an extraction run.
#[derive(Debug)]
pub struct ExportSummary {
    /// Path of the written HTML document.
    pub html_path: PathBuf,
    /// Paths of the resource files written under `images/`.
    pub resources: Vec<PathBuf>,
}

/// Write part 0 as the HTML document at `html_path` and every subsequent
/// part as a file under a sibling `images/` directory, rewriting each
/// `<base>.dat` reference in the document to the written file's relative
/// path.
///
/// Individual resources that fail to base64-decode are skipped with a
/// warning; the run continues. The optional `progress` callback receives
/// `(written, total)` counts.
pub fn export_resources(
    parts: &[Part],
    html_path: &Path,
    progress: Option<&dyn Fn(usize, usize)>,
) -> anyhow::Result<ExportSummary> {
    let Some((document, resources)) = parts.split_first() else {
        anyhow::bail!("archive produced no parts");
    };

    let mut html = document.content.clone();
    let parent = html_path.parent().unwrap_or(Path::new("."));
    let images_dir = parent.join("images");

    if !resources.is_empty() {
        std::fs::create_dir_all(&images_dir)?;
    }

    let total = resources.len();
    let mut written = Vec::new();

    for (i, part) in resources.iter().enumerate() {
        if let Some(cb) = progress {
            cb(i, total);
        }

        let cleaned: String = part
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = match STANDARD.decode(cleaned.as_bytes()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    name = %part.name,
                    content_type = %part.content_type,
                    error = %e,
                    "resource is not valid base64, skipping"
                );
                continue;
            }
        };

        let ext = file_extension(&part.content_type);
        let base = file_stem(&part.name, i);
        let file_name = format!("{base}.{ext}");
        let path = images_dir.join(&file_name);
        std::fs::write(&path, &bytes)?;

        html = html.replace(&format!("{base}.dat"), &format!("images/{file_name}"));
        written.push(path);
    }

    if let Some(cb) = progress {
        cb(total, total);
    }

    std::fs::write(html_path, &html)?;

    Ok(ExportSummary {
        html_path: html_path.to_path_buf(),
        resources: written,
    })
}

/// File extension for a MIME type: the subtype, with `jpeg` mapped to the
/// conventional `jpg`.
fn file_extension(content_type: &str) -> String {
    match content_type.split('/').nth(1).unwrap_or("") {
        "" => "bin".to_string(),
        "jpeg" => "jpg".to_string(),
        other => other.to_string(),
    }
}

/// Base file name for a resource: the final path segment of its name, up
/// to the first `.`, sanitized for the file system. Generated when empty.
fn file_stem(name: &str, index: usize) -> String {
    let segment = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(name);
    let stem = segment.split('.').next().unwrap_or(segment);
    let sanitized = sanitize_filename_part(stem, 100);
    if sanitized.is_empty() {
        format!("resource_{index}")
    } else {
        sanitized
    }
}

/// Replace characters that are unsafe in file names and truncate.
fn sanitize_filename_part(input: &str, max_len: usize) -> String {
    let sanitized: String = input
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    sanitized.trim().chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension_maps_jpeg() {
        assert_eq!(file_extension("image/jpeg"), "jpg");
        assert_eq!(file_extension("image/png"), "png");
        assert_eq!(file_extension("application/octet-stream"), "octet-stream");
        assert_eq!(file_extension("garbage"), "bin");
    }

    #[test]
    fn test_file_stem_takes_last_segment_before_dot() {
        assert_eq!(file_stem("pic1.dat", 0), "pic1");
        assert_eq!(file_stem("http://example.com/img/pic2.png", 0), "pic2");
        assert_eq!(file_stem("", 3), "resource_3");
    }

    #[test]
    fn test_sanitize_filename_part() {
        assert_eq!(sanitize_filename_part("pic*1?", 100), "pic_1_");
        assert_eq!(sanitize_filename_part("picture 1", 100), "picture 1");
        assert_eq!(sanitize_filename_part("abcdef", 3), "abc");
    }

    #[test]
    fn test_export_to_tempdir_rewrites_references() {
        let tmp = tempfile::tempdir().unwrap();
        let html_path = tmp.path().join("page.html");

        let parts = vec![
            Part {
                content_type: "text/html".into(),
                name: "page.html".into(),
                content: "<html><img src=\"pic1.dat\"></html>".into(),
            },
            Part {
                content_type: "image/png".into(),
                name: "pic1.dat".into(),
                content: "QUJDREVGR0g=\n".into(),
            },
        ];

        let summary = export_resources(&parts, &html_path, None).unwrap();
        assert_eq!(summary.resources.len(), 1);

        let image_path = tmp.path().join("images").join("pic1.png");
        assert!(image_path.exists());
        assert_eq!(std::fs::read(&image_path).unwrap(), b"ABCDEFGH");

        let html = std::fs::read_to_string(&html_path).unwrap();
        assert!(html.contains("src=\"images/pic1.png\""));
        assert!(!html.contains("pic1.dat"));
    }

    #[test]
    fn test_undecodable_resource_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let html_path = tmp.path().join("page.html");

        let parts = vec![
            Part {
                content_type: "text/html".into(),
                name: String::new(),
                content: "<html></html>".into(),
            },
            Part {
                content_type: "image/png".into(),
                name: "bad.dat".into(),
                content: "!!!not base64!!!".into(),
            },
            Part {
                content_type: "image/gif".into(),
                name: "good.dat".into(),
                content: "QUJD".into(),
            },
        ];

        let summary = export_resources(&parts, &html_path, None).unwrap();
        assert_eq!(summary.resources.len(), 1);
        assert!(tmp.path().join("images").join("good.gif").exists());
        assert!(!tmp.path().join("images").join("bad.png").exists());
        assert!(html_path.exists());
    }

    #[test]
    fn test_no_parts_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(export_resources(&[], &tmp.path().join("out.html"), None).is_err());
    }
}
