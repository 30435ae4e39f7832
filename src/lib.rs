//! `mhtunpack` — decode MHTML (.mht) web archives into usable HTML.
//!
//! An MHTML archive is a single text blob that bundles an HTML document and
//! its inline resources (images, stylesheets) as MIME multipart sections.
//! This crate splits such an archive into its parts and turns them into
//! either a standalone HTML string with resources embedded as `data:` URIs,
//! or an HTML file plus a directory of extracted resource files with
//! rewritten references.

pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod trace;
