//! Consumers of the decoded part list: inline HTML reassembly and
//! resource-file extraction.

pub mod files;
pub mod inline;
